/// Media kind written for every track fetched from the catalog.
pub const DIGITAL_MEDIA: &str = "Digital Media";

/// The kind of release, as derived from the catalog's play parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReleaseType {
    Album,
    Single,
    Ep,
    Other(String),
}

impl ReleaseType {
    pub fn as_str(&self) -> &str {
        match self {
            ReleaseType::Album => "album",
            ReleaseType::Single => "single",
            ReleaseType::Ep => "ep",
            ReleaseType::Other(kind) => kind,
        }
    }
}

/// Album metadata flattened from a catalog response.
#[derive(Debug, Clone, PartialEq)]
pub struct AlbumRecord {
    pub name: String,
    pub artist: String,
    pub release_date: String,
    pub copyright: String,
    pub label: String,
    pub release_type: ReleaseType,
    /// Track count as declared by the catalog.
    pub track_count: u32,
    /// Highest disc number among the tracks.
    pub disc_count: u32,
    /// Artwork URL with `{w}` and `{h}` placeholders.
    pub cover_url: String,
    pub tracks: Vec<TrackRecord>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrackRecord {
    pub title: String,
    pub artist: String,
    pub composer: String,
    pub genre: String,
    pub isrc: String,
    pub duration_ms: u64,
    pub track_number: u32,
    pub disc_number: u32,
    pub release_date: String,
    pub media: String,
}

impl TrackRecord {
    /// Catalog duration in whole seconds, truncated.
    pub fn duration_secs(&self) -> u64 {
        self.duration_ms / 1000
    }
}
