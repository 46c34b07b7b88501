//! Turns a raw catalog response into an [`AlbumRecord`].

use crate::album::{AlbumRecord, ReleaseType, TrackRecord, DIGITAL_MEDIA};
use crate::api_client::ApiError;
use crate::foundation::cache::CachedResponse;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct CatalogPage {
    #[serde(default)]
    data: Vec<AlbumResource>,
}

#[derive(Debug, Deserialize)]
struct AlbumResource {
    attributes: Option<AlbumAttributes>,
    relationships: Option<AlbumRelationships>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AlbumAttributes {
    name: Option<String>,
    artist_name: Option<String>,
    release_date: Option<String>,
    copyright: Option<String>,
    record_label: Option<String>,
    track_count: Option<u32>,
    artwork: Option<Artwork>,
    play_params: Option<PlayParams>,
    #[serde(default)]
    is_single: bool,
}

#[derive(Debug, Deserialize)]
struct Artwork {
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PlayParams {
    kind: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AlbumRelationships {
    tracks: Option<TrackList>,
}

#[derive(Debug, Deserialize)]
struct TrackList {
    #[serde(default)]
    data: Vec<TrackResource>,
}

#[derive(Debug, Deserialize)]
struct TrackResource {
    attributes: Option<TrackAttributes>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TrackAttributes {
    name: Option<String>,
    artist_name: Option<String>,
    composer_name: Option<String>,
    #[serde(default)]
    genre_names: Vec<String>,
    isrc: Option<String>,
    duration_in_millis: Option<u64>,
    track_number: Option<u32>,
    disc_number: Option<u32>,
    release_date: Option<String>,
}

/// Builds an [`AlbumRecord`] out of a catalog response.
///
/// A response that does not carry status 200 is an [`ApiError::HttpFailure`];
/// a successful response lacking the album structure, or containing a track
/// without a positive track or disc number, is an
/// [`ApiError::MalformedResponse`].
///
/// # Arguments
///
/// * `response` - The response as returned by the catalog client or the cache.
///
pub fn analyze_response(response: &CachedResponse) -> Result<AlbumRecord, ApiError> {
    if !response.is_success() {
        return Err(ApiError::HttpFailure {
            status: response.status,
        });
    }

    let body = response
        .json
        .clone()
        .ok_or_else(|| malformed("response has no body"))?;
    let page: CatalogPage = serde_json::from_value(body)
        .map_err(|e| malformed(&format!("unexpected layout ({})", e)))?;

    let album = page
        .data
        .into_iter()
        .next()
        .ok_or_else(|| malformed("`data` is empty"))?;
    let attributes = album
        .attributes
        .ok_or_else(|| malformed("album has no attributes"))?;

    let name = attributes.name.ok_or_else(|| malformed("album has no name"))?;
    let artist = attributes
        .artist_name
        .ok_or_else(|| malformed("album has no artist name"))?;
    let cover_url = attributes
        .artwork
        .and_then(|artwork| artwork.url)
        .ok_or_else(|| malformed("album has no artwork url"))?;

    let kind = attributes
        .play_params
        .and_then(|params| params.kind)
        .unwrap_or_else(|| "album".to_string());
    let release_type = derive_release_type(&kind, attributes.is_single, &name);

    let track_resources = album
        .relationships
        .and_then(|relationships| relationships.tracks)
        .map(|tracks| tracks.data)
        .unwrap_or_default();

    let tracks = track_resources
        .into_iter()
        .enumerate()
        .map(|(index, track)| analyze_track(index, track))
        .collect::<Result<Vec<_>, _>>()?;

    let disc_count = tracks
        .iter()
        .map(|track| track.disc_number)
        .max()
        .ok_or_else(|| malformed("album has no tracks"))?;

    Ok(AlbumRecord {
        name,
        artist,
        release_date: trimmed(attributes.release_date),
        copyright: trimmed(attributes.copyright),
        label: trimmed(attributes.record_label),
        release_type,
        track_count: attributes.track_count.unwrap_or(tracks.len() as u32),
        disc_count,
        cover_url,
        tracks,
    })
}

fn analyze_track(index: usize, track: TrackResource) -> Result<TrackRecord, ApiError> {
    let position = index + 1;
    let info = track
        .attributes
        .ok_or_else(|| malformed(&format!("track #{} has no attributes", position)))?;

    let title = info
        .name
        .ok_or_else(|| malformed(&format!("track #{} has no name", position)))?;
    let track_number = info
        .track_number
        .filter(|n| *n > 0)
        .ok_or_else(|| malformed(&format!("track '{}' has no track number", title)))?;
    let disc_number = info
        .disc_number
        .filter(|n| *n > 0)
        .ok_or_else(|| malformed(&format!("track '{}' has no disc number", title)))?;
    let duration_ms = info
        .duration_in_millis
        .ok_or_else(|| malformed(&format!("track '{}' has no duration", title)))?;

    Ok(TrackRecord {
        artist: info.artist_name.unwrap_or_default(),
        composer: info.composer_name.unwrap_or_default(),
        genre: info.genre_names.into_iter().next().unwrap_or_default(),
        isrc: info.isrc.unwrap_or_default(),
        release_date: trimmed(info.release_date),
        media: DIGITAL_MEDIA.to_string(),
        title,
        duration_ms,
        track_number,
        disc_number,
    })
}

/// Albums flagged as single become singles; albums whose name contains
/// `- EP` become EPs. The EP check is case sensitive and misses EPs the
/// catalog does not name that way.
fn derive_release_type(kind: &str, is_single: bool, name: &str) -> ReleaseType {
    match kind {
        "album" if is_single => ReleaseType::Single,
        "album" if name.contains("- EP") => ReleaseType::Ep,
        "album" => ReleaseType::Album,
        other => ReleaseType::Other(other.to_string()),
    }
}

fn trimmed(value: Option<String>) -> String {
    value.map(|s| s.trim().to_string()).unwrap_or_default()
}

fn malformed(reason: &str) -> ApiError {
    ApiError::MalformedResponse(reason.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn track(name: &str, number: u32, disc: u32) -> Value {
        json!({
            "attributes": {
                "name": name,
                "artistName": "Daft Punk",
                "genreNames": ["Electronic", "Music"],
                "isrc": "USQX91300108",
                "durationInMillis": 274_000,
                "trackNumber": number,
                "discNumber": disc,
                "releaseDate": "2013-05-17"
            }
        })
    }

    fn album_response(attributes: Value, tracks: Vec<Value>) -> CachedResponse {
        CachedResponse {
            status: 200,
            json: Some(json!({
                "data": [{
                    "attributes": attributes,
                    "relationships": { "tracks": { "data": tracks } }
                }]
            })),
        }
    }

    fn attributes(name: &str, is_single: bool) -> Value {
        json!({
            "name": name,
            "artistName": "Daft Punk",
            "releaseDate": " 2013-05-17 ",
            "copyright": " ℗ 2013 Daft Life Limited ",
            "recordLabel": "Columbia",
            "trackCount": 13,
            "artwork": { "url": "https://example.com/{w}x{h}bb.jpg" },
            "playParams": { "kind": "album" },
            "isSingle": is_single
        })
    }

    #[test]
    fn test_analyze_album() {
        let response = album_response(
            attributes("Random Access Memories", false),
            vec![track("Give Life Back to Music", 1, 1), track("Get Lucky", 8, 1)],
        );

        let album = analyze_response(&response).unwrap();
        assert_eq!(album.name, "Random Access Memories");
        assert_eq!(album.artist, "Daft Punk");
        assert_eq!(album.release_date, "2013-05-17");
        assert_eq!(album.copyright, "℗ 2013 Daft Life Limited");
        assert_eq!(album.label, "Columbia");
        assert_eq!(album.release_type, ReleaseType::Album);
        assert_eq!(album.track_count, 13);
        assert_eq!(album.disc_count, 1);
        assert_eq!(album.tracks.len(), 2);

        let get_lucky = &album.tracks[1];
        assert_eq!(get_lucky.title, "Get Lucky");
        assert_eq!(get_lucky.genre, "Electronic");
        assert_eq!(get_lucky.composer, "");
        assert_eq!(get_lucky.media, "Digital Media");
        assert_eq!(get_lucky.duration_secs(), 274);
    }

    #[test]
    fn test_disc_count_is_highest_disc_number() {
        let response = album_response(
            attributes("Box", false),
            vec![track("A", 1, 1), track("B", 2, 1), track("C", 1, 2)],
        );

        let album = analyze_response(&response).unwrap();
        assert_eq!(album.disc_count, 2);
    }

    #[test]
    fn test_release_type_derivation() {
        assert_eq!(
            derive_release_type("album", true, "Song - Single"),
            ReleaseType::Single
        );
        assert_eq!(derive_release_type("album", false, "Alive - EP"), ReleaseType::Ep);
        assert_eq!(
            derive_release_type("album", true, "Alive - EP"),
            ReleaseType::Single
        );
        // Case sensitive.
        assert_eq!(
            derive_release_type("album", false, "Alive - ep"),
            ReleaseType::Album
        );
        assert_eq!(
            derive_release_type("playlist", false, "Mix - EP"),
            ReleaseType::Other("playlist".to_string())
        );
    }

    #[test]
    fn test_single_from_response() {
        let response = album_response(
            attributes("Get Lucky - Single", true),
            vec![track("Get Lucky", 1, 1)],
        );
        let album = analyze_response(&response).unwrap();
        assert_eq!(album.release_type.as_str(), "single");
    }

    #[test]
    fn test_missing_optional_attributes_default_to_empty() {
        let response = album_response(
            json!({
                "name": "Demo",
                "artistName": "Nobody",
                "artwork": { "url": "https://example.com/{w}x{h}.jpg" },
                "playParams": { "kind": "album" }
            }),
            vec![json!({
                "attributes": {
                    "name": "Untitled",
                    "genreNames": [],
                    "durationInMillis": 1000,
                    "trackNumber": 1,
                    "discNumber": 1
                }
            })],
        );

        let album = analyze_response(&response).unwrap();
        assert_eq!(album.copyright, "");
        assert_eq!(album.label, "");
        assert_eq!(album.track_count, 1);
        assert_eq!(album.tracks[0].genre, "");
        assert_eq!(album.tracks[0].isrc, "");
    }

    #[test]
    fn test_non_success_status_is_http_failure() {
        let response = CachedResponse {
            status: 401,
            json: None,
        };
        assert!(matches!(
            analyze_response(&response),
            Err(ApiError::HttpFailure { status: 401 })
        ));
    }

    #[test]
    fn test_empty_data_is_malformed() {
        let response = CachedResponse {
            status: 200,
            json: Some(json!({ "data": [] })),
        };
        assert!(matches!(
            analyze_response(&response),
            Err(ApiError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_album_without_tracks_is_malformed() {
        let response = album_response(attributes("Empty", false), vec![]);
        assert!(matches!(
            analyze_response(&response),
            Err(ApiError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_zero_track_number_is_malformed() {
        let response = album_response(attributes("Broken", false), vec![track("Zero", 0, 1)]);
        assert!(matches!(
            analyze_response(&response),
            Err(ApiError::MalformedResponse(_))
        ));
    }
}
