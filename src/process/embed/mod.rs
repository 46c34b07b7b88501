//! Writing catalog metadata into audio files.
//!
//! A file goes through `Unopened -> Inspected -> Tagged -> Saved`. Inspection
//! reads the container family from the file content; only MP4 and Ogg/Opus are
//! handled. Nothing is written to a file that fails inspection.

mod mp4;
mod opus;

pub use self::mp4::Mp4TagWriter;
pub use self::opus::OpusTagWriter;

use crate::album::{AlbumRecord, TrackRecord};
use crate::foundation::utils::image_dimensions;
use lofty::error::LoftyError;
use lofty::file::FileType;
use lofty::picture::MimeType;
use lofty::probe::Probe;
use std::path::Path;
use std::{fmt, io};

#[derive(Debug)]
pub enum EmbedError {
    IoError(io::Error),
    TagError(LoftyError),
    UnsupportedFormat(String),
}

impl fmt::Display for EmbedError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            EmbedError::IoError(e) => write!(f, "IO error: {}", e),
            EmbedError::TagError(e) => write!(f, "Tag error: {}", e),
            EmbedError::UnsupportedFormat(s) => write!(f, "Unsupported audio format: {}", s),
        }
    }
}

impl std::error::Error for EmbedError {}

impl From<io::Error> for EmbedError {
    fn from(error: io::Error) -> Self {
        EmbedError::IoError(error)
    }
}

impl From<LoftyError> for EmbedError {
    fn from(error: LoftyError) -> Self {
        EmbedError::TagError(error)
    }
}

/// The container families tags can be written to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerKind {
    Mp4,
    Opus,
}

impl ContainerKind {
    /// Probes the file content for its container family.
    pub fn inspect(path: &Path) -> Result<Self, EmbedError> {
        let file_type = Probe::open(path)?.guess_file_type()?.file_type();

        match file_type {
            Some(FileType::Mp4) => Ok(ContainerKind::Mp4),
            Some(FileType::Opus) => Ok(ContainerKind::Opus),
            Some(other) => Err(EmbedError::UnsupportedFormat(format!(
                "{} is {:?}",
                path.display(),
                other
            ))),
            None => Err(EmbedError::UnsupportedFormat(format!(
                "{} has an unknown format",
                path.display()
            ))),
        }
    }
}

/// Cover image and its descriptor.
#[derive(Debug, Clone, PartialEq)]
pub struct CoverArt {
    pub data: Vec<u8>,
    pub mime_type: MimeType,
    pub width: u32,
    pub height: u32,
    /// Bits per pixel.
    pub color_depth: u32,
}

impl CoverArt {
    /// The size read from the image header wins over `width` and `height`,
    /// which are only used when the header has none.
    pub fn new(data: Vec<u8>, width: u32, height: u32) -> Self {
        let mime_type = if data.starts_with(b"\x89PNG") {
            MimeType::Png
        } else {
            MimeType::Jpeg
        };
        let (width, height) = image_dimensions(&data).unwrap_or((width, height));

        Self {
            data,
            mime_type,
            width,
            height,
            color_depth: 8,
        }
    }
}

/// The full set of fields written to one track.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackTags {
    pub title: String,
    pub artist: String,
    pub album: String,
    pub album_artist: String,
    pub date: String,
    pub composer: String,
    pub genre: String,
    pub track_number: u32,
    pub track_total: u32,
    pub disc_number: u32,
    pub disc_total: u32,
    pub isrc: String,
    pub media: String,
    pub release_type: String,
    pub copyright: String,
    pub label: String,
}

impl TrackTags {
    /// Combines album-wide and per-track fields. The album release date is
    /// used as the date of every track.
    pub fn new(album: &AlbumRecord, track: &TrackRecord) -> Self {
        Self {
            title: track.title.clone(),
            artist: track.artist.clone(),
            album: album.name.clone(),
            album_artist: album.artist.clone(),
            date: album.release_date.clone(),
            composer: track.composer.clone(),
            genre: track.genre.clone(),
            track_number: track.track_number,
            track_total: album.track_count,
            disc_number: track.disc_number,
            disc_total: album.disc_count,
            isrc: track.isrc.clone(),
            media: track.media.clone(),
            release_type: album.release_type.as_str().to_string(),
            copyright: album.copyright.clone(),
            label: album.label.clone(),
        }
    }
}

/// Tag writing for one container family. Empty text fields are removed from
/// the file rather than written empty.
pub trait TagWriter {
    fn apply(&mut self, tags: &TrackTags, cover: Option<&CoverArt>) -> Result<(), EmbedError>;
    fn save(&self, path: &Path) -> Result<(), EmbedError>;
}

/// Writes `tags` and `cover` into the file at `path`, keeping the audio stream
/// and unrelated metadata untouched.
///
/// Returns the inspected container family. Files that are neither MP4 nor
/// Ogg/Opus fail with [`EmbedError::UnsupportedFormat`] before anything is written.
///
/// # Arguments
///
/// * `path` - The audio file to tag in place.
/// * `tags` - Field values for the track.
/// * `cover` - Front cover to embed, replacing any existing one.
///
pub fn embed_metadata(
    path: &Path,
    tags: &TrackTags,
    cover: Option<&CoverArt>,
) -> Result<ContainerKind, EmbedError> {
    let kind = ContainerKind::inspect(path)?;
    log::debug!("{}: inspected as {:?}", path.display(), kind);

    let mut writer: Box<dyn TagWriter> = match kind {
        ContainerKind::Mp4 => Box::new(Mp4TagWriter::open(path)?),
        ContainerKind::Opus => Box::new(OpusTagWriter::open(path)?),
    };

    writer.apply(tags, cover)?;
    log::debug!("{}: tagged", path.display());

    writer.save(path)?;
    log::debug!("{}: saved", path.display());

    Ok(kind)
}
