use super::{CoverArt, EmbedError, TagWriter, TrackTags};
use lofty::config::{ParseOptions, WriteOptions};
use lofty::file::AudioFile;
use lofty::ogg::{OggPictureStorage, OpusFile, VorbisComments};
use lofty::picture::{Picture, PictureInformation, PictureType};
use std::fs::File;
use std::path::Path;

/// Writes Vorbis comments into Ogg/Opus files.
pub struct OpusTagWriter {
    file: OpusFile,
}

impl OpusTagWriter {
    pub fn open(path: &Path) -> Result<Self, EmbedError> {
        let mut reader = File::open(path)?;
        let file = OpusFile::read_from(&mut reader, ParseOptions::new())?;
        Ok(Self { file })
    }
}

impl TagWriter for OpusTagWriter {
    fn apply(&mut self, tags: &TrackTags, cover: Option<&CoverArt>) -> Result<(), EmbedError> {
        write_comments(self.file.vorbis_comments_mut(), tags, cover)
    }

    fn save(&self, path: &Path) -> Result<(), EmbedError> {
        self.file.save_to_path(path, WriteOptions::default())?;
        Ok(())
    }
}

/// Fills the comment block. Track and disc totals go under both of their
/// customary keys. The cover is stored as a `METADATA_BLOCK_PICTURE`,
/// replacing any front cover already present.
fn write_comments(
    comments: &mut VorbisComments,
    tags: &TrackTags,
    cover: Option<&CoverArt>,
) -> Result<(), EmbedError> {
    let track_number = tags.track_number.to_string();
    let track_total = tags.track_total.to_string();
    let disc_number = tags.disc_number.to_string();
    let disc_total = tags.disc_total.to_string();

    let fields: [(&str, &str); 18] = [
        ("TITLE", &tags.title),
        ("ARTIST", &tags.artist),
        ("ALBUM", &tags.album),
        ("ALBUMARTIST", &tags.album_artist),
        ("DATE", &tags.date),
        ("COMPOSER", &tags.composer),
        ("GENRE", &tags.genre),
        ("TRACKNUMBER", &track_number),
        ("TRACKTOTAL", &track_total),
        ("TOTALTRACKS", &track_total),
        ("DISCNUMBER", &disc_number),
        ("DISCTOTAL", &disc_total),
        ("TOTALDISCS", &disc_total),
        ("ISRC", &tags.isrc),
        ("COPYRIGHT", &tags.copyright),
        ("RELEASETYPE", &tags.release_type),
        ("MEDIA", &tags.media),
        ("LABEL", &tags.label),
    ];

    for (key, value) in fields {
        if value.is_empty() {
            let _ = comments.remove(key);
        } else {
            comments.insert(key.to_string(), value.to_string());
        }
    }

    if let Some(cover) = cover {
        comments.remove_picture_type(PictureType::CoverFront);
        let picture = Picture::new_unchecked(
            PictureType::CoverFront,
            Some(cover.mime_type.clone()),
            None,
            cover.data.clone(),
        );
        let information = PictureInformation {
            width: cover.width,
            height: cover.height,
            color_depth: cover.color_depth,
            num_colors: 0,
        };
        comments.insert_picture(picture, Some(information))?;
    }

    Ok(())
}
