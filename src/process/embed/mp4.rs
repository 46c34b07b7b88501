use super::{CoverArt, EmbedError, TagWriter, TrackTags};
use lofty::config::{ParseOptions, WriteOptions};
use lofty::file::AudioFile;
use lofty::mp4::{Atom, AtomData, AtomIdent, Ilst, Mp4File};
use lofty::picture::{Picture, PictureType};
use lofty::tag::Accessor;
use std::borrow::Cow;
use std::fs::File;
use std::path::Path;

const DATE: AtomIdent<'static> = AtomIdent::Fourcc(*b"\xa9day");
const COMPOSER: AtomIdent<'static> = AtomIdent::Fourcc(*b"\xa9wrt");
const ALBUM_ARTIST: AtomIdent<'static> = AtomIdent::Fourcc(*b"aART");
const COPYRIGHT: AtomIdent<'static> = AtomIdent::Fourcc(*b"cprt");

const ITUNES_MEAN: &str = "com.apple.iTunes";

fn freeform(name: &'static str) -> AtomIdent<'static> {
    AtomIdent::Freeform {
        mean: Cow::Borrowed(ITUNES_MEAN),
        name: Cow::Borrowed(name),
    }
}

/// Writes `ilst` atoms into MP4 files.
pub struct Mp4TagWriter {
    file: Mp4File,
}

impl Mp4TagWriter {
    pub fn open(path: &Path) -> Result<Self, EmbedError> {
        let mut reader = File::open(path)?;
        let file = Mp4File::read_from(&mut reader, ParseOptions::new())?;
        Ok(Self { file })
    }
}

impl TagWriter for Mp4TagWriter {
    fn apply(&mut self, tags: &TrackTags, cover: Option<&CoverArt>) -> Result<(), EmbedError> {
        let mut ilst = self.file.remove_ilst().unwrap_or_default();
        write_ilst(&mut ilst, tags, cover);
        self.file.set_ilst(ilst);
        Ok(())
    }

    fn save(&self, path: &Path) -> Result<(), EmbedError> {
        self.file.save_to_path(path, WriteOptions::default())?;
        Ok(())
    }
}

/// Fills an `ilst` with the track fields. The release type has no atom and is
/// not written.
fn write_ilst(ilst: &mut Ilst, tags: &TrackTags, cover: Option<&CoverArt>) {
    set_text(ilst, AtomIdent::Fourcc(*b"\xa9nam"), &tags.title);
    set_text(ilst, AtomIdent::Fourcc(*b"\xa9ART"), &tags.artist);
    set_text(ilst, AtomIdent::Fourcc(*b"\xa9alb"), &tags.album);
    set_text(ilst, ALBUM_ARTIST, &tags.album_artist);
    set_text(ilst, DATE, &tags.date);
    set_text(ilst, COMPOSER, &tags.composer);
    set_text(ilst, AtomIdent::Fourcc(*b"\xa9gen"), &tags.genre);
    set_text(ilst, COPYRIGHT, &tags.copyright);

    ilst.set_track(tags.track_number);
    ilst.set_track_total(tags.track_total);
    ilst.set_disk(tags.disc_number);
    ilst.set_disk_total(tags.disc_total);

    set_text(ilst, freeform("ISRC"), &tags.isrc);
    set_text(ilst, freeform("MEDIA"), &tags.media);
    set_text(ilst, freeform("LABEL"), &tags.label);

    if let Some(cover) = cover {
        ilst.remove_pictures();
        ilst.insert_picture(Picture::new_unchecked(
            PictureType::CoverFront,
            Some(cover.mime_type.clone()),
            None,
            cover.data.clone(),
        ));
    }
}

fn set_text(ilst: &mut Ilst, ident: AtomIdent<'static>, value: &str) {
    if value.is_empty() {
        let _ = ilst.remove(&ident);
    } else {
        ilst.replace_atom(Atom::new(ident, AtomData::UTF8(value.to_string())));
    }
}
