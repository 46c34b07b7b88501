//! Destination layout of organized tracks: `Initial/Artist/Album[/Disc NN]/NN Title.ext`.

use crate::album::{AlbumRecord, TrackRecord};
use crate::configuration::SidecarOptions;
use crate::foundation::utils::{artist_initial, sanitize_path_component};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Where the tracks of one album go.
#[derive(Debug, Clone, PartialEq)]
pub struct AlbumLayout {
    album_dir: PathBuf,
    disc_count: u32,
}

impl AlbumLayout {
    /// # Examples
    ///
    /// ```
    /// use ammg::album::{AlbumRecord, ReleaseType};
    /// use ammg::process::AlbumLayout;
    /// use std::path::Path;
    ///
    /// let album = AlbumRecord {
    ///     name: "Discovery".to_string(),
    ///     artist: "Daft Punk".to_string(),
    ///     release_date: "2001-03-12".to_string(),
    ///     copyright: String::new(),
    ///     label: String::new(),
    ///     release_type: ReleaseType::Album,
    ///     track_count: 14,
    ///     disc_count: 1,
    ///     cover_url: String::new(),
    ///     tracks: Vec::new(),
    /// };
    ///
    /// let layout = AlbumLayout::new(Path::new("/music"), &album);
    /// assert_eq!(layout.album_dir(), Path::new("/music/D/Daft Punk/Discovery"));
    /// ```
    pub fn new(root: &Path, album: &AlbumRecord) -> Self {
        let album_dir = root
            .join(sanitize_path_component(&artist_initial(&album.artist)))
            .join(sanitize_path_component(&album.artist))
            .join(sanitize_path_component(&album.name));

        Self {
            album_dir,
            disc_count: album.disc_count,
        }
    }

    pub fn album_dir(&self) -> &Path {
        &self.album_dir
    }

    /// Folder of a disc; the album folder itself for single-disc albums.
    pub fn disc_dir(&self, disc_number: u32) -> PathBuf {
        if self.disc_count >= 2 {
            self.album_dir.join(format!("Disc {:02}", disc_number))
        } else {
            self.album_dir.clone()
        }
    }

    /// Path of the organized track, keeping the extension of `source`.
    pub fn track_path(&self, track: &TrackRecord, source: &Path) -> PathBuf {
        let stem = track_stem(track);
        let file_name = match source.extension() {
            Some(ext) => format!("{}.{}", stem, ext.to_string_lossy()),
            None => stem,
        };
        self.disc_dir(track.disc_number).join(file_name)
    }

    /// Path of a sidecar file of the track, `extension` without the dot.
    pub fn sidecar_path(&self, track: &TrackRecord, extension: &str) -> PathBuf {
        self.disc_dir(track.disc_number)
            .join(format!("{}.{}", track_stem(track), extension))
    }
}

/// `NN Title`, with the track number padded to two digits.
pub fn track_stem(track: &TrackRecord) -> String {
    format!(
        "{:02} {}",
        track.track_number,
        sanitize_path_component(&track.title)
    )
}

/// Moves a file, creating the destination folder if needed. Falls back to
/// copying and removing the source when a rename is not possible, e.g. across
/// file systems.
pub fn move_into_place(source: &Path, destination: &Path) -> io::Result<()> {
    if let Some(parent) = destination.parent() {
        fs::create_dir_all(parent)?;
    }

    if let Err(e) = fs::rename(source, destination) {
        log::debug!(
            "rename {} failed ({}), copying instead",
            source.display(),
            e
        );
        fs::copy(source, destination)?;
        fs::remove_file(source)?;
    }

    Ok(())
}

/// Writes the requested `.lrc` and `.txt` files of a track and returns their paths.
pub fn write_sidecars(
    layout: &AlbumLayout,
    track: &TrackRecord,
    sidecars: &SidecarOptions,
) -> io::Result<Vec<PathBuf>> {
    let mut written = Vec::new();

    for (extension, text) in [("lrc", &sidecars.lrc), ("txt", &sidecars.txt)] {
        if let Some(text) = text {
            let path = layout.sidecar_path(track, extension);
            fs::write(&path, text)?;
            written.push(path);
        }
    }

    Ok(written)
}
