//! Pairing of catalog tracks with local audio files.

use crate::album::TrackRecord;
use crate::foundation::utils::normalize_unicode;
use lofty::file::AudioFile;
use lofty::probe::Probe;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// A local audio file that may belong to a catalog track.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalFileCandidate {
    pub path: PathBuf,
    /// Container duration, floored to whole seconds.
    pub duration_secs: u64,
    /// File stem, lowercased and in composed form.
    pub title: String,
}

impl LocalFileCandidate {
    /// Reads the duration of an audio file. Fails for files whose container
    /// cannot be read.
    pub fn from_path(path: &Path) -> lofty::error::Result<Self> {
        let tagged_file = Probe::open(path)?.guess_file_type()?.read()?;
        let duration_secs = tagged_file.properties().duration().as_secs();

        let stem = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();

        Ok(Self {
            path: path.to_path_buf(),
            duration_secs,
            title: normalize_unicode(&stem),
        })
    }

    /// Whether this file can stand for `track`: the durations differ by at
    /// most `tolerance` seconds and the file title appears inside the catalog title.
    pub fn qualifies_for(&self, track: &TrackRecord, tolerance: u64) -> bool {
        let error = track.duration_secs().abs_diff(self.duration_secs);
        error <= tolerance && normalize_unicode(&track.title).contains(&self.title)
    }
}

/// Collects the readable audio files directly inside `directory`, ordered by
/// file name. Files that are not audio are skipped.
///
/// # Arguments
///
/// * `directory` - The folder holding the downloaded files.
///
pub fn scan_candidates(directory: &Path) -> io::Result<Vec<LocalFileCandidate>> {
    let mut candidates = Vec::new();

    for entry in WalkDir::new(directory)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(io::Error::from)?;
        if !entry.file_type().is_file() {
            continue;
        }

        match LocalFileCandidate::from_path(entry.path()) {
            Ok(candidate) => candidates.push(candidate),
            Err(e) => log::debug!("Skipping {}: {}", entry.path().display(), e),
        }
    }

    Ok(candidates)
}

/// Picks the file for a catalog track.
///
/// Every candidate is checked and the last qualifying one in the given order
/// wins, not the first.
pub fn find_match<'a>(
    track: &TrackRecord,
    candidates: &'a [LocalFileCandidate],
    tolerance: u64,
) -> Option<&'a LocalFileCandidate> {
    candidates
        .iter()
        .filter(|candidate| candidate.qualifies_for(track, tolerance))
        .last()
}
