pub mod embed;
mod matcher;
mod organizer;
#[allow(clippy::module_inception)]
mod process;
mod run_error;

pub use matcher::{find_match, scan_candidates, LocalFileCandidate};
pub use organizer::{move_into_place, track_stem, write_sidecars, AlbumLayout};
pub use process::{process_album, RunSummary};
pub use run_error::RunError;
