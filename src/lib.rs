pub mod album;
pub mod api_client;
pub mod configuration;
pub mod foundation;
pub mod process;
pub mod startup;

pub use album::{analyze_response, AlbumRecord, ReleaseType, TrackRecord};
pub use api_client::{ApiError, CatalogClient, TokenProvider, WebTokenProvider};
pub use configuration::*;
pub use foundation::cache::*;
pub use process::{process_album, RunError, RunSummary};
