mod models;
mod operations;

pub use models::CachedResponse;
pub use operations::*;
