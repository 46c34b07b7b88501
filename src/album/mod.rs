mod analyzer;
mod models;

pub use analyzer::analyze_response;
pub use models::*;
