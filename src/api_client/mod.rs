mod api_error;
mod catalog;
mod token;
mod transport;

pub use api_error::ApiError;
pub use catalog::CatalogClient;
pub use token::*;
pub use transport::*;
