use reqwest::Error as ReqwestError;
use std::{fmt, io};

#[derive(Debug)]
pub enum ApiError {
    IoError(io::Error),
    JsonParseError(serde_json::Error),
    HttpFailure { status: u16 },
    MalformedResponse(String),
    TokenScrapeFailure(String),
    ReqwestError(ReqwestError),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ApiError::IoError(e) => write!(f, "IO error: {}", e),
            ApiError::JsonParseError(e) => write!(f, "JSON parse error: {}", e),
            ApiError::HttpFailure { status } => write!(
                f,
                "Catalog request failed with status {}. Maybe run with --clean-request",
                status
            ),
            ApiError::MalformedResponse(s) => write!(f, "Malformed catalog response: {}", s),
            ApiError::TokenScrapeFailure(s) => write!(f, "Unable to get a token: {}", s),
            ApiError::ReqwestError(e) => write!(f, "Reqwest error: {}", e),
        }
    }
}

impl std::error::Error for ApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ApiError::IoError(e) => Some(e),
            ApiError::JsonParseError(e) => Some(e),
            ApiError::ReqwestError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for ApiError {
    fn from(error: io::Error) -> Self {
        ApiError::IoError(error)
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(error: serde_json::Error) -> Self {
        ApiError::JsonParseError(error)
    }
}

impl From<ReqwestError> for ApiError {
    fn from(error: ReqwestError) -> Self {
        ApiError::ReqwestError(error)
    }
}
