use crate::api_client::ApiError;
use std::{fmt, io};

/// Errors that stop a `get` run.
#[derive(Debug)]
pub enum RunError {
    Api(ApiError),
    IoError(io::Error),
    UnsupportedFormat(String),
}

impl RunError {
    /// Process exit code for the error: 2 for audio files that cannot be
    /// tagged, 1 for everything else.
    pub fn exit_code(&self) -> u8 {
        match self {
            RunError::UnsupportedFormat(_) => 2,
            RunError::Api(_) | RunError::IoError(_) => 1,
        }
    }
}

impl fmt::Display for RunError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RunError::Api(e) => write!(f, "{}", e),
            RunError::IoError(e) => write!(f, "IO error: {}", e),
            RunError::UnsupportedFormat(s) => write!(f, "Unsupported audio format: {}", s),
        }
    }
}

impl std::error::Error for RunError {}

impl From<ApiError> for RunError {
    fn from(error: ApiError) -> Self {
        RunError::Api(error)
    }
}

impl From<io::Error> for RunError {
    fn from(error: io::Error) -> Self {
        RunError::IoError(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(RunError::UnsupportedFormat("a.wav".to_string()).exit_code(), 2);
        assert_eq!(
            RunError::from(ApiError::MalformedResponse("no data".to_string())).exit_code(),
            1
        );
        assert_eq!(
            RunError::from(ApiError::HttpFailure { status: 404 }).exit_code(),
            1
        );
        assert_eq!(
            RunError::from(io::Error::new(io::ErrorKind::NotFound, "gone")).exit_code(),
            1
        );
    }
}
