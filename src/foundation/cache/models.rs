use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A catalog response as persisted in the cache: the HTTP status and,
/// for successful requests, the decoded body.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CachedResponse {
    pub status: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub json: Option<Value>,
}

impl CachedResponse {
    pub fn is_success(&self) -> bool {
        self.status == 200
    }
}
