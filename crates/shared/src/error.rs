use serde::{Deserialize, Serialize};

/// Error body the service attaches to non-2xx responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub detail: String,
}

impl ErrorDetail {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }

    /// Best-effort extraction of the detail from a raw response body.
    /// Falls back to the trimmed body text when it isn't the JSON error shape.
    pub fn from_body(body: &str) -> Option<Self> {
        if let Ok(parsed) = serde_json::from_str::<ErrorDetail>(body) {
            return Some(parsed);
        }
        let trimmed = body.trim();
        (!trimmed.is_empty()).then(|| Self::new(trimmed))
    }
}
