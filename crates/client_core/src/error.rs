use std::path::PathBuf;

use reqwest::StatusCode;
use shared::domain::Scenario;
use thiserror::Error;

/// Failure of a single call to the scenario chat service.
///
/// The conversation controller collapses every variant into the same
/// user-facing notice; the distinction only survives in logs.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("transport failure: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("service returned {status}{}", detail_suffix(.detail))]
    Status {
        status: StatusCode,
        detail: Option<String>,
    },
    #[error("malformed service response: {0}")]
    Malformed(String),
}

fn detail_suffix(detail: &Option<String>) -> String {
    detail
        .as_deref()
        .map(|detail| format!(": {detail}"))
        .unwrap_or_default()
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("scenario '{0}' is not available yet")]
    ScenarioUnavailable(Scenario),
    #[error("invalid service base url '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
    #[error("failed to read settings from '{}': {reason}", .path.display())]
    Settings { path: PathBuf, reason: String },
    #[error("failed to build http client: {0}")]
    HttpClient(#[source] reqwest::Error),
}
