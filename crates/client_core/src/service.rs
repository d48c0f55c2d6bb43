use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use shared::{
    domain::Scenario,
    error::ErrorDetail,
    protocol::{ChatRequest, ReplyResponse, StatusResponse},
};

use crate::{
    config::{normalize_base_url, Settings},
    error::{ClientError, ServiceError},
};

/// Remote backend that plays the attacker for a scenario.
#[async_trait]
pub trait ScenarioChatService: Send + Sync {
    /// Fetches the opening line for `scenario`.
    async fn start(&self, scenario: Scenario) -> Result<String, ServiceError>;
    /// Sends one user message and returns the attacker's reply.
    async fn send(&self, scenario: Scenario, message: &str) -> Result<String, ServiceError>;
}

pub struct HttpScenarioChatService {
    http: Client,
    base_url: String,
}

impl HttpScenarioChatService {
    pub fn new(settings: &Settings) -> Result<Self, ClientError> {
        let mut builder = Client::builder();
        if let Some(timeout) = settings.request_timeout() {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(ClientError::HttpClient)?;
        Ok(Self {
            http,
            base_url: normalize_base_url(&settings.base_url)?,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Health endpoint of the backend.
    pub async fn status(&self) -> Result<StatusResponse, ServiceError> {
        let res = self.http.get(format!("{}/", self.base_url)).send().await?;
        decode(res).await
    }
}

#[async_trait]
impl ScenarioChatService for HttpScenarioChatService {
    async fn start(&self, scenario: Scenario) -> Result<String, ServiceError> {
        let res = self
            .http
            .get(format!("{}/start/{}", self.base_url, scenario.as_str()))
            .send()
            .await?;
        let body: ReplyResponse = decode(res).await?;
        Ok(body.reply)
    }

    async fn send(&self, scenario: Scenario, message: &str) -> Result<String, ServiceError> {
        let res = self
            .http
            .post(format!("{}/chat", self.base_url))
            .json(&ChatRequest {
                message: message.to_string(),
                scenario,
            })
            .send()
            .await?;
        let body: ReplyResponse = decode(res).await?;
        Ok(body.reply)
    }
}

async fn decode<T: DeserializeOwned>(res: Response) -> Result<T, ServiceError> {
    let status = res.status();
    if !status.is_success() {
        let detail = res
            .text()
            .await
            .ok()
            .and_then(|body| ErrorDetail::from_body(&body))
            .map(|detail| detail.detail);
        return Err(ServiceError::Status { status, detail });
    }

    let body = res.bytes().await?;
    serde_json::from_slice(&body).map_err(|err| ServiceError::Malformed(err.to_string()))
}

#[cfg(test)]
#[path = "tests/service_tests.rs"]
mod tests;
