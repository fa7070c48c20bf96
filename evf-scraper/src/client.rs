//! HTTP client for the Eventfinder API

use crate::error::ClientError;
use async_trait::async_trait;
use evf_common::models::{Event, EventInput, NormalizeRequest, NormalizedRef, RecordKind};
use reqwest::{Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// What a submission did on the server
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveStatus {
    Created,
    Updated,
}

/// Operations the scrape pipeline needs from the backend
#[async_trait]
pub trait EventBackend: Send + Sync {
    /// Resolve a venue or organizer name to its stable id
    async fn normalize(&self, kind: RecordKind, name: &str) -> Result<NormalizedRef, ClientError>;

    /// Upsert an event by slug
    async fn save_event(&self, event: &EventInput) -> Result<(Event, SaveStatus), ClientError>;
}

/// reqwest-backed `EventBackend`
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

impl ApiClient {
    /// `base_url` is the API root, e.g. `http://localhost:3000/api`
    pub fn new(base_url: &str, user_agent: &str) -> Result<Self, ClientError> {
        // Trailing slash so join() appends instead of replacing the last segment
        let normalized = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalized).map_err(|e| ClientError::InvalidUrl(format!("{}: {}", base_url, e)))?;

        let http = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self { http, base_url })
    }

    fn url(&self, path: &str) -> Result<Url, ClientError> {
        self.base_url
            .join(path)
            .map_err(|e| ClientError::InvalidUrl(format!("{}: {}", path, e)))
    }

    /// Map non-2xx responses to `ClientError::Api` with the server's message
    async fn check(response: Response) -> Result<Response, ClientError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&text)
            .map(|body| body.error)
            .unwrap_or(text);
        Err(ClientError::Api(status, message))
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
        Ok(Self::check(response).await?.json::<T>().await?)
    }
}

#[async_trait]
impl EventBackend for ApiClient {
    async fn normalize(&self, kind: RecordKind, name: &str) -> Result<NormalizedRef, ClientError> {
        let url = self.url(&format!("{}/normalize", kind.collection()))?;
        let response = self
            .http
            .post(url)
            .json(&NormalizeRequest { name: name.to_string() })
            .send()
            .await?;
        Self::decode(response).await
    }

    async fn save_event(&self, event: &EventInput) -> Result<(Event, SaveStatus), ClientError> {
        let response = self.http.post(self.url("events")?).json(event).send().await?;
        let status = if response.status() == StatusCode::CREATED {
            SaveStatus::Created
        } else {
            SaveStatus::Updated
        };
        let saved: Event = Self::decode(response).await?;
        Ok((saved, status))
    }
}
