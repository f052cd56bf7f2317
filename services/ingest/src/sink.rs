use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};

use crate::events::CanonicalEvent;

#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("sink request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("sink rejected batch: HTTP {status}: {body}")]
    Rejected { status: StatusCode, body: String },
}

/// The analytics sink boundary: bulk-accepts an ordered list of events.
/// No acknowledgment contract beyond call success/failure.
#[async_trait]
pub trait EventSink: Send + Sync {
    async fn accept(&self, events: Vec<CanonicalEvent>) -> Result<(), SinkError>;
}

pub struct HttpEventSink {
    http: Client,
    url: String,
}

impl HttpEventSink {
    pub fn new(url: impl Into<String>) -> Result<Self, reqwest::Error> {
        let http = Client::builder().timeout(Duration::from_secs(30)).build()?;
        Ok(Self {
            http,
            url: url.into(),
        })
    }
}

#[async_trait]
impl EventSink for HttpEventSink {
    async fn accept(&self, events: Vec<CanonicalEvent>) -> Result<(), SinkError> {
        let response = self.http.post(&self.url).json(&events).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SinkError::Rejected { status, body });
        }
        Ok(())
    }
}
