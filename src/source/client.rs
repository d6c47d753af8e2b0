// client.rs - blocking fetch of the threat feed, or a local JSON dump
use std::path::Path;
use std::time::Duration;

use reqwest::blocking::Client;
use tracing::info;

use super::{FetchError, ThreatRecord, parse_records};

pub struct ThreatFeedClient {
    http: Client,
    endpoint: String,
}

impl ThreatFeedClient {
    pub fn new(endpoint: impl Into<String>) -> Result<Self, FetchError> {
        Self::with_timeout(endpoint, Duration::from_secs(30))
    }

    pub fn with_timeout(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, FetchError> {
        let http = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn fetch(&self) -> Result<Vec<ThreatRecord>, FetchError> {
        let response = self.http.get(&self.endpoint).send()?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(FetchError::ServerError {
                status: status.as_u16(),
                body,
            });
        }

        let records = parse_records(&response.text()?)?;
        info!(endpoint = %self.endpoint, records = records.len(), "threat feed fetched");
        Ok(records)
    }
}

pub fn load_records(path: &Path) -> Result<Vec<ThreatRecord>, FetchError> {
    let content = std::fs::read_to_string(path).map_err(|source| FetchError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let records = parse_records(&content)?;
    info!(path = %path.display(), records = records.len(), "threat records loaded");
    Ok(records)
}
