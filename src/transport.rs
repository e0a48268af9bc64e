//! Carrying an envelope to a receiver and bringing its response back.
//!
//! A delivery is a single request with a fixed timeout. Failures come back
//! as errors; nothing is retried here.

use crate::envelope::{DecodeResponse, Envelope};
use crate::error::{FanowireError, Result};
use crate::pipeline::OrthogonalCodec;
use crate::receiver::respond;
use std::time::Duration;

pub const DEFAULT_SERVER_URL: &str = "http://localhost:5000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// One request/response round trip
pub trait Transport {
    fn deliver(&self, envelope: &Envelope) -> Result<DecodeResponse>;
}

/// POSTs the envelope as JSON to `<url>/decode`
#[derive(Debug, Clone)]
pub struct HttpTransport {
    url: String,
    timeout: Duration,
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new(DEFAULT_SERVER_URL, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }
}

impl HttpTransport {
    pub fn new(url: &str, timeout: Duration) -> Self {
        Self {
            url: url.trim_end_matches('/').to_string(),
            timeout,
        }
    }

    pub fn endpoint(&self) -> String {
        format!("{}/decode", self.url)
    }

    fn map_error(&self, e: reqwest::Error) -> FanowireError {
        if e.is_timeout() {
            FanowireError::Timeout(self.timeout.as_secs())
        } else {
            FanowireError::Transport(e.to_string())
        }
    }
}

impl Transport for HttpTransport {
    fn deliver(&self, envelope: &Envelope) -> Result<DecodeResponse> {
        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| FanowireError::Transport(e.to_string()))?;

        tracing::debug!("POST {}", self.endpoint());
        let response = client
            .post(self.endpoint())
            .json(envelope)
            .send()
            .map_err(|e| self.map_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(FanowireError::ServerStatus {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<DecodeResponse>()
            .map_err(|e| self.map_error(e))
    }
}

/// Hands the serialized envelope to an in-process receiver
#[derive(Debug, Clone)]
pub struct LoopbackTransport {
    codec: OrthogonalCodec,
}

impl LoopbackTransport {
    pub fn new(codec: OrthogonalCodec) -> Self {
        Self { codec }
    }
}

impl Transport for LoopbackTransport {
    fn deliver(&self, envelope: &Envelope) -> Result<DecodeResponse> {
        let body = envelope.to_json()?;
        Ok(respond(&body, &self.codec))
    }
}
