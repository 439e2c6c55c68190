use std::time::Duration;

use cork_state::parse_assignment;
use cork_types::CorkError;

/// Talks to a running cork server's `/state` routes.
pub struct StateClient {
    http: reqwest::Client,
    base: String,
}

impl StateClient {
    pub fn new(host: &str, port: u16, timeout: Duration) -> Result<Self, CorkError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CorkError::Client(e.to_string()))?;
        Ok(StateClient { http, base: format!("http://{host}:{port}") })
    }

    /// `GET /state`; the full enumeration, or `None` when the server answers
    /// anything but 200.
    pub async fn get_all(&self) -> Result<Option<String>, CorkError> {
        let resp = self
            .http
            .get(format!("{}/state", self.base))
            .send()
            .await
            .map_err(|e| CorkError::Client(e.to_string()))?;
        if !resp.status().is_success() {
            tracing::debug!(status = %resp.status(), "state enumeration failed");
            return Ok(None);
        }
        resp.text().await.map(Some).map_err(|e| CorkError::Client(e.to_string()))
    }

    /// `GET /state/{key}`. Any non-200 answer reads as `key=`.
    pub async fn get(&self, key: &str) -> Result<String, CorkError> {
        let resp = self
            .http
            .get(format!("{}/state/{key}", self.base))
            .send()
            .await
            .map_err(|e| CorkError::Client(e.to_string()))?;
        if resp.status().is_success() {
            resp.text().await.map_err(|e| CorkError::Client(e.to_string()))
        } else {
            tracing::debug!(key, status = %resp.status(), "state query failed");
            Ok(format!("{key}="))
        }
    }

    /// `POST /state/{key}` with `value` as the body. Returns whether the
    /// server answered 200.
    ///
    /// Posting `stop` may tear the connection down before an answer arrives;
    /// that counts as success.
    pub async fn set(&self, key: &str, value: &str) -> Result<bool, CorkError> {
        let sent = self
            .http
            .post(format!("{}/state/{key}", self.base))
            .body(value.to_string())
            .send()
            .await;
        match sent {
            Ok(resp) => Ok(resp.status().is_success()),
            Err(e) if key == cork_types::STOP_KEY && !e.is_connect() => {
                tracing::debug!(error = %e, "connection dropped after stop");
                Ok(true)
            }
            Err(e) => Err(CorkError::Client(e.to_string())),
        }
    }
}

/// Validate every `KEY=VALUE` token up front so a bad one stops the run
/// before anything is sent.
pub fn parse_assignments(tokens: &[String]) -> Result<Vec<(String, String)>, CorkError> {
    tokens.iter().map(|t| parse_assignment(t)).collect()
}
