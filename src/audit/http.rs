//! Remote collector client.

use std::time::Duration;

use serde::Deserialize;
use tokio::runtime::Handle;
use tracing::{debug, error, warn};

use super::{AuditError, AuditEvent, AuditSink};

/// Reply body of the collector on success.
#[derive(Debug, Deserialize)]
struct LogReceipt {
    #[serde(rename = "logID")]
    log_id: Option<String>,
}

/// Posts events as JSON to the collector with bearer authorization.
///
/// Every [`emit`](AuditSink::emit) spawns its own task on the current tokio
/// runtime, so events may arrive in any order. Each request is bounded by
/// the client timeout.
#[derive(Debug, Clone)]
pub struct HttpAuditSink {
    client: reqwest::Client,
    endpoint: String,
    token: Option<String>,
}

impl HttpAuditSink {
    /// # Errors
    /// Fails if the HTTP client cannot be constructed.
    pub fn new(
        endpoint: impl Into<String>,
        token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, AuditError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            token,
        })
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Deliver one event and wait for the collector's answer.
    ///
    /// Returns the collector's log id, if it sent one.
    ///
    /// # Errors
    /// Transport failures, timeouts and non-200 replies.
    pub async fn send(&self, event: &AuditEvent) -> Result<Option<String>, AuditError> {
        let mut request = self.client.post(&self.endpoint).json(event);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();

        if status != reqwest::StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(AuditError::Status {
                status: status.as_u16(),
                body,
            });
        }

        // a 200 with an unexpected body still counts as delivered
        let receipt = response.json::<LogReceipt>().await.ok();
        Ok(receipt.and_then(|r| r.log_id))
    }
}

impl AuditSink for HttpAuditSink {
    fn emit(&self, event: AuditEvent) {
        let Ok(runtime) = Handle::try_current() else {
            warn!(message = %event.message, "No async runtime, audit event dropped");
            return;
        };

        let sink = self.clone();
        runtime.spawn(async move {
            match sink.send(&event).await {
                Ok(log_id) => debug!(log_id = ?log_id, "Audit event delivered"),
                Err(e) => error!(error = %e, "Failed to send audit event"),
            }
        });
    }
}
