//! Lead sink posting to the chat-lead endpoint over HTTP

use async_trait::async_trait;
use ecofind_core::{
    dialog::{LeadSink, SubmissionOutcome},
    types::Lead,
};
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

/// Posts leads as JSON and interprets the `{success, error}` answer
#[derive(Debug, Clone)]
pub struct HttpLeadSink {
    client: Client,
    url: String,
}

impl HttpLeadSink {
    /// Sink posting to `url`
    pub fn new(url: impl Into<String>, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|e| {
                warn!(error = %e, "Falling back to default HTTP client for lead sink");
                Client::new()
            });
        Self {
            client,
            url: url.into(),
        }
    }

    /// Target URL
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl LeadSink for HttpLeadSink {
    async fn submit(&self, lead: &Lead) -> SubmissionOutcome {
        debug!(url = %self.url, company = %lead.company_name, "Submitting lead");

        let response = match self.client.post(&self.url).json(lead).send().await {
            Ok(response) => response,
            Err(e) => {
                return SubmissionOutcome::Failed {
                    error: e.to_string(),
                };
            }
        };

        let status = response.status();
        let body = match response.json::<Value>().await {
            Ok(body) => body,
            Err(e) => {
                return SubmissionOutcome::Failed {
                    error: format!("invalid response from lead endpoint: {e}"),
                };
            }
        };

        let accepted = body.get("success").and_then(Value::as_bool) == Some(true);
        if status.is_success() && accepted {
            return SubmissionOutcome::Accepted;
        }

        let reason = ["error", "message"]
            .iter()
            .find_map(|key| body.get(*key).and_then(Value::as_str))
            .map_or_else(|| format!("lead endpoint answered {status}"), str::to_string);
        SubmissionOutcome::Rejected { reason }
    }
}
