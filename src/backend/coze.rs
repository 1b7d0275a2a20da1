//! Coze workflow runs.
//!
//! The workflow answers with the complete caption in one JSON reply; it is
//! handed on as a single fragment and re-chunked downstream.

use crate::backend::{Backend, FragmentStream, GenerateRequest};
use crate::error::{BackendError, Result};
use crate::segment::SegmentConfig;
use async_trait::async_trait;
use futures_util::StreamExt;
use futures_util::stream;
use serde::{Deserialize, Serialize};

/// Longest upstream error body kept in an error message.
const MAX_ERROR_BODY: usize = 200;

/// Request body of a workflow run.
#[derive(Debug, Serialize)]
struct WorkflowRequest<'a> {
    query: &'a str,
    category: &'a str,
}

/// Reply of a workflow run.
#[derive(Debug, Deserialize)]
struct WorkflowReply {
    #[serde(default)]
    text: Option<String>,
}

/// Calls a Coze workflow over HTTP.
#[derive(Debug, Clone, Default)]
pub struct CozeBackend {
    client: reqwest::Client,
}

impl CozeBackend {
    /// Creates a backend with a default HTTP client.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a backend with a preconfigured HTTP client.
    #[must_use]
    pub const fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

/// Joins the base URL and the workflow id.
fn workflow_url(base_url: &str, workflow_id: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), workflow_id.trim())
}

/// Extracts the caption text from a reply body.
fn parse_reply(body: &str) -> Result<String> {
    let reply: WorkflowReply = serde_json::from_str(body)
        .map_err(|e| BackendError::Request(format!("invalid workflow reply: {e}")))?;
    reply
        .text
        .filter(|text| !text.trim().is_empty())
        .ok_or_else(|| BackendError::EmptyReply.into())
}

fn truncate(body: &str) -> String {
    body.chars().take(MAX_ERROR_BODY).collect()
}

#[async_trait]
impl Backend for CozeBackend {
    fn name(&self) -> &'static str {
        "coze"
    }

    fn segment_config(&self) -> SegmentConfig {
        SegmentConfig::whole()
    }

    async fn generate(&self, request: &GenerateRequest) -> Result<FragmentStream> {
        let workflow_id = request
            .workflow_id
            .as_deref()
            .filter(|id| !id.trim().is_empty())
            .ok_or(BackendError::MissingWorkflowId)?;
        let url = workflow_url(&request.base_url, workflow_id);

        tracing::info!(url = %url, category = %request.category, "running workflow");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&request.api_key)
            .json(&WorkflowRequest {
                query: &request.prompt,
                category: request.category.label(),
            })
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(BackendError::Status {
                status: status.as_u16(),
                message: truncate(&body),
            }
            .into());
        }

        let text = parse_reply(&body)?;
        tracing::debug!(bytes = text.len(), "workflow reply received");
        Ok(stream::once(async move { Ok(text) }).boxed())
    }
}
