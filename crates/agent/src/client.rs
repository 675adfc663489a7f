use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use snafu::ResultExt;

use crate::config::AgentConfig;
use crate::error::{
    AgentResult, BuildHttpClientSnafu, DecodeResponseSnafu, ResponseStatusSnafu, SendRequestSnafu,
};
use crate::identity::Identity;
use crate::protocol::{CreateSessionRequest, RunRequest, Turn, decode_turns};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Backend the widget talks to.
///
/// Returned futures own everything they need so callers can move them onto
/// another runtime and drop the backend handle in the meantime.
pub trait AgentBackend: Send + Sync {
    fn config(&self) -> &AgentConfig;
    fn create_session(&self, identity: &Identity) -> BoxFuture<'static, AgentResult<()>>;
    fn run(&self, request: RunRequest) -> BoxFuture<'static, AgentResult<Vec<Turn>>>;
}

/// reqwest-backed [`AgentBackend`]. No timeout is set; the underlying client
/// defaults apply.
#[derive(Clone)]
pub struct HttpAgentClient {
    config: AgentConfig,
    http: reqwest::Client,
}

impl HttpAgentClient {
    pub fn new(config: AgentConfig) -> AgentResult<Self> {
        let http = reqwest::Client::builder()
            .build()
            .context(BuildHttpClientSnafu {
                stage: "http-client-new",
            })?;

        Ok(Self { config, http })
    }

    async fn post_create_session(
        http: reqwest::Client,
        url: String,
        body: CreateSessionRequest,
    ) -> AgentResult<()> {
        let response = http
            .post(&url)
            .json(&body)
            .send()
            .await
            .context(SendRequestSnafu {
                stage: "send-create-session",
                url: url.clone(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return ResponseStatusSnafu {
                stage: "create-session-status",
                url,
                status: status.as_u16(),
                body,
            }
            .fail();
        }

        tracing::info!(status = status.as_u16(), %url, "agent session created");
        Ok(())
    }

    async fn post_run(
        http: reqwest::Client,
        url: String,
        body: RunRequest,
    ) -> AgentResult<Vec<Turn>> {
        let response = http
            .post(&url)
            .json(&body)
            .send()
            .await
            .context(SendRequestSnafu {
                stage: "send-run",
                url: url.clone(),
            })?;

        let status = response.status();
        let payload = response.bytes().await.context(SendRequestSnafu {
            stage: "read-run-response",
            url: url.clone(),
        })?;

        if !status.is_success() {
            return ResponseStatusSnafu {
                stage: "run-status",
                url,
                status: status.as_u16(),
                body: String::from_utf8_lossy(&payload).into_owned(),
            }
            .fail();
        }

        let turns = decode_turns(&payload).context(DecodeResponseSnafu {
            stage: "decode-run-response",
            url: url.clone(),
        })?;

        tracing::debug!(
            %url,
            session_id = %body.session_id,
            turn_count = turns.len(),
            "agent run completed"
        );
        Ok(turns)
    }
}

impl AgentBackend for HttpAgentClient {
    fn config(&self) -> &AgentConfig {
        &self.config
    }

    fn create_session(&self, identity: &Identity) -> BoxFuture<'static, AgentResult<()>> {
        Box::pin(Self::post_create_session(
            self.http.clone(),
            self.config.session_url(identity),
            CreateSessionRequest::now(),
        ))
    }

    fn run(&self, request: RunRequest) -> BoxFuture<'static, AgentResult<Vec<Turn>>> {
        Box::pin(Self::post_run(
            self.http.clone(),
            self.config.run_url(),
            request,
        ))
    }
}

pub fn create_backend(config: AgentConfig) -> AgentResult<Arc<dyn AgentBackend>> {
    Ok(Arc::new(HttpAgentClient::new(config)?))
}
