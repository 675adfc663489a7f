use snafu::Snafu;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum AgentError {
    #[snafu(display("failed to build http client on `{stage}`: {source}"))]
    BuildHttpClient {
        stage: &'static str,
        source: reqwest::Error,
    },
    #[snafu(display("request to {url} failed on `{stage}`: {source}"))]
    SendRequest {
        stage: &'static str,
        url: String,
        source: reqwest::Error,
    },
    #[snafu(display("{url} returned status {status} on `{stage}`: {body}"))]
    ResponseStatus {
        stage: &'static str,
        url: String,
        status: u16,
        body: String,
    },
    #[snafu(display("failed to decode response from {url} on `{stage}`: {source}"))]
    DecodeResponse {
        stage: &'static str,
        url: String,
        source: serde_json::Error,
    },
}

impl AgentError {
    /// Pipeline step that produced this error.
    pub fn stage(&self) -> &'static str {
        match self {
            Self::BuildHttpClient { stage, .. }
            | Self::SendRequest { stage, .. }
            | Self::ResponseStatus { stage, .. }
            | Self::DecodeResponse { stage, .. } => *stage,
        }
    }
}

pub type AgentResult<T> = Result<T, AgentError>;
