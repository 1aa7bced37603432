use futures::future::BoxFuture;
use snafu::Snafu;

use super::model::{ChatMessage, DEFAULT_ENDPOINT, DEFAULT_MODEL};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    pub endpoint: String,
    pub model: String,
}

impl ProviderConfig {
    pub fn new(endpoint: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into().trim().to_string(),
            model: model.into().trim().to_string(),
        }
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self::new(DEFAULT_ENDPOINT, DEFAULT_MODEL)
    }
}

pub type ProviderResult<T> = Result<T, ProviderError>;

/// Diagnostic detail for a failed chat request.
///
/// Callers present every variant to the user the same way; the variants only
/// make the log line useful.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ProviderError {
    #[snafu(display("endpoint '{endpoint}' is not a valid http(s) URL: {details}"))]
    InvalidEndpoint {
        stage: &'static str,
        endpoint: String,
        details: String,
    },
    #[snafu(display("failed to build http client on `{stage}`, {source}"))]
    BuildClient {
        stage: &'static str,
        source: reqwest::Error,
    },
    #[snafu(display("request to {endpoint} failed on `{stage}`, {source}"))]
    SendRequest {
        stage: &'static str,
        endpoint: String,
        source: reqwest::Error,
    },
    #[snafu(display("failed to read response body on `{stage}`, {source}"))]
    ReadBody {
        stage: &'static str,
        source: reqwest::Error,
    },
    #[snafu(display("chat endpoint returned status {status}: {body}"))]
    UnexpectedStatus {
        stage: &'static str,
        status: u16,
        body: String,
    },
    #[snafu(display("failed to decode chat response: {details}"))]
    DecodeResponse {
        stage: &'static str,
        details: String,
    },
}

impl ProviderError {
    pub fn stage(&self) -> &'static str {
        match self {
            Self::InvalidEndpoint { stage, .. }
            | Self::BuildClient { stage, .. }
            | Self::SendRequest { stage, .. }
            | Self::ReadBody { stage, .. }
            | Self::UnexpectedStatus { stage, .. }
            | Self::DecodeResponse { stage, .. } => stage,
        }
    }
}

/// The collaborator that turns a conversation into one assistant reply.
pub trait ChatProvider: Send + Sync {
    fn id(&self) -> &str;
    fn model(&self) -> &str;
    fn endpoint(&self) -> &str;
    /// Sends the whole conversation and resolves to the assistant's reply text.
    fn chat(&self, messages: Vec<ChatMessage>) -> BoxFuture<'_, ProviderResult<String>>;
}
