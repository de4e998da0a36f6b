#![allow(dead_code)]

//! Inference gateway: the single point of entry for all AI server calls.
//!
//! ARCHITECTURAL RULE: no other module may talk to the AI server directly.
//! Handlers receive an `Arc<dyn InferenceGateway>` through `AppState` and
//! never know whether an answer came from the remote service or from the
//! local templates in [`fallback`].
//!
//! Failure policy: one attempt, no retries. Any transport error, non-2xx
//! status, or undecodable body downgrades to the deterministic fallback so
//! the conversation endpoints stay available while the AI server is down.

use async_trait::async_trait;
use reqwest::Client;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::warn;

use crate::models::jobs::JobPostingRow;
use crate::models::profile::CandidateProfile;

pub mod fallback;
pub mod types;

pub use types::{AssistantReply, ChatTurn, ExtractedProfile, MatchAssessment};

const REPLY_PATH: &str = "/api/chat/reply";
const EXTRACT_PATH: &str = "/api/profile/extract";
const MATCH_PATH: &str = "/api/match";

/// Per-request timeout for AI server calls.
const REQUEST_TIMEOUT_SECS: u64 = 30;

// ────────────────────────────────────────────────────────────────────────────
// Answer provenance
// ────────────────────────────────────────────────────────────────────────────

/// Where an inference answer came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InferenceSource {
    /// The remote AI server produced the value.
    Remote,
    /// Local deterministic template, used when the remote call failed.
    Fallback,
}

/// An inference result tagged with its provenance. Callers that only need
/// the value read `.value`; logging and tests can check `.source`.
#[derive(Debug, Clone)]
pub struct Inferred<T> {
    pub value: T,
    pub source: InferenceSource,
}

impl<T> Inferred<T> {
    pub fn remote(value: T) -> Self {
        Self {
            value,
            source: InferenceSource::Remote,
        }
    }

    pub fn fallback(value: T) -> Self {
        Self {
            value,
            source: InferenceSource::Fallback,
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.source == InferenceSource::Fallback
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Trait definition
// ────────────────────────────────────────────────────────────────────────────

/// The inference seam. Implement this to swap the AI backend without touching
/// handler or pipeline code.
///
/// Carried in `AppState` as `Arc<dyn InferenceGateway>`.
#[async_trait]
pub trait InferenceGateway: Send + Sync {
    /// Next assistant turn for an ongoing conversation.
    async fn generate_reply(&self, history: &[ChatTurn]) -> Inferred<AssistantReply>;

    /// Candidate profile distilled from the full conversation.
    async fn extract_profile(&self, history: &[ChatTurn]) -> Inferred<ExtractedProfile>;

    /// Scores one job posting against a candidate profile.
    async fn score_match(
        &self,
        profile: &CandidateProfile,
        job: &JobPostingRow,
    ) -> Inferred<MatchAssessment>;
}

// ────────────────────────────────────────────────────────────────────────────
// HTTP implementation
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
enum GatewayError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("AI server returned status {0}")]
    Status(reqwest::StatusCode),

    #[error("AI server returned a non-object body")]
    NonObjectBody,

    #[error("AI server body did not fit the schema: {0}")]
    Schema(#[from] serde_json::Error),
}

/// Decodes a success body. Only the JSON-object form counts as a schema fit:
/// derived `Deserialize` would also accept a struct's positional array form,
/// and such bodies have to take the fallback path instead.
fn decode_object<T: DeserializeOwned>(payload: Value) -> Result<T, GatewayError> {
    if !payload.is_object() {
        return Err(GatewayError::NonObjectBody);
    }
    Ok(serde_json::from_value(payload)?)
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    messages: &'a [ChatTurn],
}

#[derive(Debug, Serialize)]
struct MatchRequest<'a> {
    profile: &'a CandidateProfile,
    job: &'a JobPostingRow,
}

/// Talks to the companion AI server over JSON. Every failed call is logged
/// at `warn` and answered from the local templates instead.
#[derive(Clone)]
pub struct HttpInferenceGateway {
    client: Client,
    base_url: String,
}

impl HttpInferenceGateway {
    pub fn new(base_url: String) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
                .build()
                .expect("Failed to build HTTP client"),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, GatewayError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .client
            .post(format!("{}{}", self.base_url, path))
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::Status(status));
        }

        let payload: Value = response.json().await?;
        decode_object(payload)
    }
}

#[async_trait]
impl InferenceGateway for HttpInferenceGateway {
    async fn generate_reply(&self, history: &[ChatTurn]) -> Inferred<AssistantReply> {
        let body = MessagesRequest { messages: history };
        match self.post_json(REPLY_PATH, &body).await {
            Ok(reply) => Inferred::remote(reply),
            Err(e) => {
                warn!("Chat reply inference failed, using fallback: {e}");
                Inferred::fallback(fallback::reply(history))
            }
        }
    }

    async fn extract_profile(&self, history: &[ChatTurn]) -> Inferred<ExtractedProfile> {
        let body = MessagesRequest { messages: history };
        match self.post_json(EXTRACT_PATH, &body).await {
            Ok(profile) => Inferred::remote(profile),
            Err(e) => {
                warn!("Profile extraction failed, using fallback: {e}");
                Inferred::fallback(fallback::profile(history))
            }
        }
    }

    async fn score_match(
        &self,
        profile: &CandidateProfile,
        job: &JobPostingRow,
    ) -> Inferred<MatchAssessment> {
        let body = MatchRequest { profile, job };
        match self.post_json(MATCH_PATH, &body).await {
            Ok(assessment) => Inferred::remote(assessment),
            Err(e) => {
                warn!("Match scoring for job {} failed, using fallback: {e}", job.id);
                Inferred::fallback(fallback::assessment())
            }
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Template-only implementation
// ────────────────────────────────────────────────────────────────────────────

/// Always answers from the local templates, never touching the network.
/// Useful in tests and in deployments without an AI server.
pub struct FallbackGateway;

#[async_trait]
impl InferenceGateway for FallbackGateway {
    async fn generate_reply(&self, history: &[ChatTurn]) -> Inferred<AssistantReply> {
        Inferred::fallback(fallback::reply(history))
    }

    async fn extract_profile(&self, history: &[ChatTurn]) -> Inferred<ExtractedProfile> {
        Inferred::fallback(fallback::profile(history))
    }

    async fn score_match(
        &self,
        _profile: &CandidateProfile,
        _job: &JobPostingRow,
    ) -> Inferred<MatchAssessment> {
        Inferred::fallback(fallback::assessment())
    }
}
