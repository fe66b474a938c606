//! Narrative provider trait and the failure taxonomy of the transport.
//!
//! This module defines the [`NarrativeProvider`] trait that hides which
//! text-generation service produces the narrative. The analysis pipeline only
//! sees a reply text or a classified [`NarrativeFailure`], which it passes
//! through unchanged.
//!
//! # Implementing a New Provider
//!
//! 1. Create a new file in `src/ai/` (e.g., `openai.rs`)
//! 2. Implement [`NarrativeProvider`] for your provider struct, mapping
//!    transport errors with [`NarrativeFailure::classify`]
//! 3. Export the provider in `src/ai/mod.rs`

use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// Category of an upstream narrative failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Missing, invalid or expired API key.
    Authentication,
    /// Rate or usage limit reached.
    QuotaExceeded,
    /// The requested model does not exist or is unavailable.
    ModelNotFound,
    /// The reply was withheld by the service's safety filters.
    SafetyBlocked,
    /// Anything else.
    Generic,
}

impl FailureKind {
    /// Get error code for frontend handling.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Authentication => "AUTHENTICATION_FAILED",
            Self::QuotaExceeded => "QUOTA_EXCEEDED",
            Self::ModelNotFound => "MODEL_NOT_FOUND",
            Self::SafetyBlocked => "SAFETY_BLOCKED",
            Self::Generic => "NARRATIVE_FAILED",
        }
    }

    /// Classify an HTTP status code, `None` for statuses without a dedicated kind.
    pub fn from_status(status: u16) -> Option<Self> {
        match status {
            401 | 403 => Some(Self::Authentication),
            429 => Some(Self::QuotaExceeded),
            404 => Some(Self::ModelNotFound),
            _ => None,
        }
    }

    /// Classify an error message by the markers services put in them.
    pub fn from_message(message: &str) -> Self {
        if message.contains("API_KEY") {
            Self::Authentication
        } else if message.contains("quota") || message.contains("limit") {
            Self::QuotaExceeded
        } else if message.contains("not found") || message.contains("404") {
            Self::ModelNotFound
        } else if message.contains("SAFETY") {
            Self::SafetyBlocked
        } else {
            Self::Generic
        }
    }

    /// User-facing description in the language of the generated reports.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Authentication => {
                "Erro de autenticação com a API. Verifique se a chave da API está correta."
            }
            Self::QuotaExceeded => "Limite de quota da API excedido. Tente novamente mais tarde.",
            Self::ModelNotFound => "Modelo não encontrado.",
            Self::SafetyBlocked => "Conteúdo bloqueado por filtros de segurança.",
            Self::Generic => "Erro ao processar análise com a API.",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Authentication => "authentication",
            Self::QuotaExceeded => "quota exceeded",
            Self::ModelNotFound => "model not found",
            Self::SafetyBlocked => "safety blocked",
            Self::Generic => "generic",
        };
        f.write_str(name)
    }
}

/// A classified failure reported by a narrative provider.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[error("{kind}: {message}")]
pub struct NarrativeFailure {
    pub kind: FailureKind,
    pub message: String,
}

impl NarrativeFailure {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Classify by HTTP status when it is decisive, otherwise by message.
    pub fn classify(status: Option<u16>, message: impl Into<String>) -> Self {
        let message = message.into();
        let kind = status
            .and_then(FailureKind::from_status)
            .unwrap_or_else(|| FailureKind::from_message(&message));
        Self { kind, message }
    }
}

/// A successful narrative reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NarrativeReply {
    pub text: String,
    /// Identifier of the model that produced the text.
    pub model: String,
}

/// Trait for services that turn a prompt into narrative text.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` to allow usage across threads.
///
/// # Error Handling
///
/// Implementations classify every failure into a [`FailureKind`]. Callers do
/// not retry; they skip the steps that need the narrative.
pub trait NarrativeProvider: Send + Sync {
    /// Send the prompt and return the generated text.
    fn generate(&self, prompt: &str) -> Result<NarrativeReply, NarrativeFailure>;

    /// Get the provider name for logging and debugging.
    fn name(&self) -> &str;

    /// Get the model being used by this provider.
    ///
    /// Returns `None` if the provider doesn't expose model information.
    fn model(&self) -> Option<&str> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status() {
        assert_eq!(FailureKind::from_status(401), Some(FailureKind::Authentication));
        assert_eq!(FailureKind::from_status(403), Some(FailureKind::Authentication));
        assert_eq!(FailureKind::from_status(429), Some(FailureKind::QuotaExceeded));
        assert_eq!(FailureKind::from_status(404), Some(FailureKind::ModelNotFound));
        assert_eq!(FailureKind::from_status(500), None);
    }

    #[test]
    fn test_from_message() {
        assert_eq!(
            FailureKind::from_message("API_KEY_INVALID"),
            FailureKind::Authentication
        );
        assert_eq!(
            FailureKind::from_message("Resource has been exhausted (check quota)"),
            FailureKind::QuotaExceeded
        );
        assert_eq!(FailureKind::from_message("rate limit"), FailureKind::QuotaExceeded);
        assert_eq!(
            FailureKind::from_message("models/foo is not found"),
            FailureKind::ModelNotFound
        );
        assert_eq!(
            FailureKind::from_message("blocked: SAFETY"),
            FailureKind::SafetyBlocked
        );
        assert_eq!(FailureKind::from_message("connection reset"), FailureKind::Generic);
    }

    #[test]
    fn test_classify_prefers_status() {
        let failure = NarrativeFailure::classify(Some(429), "SAFETY");
        assert_eq!(failure.kind, FailureKind::QuotaExceeded);

        let failure = NarrativeFailure::classify(Some(500), "SAFETY");
        assert_eq!(failure.kind, FailureKind::SafetyBlocked);

        let failure = NarrativeFailure::classify(None, "timeout");
        assert_eq!(failure.kind, FailureKind::Generic);
        assert_eq!(failure.message, "timeout");
    }

    #[test]
    fn test_failure_display() {
        let failure = NarrativeFailure::new(FailureKind::ModelNotFound, "no such model");
        assert_eq!(failure.to_string(), "model not found: no such model");
        assert_eq!(failure.kind.error_code(), "MODEL_NOT_FOUND");
    }
}
