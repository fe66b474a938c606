//! Narrative generation through external language models.
//!
//! The analysis core never talks to a service directly. It renders a prompt
//! (see [`crate::context::prompt`]) and hands it to a [`NarrativeProvider`];
//! the reply text then goes through
//! [`NarrativeExtractor`](crate::narrative::NarrativeExtractor).
//!
//! # Feature Flag
//!
//! The concrete [`GeminiProvider`] requires the `ai` feature flag. The
//! [`NarrativeProvider`] trait and failure types are always available for
//! custom implementations and test doubles.
//!
//! ```toml
//! # Enable AI support (default)
//! datainsight-core = { version = "0.1", features = ["ai"] }
//!
//! # Disable AI support for smaller binary
//! datainsight-core = { version = "0.1", default-features = false }
//! ```

mod provider;
pub use provider::{FailureKind, NarrativeFailure, NarrativeProvider, NarrativeReply};

#[cfg(feature = "ai")]
mod gemini;

#[cfg(feature = "ai")]
pub use gemini::{API_KEY_ENV, GeminiConfig, GeminiConfigBuilder, GeminiProvider};
