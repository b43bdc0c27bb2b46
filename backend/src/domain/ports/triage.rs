//! Port abstraction for the AI triage collaborator.
//!
//! The collaborator is treated as unreliable: callers substitute
//! [`TriageOutcome::default`] on any failure rather than propagating it.

use async_trait::async_trait;

use crate::domain::grievance::Priority;

/// Priority and summary suggested for a new grievance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriageOutcome {
    /// Suggested urgency.
    pub priority: Priority,
    /// One-line summary, empty when unavailable.
    pub summary: String,
}

impl Default for TriageOutcome {
    fn default() -> Self {
        Self {
            priority: Priority::Medium,
            summary: String::new(),
        }
    }
}

/// Errors raised by triage adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TriageError {
    /// The provider could not be reached or timed out.
    #[error("triage provider unreachable: {message}")]
    Transport {
        /// Adapter-specific detail.
        message: String,
    },
    /// The provider answered with something unparseable.
    #[error("triage response malformed: {message}")]
    Malformed {
        /// Adapter-specific detail.
        message: String,
    },
}

impl TriageError {
    /// Construct a [`TriageError::Transport`].
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Construct a [`TriageError::Malformed`].
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed {
            message: message.into(),
        }
    }
}

#[async_trait]
pub trait TriageAssist: Send + Sync {
    /// Assess a new grievance from its title and plain-text description.
    async fn assess(&self, title: &str, description: &str) -> Result<TriageOutcome, TriageError>;
}
