//! Port abstraction for the external evidence object store.

use async_trait::async_trait;

use crate::domain::grievance::Evidence;

/// An image file accepted for upload.
#[derive(Debug, Clone)]
pub struct EvidenceUpload {
    /// Original client file name, used for the upload form.
    pub file_name: String,
    /// MIME type as declared by the client.
    pub content_type: String,
    /// Raw file bytes.
    pub bytes: Vec<u8>,
}

/// Errors raised by evidence store adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EvidenceStoreError {
    /// The store could not be reached.
    #[error("evidence store unreachable: {message}")]
    Transport {
        /// Adapter-specific detail.
        message: String,
    },
    /// The store rejected the upload or answered with an unusable body.
    #[error("evidence store rejected the upload: {message}")]
    Rejected {
        /// Adapter-specific detail.
        message: String,
    },
}

impl EvidenceStoreError {
    /// Construct an [`EvidenceStoreError::Transport`].
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Construct an [`EvidenceStoreError::Rejected`].
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected {
            message: message.into(),
        }
    }
}

#[async_trait]
pub trait EvidenceStore: Send + Sync {
    /// Upload an image and return its stored identity and public URL.
    async fn upload(&self, upload: EvidenceUpload) -> Result<Evidence, EvidenceStoreError>;
}
