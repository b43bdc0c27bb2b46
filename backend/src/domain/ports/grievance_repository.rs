//! Port abstraction for grievance persistence adapters and their errors.
//!
//! Comment and upvote mutations are expressed as single operations so
//! adapters can apply them atomically; callers never read-modify-write a
//! grievance across requests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::grievance::{Comment, Grievance, GrievanceId, StatusUpdate};
use crate::domain::user::UserId;

/// Persistence errors raised by grievance repository adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GrievancePersistenceError {
    /// Repository connection could not be established.
    #[error("grievance repository connection failed: {message}")]
    Connection {
        /// Adapter-specific detail.
        message: String,
    },
    /// Query or mutation failed during execution.
    #[error("grievance repository query failed: {message}")]
    Query {
        /// Adapter-specific detail.
        message: String,
    },
}

impl GrievancePersistenceError {
    /// Construct a [`GrievancePersistenceError::Connection`].
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Construct a [`GrievancePersistenceError::Query`].
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }
}

#[async_trait]
pub trait GrievanceRepository: Send + Sync {
    /// Persist a newly opened grievance.
    async fn insert(&self, grievance: &Grievance) -> Result<(), GrievancePersistenceError>;

    /// Fetch one grievance with its comments and upvotes.
    async fn find_by_id(
        &self,
        id: &GrievanceId,
    ) -> Result<Option<Grievance>, GrievancePersistenceError>;

    /// All grievances owned by `student`, newest first.
    async fn list_for_student(
        &self,
        student: &UserId,
    ) -> Result<Vec<Grievance>, GrievancePersistenceError>;

    /// All grievances, newest first.
    async fn list_all(&self) -> Result<Vec<Grievance>, GrievancePersistenceError>;

    /// Atomically append a comment. Returns the full ordered comment
    /// sequence, or `None` when the grievance does not exist.
    async fn append_comment(
        &self,
        id: &GrievanceId,
        author: &UserId,
        body: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Vec<Comment>>, GrievancePersistenceError>;

    /// Atomically toggle `voter`'s upvote. Returns the resulting voter
    /// sequence, or `None` when the grievance does not exist.
    async fn toggle_upvote(
        &self,
        id: &GrievanceId,
        voter: &UserId,
        now: DateTime<Utc>,
    ) -> Result<Option<Vec<UserId>>, GrievancePersistenceError>;

    /// Apply a normalised staff edit. Returns the updated grievance, or
    /// `None` when it does not exist.
    async fn apply_update(
        &self,
        id: &GrievanceId,
        update: &StatusUpdate,
        now: DateTime<Utc>,
    ) -> Result<Option<Grievance>, GrievancePersistenceError>;
}
