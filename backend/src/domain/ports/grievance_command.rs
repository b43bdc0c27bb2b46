//! Driving port for grievance mutations.

use async_trait::async_trait;

use crate::domain::error::Error;
use crate::domain::grievance::{Category, GrievanceId, StatusUpdate};
use crate::domain::ports::evidence_store::EvidenceUpload;
use crate::domain::user::{User, UserId};
use crate::domain::views::{CommentView, GrievanceView};

/// A validated submission ready for the lifecycle service.
#[derive(Debug, Clone)]
pub struct SubmitGrievance {
    /// Short headline.
    pub title: String,
    /// Description; may contain markup, which is stripped before triage.
    pub description: String,
    /// Topic bucket.
    pub category: Category,
    /// Hide the reporter's identity from other participants.
    pub is_anonymous: bool,
    /// Image evidence, when the reporter attached one.
    pub evidence: Option<EvidenceUpload>,
}

/// Domain use-case port for grievance mutations.
#[async_trait]
pub trait GrievanceCommand: Send + Sync {
    /// Open a new grievance on behalf of `reporter`, including evidence
    /// upload, triage, persistence, and the receipt notification.
    async fn submit(
        &self,
        reporter: &User,
        submission: SubmitGrievance,
    ) -> Result<GrievanceView, Error>;

    /// Append a comment and return the full resolved comment sequence.
    async fn add_comment(
        &self,
        id: &GrievanceId,
        author: &User,
        text: String,
    ) -> Result<Vec<CommentView>, Error>;

    /// Apply a staff edit and return the updated record.
    async fn update_status(
        &self,
        id: &GrievanceId,
        staff: &User,
        update: StatusUpdate,
    ) -> Result<GrievanceView, Error>;

    /// Toggle the caller's upvote and return the resulting voter sequence.
    async fn toggle_upvote(&self, id: &GrievanceId, voter: &User)
        -> Result<Vec<UserId>, Error>;
}
