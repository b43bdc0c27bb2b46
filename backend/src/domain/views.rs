//! Serialisable API projections of domain entities.
//!
//! Entities never serialise directly; these views control exactly which
//! fields reach a caller. Internal notes are filtered here based on the
//! requesting role, so no handler can leak them by accident.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::authorization::may_see_internal_notes;
use crate::domain::grievance::{Category, Evidence, Grievance, GrievanceId, Priority, Status};
use crate::domain::user::{Role, User, UserId};

/// Profile projection returned by the account endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    /// Stable identifier.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Email address.
    pub email: String,
    /// Access level.
    pub role: Role,
    /// Department affiliation, when declared.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
}

impl From<&User> for UserView {
    fn from(user: &User) -> Self {
        Self {
            id: *user.id(),
            name: user.name().as_ref().to_owned(),
            email: user.email().as_ref().to_owned(),
            role: user.role(),
            department: user.department().map(str::to_owned),
        }
    }
}

/// Resolved identity embedded in grievance responses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StudentRef {
    /// Stable identifier.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Email address.
    pub email: String,
    /// Department affiliation, when declared.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
}

impl From<&User> for StudentRef {
    fn from(user: &User) -> Self {
        Self {
            id: *user.id(),
            name: user.name().as_ref().to_owned(),
            email: user.email().as_ref().to_owned(),
            department: user.department().map(str::to_owned),
        }
    }
}

/// Comment author as shown in responses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommentAuthor {
    /// Stable identifier.
    pub id: UserId,
    /// Display name, when the account could be resolved.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Discussion entry as shown in responses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommentView {
    /// Stable identifier.
    pub id: Uuid,
    /// Resolved author.
    pub user: CommentAuthor,
    /// Comment text.
    pub text: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Grievance as shown in responses, with identities resolved and internal
/// notes filtered by the requesting role.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GrievanceView {
    /// Stable identifier.
    pub id: GrievanceId,
    /// Resolved reporter, when the account could be resolved.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub student: Option<StudentRef>,
    /// Short headline.
    pub title: String,
    /// Full description.
    pub description: String,
    /// Topic bucket.
    pub category: Category,
    /// Processing state.
    pub status: Status,
    /// Urgency.
    pub priority: Priority,
    /// Whether the reporter asked to stay anonymous.
    pub is_anonymous: bool,
    /// One-line triage summary, when available.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_summary: Option<String>,
    /// Staff-only notes. Never present for student callers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub internal_notes: Option<String>,
    /// Attached evidence, when uploaded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evidence: Option<Evidence>,
    /// Voters, each at most once.
    pub upvotes: Vec<UserId>,
    /// Discussion, oldest first.
    pub comments: Vec<CommentView>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Lookup table from user id to resolved identity, built by the query
/// service from one batched repository fetch.
pub type IdentityIndex = HashMap<UserId, StudentRef>;

impl GrievanceView {
    /// Project a grievance for a caller with `viewer_role`, resolving the
    /// reporter and comment authors through `identities`. Internal notes are
    /// dropped for students.
    pub fn project(grievance: &Grievance, identities: &IdentityIndex, viewer_role: Role) -> Self {
        let internal_notes = if may_see_internal_notes(viewer_role) {
            grievance.internal_notes().map(str::to_owned)
        } else {
            None
        };
        let comments = grievance
            .comments()
            .iter()
            .map(|comment| CommentView {
                id: comment.id,
                user: CommentAuthor {
                    id: comment.author,
                    name: identities.get(&comment.author).map(|s| s.name.clone()),
                },
                text: comment.body.clone(),
                created_at: comment.created_at,
            })
            .collect();
        Self {
            id: *grievance.id(),
            student: identities.get(grievance.student()).cloned(),
            title: grievance.title().to_owned(),
            description: grievance.description().to_owned(),
            category: grievance.category(),
            status: grievance.status(),
            priority: grievance.priority(),
            is_anonymous: grievance.is_anonymous(),
            ai_summary: grievance.ai_summary().map(str::to_owned),
            internal_notes,
            evidence: grievance.evidence().cloned(),
            upvotes: grievance.upvotes().to_vec(),
            comments,
            created_at: grievance.created_at(),
            updated_at: grievance.updated_at(),
        }
    }
}
