//! Grievance aggregate and its lifecycle vocabulary.
//!
//! A grievance owns its comments and upvotes. Mutations on the aggregate are
//! expressed as methods so the rules (upvote toggling, comment ordering,
//! status transitions) are testable without a database; the persistence
//! adapter applies the same rules atomically with SQL.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::user::UserId;

/// Stable grievance identifier backed by a UUID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(transparent)]
pub struct GrievanceId(Uuid);

impl GrievanceId {
    /// Wrap an existing UUID.
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Generate a new random identifier.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl std::fmt::Display for GrievanceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for GrievanceId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Grievance topic, fixed vocabulary.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema,
)]
pub enum Category {
    /// Courses, grading, academic staff.
    Academic,
    /// Buildings, utilities, campus facilities.
    Infrastructure,
    /// Harassment or misconduct.
    Harassment,
    /// Food services.
    Cafeteria,
    /// Anything else.
    Other,
}

impl Category {
    /// Wire spelling of the category.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Academic => "Academic",
            Self::Infrastructure => "Infrastructure",
            Self::Harassment => "Harassment",
            Self::Cafeteria => "Cafeteria",
            Self::Other => "Other",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Category {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Academic" => Ok(Self::Academic),
            "Infrastructure" => Ok(Self::Infrastructure),
            "Harassment" => Ok(Self::Harassment),
            "Cafeteria" => Ok(Self::Cafeteria),
            "Other" => Ok(Self::Other),
            _ => Err(UnknownVariant {
                field: "category",
                value: s.to_owned(),
            }),
        }
    }
}

/// Processing state of a grievance.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema,
)]
pub enum Status {
    /// Newly submitted, not yet picked up.
    Pending,
    /// Being worked on by staff.
    #[serde(rename = "In Progress")]
    InProgress,
    /// Addressed to completion.
    Resolved,
    /// Declined without resolution.
    Rejected,
}

impl Status {
    /// Wire spelling of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::InProgress => "In Progress",
            Self::Resolved => "Resolved",
            Self::Rejected => "Rejected",
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Status {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(Self::Pending),
            "In Progress" => Ok(Self::InProgress),
            "Resolved" => Ok(Self::Resolved),
            "Rejected" => Ok(Self::Rejected),
            _ => Err(UnknownVariant {
                field: "status",
                value: s.to_owned(),
            }),
        }
    }
}

/// Urgency assigned during triage.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema,
)]
pub enum Priority {
    /// Minor inconvenience.
    Low,
    /// Default when unassessed.
    Medium,
    /// Needs prompt attention.
    High,
}

impl Priority {
    /// Wire spelling of the priority.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }
}

impl Default for Priority {
    fn default() -> Self {
        Self::Medium
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Priority {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Low" => Ok(Self::Low),
            "Medium" => Ok(Self::Medium),
            "High" => Ok(Self::High),
            _ => Err(UnknownVariant {
                field: "priority",
                value: s.to_owned(),
            }),
        }
    }
}

/// Parse failure for one of the fixed vocabularies.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {field}: {value}")]
pub struct UnknownVariant {
    /// Which vocabulary rejected the value.
    pub field: &'static str,
    /// The offending input.
    pub value: String,
}

/// Reference to an uploaded evidence image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Evidence {
    /// Identifier assigned by the object store.
    pub asset_id: String,
    /// Publicly reachable URL for the image.
    pub url: String,
}

/// Discussion entry attached to a grievance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    /// Stable comment identifier.
    pub id: Uuid,
    /// Who wrote it.
    pub author: UserId,
    /// Comment text.
    pub body: String,
    /// Creation timestamp; comments sort oldest first.
    pub created_at: DateTime<Utc>,
}

/// Staff edit applied to a grievance.
///
/// Every field is optional; an update with nothing set is rejected upstream.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusUpdate {
    /// New processing state.
    pub status: Option<Status>,
    /// New urgency.
    pub priority: Option<Priority>,
    /// Replacement internal notes. An empty or whitespace-only string is
    /// treated as absent and leaves the stored notes untouched.
    pub internal_notes: Option<String>,
}

impl StatusUpdate {
    /// Normalise the update: blank notes collapse to `None`.
    pub fn normalised(mut self) -> Self {
        if self
            .internal_notes
            .as_deref()
            .is_some_and(|notes| notes.trim().is_empty())
        {
            self.internal_notes = None;
        }
        self
    }

    /// True when the update carries no changes at all.
    pub fn is_empty(&self) -> bool {
        self.status.is_none() && self.priority.is_none() && self.internal_notes.is_none()
    }
}

/// A reported grievance together with its discussion and upvotes.
///
/// ## Invariants
/// - `upvotes` holds each voter at most once.
/// - `comments` are ordered oldest first.
/// - `internal_notes` is staff-only; projection for students happens in the
///   view layer.
#[derive(Debug, Clone, PartialEq)]
pub struct Grievance {
    id: GrievanceId,
    student: UserId,
    title: String,
    description: String,
    category: Category,
    status: Status,
    priority: Priority,
    is_anonymous: bool,
    ai_summary: Option<String>,
    internal_notes: Option<String>,
    evidence: Option<Evidence>,
    upvotes: Vec<UserId>,
    comments: Vec<Comment>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Fields required to open a new grievance.
#[derive(Debug, Clone)]
pub struct NewGrievance {
    /// Reporting student.
    pub student: UserId,
    /// Short headline.
    pub title: String,
    /// Full description.
    pub description: String,
    /// Topic bucket.
    pub category: Category,
    /// Hide the reporter's identity from staff listings.
    pub is_anonymous: bool,
    /// Triage result, when the assistant produced one.
    pub priority: Priority,
    /// One-line summary from triage, empty when unavailable.
    pub ai_summary: Option<String>,
    /// Uploaded evidence, when provided.
    pub evidence: Option<Evidence>,
}

impl Grievance {
    /// Open a new grievance in the [`Status::Pending`] state.
    pub fn open(id: GrievanceId, now: DateTime<Utc>, fields: NewGrievance) -> Self {
        Self {
            id,
            student: fields.student,
            title: fields.title,
            description: fields.description,
            category: fields.category,
            status: Status::Pending,
            priority: fields.priority,
            is_anonymous: fields.is_anonymous,
            ai_summary: fields.ai_summary,
            internal_notes: None,
            evidence: fields.evidence,
            upvotes: Vec::new(),
            comments: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Rehydrate a grievance from stored parts. The persistence adapter is
    /// responsible for handing over voters deduplicated and comments ordered
    /// oldest first.
    #[allow(clippy::too_many_arguments)]
    pub fn from_parts(
        id: GrievanceId,
        student: UserId,
        title: String,
        description: String,
        category: Category,
        status: Status,
        priority: Priority,
        is_anonymous: bool,
        ai_summary: Option<String>,
        internal_notes: Option<String>,
        evidence: Option<Evidence>,
        upvotes: Vec<UserId>,
        comments: Vec<Comment>,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            student,
            title,
            description,
            category,
            status,
            priority,
            is_anonymous,
            ai_summary,
            internal_notes,
            evidence,
            upvotes,
            comments,
            created_at,
            updated_at,
        }
    }

    /// Stable identifier.
    pub fn id(&self) -> &GrievanceId {
        &self.id
    }

    /// Reporting student.
    pub fn student(&self) -> &UserId {
        &self.student
    }

    /// Short headline.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Full description.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Topic bucket.
    pub fn category(&self) -> Category {
        self.category
    }

    /// Processing state.
    pub fn status(&self) -> Status {
        self.status
    }

    /// Urgency.
    pub fn priority(&self) -> Priority {
        self.priority
    }

    /// Whether the reporter asked to stay anonymous.
    pub fn is_anonymous(&self) -> bool {
        self.is_anonymous
    }

    /// One-line triage summary, when available.
    pub fn ai_summary(&self) -> Option<&str> {
        self.ai_summary.as_deref()
    }

    /// Staff-only notes.
    pub fn internal_notes(&self) -> Option<&str> {
        self.internal_notes.as_deref()
    }

    /// Attached evidence, when uploaded.
    pub fn evidence(&self) -> Option<&Evidence> {
        self.evidence.as_ref()
    }

    /// Voters, each present at most once.
    pub fn upvotes(&self) -> &[UserId] {
        &self.upvotes
    }

    /// Discussion, oldest first.
    pub fn comments(&self) -> &[Comment] {
        &self.comments
    }

    /// Creation timestamp.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Last modification timestamp.
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// True when `user` reported this grievance.
    pub fn is_owned_by(&self, user: &UserId) -> bool {
        &self.student == user
    }

    /// Toggle `voter`'s upvote: absent becomes present, present is removed.
    /// Returns true when the vote is present after the call.
    pub fn toggle_upvote(&mut self, voter: UserId, now: DateTime<Utc>) -> bool {
        let added = match self.upvotes.iter().position(|v| *v == voter) {
            Some(index) => {
                self.upvotes.remove(index);
                false
            }
            None => {
                self.upvotes.push(voter);
                true
            }
        };
        self.updated_at = now;
        added
    }

    /// Append a comment to the discussion.
    pub fn add_comment(&mut self, author: UserId, body: String, now: DateTime<Utc>) -> &Comment {
        self.comments.push(Comment {
            id: Uuid::new_v4(),
            author,
            body,
            created_at: now,
        });
        self.updated_at = now;
        self.comments
            .last()
            .unwrap_or_else(|| unreachable!("comment was just pushed"))
    }

    /// Apply a staff edit. Blank notes were normalised away by
    /// [`StatusUpdate::normalised`], so `Some` notes here always replace.
    /// Returns the status the grievance ends up in.
    pub fn apply_update(&mut self, update: StatusUpdate, now: DateTime<Utc>) -> Status {
        if let Some(status) = update.status {
            self.status = status;
        }
        if let Some(priority) = update.priority {
            self.priority = priority;
        }
        if let Some(notes) = update.internal_notes {
            self.internal_notes = Some(notes);
        }
        self.updated_at = now;
        self.status
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn sample(now: DateTime<Utc>) -> Grievance {
        Grievance::open(
            GrievanceId::random(),
            now,
            NewGrievance {
                student: UserId::random(),
                title: "WiFi down in dorm B".to_owned(),
                description: "No connectivity since Monday.".to_owned(),
                category: Category::Infrastructure,
                is_anonymous: false,
                priority: Priority::default(),
                ai_summary: None,
                evidence: None,
            },
        )
    }

    #[test]
    fn opens_pending_with_medium_priority() {
        let g = sample(Utc::now());
        assert_eq!(g.status(), Status::Pending);
        assert_eq!(g.priority(), Priority::Medium);
        assert!(g.upvotes().is_empty());
        assert!(g.comments().is_empty());
    }

    #[test]
    fn toggle_upvote_is_an_involution() {
        let mut g = sample(Utc::now());
        let voter = UserId::random();
        assert!(g.toggle_upvote(voter, Utc::now()));
        assert_eq!(g.upvotes(), &[voter]);
        assert!(!g.toggle_upvote(voter, Utc::now()));
        assert!(g.upvotes().is_empty());
    }

    #[test]
    fn toggling_never_duplicates_a_voter() {
        let mut g = sample(Utc::now());
        let voter = UserId::random();
        let other = UserId::random();
        g.toggle_upvote(voter, Utc::now());
        g.toggle_upvote(other, Utc::now());
        g.toggle_upvote(voter, Utc::now());
        g.toggle_upvote(voter, Utc::now());
        assert_eq!(g.upvotes().iter().filter(|v| **v == voter).count(), 1);
    }

    #[test]
    fn comments_stay_in_insertion_order() {
        let mut g = sample(Utc::now());
        let author = UserId::random();
        g.add_comment(author, "first".to_owned(), Utc::now());
        g.add_comment(author, "second".to_owned(), Utc::now());
        let bodies: Vec<&str> = g.comments().iter().map(|c| c.body.as_str()).collect();
        assert_eq!(bodies, vec!["first", "second"]);
    }

    #[test]
    fn blank_notes_normalise_to_absent() {
        let update = StatusUpdate {
            status: Some(Status::Resolved),
            priority: None,
            internal_notes: Some("   ".to_owned()),
        }
        .normalised();
        assert!(update.internal_notes.is_none());
        assert!(!update.is_empty());
    }

    #[test]
    fn empty_update_detected_after_normalisation() {
        let update = StatusUpdate {
            status: None,
            priority: None,
            internal_notes: Some(String::new()),
        }
        .normalised();
        assert!(update.is_empty());
    }

    #[test]
    fn update_replaces_only_provided_fields() {
        let mut g = sample(Utc::now());
        g.apply_update(
            StatusUpdate {
                status: None,
                priority: None,
                internal_notes: Some("checked with facilities".to_owned()),
            },
            Utc::now(),
        );
        let ended = g.apply_update(
            StatusUpdate {
                status: Some(Status::InProgress),
                priority: Some(Priority::High),
                internal_notes: None,
            },
            Utc::now(),
        );
        assert_eq!(ended, Status::InProgress);
        assert_eq!(g.priority(), Priority::High);
        assert_eq!(g.internal_notes(), Some("checked with facilities"));
    }

    #[rstest]
    #[case("Pending", Status::Pending)]
    #[case("In Progress", Status::InProgress)]
    #[case("Resolved", Status::Resolved)]
    #[case("Rejected", Status::Rejected)]
    fn status_round_trips_its_wire_spelling(#[case] raw: &str, #[case] status: Status) {
        assert_eq!(raw.parse::<Status>().expect("known status"), status);
        assert_eq!(status.as_str(), raw);
        assert_eq!(
            serde_json::to_value(status).expect("serialise"),
            serde_json::Value::String(raw.to_owned())
        );
    }
}
