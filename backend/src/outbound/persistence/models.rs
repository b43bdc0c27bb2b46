//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. They exist solely to satisfy Diesel's
//! type requirements for queries and mutations.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::{grievance_comments, grievance_upvotes, grievances, users};

/// Row struct for reading from the users table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub department: Option<String>,
    #[expect(dead_code, reason = "schema field for future audit trail support")]
    pub created_at: DateTime<Utc>,
    #[expect(dead_code, reason = "schema field for future audit trail support")]
    pub updated_at: DateTime<Utc>,
}

/// Insertable struct for creating new user records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: Uuid,
    pub name: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub role: &'a str,
    pub department: Option<&'a str>,
}

/// Changeset struct for profile updates.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = users)]
pub(crate) struct UserChangeset<'a> {
    pub name: &'a str,
    pub password_hash: &'a str,
    pub updated_at: DateTime<Utc>,
}

/// Row struct for reading from the grievances table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = grievances)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct GrievanceRow {
    pub id: Uuid,
    pub student_id: Uuid,
    pub title: String,
    pub description: String,
    pub category: String,
    pub status: String,
    pub priority: String,
    pub is_anonymous: bool,
    pub ai_summary: Option<String>,
    pub internal_notes: Option<String>,
    pub evidence_asset_id: Option<String>,
    pub evidence_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insertable struct for newly opened grievances.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = grievances)]
pub(crate) struct NewGrievanceRow<'a> {
    pub id: Uuid,
    pub student_id: Uuid,
    pub title: &'a str,
    pub description: &'a str,
    pub category: &'a str,
    pub status: &'a str,
    pub priority: &'a str,
    pub is_anonymous: bool,
    pub ai_summary: Option<&'a str>,
    pub evidence_asset_id: Option<&'a str>,
    pub evidence_url: Option<&'a str>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Changeset struct for staff edits. `None` fields are left untouched.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = grievances)]
pub(crate) struct GrievanceChangeset<'a> {
    pub status: Option<&'a str>,
    pub priority: Option<&'a str>,
    pub internal_notes: Option<&'a str>,
    pub updated_at: DateTime<Utc>,
}

/// Row struct for reading from the grievance_comments table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = grievance_comments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct CommentRow {
    pub id: Uuid,
    pub grievance_id: Uuid,
    pub author_id: Uuid,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

/// Insertable struct for new comments.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = grievance_comments)]
pub(crate) struct NewCommentRow<'a> {
    pub id: Uuid,
    pub grievance_id: Uuid,
    pub author_id: Uuid,
    pub body: &'a str,
    pub created_at: DateTime<Utc>,
}

/// Row struct for reading from the grievance_upvotes table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = grievance_upvotes)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UpvoteRow {
    pub grievance_id: Uuid,
    pub voter_id: Uuid,
    #[expect(dead_code, reason = "schema field used only for ordering in SQL")]
    pub created_at: DateTime<Utc>,
}

/// Insertable struct for new upvotes.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = grievance_upvotes)]
pub(crate) struct NewUpvoteRow {
    pub grievance_id: Uuid,
    pub voter_id: Uuid,
    pub created_at: DateTime<Utc>,
}
