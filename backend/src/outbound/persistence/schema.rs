//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the database migrations exactly; Diesel uses
//! them for compile-time query validation. Regenerate with
//! `diesel print-schema` whenever a migration changes the schema.

diesel::table! {
    /// Registered accounts. `email` carries a unique constraint.
    users (id) {
        id -> Uuid,
        name -> Varchar,
        email -> Varchar,
        password_hash -> Varchar,
        role -> Varchar,
        department -> Nullable<Varchar>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Grievance records; comments and upvotes live in child tables.
    grievances (id) {
        id -> Uuid,
        student_id -> Uuid,
        title -> Varchar,
        description -> Text,
        category -> Varchar,
        status -> Varchar,
        priority -> Varchar,
        is_anonymous -> Bool,
        ai_summary -> Nullable<Text>,
        internal_notes -> Nullable<Text>,
        evidence_asset_id -> Nullable<Varchar>,
        evidence_url -> Nullable<Varchar>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Discussion entries, ordered by creation time.
    grievance_comments (id) {
        id -> Uuid,
        grievance_id -> Uuid,
        author_id -> Uuid,
        body -> Text,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// One row per voter per grievance; the composite key enforces the
    /// at-most-once invariant.
    grievance_upvotes (grievance_id, voter_id) {
        grievance_id -> Uuid,
        voter_id -> Uuid,
        created_at -> Timestamptz,
    }
}

diesel::joinable!(grievance_comments -> grievances (grievance_id));
diesel::joinable!(grievance_upvotes -> grievances (grievance_id));

diesel::allow_tables_to_appear_in_same_query!(
    users,
    grievances,
    grievance_comments,
    grievance_upvotes,
);
