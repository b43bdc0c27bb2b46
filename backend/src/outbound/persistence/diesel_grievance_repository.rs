//! PostgreSQL-backed `GrievanceRepository` implementation using Diesel ORM.
//!
//! Comments and upvotes live in child tables. Mutations run inside a
//! transaction that first bumps the parent row's `updated_at`; a zero row
//! count there doubles as the existence check, so a missing grievance maps
//! to `None` without a separate lookup.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use diesel_async::AsyncConnection as _;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use uuid::Uuid;

use crate::domain::grievance::{
    Category, Comment, Evidence, Grievance, GrievanceId, Priority, Status, StatusUpdate,
};
use crate::domain::ports::grievance_repository::{
    GrievancePersistenceError, GrievanceRepository,
};
use crate::domain::user::UserId;

use super::error_mapping::{map_grievance_diesel_error, map_grievance_pool_error};
use super::models::{
    CommentRow, GrievanceChangeset, GrievanceRow, NewCommentRow, NewGrievanceRow, NewUpvoteRow,
    UpvoteRow,
};
use super::pool::DbPool;
use super::schema::{grievance_comments, grievance_upvotes, grievances};

/// Diesel-backed implementation of the `GrievanceRepository` port.
#[derive(Clone)]
pub struct DieselGrievanceRepository {
    pool: DbPool,
}

impl DieselGrievanceRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Snapshot of grievance rows with their child rows, read in one transaction.
type RowSnapshot = (Vec<GrievanceRow>, Vec<CommentRow>, Vec<UpvoteRow>);

/// Fetch the children for already-selected grievance rows.
async fn snapshot(
    conn: &mut AsyncPgConnection,
    rows: Vec<GrievanceRow>,
) -> Result<RowSnapshot, diesel::result::Error> {
    let ids: Vec<Uuid> = rows.iter().map(|row| row.id).collect();
    let (comments, upvotes) = children_for(conn, ids).await?;
    Ok((rows, comments, upvotes))
}

/// Assemble domain aggregates from a snapshot, preserving row order.
fn assemble_all(
    (rows, comment_rows, upvote_rows): RowSnapshot,
) -> Result<Vec<Grievance>, GrievancePersistenceError> {
    let (mut comments, mut upvotes) = group_children(comment_rows, upvote_rows);
    rows.into_iter()
        .map(|row| {
            let id = row.id;
            assemble(
                row,
                comments.remove(&id).unwrap_or_default(),
                upvotes.remove(&id).unwrap_or_default(),
            )
        })
        .collect()
}

/// Fetch comment and upvote rows for the given grievances, each ordered
/// oldest first.
async fn children_for(
    conn: &mut AsyncPgConnection,
    ids: Vec<Uuid>,
) -> Result<(Vec<CommentRow>, Vec<UpvoteRow>), diesel::result::Error> {
    if ids.is_empty() {
        return Ok((Vec::new(), Vec::new()));
    }
    let comments = grievance_comments::table
        .filter(grievance_comments::grievance_id.eq_any(ids.clone()))
        .order((
            grievance_comments::created_at.asc(),
            grievance_comments::id.asc(),
        ))
        .select(CommentRow::as_select())
        .load(conn)
        .await?;
    let upvotes = grievance_upvotes::table
        .filter(grievance_upvotes::grievance_id.eq_any(ids))
        .order(grievance_upvotes::created_at.asc())
        .select(UpvoteRow::as_select())
        .load(conn)
        .await?;
    Ok((comments, upvotes))
}

fn group_children(
    comment_rows: Vec<CommentRow>,
    upvote_rows: Vec<UpvoteRow>,
) -> (HashMap<Uuid, Vec<Comment>>, HashMap<Uuid, Vec<UserId>>) {
    let mut comments: HashMap<Uuid, Vec<Comment>> = HashMap::new();
    for row in comment_rows {
        comments
            .entry(row.grievance_id)
            .or_default()
            .push(row_to_comment(row));
    }
    let mut upvotes: HashMap<Uuid, Vec<UserId>> = HashMap::new();
    for row in upvote_rows {
        upvotes
            .entry(row.grievance_id)
            .or_default()
            .push(UserId::from_uuid(row.voter_id));
    }
    (comments, upvotes)
}

fn row_to_comment(row: CommentRow) -> Comment {
    Comment {
        id: row.id,
        author: UserId::from_uuid(row.author_id),
        body: row.body,
        created_at: row.created_at,
    }
}

fn vocab_error(err: impl std::fmt::Display) -> GrievancePersistenceError {
    GrievancePersistenceError::query(format!("corrupted grievance row: {err}"))
}

/// Convert a grievance row and its children to the domain aggregate.
fn assemble(
    row: GrievanceRow,
    comments: Vec<Comment>,
    upvotes: Vec<UserId>,
) -> Result<Grievance, GrievancePersistenceError> {
    let category = row.category.parse::<Category>().map_err(vocab_error)?;
    let status = row.status.parse::<Status>().map_err(vocab_error)?;
    let priority = row.priority.parse::<Priority>().map_err(vocab_error)?;
    let evidence = match (row.evidence_asset_id, row.evidence_url) {
        (Some(asset_id), Some(url)) => Some(Evidence { asset_id, url }),
        (None, None) => None,
        _ => {
            return Err(GrievancePersistenceError::query(
                "evidence columns out of sync",
            ))
        }
    };

    Ok(Grievance::from_parts(
        GrievanceId::from_uuid(row.id),
        UserId::from_uuid(row.student_id),
        row.title,
        row.description,
        category,
        status,
        priority,
        row.is_anonymous,
        row.ai_summary,
        row.internal_notes,
        evidence,
        upvotes,
        comments,
        row.created_at,
        row.updated_at,
    ))
}

#[async_trait]
impl GrievanceRepository for DieselGrievanceRepository {
    async fn insert(&self, grievance: &Grievance) -> Result<(), GrievancePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_grievance_pool_error)?;
        let row = NewGrievanceRow {
            id: *grievance.id().as_uuid(),
            student_id: *grievance.student().as_uuid(),
            title: grievance.title(),
            description: grievance.description(),
            category: grievance.category().as_str(),
            status: grievance.status().as_str(),
            priority: grievance.priority().as_str(),
            is_anonymous: grievance.is_anonymous(),
            ai_summary: grievance.ai_summary(),
            evidence_asset_id: grievance.evidence().map(|e| e.asset_id.as_str()),
            evidence_url: grievance.evidence().map(|e| e.url.as_str()),
            created_at: grievance.created_at(),
            updated_at: grievance.updated_at(),
        };

        diesel::insert_into(grievances::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map_err(map_grievance_diesel_error)?;
        Ok(())
    }

    async fn find_by_id(
        &self,
        id: &GrievanceId,
    ) -> Result<Option<Grievance>, GrievancePersistenceError> {
        let gid = *id.as_uuid();
        let mut conn = self.pool.get().await.map_err(map_grievance_pool_error)?;
        let loaded = conn
            .transaction(|conn| {
                async move {
                    let rows = grievances::table
                        .filter(grievances::id.eq(gid))
                        .select(GrievanceRow::as_select())
                        .load(conn)
                        .await?;
                    snapshot(conn, rows).await
                }
                .scope_boxed()
            })
            .await
            .map_err(map_grievance_diesel_error)?;

        Ok(assemble_all(loaded)?.pop())
    }

    async fn list_for_student(
        &self,
        student: &UserId,
    ) -> Result<Vec<Grievance>, GrievancePersistenceError> {
        let sid = *student.as_uuid();
        let mut conn = self.pool.get().await.map_err(map_grievance_pool_error)?;
        let loaded = conn
            .transaction(|conn| {
                async move {
                    let rows = grievances::table
                        .filter(grievances::student_id.eq(sid))
                        .order(grievances::created_at.desc())
                        .select(GrievanceRow::as_select())
                        .load(conn)
                        .await?;
                    snapshot(conn, rows).await
                }
                .scope_boxed()
            })
            .await
            .map_err(map_grievance_diesel_error)?;

        assemble_all(loaded)
    }

    async fn list_all(&self) -> Result<Vec<Grievance>, GrievancePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_grievance_pool_error)?;
        let loaded = conn
            .transaction(|conn| {
                async move {
                    let rows = grievances::table
                        .order(grievances::created_at.desc())
                        .select(GrievanceRow::as_select())
                        .load(conn)
                        .await?;
                    snapshot(conn, rows).await
                }
                .scope_boxed()
            })
            .await
            .map_err(map_grievance_diesel_error)?;

        assemble_all(loaded)
    }

    async fn append_comment(
        &self,
        id: &GrievanceId,
        author: &UserId,
        body: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Vec<Comment>>, GrievancePersistenceError> {
        let gid = *id.as_uuid();
        let author_id = *author.as_uuid();
        let mut conn = self.pool.get().await.map_err(map_grievance_pool_error)?;

        let rows = conn
            .transaction(|conn| {
                async move {
                    let touched = diesel::update(grievances::table.find(gid))
                        .set(grievances::updated_at.eq(now))
                        .execute(conn)
                        .await?;
                    if touched == 0 {
                        return Ok(None);
                    }

                    diesel::insert_into(grievance_comments::table)
                        .values(&NewCommentRow {
                            id: Uuid::new_v4(),
                            grievance_id: gid,
                            author_id,
                            body,
                            created_at: now,
                        })
                        .execute(conn)
                        .await?;

                    let rows = grievance_comments::table
                        .filter(grievance_comments::grievance_id.eq(gid))
                        .order((
                            grievance_comments::created_at.asc(),
                            grievance_comments::id.asc(),
                        ))
                        .select(CommentRow::as_select())
                        .load(conn)
                        .await?;
                    Ok::<_, diesel::result::Error>(Some(rows))
                }
                .scope_boxed()
            })
            .await
            .map_err(map_grievance_diesel_error)?;

        Ok(rows.map(|rows| rows.into_iter().map(row_to_comment).collect()))
    }

    async fn toggle_upvote(
        &self,
        id: &GrievanceId,
        voter: &UserId,
        now: DateTime<Utc>,
    ) -> Result<Option<Vec<UserId>>, GrievancePersistenceError> {
        let gid = *id.as_uuid();
        let voter_id = *voter.as_uuid();
        let mut conn = self.pool.get().await.map_err(map_grievance_pool_error)?;

        let rows = conn
            .transaction(|conn| {
                async move {
                    let touched = diesel::update(grievances::table.find(gid))
                        .set(grievances::updated_at.eq(now))
                        .execute(conn)
                        .await?;
                    if touched == 0 {
                        return Ok(None);
                    }

                    // Remove-then-insert inside the transaction keeps the
                    // toggle atomic under concurrent votes.
                    let removed =
                        diesel::delete(grievance_upvotes::table.find((gid, voter_id)))
                            .execute(conn)
                            .await?;
                    if removed == 0 {
                        diesel::insert_into(grievance_upvotes::table)
                            .values(&NewUpvoteRow {
                                grievance_id: gid,
                                voter_id,
                                created_at: now,
                            })
                            .execute(conn)
                            .await?;
                    }

                    let rows = grievance_upvotes::table
                        .filter(grievance_upvotes::grievance_id.eq(gid))
                        .order(grievance_upvotes::created_at.asc())
                        .select(UpvoteRow::as_select())
                        .load(conn)
                        .await?;
                    Ok::<_, diesel::result::Error>(Some(rows))
                }
                .scope_boxed()
            })
            .await
            .map_err(map_grievance_diesel_error)?;

        Ok(rows.map(|rows| {
            rows.into_iter()
                .map(|row| UserId::from_uuid(row.voter_id))
                .collect()
        }))
    }

    async fn apply_update(
        &self,
        id: &GrievanceId,
        update: &StatusUpdate,
        now: DateTime<Utc>,
    ) -> Result<Option<Grievance>, GrievancePersistenceError> {
        let gid = *id.as_uuid();
        let changes = GrievanceChangeset {
            status: update.status.map(|s| s.as_str()),
            priority: update.priority.map(|p| p.as_str()),
            internal_notes: update.internal_notes.as_deref(),
            updated_at: now,
        };
        let mut conn = self.pool.get().await.map_err(map_grievance_pool_error)?;

        let loaded = conn
            .transaction(|conn| {
                async move {
                    let row = diesel::update(grievances::table.find(gid))
                        .set(&changes)
                        .returning(GrievanceRow::as_returning())
                        .get_result(conn)
                        .await
                        .optional()?;
                    let Some(row) = row else {
                        return Ok(None);
                    };
                    let (comments, upvotes) = children_for(conn, vec![gid]).await?;
                    Ok::<_, diesel::result::Error>(Some((row, comments, upvotes)))
                }
                .scope_boxed()
            })
            .await
            .map_err(map_grievance_diesel_error)?;

        loaded
            .map(|(row, comment_rows, upvote_rows)| {
                let (mut comments, mut upvotes) = group_children(comment_rows, upvote_rows);
                assemble(
                    row,
                    comments.remove(&gid).unwrap_or_default(),
                    upvotes.remove(&gid).unwrap_or_default(),
                )
            })
            .transpose()
    }
}
