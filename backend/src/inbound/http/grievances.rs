//! Grievance API handlers.
//!
//! ```text
//! POST /api/grievances                multipart: title, category, description, isAnonymous, evidence?
//! GET  /api/grievances/my-grievances
//! GET  /api/grievances
//! GET  /api/grievances/{id}
//! POST /api/grievances/{id}/comment   {"text":"..."}
//! PUT  /api/grievances/{id}/status    {"status":"Resolved","internalNotes":"..."}
//! PUT  /api/grievances/{id}/upvote
//! ```
//!
//! Route registration order matters: `my-grievances` must be registered
//! before the `{id}` route so it is not captured as an identifier.

use actix_multipart::form::tempfile::TempFile;
use actix_multipart::form::text::Text;
use actix_multipart::form::MultipartForm;
use actix_web::{get, post, put, web, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::domain::grievance::{Category, Priority, Status, StatusUpdate};
use crate::domain::ports::evidence_store::EvidenceUpload;
use crate::domain::ports::grievance_command::SubmitGrievance;
use crate::domain::views::{CommentView, GrievanceView};
use crate::domain::{Error, GrievanceId, UserId};
use crate::inbound::http::identity::require_identity;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::ApiResult;

/// Accepted evidence MIME types.
const EVIDENCE_TYPES: [&str; 3] = ["image/jpeg", "image/png", "image/webp"];

/// Multipart submission form for `POST /api/grievances`.
#[derive(Debug, MultipartForm)]
pub struct SubmitForm {
    pub title: Text<String>,
    pub description: Text<String>,
    pub category: Text<String>,
    #[multipart(rename = "isAnonymous")]
    pub is_anonymous: Option<Text<String>>,
    /// Optional image attachment.
    #[multipart(limit = "5MiB")]
    pub evidence: Option<TempFile>,
}

async fn evidence_from(file: TempFile) -> ApiResult<EvidenceUpload> {
    let content_type = file
        .content_type
        .as_ref()
        .map(|mime| mime.essence_str().to_owned())
        .unwrap_or_default();
    if !EVIDENCE_TYPES.contains(&content_type.as_str()) {
        return Err(Error::invalid_request(
            "Evidence must be a JPEG, PNG, or WebP image",
        ));
    }
    let bytes = tokio::fs::read(file.file.path())
        .await
        .map_err(|err| Error::internal(format!("failed to read uploaded file: {err}")))?;
    Ok(EvidenceUpload {
        file_name: file.file_name.unwrap_or_else(|| "evidence".to_owned()),
        content_type,
        bytes,
    })
}

/// Submit a new grievance.
#[utoipa::path(
    post,
    path = "/api/grievances",
    responses(
        (status = 201, description = "Grievance created", body = GrievanceView),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["grievances"],
    operation_id = "submitGrievance"
)]
#[post("/grievances")]
pub async fn submit(
    session: SessionContext,
    state: web::Data<HttpState>,
    MultipartForm(form): MultipartForm<SubmitForm>,
) -> ApiResult<HttpResponse> {
    let user = require_identity(&session, state.accounts.as_ref()).await?;
    let category = form
        .category
        .0
        .parse::<Category>()
        .map_err(|err| Error::invalid_request(err.to_string()))?;
    let is_anonymous = form
        .is_anonymous
        .map(|flag| flag.0.trim().eq_ignore_ascii_case("true"))
        .unwrap_or(false);
    let evidence = match form.evidence {
        Some(file) => Some(evidence_from(file).await?),
        None => None,
    };
    let view = state
        .commands
        .submit(
            &user,
            SubmitGrievance {
                title: form.title.0,
                description: form.description.0,
                category,
                is_anonymous,
                evidence,
            },
        )
        .await?;
    Ok(HttpResponse::Created().json(view))
}

/// List the caller's own grievances, newest first.
#[utoipa::path(
    get,
    path = "/api/grievances/my-grievances",
    responses(
        (status = 200, description = "Grievances", body = [GrievanceView]),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["grievances"],
    operation_id = "listMyGrievances"
)]
#[get("/grievances/my-grievances")]
pub async fn list_mine(
    session: SessionContext,
    state: web::Data<HttpState>,
) -> ApiResult<web::Json<Vec<GrievanceView>>> {
    let user = require_identity(&session, state.accounts.as_ref()).await?;
    let views = state.queries.list_mine(&user).await?;
    Ok(web::Json(views))
}

/// List every grievance, newest first, field-filtered by role.
#[utoipa::path(
    get,
    path = "/api/grievances",
    responses(
        (status = 200, description = "Grievances", body = [GrievanceView]),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["grievances"],
    operation_id = "listGrievances"
)]
#[get("/grievances")]
pub async fn list_all(
    session: SessionContext,
    state: web::Data<HttpState>,
) -> ApiResult<web::Json<Vec<GrievanceView>>> {
    let user = require_identity(&session, state.accounts.as_ref()).await?;
    let views = state.queries.list_all(&user).await?;
    Ok(web::Json(views))
}

/// Fetch one grievance. Students may only fetch their own.
#[utoipa::path(
    get,
    path = "/api/grievances/{id}",
    params(("id" = uuid::Uuid, Path, description = "Grievance id")),
    responses(
        (status = 200, description = "Grievance", body = GrievanceView),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["grievances"],
    operation_id = "getGrievance"
)]
#[get("/grievances/{id}")]
pub async fn get_one(
    session: SessionContext,
    state: web::Data<HttpState>,
    id: web::Path<GrievanceId>,
) -> ApiResult<web::Json<GrievanceView>> {
    let user = require_identity(&session, state.accounts.as_ref()).await?;
    let view = state.queries.get_one(&id, &user).await?;
    Ok(web::Json(view))
}

/// Comment request body.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct CommentRequest {
    pub text: String,
}

/// Add a comment; returns the full comment sequence.
#[utoipa::path(
    post,
    path = "/api/grievances/{id}/comment",
    params(("id" = uuid::Uuid, Path, description = "Grievance id")),
    request_body = CommentRequest,
    responses(
        (status = 200, description = "Comments after the append", body = [CommentView]),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["grievances"],
    operation_id = "addComment"
)]
#[post("/grievances/{id}/comment")]
pub async fn add_comment(
    session: SessionContext,
    state: web::Data<HttpState>,
    id: web::Path<GrievanceId>,
    payload: web::Json<CommentRequest>,
) -> ApiResult<web::Json<Vec<CommentView>>> {
    let user = require_identity(&session, state.accounts.as_ref()).await?;
    let comments = state
        .commands
        .add_comment(&id, &user, payload.into_inner().text)
        .await?;
    Ok(web::Json(comments))
}

/// Status update body. Absent fields are left untouched; blank internal
/// notes are treated as absent.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatusRequest {
    pub status: Option<Status>,
    pub priority: Option<Priority>,
    pub internal_notes: Option<String>,
}

impl From<StatusRequest> for StatusUpdate {
    fn from(value: StatusRequest) -> Self {
        Self {
            status: value.status,
            priority: value.priority,
            internal_notes: value.internal_notes,
        }
    }
}

/// Apply a staff edit to a grievance.
#[utoipa::path(
    put,
    path = "/api/grievances/{id}/status",
    params(("id" = uuid::Uuid, Path, description = "Grievance id")),
    request_body = StatusRequest,
    responses(
        (status = 200, description = "Updated grievance", body = GrievanceView),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["grievances"],
    operation_id = "updateGrievanceStatus"
)]
#[put("/grievances/{id}/status")]
pub async fn update_status(
    session: SessionContext,
    state: web::Data<HttpState>,
    id: web::Path<GrievanceId>,
    payload: web::Json<StatusRequest>,
) -> ApiResult<web::Json<GrievanceView>> {
    let user = require_identity(&session, state.accounts.as_ref()).await?;
    let view = state
        .commands
        .update_status(&id, &user, payload.into_inner().into())
        .await?;
    Ok(web::Json(view))
}

/// Toggle the caller's upvote; returns the resulting voter sequence.
#[utoipa::path(
    put,
    path = "/api/grievances/{id}/upvote",
    params(("id" = uuid::Uuid, Path, description = "Grievance id")),
    responses(
        (status = 200, description = "Voters after the toggle", body = [UserId]),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["grievances"],
    operation_id = "toggleUpvote"
)]
#[put("/grievances/{id}/upvote")]
pub async fn toggle_upvote(
    session: SessionContext,
    state: web::Data<HttpState>,
    id: web::Path<GrievanceId>,
) -> ApiResult<web::Json<Vec<UserId>>> {
    let user = require_identity(&session, state.accounts.as_ref()).await?;
    let voters = state.commands.toggle_upvote(&id, &user).await?;
    Ok(web::Json(voters))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use crate::test_support::{
        get_req, multipart_submit_req, post_json_req, put_json_req, register_and_login,
        test_app, test_harness,
    };
    use actix_web::http::StatusCode;
    use actix_web::test;
    use serde_json::{json, Value};

    #[actix_web::test]
    async fn submit_requires_a_session() {
        let app = test::init_service(test_app(test_harness())).await;
        let res = test::call_service(
            &app,
            multipart_submit_req("WiFi down", "Infrastructure", "No connectivity.", false, None),
        )
        .await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn submit_and_list_mine() {
        let app = test::init_service(test_app(test_harness())).await;
        let cookie = register_and_login(&app, "Lenni", "a@u.edu", "student").await;

        let res = test::call_service(
            &app,
            multipart_submit_req(
                "WiFi down",
                "Infrastructure",
                "No connectivity in dorm B.",
                false,
                Some(cookie.clone()),
            ),
        )
        .await;
        assert_eq!(res.status(), StatusCode::CREATED);
        let created: Value = test::read_body_json(res).await;
        assert_eq!(created["status"], "Pending");
        assert_eq!(created["priority"], "Medium");
        assert_eq!(created["category"], "Infrastructure");

        let res = test::call_service(
            &app,
            get_req("/api/grievances/my-grievances", Some(cookie)),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let listed: Value = test::read_body_json(res).await;
        let records = listed.as_array().expect("array of grievances");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["title"], "WiFi down");
    }

    #[actix_web::test]
    async fn unknown_category_is_rejected() {
        let app = test::init_service(test_app(test_harness())).await;
        let cookie = register_and_login(&app, "Lenni", "a@u.edu", "student").await;
        let res = test::call_service(
            &app,
            multipart_submit_req(
                "WiFi down",
                "Gymnasium",
                "No connectivity.",
                false,
                Some(cookie),
            ),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: Error = test::read_body_json(res).await;
        assert_eq!(body.code, ErrorCode::InvalidRequest);
    }

    #[actix_web::test]
    async fn student_cannot_update_status_but_officer_can() {
        let app = test::init_service(test_app(test_harness())).await;
        let student = register_and_login(&app, "Lenni", "a@u.edu", "student").await;
        let officer = register_and_login(&app, "Ines", "o@u.edu", "officer").await;

        let res = test::call_service(
            &app,
            multipart_submit_req(
                "WiFi down",
                "Infrastructure",
                "No connectivity.",
                false,
                Some(student.clone()),
            ),
        )
        .await;
        let created: Value = test::read_body_json(res).await;
        let id = created["id"].as_str().expect("id").to_owned();

        let res = test::call_service(
            &app,
            put_json_req(
                &format!("/api/grievances/{id}/status"),
                &json!({ "status": "Resolved" }),
                Some(student.clone()),
            ),
        )
        .await;
        assert_eq!(res.status(), StatusCode::FORBIDDEN);

        let res = test::call_service(
            &app,
            put_json_req(
                &format!("/api/grievances/{id}/status"),
                &json!({ "status": "Resolved" }),
                Some(officer),
            ),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let updated: Value = test::read_body_json(res).await;
        assert_eq!(updated["status"], "Resolved");

        let res = test::call_service(
            &app,
            get_req(&format!("/api/grievances/{id}"), Some(student)),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let seen: Value = test::read_body_json(res).await;
        assert_eq!(seen["status"], "Resolved");
        assert!(seen.get("internalNotes").is_none());
    }

    #[actix_web::test]
    async fn comment_and_upvote_round_trip() {
        let app = test::init_service(test_app(test_harness())).await;
        let student = register_and_login(&app, "Lenni", "a@u.edu", "student").await;

        let res = test::call_service(
            &app,
            multipart_submit_req(
                "WiFi down",
                "Infrastructure",
                "No connectivity.",
                false,
                Some(student.clone()),
            ),
        )
        .await;
        let created: Value = test::read_body_json(res).await;
        let id = created["id"].as_str().expect("id").to_owned();

        let res = test::call_service(
            &app,
            post_json_req(
                &format!("/api/grievances/{id}/comment"),
                &json!({ "text": "still down" }),
                Some(student.clone()),
            ),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let comments: Value = test::read_body_json(res).await;
        assert_eq!(comments.as_array().expect("comments").len(), 1);
        assert_eq!(comments[0]["text"], "still down");
        assert_eq!(comments[0]["user"]["name"], "Lenni");

        let res = test::call_service(
            &app,
            put_json_req(
                &format!("/api/grievances/{id}/upvote"),
                &json!({}),
                Some(student.clone()),
            ),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let voters: Value = test::read_body_json(res).await;
        assert_eq!(voters.as_array().expect("voters").len(), 1);

        let res = test::call_service(
            &app,
            put_json_req(
                &format!("/api/grievances/{id}/upvote"),
                &json!({}),
                Some(student),
            ),
        )
        .await;
        let voters: Value = test::read_body_json(res).await;
        assert!(voters.as_array().expect("voters").is_empty());
    }

    #[actix_web::test]
    async fn strangers_get_forbidden_and_unknown_ids_not_found() {
        let app = test::init_service(test_app(test_harness())).await;
        let student = register_and_login(&app, "Lenni", "a@u.edu", "student").await;
        let stranger = register_and_login(&app, "Mika", "m@u.edu", "student").await;

        let res = test::call_service(
            &app,
            multipart_submit_req(
                "WiFi down",
                "Infrastructure",
                "No connectivity.",
                false,
                Some(student),
            ),
        )
        .await;
        let created: Value = test::read_body_json(res).await;
        let id = created["id"].as_str().expect("id").to_owned();

        let res = test::call_service(
            &app,
            get_req(&format!("/api/grievances/{id}"), Some(stranger.clone())),
        )
        .await;
        assert_eq!(res.status(), StatusCode::FORBIDDEN);

        let missing = uuid::Uuid::new_v4();
        let res = test::call_service(
            &app,
            get_req(&format!("/api/grievances/{missing}"), Some(stranger)),
        )
        .await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }
}
