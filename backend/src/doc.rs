//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] generates the OpenAPI specification for the REST API: every
//! endpoint from the inbound layer, the view and error schemas they answer
//! with, and the session cookie security scheme. Swagger UI serves the
//! document in debug builds.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::grievance::{Category, Evidence, GrievanceId, Priority, Status};
use crate::domain::user::{Role, UserId};
use crate::domain::{
    CommentAuthor, CommentView, Error, ErrorCode, GrievanceView, StudentRef, UserView,
};
use crate::inbound::http::accounts::{LoginRequest, ProfileRequest, RegisterRequest};
use crate::inbound::http::grievances::{CommentRequest, StatusRequest};

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /api/auth/login or /api/auth/register.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Resolve backend API",
        description = "HTTP interface for campus grievance reporting: accounts, \
                       grievance lifecycle, and health probes."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::accounts::register,
        crate::inbound::http::accounts::login,
        crate::inbound::http::accounts::logout,
        crate::inbound::http::accounts::check,
        crate::inbound::http::accounts::update_profile,
        crate::inbound::http::grievances::submit,
        crate::inbound::http::grievances::list_mine,
        crate::inbound::http::grievances::list_all,
        crate::inbound::http::grievances::get_one,
        crate::inbound::http::grievances::add_comment,
        crate::inbound::http::grievances::update_status,
        crate::inbound::http::grievances::toggle_upvote,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Error,
        ErrorCode,
        UserId,
        Role,
        UserView,
        StudentRef,
        GrievanceId,
        Category,
        Status,
        Priority,
        Evidence,
        CommentAuthor,
        CommentView,
        GrievanceView,
        RegisterRequest,
        LoginRequest,
        ProfileRequest,
        CommentRequest,
        StatusRequest,
    )),
    tags(
        (name = "auth", description = "Account registration, sessions, and profiles"),
        (name = "grievances", description = "Grievance lifecycle operations"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
