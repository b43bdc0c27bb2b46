//! Account API handlers.
//!
//! ```text
//! POST /api/auth/register {"name":"Lenni","email":"a@u.edu","password":"secret1"}
//! POST /api/auth/login    {"email":"a@u.edu","password":"secret1"}
//! POST /api/auth/logout
//! GET  /api/auth/check
//! PUT  /api/auth/profile  {"name":"Lennart"} or {"currentPassword":"...","password":"..."}
//! ```

use actix_web::{get, post, put, web, HttpResponse};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::domain::auth::{Credentials, ProfileUpdate, RawPassword, Registration};
use crate::domain::user::{EmailAddress, Role, UserName, UserValidationError};
use crate::domain::{Error, UserView};
use crate::inbound::http::identity::require_identity;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::ApiResult;

/// Registration request body for `POST /api/auth/register`.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    /// Defaults to `student` when omitted.
    pub role: Option<String>,
    pub department: Option<String>,
}

impl TryFrom<RegisterRequest> for Registration {
    type Error = Error;

    fn try_from(value: RegisterRequest) -> Result<Self, Self::Error> {
        let role = match value.role.as_deref() {
            None => Role::default(),
            Some(raw) => raw
                .parse::<Role>()
                .map_err(|err| map_validation_error("role", err))?,
        };
        Ok(Self {
            name: UserName::new(value.name).map_err(|err| map_validation_error("name", err))?,
            email: EmailAddress::new(value.email)
                .map_err(|err| map_validation_error("email", err))?,
            password: RawPassword::new(value.password)
                .map_err(|err| map_validation_error("password", err))?,
            role,
            department: value
                .department
                .map(|d| d.trim().to_owned())
                .filter(|d| !d.is_empty()),
        })
    }
}

fn map_validation_error(field: &str, err: UserValidationError) -> Error {
    Error::invalid_request(err.to_string()).with_details(json!({ "field": field }))
}

/// Login request body for `POST /api/auth/login`.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Profile update body for `PUT /api/auth/profile`.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileRequest {
    pub name: Option<String>,
    /// Required when `password` is set.
    pub current_password: Option<String>,
    /// Replacement password.
    pub password: Option<String>,
}

impl TryFrom<ProfileRequest> for ProfileUpdate {
    type Error = Error;

    fn try_from(value: ProfileRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            name: value
                .name
                .map(UserName::new)
                .transpose()
                .map_err(|err| map_validation_error("name", err))?,
            current_password: value.current_password.map(RawPassword::unchecked),
            new_password: value
                .password
                .map(RawPassword::new)
                .transpose()
                .map_err(|err| map_validation_error("password", err))?,
        })
    }
}

/// Create an account and establish a session.
#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = UserView,
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Invalid request or duplicate email", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["auth"],
    operation_id = "register",
    security([])
)]
#[post("/auth/register")]
pub async fn register(
    session: SessionContext,
    state: web::Data<HttpState>,
    payload: web::Json<RegisterRequest>,
) -> ApiResult<HttpResponse> {
    let registration = Registration::try_from(payload.into_inner())?;
    let user = state.accounts.register(registration).await?;
    session.persist_user(user.id())?;
    Ok(HttpResponse::Created().json(UserView::from(&user)))
}

/// Authenticate and establish a session.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login success", body = UserView,
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 401, description = "Invalid credentials", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["auth"],
    operation_id = "login",
    security([])
)]
#[post("/auth/login")]
pub async fn login(
    session: SessionContext,
    state: web::Data<HttpState>,
    payload: web::Json<LoginRequest>,
) -> ApiResult<HttpResponse> {
    let payload = payload.into_inner();
    // A malformed email cannot match any account; answer with the same
    // generic credential error as a wrong password.
    let email = EmailAddress::new(payload.email)
        .map_err(|_| Error::unauthorized("Invalid email or password"))?;
    let user = state
        .accounts
        .login(Credentials {
            email,
            password: RawPassword::unchecked(payload.password),
        })
        .await?;
    session.persist_user(user.id())?;
    Ok(HttpResponse::Ok().json(UserView::from(&user)))
}

/// End the session.
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses(
        (status = 200, description = "Session ended")
    ),
    tags = ["auth"],
    operation_id = "logout",
    security([])
)]
#[post("/auth/logout")]
pub async fn logout(session: SessionContext) -> HttpResponse {
    session.clear();
    HttpResponse::Ok().json(json!({ "message": "Logged out successfully" }))
}

/// Return the calling identity.
#[utoipa::path(
    get,
    path = "/api/auth/check",
    responses(
        (status = 200, description = "Current identity", body = UserView),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["auth"],
    operation_id = "checkSession"
)]
#[get("/auth/check")]
pub async fn check(
    session: SessionContext,
    state: web::Data<HttpState>,
) -> ApiResult<web::Json<UserView>> {
    let user = require_identity(&session, state.accounts.as_ref()).await?;
    Ok(web::Json(UserView::from(&user)))
}

/// Update the caller's profile.
#[utoipa::path(
    put,
    path = "/api/auth/profile",
    request_body = ProfileRequest,
    responses(
        (status = 200, description = "Updated identity", body = UserView),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised or wrong current password", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["auth"],
    operation_id = "updateProfile"
)]
#[put("/auth/profile")]
pub async fn update_profile(
    session: SessionContext,
    state: web::Data<HttpState>,
    payload: web::Json<ProfileRequest>,
) -> ApiResult<web::Json<UserView>> {
    let user = require_identity(&session, state.accounts.as_ref()).await?;
    let update = ProfileUpdate::try_from(payload.into_inner())?;
    let updated = state.accounts.update_profile(user.id(), update).await?;
    Ok(web::Json(UserView::from(&updated)))
}
