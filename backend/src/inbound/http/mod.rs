//! HTTP inbound adapter exposing the REST endpoints.

use actix_web::{web, Scope};

pub mod accounts;
pub mod error;
pub mod grievances;
pub mod health;
pub mod identity;
pub mod session;
pub mod session_config;
pub mod state;

pub use error::ApiResult;

/// All REST endpoints under `/api`.
///
/// `my-grievances` is registered ahead of the `{id}` route so it is matched
/// as a literal path segment rather than an identifier.
pub fn api_scope() -> Scope {
    web::scope("/api")
        .service(accounts::register)
        .service(accounts::login)
        .service(accounts::logout)
        .service(accounts::check)
        .service(accounts::update_profile)
        .service(grievances::list_mine)
        .service(grievances::submit)
        .service(grievances::list_all)
        .service(grievances::get_one)
        .service(grievances::add_comment)
        .service(grievances::update_status)
        .service(grievances::toggle_upvote)
}
