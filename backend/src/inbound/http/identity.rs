//! Resolution of the calling identity from the session cookie.
//!
//! The cookie holds only the user id; the account record (and with it the
//! live role) is fetched per request. A cookie referencing a deleted account
//! is treated as an expired session, not a server error.

use crate::domain::ports::account::AccountService;
use crate::domain::{Error, User};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::ApiResult;

/// Resolve the authenticated user or fail with `401 Unauthorized`.
pub async fn require_identity(
    session: &SessionContext,
    accounts: &dyn AccountService,
) -> ApiResult<User> {
    let id = session.require_user_id()?;
    accounts
        .fetch(&id)
        .await?
        .ok_or_else(|| Error::unauthorized("Login required"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ErrorCode, UserId};
    use crate::test_support::{test_session_middleware, InMemoryUserRepository, PlainTextHasher};
    use crate::domain::PasswordAccountService;
    use actix_web::http::StatusCode;
    use actix_web::{test, web, App, HttpResponse};
    use std::sync::Arc;

    #[actix_web::test]
    async fn stale_cookie_for_a_missing_account_is_unauthorised() {
        let accounts: Arc<dyn AccountService> = Arc::new(PasswordAccountService::new(
            Arc::new(InMemoryUserRepository::default()),
            Arc::new(PlainTextHasher),
        ));
        let app = test::init_service(
            App::new()
                .wrap(test_session_middleware())
                .app_data(web::Data::new(accounts))
                .route(
                    "/set",
                    web::get().to(|session: SessionContext| async move {
                        session.persist_user(&UserId::random())?;
                        Ok::<_, Error>(HttpResponse::Ok())
                    }),
                )
                .route(
                    "/me",
                    web::get().to(
                        |session: SessionContext,
                         accounts: web::Data<Arc<dyn AccountService>>| async move {
                            let user = require_identity(&session, accounts.as_ref().as_ref())
                                .await?;
                            Ok::<_, Error>(HttpResponse::Ok().body(user.id().to_string()))
                        },
                    ),
                ),
        )
        .await;

        let set_res =
            test::call_service(&app, test::TestRequest::get().uri("/set").to_request()).await;
        let cookie = set_res
            .response()
            .cookies()
            .find(|cookie| cookie.name() == "session")
            .expect("session cookie set")
            .into_owned();

        let res = test::call_service(
            &app,
            test::TestRequest::get().uri("/me").cookie(cookie).to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        let body: Error = test::read_body_json(res).await;
        assert_eq!(body.code, ErrorCode::Unauthorized);
    }
}
