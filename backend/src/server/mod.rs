//! Server construction and middleware wiring.
//!
//! [`create_server`] assembles the production dependency graph: a PostgreSQL
//! pool behind the Diesel repositories, the Argon2 hasher, the evidence
//! store, triage, and SMTP adapters, all bundled into [`HttpState`] and
//! served by actix-web. [`build_app`] is the per-worker application factory.

mod config;

use std::sync::Arc;

use actix_web::cookie::Key;
use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{web, App, HttpServer};
#[cfg(debug_assertions)]
use utoipa::OpenApi as _;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

pub use config::{ConfigError, ServerConfig, TriageConfig};

use crate::domain::{GrievanceLifecycleService, PasswordAccountService};
use crate::inbound::http::session_config::session_middleware;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::{api_scope, health};
use crate::middleware::trace::Trace;
use crate::outbound::email::SmtpMailer;
use crate::outbound::persistence::{
    DbPool, DieselGrievanceRepository, DieselUserRepository, PoolConfig,
};
use crate::outbound::security::Argon2Hasher;
use crate::outbound::storage::HttpEvidenceStore;
use crate::outbound::triage::GenerativeTriage;

/// Build one worker's application: tracing, session handling, the `/api`
/// surface, and the health probes. Swagger UI is mounted in debug builds.
pub fn build_app(
    state: HttpState,
    health_state: web::Data<health::HealthState>,
    session_key: Key,
    cookie_secure: bool,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let app = App::new()
        .wrap(Trace)
        .app_data(web::Data::new(state))
        .app_data(health_state)
        .wrap(session_middleware(session_key, cookie_secure))
        .service(api_scope())
        .service(health::ready)
        .service(health::live);

    #[cfg(debug_assertions)]
    let app = app.service(
        SwaggerUi::new("/docs").url("/api-docs/openapi.json", crate::doc::ApiDoc::openapi()),
    );

    app
}

/// Wire the production adapters into the domain services.
async fn build_state(config: &ServerConfig) -> std::io::Result<HttpState> {
    let pool = DbPool::new(PoolConfig::new(config.database_url.as_str()))
        .await
        .map_err(std::io::Error::other)?;
    let users = Arc::new(DieselUserRepository::new(pool.clone()));
    let grievances = Arc::new(DieselGrievanceRepository::new(pool));

    let accounts = Arc::new(PasswordAccountService::new(
        users.clone(),
        Arc::new(Argon2Hasher),
    ));

    let evidence = Arc::new(
        HttpEvidenceStore::new(config.evidence_store_url.clone())
            .map_err(std::io::Error::other)?,
    );
    let mut lifecycle = GrievanceLifecycleService::new(grievances, users, evidence);
    if let Some(triage) = &config.triage {
        let triage = GenerativeTriage::new(triage.endpoint.clone(), triage.api_key.clone())
            .map_err(std::io::Error::other)?;
        lifecycle = lifecycle.with_triage(Arc::new(triage));
    }
    if let Some(smtp) = &config.smtp {
        let mailer = SmtpMailer::new(smtp.clone()).map_err(std::io::Error::other)?;
        lifecycle = lifecycle.with_mailer(Arc::new(mailer));
    }
    if let Some(client_url) = &config.client_url {
        lifecycle = lifecycle.with_client_url(client_url.clone());
    }
    let lifecycle = Arc::new(lifecycle);

    Ok(HttpState::new(accounts, lifecycle.clone(), lifecycle))
}

/// Build and bind the HTTP server.
///
/// The caller keeps a handle on `health_state` and flips it to ready once
/// `run()` has been started.
///
/// # Errors
///
/// Propagates [`std::io::Error`] when the database pool or an outbound
/// adapter cannot be constructed, or when binding the socket fails.
pub async fn create_server(
    health_state: web::Data<health::HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let state = build_state(&config).await?;

    let session_key = config.session_key.clone();
    let cookie_secure = config.cookie_secure;
    let server = HttpServer::new(move || {
        build_app(
            state.clone(),
            health_state.clone(),
            session_key.clone(),
            cookie_secure,
        )
    })
    .bind(config.bind_addr)?
    .run();

    Ok(server)
}
