//! In-memory port fakes and HTTP test helpers.
//!
//! Shared by unit tests and the end-to-end tests under `tests/`. The fakes
//! honour the port contracts (duplicate-email detection, newest-first
//! listings, atomic toggle semantics) so service tests exercise real rules.

use std::collections::HashMap;
use std::sync::Arc;

use actix_session::storage::CookieSessionStore;
use actix_session::SessionMiddleware;
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::http::header;
use actix_web::{test, web, App};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::grievance::{Comment, Evidence, Grievance, GrievanceId, StatusUpdate};
use crate::domain::ports::evidence_store::{EvidenceStore, EvidenceStoreError, EvidenceUpload};
use crate::domain::ports::grievance_repository::{GrievancePersistenceError, GrievanceRepository};
use crate::domain::ports::mailer::{MailError, Mailer, OutgoingEmail};
use crate::domain::ports::password_hasher::{HasherError, PasswordHasher};
use crate::domain::ports::triage::{TriageAssist, TriageError, TriageOutcome};
use crate::domain::ports::user_repository::{UserPersistenceError, UserRepository};
use crate::domain::auth::RawPassword;
use crate::domain::user::{EmailAddress, User, UserId};
use crate::domain::{GrievanceLifecycleService, PasswordAccountService};
use crate::inbound::http::state::HttpState;

/// User repository fake backed by a map.
#[derive(Default)]
pub struct InMemoryUserRepository {
    users: RwLock<HashMap<UserId, User>>,
}

impl InMemoryUserRepository {
    /// Insert a user directly, bypassing registration.
    pub async fn seed(&self, user: User) {
        self.users.write().await.insert(*user.id(), user);
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn insert(&self, user: &User) -> Result<(), UserPersistenceError> {
        let mut users = self.users.write().await;
        if users.values().any(|existing| existing.email() == user.email()) {
            return Err(UserPersistenceError::DuplicateEmail);
        }
        users.insert(*user.id(), user.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        Ok(self.users.read().await.get(id).cloned())
    }

    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<User>, UserPersistenceError> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|user| user.email() == email)
            .cloned())
    }

    async fn find_by_ids(&self, ids: &[UserId]) -> Result<Vec<User>, UserPersistenceError> {
        let users = self.users.read().await;
        Ok(ids.iter().filter_map(|id| users.get(id).cloned()).collect())
    }

    async fn update(&self, user: &User) -> Result<(), UserPersistenceError> {
        self.users.write().await.insert(*user.id(), user.clone());
        Ok(())
    }
}

/// Grievance repository fake keeping insertion order for newest-first reads.
#[derive(Default)]
pub struct InMemoryGrievanceRepository {
    grievances: RwLock<Vec<Grievance>>,
}

#[async_trait]
impl GrievanceRepository for InMemoryGrievanceRepository {
    async fn insert(&self, grievance: &Grievance) -> Result<(), GrievancePersistenceError> {
        self.grievances.write().await.push(grievance.clone());
        Ok(())
    }

    async fn find_by_id(
        &self,
        id: &GrievanceId,
    ) -> Result<Option<Grievance>, GrievancePersistenceError> {
        Ok(self
            .grievances
            .read()
            .await
            .iter()
            .find(|g| g.id() == id)
            .cloned())
    }

    async fn list_for_student(
        &self,
        student: &UserId,
    ) -> Result<Vec<Grievance>, GrievancePersistenceError> {
        Ok(self
            .grievances
            .read()
            .await
            .iter()
            .rev()
            .filter(|g| g.is_owned_by(student))
            .cloned()
            .collect())
    }

    async fn list_all(&self) -> Result<Vec<Grievance>, GrievancePersistenceError> {
        Ok(self.grievances.read().await.iter().rev().cloned().collect())
    }

    async fn append_comment(
        &self,
        id: &GrievanceId,
        author: &UserId,
        body: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Vec<Comment>>, GrievancePersistenceError> {
        let mut grievances = self.grievances.write().await;
        let Some(grievance) = grievances.iter_mut().find(|g| g.id() == id) else {
            return Ok(None);
        };
        grievance.add_comment(*author, body.to_owned(), now);
        Ok(Some(grievance.comments().to_vec()))
    }

    async fn toggle_upvote(
        &self,
        id: &GrievanceId,
        voter: &UserId,
        now: DateTime<Utc>,
    ) -> Result<Option<Vec<UserId>>, GrievancePersistenceError> {
        let mut grievances = self.grievances.write().await;
        let Some(grievance) = grievances.iter_mut().find(|g| g.id() == id) else {
            return Ok(None);
        };
        grievance.toggle_upvote(*voter, now);
        Ok(Some(grievance.upvotes().to_vec()))
    }

    async fn apply_update(
        &self,
        id: &GrievanceId,
        update: &StatusUpdate,
        now: DateTime<Utc>,
    ) -> Result<Option<Grievance>, GrievancePersistenceError> {
        let mut grievances = self.grievances.write().await;
        let Some(grievance) = grievances.iter_mut().find(|g| g.id() == id) else {
            return Ok(None);
        };
        grievance.apply_update(update.clone(), now);
        Ok(Some(grievance.clone()))
    }
}

/// Evidence store fake answering with a deterministic asset shape.
#[derive(Default)]
pub struct FixtureEvidenceStore;

#[async_trait]
impl EvidenceStore for FixtureEvidenceStore {
    async fn upload(&self, _upload: EvidenceUpload) -> Result<Evidence, EvidenceStoreError> {
        let asset = Uuid::new_v4();
        Ok(Evidence {
            asset_id: format!("campus-connect/{asset}"),
            url: format!("https://evidence.example/campus-connect/{asset}"),
        })
    }
}

/// Evidence store fake that always fails, for hard-error paths.
pub struct FailingEvidenceStore;

#[async_trait]
impl EvidenceStore for FailingEvidenceStore {
    async fn upload(&self, _upload: EvidenceUpload) -> Result<Evidence, EvidenceStoreError> {
        Err(EvidenceStoreError::transport("store offline"))
    }
}

/// Triage fake returning a fixed outcome and recording its last input.
#[derive(Default)]
pub struct StaticTriage {
    outcome: TriageOutcome,
    last: std::sync::Mutex<Option<(String, String)>>,
}

impl StaticTriage {
    /// Always answer with `outcome`.
    pub fn returning(outcome: TriageOutcome) -> Self {
        Self {
            outcome,
            last: std::sync::Mutex::new(None),
        }
    }

    /// The `(title, description)` of the most recent call.
    pub fn last_input(&self) -> Option<(String, String)> {
        self.last.lock().expect("triage lock poisoned").clone()
    }
}

#[async_trait]
impl TriageAssist for StaticTriage {
    async fn assess(&self, title: &str, description: &str) -> Result<TriageOutcome, TriageError> {
        *self.last.lock().expect("triage lock poisoned") =
            Some((title.to_owned(), description.to_owned()));
        Ok(self.outcome.clone())
    }
}

/// Triage fake that always fails.
pub struct FailingTriage;

#[async_trait]
impl TriageAssist for FailingTriage {
    async fn assess(&self, _title: &str, _description: &str) -> Result<TriageOutcome, TriageError> {
        Err(TriageError::transport("triage offline"))
    }
}

/// Mailer fake recording every delivery.
#[derive(Default)]
pub struct RecordingMailer {
    sent: tokio::sync::Mutex<Vec<OutgoingEmail>>,
}

impl RecordingMailer {
    /// All deliveries so far.
    pub async fn sent(&self) -> Vec<OutgoingEmail> {
        self.sent.lock().await.clone()
    }

    /// Forget recorded deliveries.
    pub async fn clear(&self) {
        self.sent.lock().await.clear();
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, email: OutgoingEmail) -> Result<(), MailError> {
        self.sent.lock().await.push(email);
        Ok(())
    }
}

/// Mailer fake that always fails.
pub struct FailingMailer;

#[async_trait]
impl Mailer for FailingMailer {
    async fn send(&self, _email: OutgoingEmail) -> Result<(), MailError> {
        Err(MailError::new("relay offline"))
    }
}

/// Reversible "hash" for fast deterministic credential tests.
pub struct PlainTextHasher;

#[async_trait]
impl PasswordHasher for PlainTextHasher {
    async fn hash(&self, password: &RawPassword) -> Result<String, HasherError> {
        Ok(format!("plain${}", password.reveal()))
    }

    async fn verify(&self, password: &RawPassword, encoded: &str) -> Result<bool, HasherError> {
        Ok(encoded == format!("plain${}", password.reveal()))
    }
}

/// Build a session middleware configured for tests.
///
/// Generates a fresh key per invocation, names the cookie `session`, and
/// disables the `Secure` flag for plain-HTTP test calls.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// Fully wired in-memory backend for HTTP tests.
pub struct TestHarness {
    pub state: HttpState,
    pub users: Arc<InMemoryUserRepository>,
    pub mailer: Arc<RecordingMailer>,
}

/// Assemble the real services over in-memory fakes.
pub fn test_harness() -> TestHarness {
    let users = Arc::new(InMemoryUserRepository::default());
    let mailer = Arc::new(RecordingMailer::default());
    let accounts = Arc::new(PasswordAccountService::new(
        users.clone(),
        Arc::new(PlainTextHasher),
    ));
    let lifecycle = Arc::new(
        GrievanceLifecycleService::new(
            Arc::new(InMemoryGrievanceRepository::default()),
            users.clone(),
            Arc::new(FixtureEvidenceStore),
        )
        .with_mailer(mailer.clone())
        .with_client_url("https://campus.example"),
    );
    TestHarness {
        state: HttpState::new(accounts, lifecycle.clone(), lifecycle),
        users,
        mailer,
    }
}

/// Build the application under test with the full `/api` surface.
pub fn test_app(
    harness: TestHarness,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .wrap(crate::middleware::trace::Trace)
        .app_data(web::Data::new(harness.state))
        .wrap(test_session_middleware())
        .service(crate::inbound::http::api_scope())
}

fn with_cookie(req: test::TestRequest, cookie: Option<Cookie<'static>>) -> test::TestRequest {
    match cookie {
        Some(cookie) => req.cookie(cookie),
        None => req,
    }
}

/// JSON `POST` request.
pub fn post_json_req(
    path: &str,
    body: &Value,
    cookie: Option<Cookie<'static>>,
) -> actix_http::Request {
    with_cookie(test::TestRequest::post().uri(path).set_json(body), cookie).to_request()
}

/// JSON `PUT` request.
pub fn put_json_req(
    path: &str,
    body: &Value,
    cookie: Option<Cookie<'static>>,
) -> actix_http::Request {
    with_cookie(test::TestRequest::put().uri(path).set_json(body), cookie).to_request()
}

/// Plain `GET` request.
pub fn get_req(path: &str, cookie: Option<Cookie<'static>>) -> actix_http::Request {
    with_cookie(test::TestRequest::get().uri(path), cookie).to_request()
}

/// Multipart submission request for `POST /api/grievances`.
pub fn multipart_submit_req(
    title: &str,
    category: &str,
    description: &str,
    is_anonymous: bool,
    cookie: Option<Cookie<'static>>,
) -> actix_http::Request {
    const BOUNDARY: &str = "----resolve-test-boundary";
    let mut body = String::new();
    for (name, value) in [
        ("title", title),
        ("description", description),
        ("category", category),
        ("isAnonymous", if is_anonymous { "true" } else { "false" }),
    ] {
        body.push_str(&format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
        ));
    }
    body.push_str(&format!("--{BOUNDARY}--\r\n"));
    with_cookie(
        test::TestRequest::post()
            .uri("/api/grievances")
            .insert_header((
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            ))
            .set_payload(body),
        cookie,
    )
    .to_request()
}

/// Extract the `session` cookie from a response.
pub fn session_cookie<B>(res: &ServiceResponse<B>) -> Cookie<'static> {
    res.response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .expect("session cookie set")
        .into_owned()
}

/// Register an account with password `secret1` and return its session cookie.
pub async fn register_and_login<S, B>(app: &S, name: &str, email: &str, role: &str) -> Cookie<'static>
where
    S: actix_web::dev::Service<
        actix_http::Request,
        Response = ServiceResponse<B>,
        Error = actix_web::Error,
    >,
{
    let res = test::call_service(
        app,
        post_json_req(
            "/api/auth/register",
            &json!({ "name": name, "email": email, "password": "secret1", "role": role }),
            None,
        ),
    )
    .await;
    assert!(
        res.status().is_success(),
        "registration failed: {}",
        res.status()
    );
    session_cookie(&res)
}
