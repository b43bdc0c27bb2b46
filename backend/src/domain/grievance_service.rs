//! Grievance lifecycle service.
//!
//! Implements both the command and query driving ports on top of the
//! persistence, evidence store, triage, and mailer ports. Triage and email
//! are best effort: a triage failure falls back to the default outcome and a
//! delivery failure is logged, never surfaced.

use std::collections::HashSet;
use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use chrono::Utc;
use regex::Regex;
use tracing::warn;

use crate::domain::authorization::{authorize, authorize_view, GrievanceAction};
use crate::domain::error::Error;
use crate::domain::grievance::{Grievance, GrievanceId, NewGrievance, StatusUpdate};
use crate::domain::ports::evidence_store::EvidenceStore;
use crate::domain::ports::grievance_command::{GrievanceCommand, SubmitGrievance};
use crate::domain::ports::grievance_query::GrievanceQuery;
use crate::domain::ports::grievance_repository::GrievanceRepository;
use crate::domain::ports::mailer::{Mailer, OutgoingEmail};
use crate::domain::ports::triage::{TriageAssist, TriageOutcome};
use crate::domain::ports::user_repository::UserRepository;
use crate::domain::user::{User, UserId};
use crate::domain::views::{CommentView, GrievanceView, IdentityIndex, StudentRef};

static MARKUP_RE: OnceLock<Regex> = OnceLock::new();

/// Strip HTML-style tags so triage sees plain text.
fn strip_markup(text: &str) -> String {
    let re = MARKUP_RE.get_or_init(|| {
        Regex::new(r"<[^>]+>")
            .unwrap_or_else(|error| panic!("markup regex failed to compile: {error}"))
    });
    re.replace_all(text, "").into_owned()
}

/// [`GrievanceCommand`] and [`GrievanceQuery`] backed by the driven ports.
///
/// Triage and mailer are optional collaborators: without triage every
/// submission gets the default outcome, without a mailer notifications are
/// skipped.
pub struct GrievanceLifecycleService {
    grievances: Arc<dyn GrievanceRepository>,
    users: Arc<dyn UserRepository>,
    evidence: Arc<dyn EvidenceStore>,
    triage: Option<Arc<dyn TriageAssist>>,
    mailer: Option<Arc<dyn Mailer>>,
    client_url: Option<String>,
}

impl GrievanceLifecycleService {
    /// Wire the service to its mandatory collaborators.
    pub fn new(
        grievances: Arc<dyn GrievanceRepository>,
        users: Arc<dyn UserRepository>,
        evidence: Arc<dyn EvidenceStore>,
    ) -> Self {
        Self {
            grievances,
            users,
            evidence,
            triage: None,
            mailer: None,
            client_url: None,
        }
    }

    /// Attach the triage collaborator.
    pub fn with_triage(mut self, triage: Arc<dyn TriageAssist>) -> Self {
        self.triage = Some(triage);
        self
    }

    /// Attach the notification mailer.
    pub fn with_mailer(mut self, mailer: Arc<dyn Mailer>) -> Self {
        self.mailer = Some(mailer);
        self
    }

    /// Base URL of the web client, used in notification links.
    pub fn with_client_url(mut self, client_url: impl Into<String>) -> Self {
        self.client_url = Some(client_url.into());
        self
    }

    /// Run triage, substituting the default outcome on any failure.
    async fn assess(&self, title: &str, description: &str) -> TriageOutcome {
        let Some(triage) = &self.triage else {
            return TriageOutcome::default();
        };
        let plain = strip_markup(description);
        match triage.assess(title, &plain).await {
            Ok(outcome) => outcome,
            Err(err) => {
                warn!(%err, "triage failed, falling back to default outcome");
                TriageOutcome::default()
            }
        }
    }

    /// Deliver an email off the request path. Failures are logged only.
    fn notify(&self, email: OutgoingEmail) {
        let Some(mailer) = self.mailer.clone() else {
            return;
        };
        tokio::spawn(async move {
            if let Err(err) = mailer.send(email).await {
                warn!(%err, "notification email failed");
            }
        });
    }

    fn grievance_link(&self, id: &GrievanceId) -> String {
        match &self.client_url {
            Some(base) => format!("{}/grievances/{id}", base.trim_end_matches('/')),
            None => format!("/grievances/{id}"),
        }
    }

    /// Resolve every identity referenced by `grievances` in one repository
    /// round trip.
    async fn resolve_identities(
        &self,
        grievances: &[Grievance],
    ) -> Result<IdentityIndex, Error> {
        let mut ids: HashSet<UserId> = HashSet::new();
        for grievance in grievances {
            ids.insert(*grievance.student());
            for comment in grievance.comments() {
                ids.insert(comment.author);
            }
        }
        let ids: Vec<UserId> = ids.into_iter().collect();
        let users = self
            .users
            .find_by_ids(&ids)
            .await
            .map_err(|err| Error::internal(err.to_string()))?;
        Ok(users
            .iter()
            .map(|user| (*user.id(), StudentRef::from(user)))
            .collect())
    }

    async fn load(&self, id: &GrievanceId) -> Result<Grievance, Error> {
        self.grievances
            .find_by_id(id)
            .await
            .map_err(|err| Error::internal(err.to_string()))?
            .ok_or_else(|| Error::not_found("Grievance not found"))
    }
}

#[async_trait]
impl GrievanceCommand for GrievanceLifecycleService {
    async fn submit(
        &self,
        reporter: &User,
        submission: SubmitGrievance,
    ) -> Result<GrievanceView, Error> {
        authorize(reporter.role(), GrievanceAction::Submit)?;
        let title = submission.title.trim().to_owned();
        if title.is_empty() {
            return Err(Error::invalid_request("Title is required"));
        }
        if submission.description.trim().is_empty() {
            return Err(Error::invalid_request("Description is required"));
        }

        // Upload failure is a hard error; triage failure is not.
        let evidence = match submission.evidence {
            Some(upload) => Some(
                self.evidence
                    .upload(upload)
                    .await
                    .map_err(|err| Error::internal(err.to_string()))?,
            ),
            None => None,
        };
        let outcome = self.assess(&title, &submission.description).await;

        let grievance = Grievance::open(
            GrievanceId::random(),
            Utc::now(),
            NewGrievance {
                student: *reporter.id(),
                title,
                description: submission.description,
                category: submission.category,
                is_anonymous: submission.is_anonymous,
                priority: outcome.priority,
                ai_summary: (!outcome.summary.is_empty()).then_some(outcome.summary),
                evidence,
            },
        );
        self.grievances
            .insert(&grievance)
            .await
            .map_err(|err| Error::internal(err.to_string()))?;

        self.notify(OutgoingEmail {
            to: reporter.email().as_ref().to_owned(),
            subject: "Grievance Submitted Successfully.".to_owned(),
            body: format!(
                "Hi {},\n\nWe have received your grievance \"{}\".\nPriority: {}\nAn officer will review it shortly.\nTrack its progress at {}.\n",
                reporter.name(),
                grievance.title(),
                grievance.priority(),
                self.grievance_link(grievance.id()),
            ),
        });

        let identities = self.resolve_identities(std::slice::from_ref(&grievance)).await?;
        Ok(GrievanceView::project(&grievance, &identities, reporter.role()))
    }

    async fn add_comment(
        &self,
        id: &GrievanceId,
        author: &User,
        text: String,
    ) -> Result<Vec<CommentView>, Error> {
        authorize(author.role(), GrievanceAction::Comment)?;
        let text = text.trim().to_owned();
        if text.is_empty() {
            return Err(Error::invalid_request("Comment text is required"));
        }
        let comments = self
            .grievances
            .append_comment(id, author.id(), &text, Utc::now())
            .await
            .map_err(|err| Error::internal(err.to_string()))?
            .ok_or_else(|| Error::not_found("Grievance not found"))?;

        let author_ids: Vec<UserId> = {
            let mut seen = HashSet::new();
            comments
                .iter()
                .map(|c| c.author)
                .filter(|id| seen.insert(*id))
                .collect()
        };
        let authors = self
            .users
            .find_by_ids(&author_ids)
            .await
            .map_err(|err| Error::internal(err.to_string()))?;
        let identities: IdentityIndex = authors
            .iter()
            .map(|user| (*user.id(), StudentRef::from(user)))
            .collect();
        Ok(comments
            .into_iter()
            .map(|comment| CommentView {
                id: comment.id,
                user: crate::domain::views::CommentAuthor {
                    id: comment.author,
                    name: identities.get(&comment.author).map(|s| s.name.clone()),
                },
                text: comment.body,
                created_at: comment.created_at,
            })
            .collect())
    }

    async fn update_status(
        &self,
        id: &GrievanceId,
        staff: &User,
        update: StatusUpdate,
    ) -> Result<GrievanceView, Error> {
        authorize(staff.role(), GrievanceAction::UpdateStatus)?;
        let update = update.normalised();
        if update.is_empty() {
            // Nothing survives normalisation, e.g. only blank notes were
            // sent. The stored record is returned untouched and nobody is
            // notified.
            let grievance = self.load(id).await?;
            let identities = self
                .resolve_identities(std::slice::from_ref(&grievance))
                .await?;
            return Ok(GrievanceView::project(&grievance, &identities, staff.role()));
        }

        let grievance = self
            .grievances
            .apply_update(id, &update, Utc::now())
            .await
            .map_err(|err| Error::internal(err.to_string()))?
            .ok_or_else(|| Error::not_found("Grievance not found"))?;

        // The owner hears about every effective edit, including notes-only
        // reviews where the status line stays generic.
        let owner = self
            .users
            .find_by_id(grievance.student())
            .await
            .map_err(|err| Error::internal(err.to_string()))?;
        if let Some(owner) = owner {
            let change_line = match update.status {
                Some(status) => format!(
                    "The status of your grievance \"{}\" is now {status}.",
                    grievance.title(),
                ),
                None => format!(
                    "The internal review of your grievance \"{}\" was updated.",
                    grievance.title(),
                ),
            };
            self.notify(OutgoingEmail {
                to: owner.email().as_ref().to_owned(),
                subject: format!("Status Updated: {}", grievance.title()),
                body: format!(
                    "Hi {},\n\n{change_line}\nSee the details at {}.\n",
                    owner.name(),
                    self.grievance_link(grievance.id()),
                ),
            });
        }

        let identities = self.resolve_identities(std::slice::from_ref(&grievance)).await?;
        Ok(GrievanceView::project(&grievance, &identities, staff.role()))
    }

    async fn toggle_upvote(
        &self,
        id: &GrievanceId,
        voter: &User,
    ) -> Result<Vec<UserId>, Error> {
        authorize(voter.role(), GrievanceAction::Upvote)?;
        self.grievances
            .toggle_upvote(id, voter.id(), Utc::now())
            .await
            .map_err(|err| Error::internal(err.to_string()))?
            .ok_or_else(|| Error::not_found("Grievance not found"))
    }
}

#[async_trait]
impl GrievanceQuery for GrievanceLifecycleService {
    async fn list_mine(&self, caller: &User) -> Result<Vec<GrievanceView>, Error> {
        let grievances = self
            .grievances
            .list_for_student(caller.id())
            .await
            .map_err(|err| Error::internal(err.to_string()))?;
        let identities = self.resolve_identities(&grievances).await?;
        Ok(grievances
            .iter()
            .map(|g| GrievanceView::project(g, &identities, caller.role()))
            .collect())
    }

    async fn list_all(&self, caller: &User) -> Result<Vec<GrievanceView>, Error> {
        authorize(caller.role(), GrievanceAction::ListAll)?;
        let grievances = self
            .grievances
            .list_all()
            .await
            .map_err(|err| Error::internal(err.to_string()))?;
        let identities = self.resolve_identities(&grievances).await?;
        Ok(grievances
            .iter()
            .map(|g| GrievanceView::project(g, &identities, caller.role()))
            .collect())
    }

    async fn get_one(&self, id: &GrievanceId, caller: &User) -> Result<GrievanceView, Error> {
        let grievance = self.load(id).await?;
        authorize_view(caller.role(), caller.id(), &grievance)?;
        let identities = self.resolve_identities(std::slice::from_ref(&grievance)).await?;
        Ok(GrievanceView::project(&grievance, &identities, caller.role()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::ErrorCode;
    use crate::domain::grievance::{Category, Priority, Status};
    use crate::domain::ports::evidence_store::EvidenceUpload;
    use crate::domain::user::{EmailAddress, Role, UserName};
    use crate::test_support::{
        FailingEvidenceStore, FailingMailer, FailingTriage, FixtureEvidenceStore,
        InMemoryGrievanceRepository, InMemoryUserRepository, RecordingMailer, StaticTriage,
    };

    fn user(name: &str, email: &str, role: Role) -> User {
        User::new(
            UserId::random(),
            UserName::new(name).expect("valid name"),
            EmailAddress::new(email).expect("valid email"),
            "plain$secret1".to_owned(),
            role,
            None,
        )
    }

    struct Fixture {
        service: GrievanceLifecycleService,
        users: Arc<InMemoryUserRepository>,
        mailer: Arc<RecordingMailer>,
    }

    fn fixture(triage: Option<Arc<dyn TriageAssist>>) -> Fixture {
        let users = Arc::new(InMemoryUserRepository::default());
        let mailer = Arc::new(RecordingMailer::default());
        let mut service = GrievanceLifecycleService::new(
            Arc::new(InMemoryGrievanceRepository::default()),
            users.clone(),
            Arc::new(FixtureEvidenceStore::default()),
        )
        .with_mailer(mailer.clone())
        .with_client_url("https://campus.example");
        if let Some(triage) = triage {
            service = service.with_triage(triage);
        }
        Fixture {
            service,
            users,
            mailer,
        }
    }

    /// Give spawned notification tasks a chance to run.
    async fn drain_tasks() {
        for _ in 0..8 {
            tokio::task::yield_now().await;
        }
    }

    fn submission() -> SubmitGrievance {
        SubmitGrievance {
            title: "WiFi down".to_owned(),
            description: "<p>No connectivity in dorm B.</p>".to_owned(),
            category: Category::Infrastructure,
            is_anonymous: false,
            evidence: None,
        }
    }

    #[tokio::test]
    async fn submit_creates_a_pending_grievance() {
        let fx = fixture(Some(Arc::new(StaticTriage::returning(TriageOutcome {
            priority: Priority::High,
            summary: "Dorm B has no WiFi".to_owned(),
        }))));
        let student = user("Lenni", "a@u.edu", Role::Student);
        fx.users.seed(student.clone()).await;

        let view = fx
            .service
            .submit(&student, submission())
            .await
            .expect("submit");
        assert_eq!(view.status, Status::Pending);
        assert_eq!(view.priority, Priority::High);
        assert_eq!(view.ai_summary.as_deref(), Some("Dorm B has no WiFi"));
        assert_eq!(
            view.student.as_ref().map(|s| s.email.as_str()),
            Some("a@u.edu")
        );
    }

    #[tokio::test]
    async fn triage_failure_falls_back_to_medium_and_no_summary() {
        let fx = fixture(Some(Arc::new(FailingTriage)));
        let student = user("Lenni", "a@u.edu", Role::Student);
        fx.users.seed(student.clone()).await;

        let view = fx
            .service
            .submit(&student, submission())
            .await
            .expect("submit succeeds despite triage failure");
        assert_eq!(view.priority, Priority::Medium);
        assert!(view.ai_summary.is_none());
    }

    #[tokio::test]
    async fn triage_sees_plain_text() {
        let triage = Arc::new(StaticTriage::default());
        let fx = fixture(Some(triage.clone()));
        let student = user("Lenni", "a@u.edu", Role::Student);
        fx.users.seed(student.clone()).await;

        fx.service
            .submit(&student, submission())
            .await
            .expect("submit");
        let seen = triage.last_input().expect("triage was called");
        assert_eq!(seen.1, "No connectivity in dorm B.");
    }

    #[tokio::test]
    async fn submit_records_uploaded_evidence() {
        let fx = fixture(None);
        let student = user("Lenni", "a@u.edu", Role::Student);
        fx.users.seed(student.clone()).await;

        let mut s = submission();
        s.evidence = Some(EvidenceUpload {
            file_name: "router.jpg".to_owned(),
            content_type: "image/jpeg".to_owned(),
            bytes: vec![0xff, 0xd8],
        });
        let view = fx.service.submit(&student, s).await.expect("submit");
        let evidence = view.evidence.expect("evidence recorded");
        assert!(!evidence.asset_id.is_empty());
        assert!(evidence.url.starts_with("https://"));
    }

    #[tokio::test]
    async fn evidence_store_failure_fails_the_submission() {
        let users = Arc::new(InMemoryUserRepository::default());
        let service = GrievanceLifecycleService::new(
            Arc::new(InMemoryGrievanceRepository::default()),
            users.clone(),
            Arc::new(FailingEvidenceStore),
        );
        let student = user("Lenni", "a@u.edu", Role::Student);
        users.seed(student.clone()).await;

        let mut s = submission();
        s.evidence = Some(EvidenceUpload {
            file_name: "router.jpg".to_owned(),
            content_type: "image/jpeg".to_owned(),
            bytes: vec![0xff, 0xd8],
        });
        let err = service
            .submit(&student, s)
            .await
            .expect_err("upload failure is a hard error");
        assert_eq!(err.code, ErrorCode::InternalError);
    }

    #[tokio::test]
    async fn submit_sends_a_receipt_email() {
        let fx = fixture(None);
        let student = user("Lenni", "a@u.edu", Role::Student);
        fx.users.seed(student.clone()).await;

        fx.service
            .submit(&student, submission())
            .await
            .expect("submit");
        // Delivery happens on a spawned task.
        drain_tasks().await;
        let sent = fx.mailer.sent().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "a@u.edu");
        assert_eq!(sent[0].subject, "Grievance Submitted Successfully.");
        assert!(sent[0].body.contains("WiFi down"));
        assert!(sent[0].body.contains("Priority: Medium"));
    }

    #[tokio::test]
    async fn mail_failure_does_not_fail_submission() {
        let users = Arc::new(InMemoryUserRepository::default());
        let service = GrievanceLifecycleService::new(
            Arc::new(InMemoryGrievanceRepository::default()),
            users.clone(),
            Arc::new(FixtureEvidenceStore::default()),
        )
        .with_mailer(Arc::new(FailingMailer));
        let student = user("Lenni", "a@u.edu", Role::Student);
        users.seed(student.clone()).await;

        let view = service
            .submit(&student, submission())
            .await
            .expect("submit succeeds despite relay failure");
        drain_tasks().await;
        assert_eq!(view.status, Status::Pending);
    }

    #[tokio::test]
    async fn comments_come_back_resolved_and_ordered() {
        let fx = fixture(None);
        let student = user("Lenni", "a@u.edu", Role::Student);
        let officer = user("Ines", "o@u.edu", Role::Officer);
        fx.users.seed(student.clone()).await;
        fx.users.seed(officer.clone()).await;

        let view = fx
            .service
            .submit(&student, submission())
            .await
            .expect("submit");
        fx.service
            .add_comment(&view.id, &student, "still down".to_owned())
            .await
            .expect("first comment");
        let comments = fx
            .service
            .add_comment(&view.id, &officer, "on it".to_owned())
            .await
            .expect("second comment");
        assert_eq!(comments.len(), 2);
        assert_eq!(comments[0].text, "still down");
        assert_eq!(comments[0].user.name.as_deref(), Some("Lenni"));
        assert_eq!(comments[1].user.name.as_deref(), Some("Ines"));
    }

    #[tokio::test]
    async fn comment_on_missing_grievance_is_not_found() {
        let fx = fixture(None);
        let student = user("Lenni", "a@u.edu", Role::Student);
        fx.users.seed(student.clone()).await;
        let err = fx
            .service
            .add_comment(&GrievanceId::random(), &student, "hello".to_owned())
            .await
            .expect_err("must fail");
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn upvote_toggles_and_never_duplicates() {
        let fx = fixture(None);
        let student = user("Lenni", "a@u.edu", Role::Student);
        let peer = user("Mika", "m@u.edu", Role::Student);
        fx.users.seed(student.clone()).await;
        fx.users.seed(peer.clone()).await;

        let view = fx
            .service
            .submit(&student, submission())
            .await
            .expect("submit");
        let after_first = fx
            .service
            .toggle_upvote(&view.id, &peer)
            .await
            .expect("first toggle");
        assert_eq!(after_first, vec![*peer.id()]);
        let after_second = fx
            .service
            .toggle_upvote(&view.id, &peer)
            .await
            .expect("second toggle");
        assert!(after_second.is_empty());
    }

    #[tokio::test]
    async fn students_cannot_update_status() {
        let fx = fixture(None);
        let student = user("Lenni", "a@u.edu", Role::Student);
        fx.users.seed(student.clone()).await;
        let view = fx
            .service
            .submit(&student, submission())
            .await
            .expect("submit");
        let err = fx
            .service
            .update_status(
                &view.id,
                &student,
                StatusUpdate {
                    status: Some(Status::Resolved),
                    priority: None,
                    internal_notes: None,
                },
            )
            .await
            .expect_err("must fail");
        assert_eq!(err.code, ErrorCode::Forbidden);
    }

    #[tokio::test]
    async fn status_update_notifies_the_owner() {
        let fx = fixture(None);
        let student = user("Lenni", "a@u.edu", Role::Student);
        let officer = user("Ines", "o@u.edu", Role::Officer);
        fx.users.seed(student.clone()).await;
        fx.users.seed(officer.clone()).await;

        let view = fx
            .service
            .submit(&student, submission())
            .await
            .expect("submit");
        drain_tasks().await;
        fx.mailer.clear().await;

        let updated = fx
            .service
            .update_status(
                &view.id,
                &officer,
                StatusUpdate {
                    status: Some(Status::Resolved),
                    priority: None,
                    internal_notes: None,
                },
            )
            .await
            .expect("update");
        assert_eq!(updated.status, Status::Resolved);
        drain_tasks().await;
        let sent = fx.mailer.sent().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "a@u.edu");
        assert_eq!(sent[0].subject, "Status Updated: WiFi down");
        assert!(sent[0].body.contains("Resolved"));
    }

    #[tokio::test]
    async fn notes_only_update_still_notifies_the_owner() {
        let fx = fixture(None);
        let student = user("Lenni", "a@u.edu", Role::Student);
        let officer = user("Ines", "o@u.edu", Role::Officer);
        fx.users.seed(student.clone()).await;
        fx.users.seed(officer.clone()).await;

        let view = fx
            .service
            .submit(&student, submission())
            .await
            .expect("submit");
        drain_tasks().await;
        fx.mailer.clear().await;

        fx.service
            .update_status(
                &view.id,
                &officer,
                StatusUpdate {
                    status: None,
                    priority: None,
                    internal_notes: Some("escalated to facilities".to_owned()),
                },
            )
            .await
            .expect("notes update");
        drain_tasks().await;
        let sent = fx.mailer.sent().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "a@u.edu");
        assert_eq!(sent[0].subject, "Status Updated: WiFi down");
        assert!(sent[0].body.contains("internal review"));
        // The notes themselves never leave the staff surface.
        assert!(!sent[0].body.contains("escalated to facilities"));
    }

    #[tokio::test]
    async fn blank_notes_update_is_a_no_op() {
        let fx = fixture(None);
        let student = user("Lenni", "a@u.edu", Role::Student);
        let officer = user("Ines", "o@u.edu", Role::Officer);
        fx.users.seed(student.clone()).await;
        fx.users.seed(officer.clone()).await;

        let view = fx
            .service
            .submit(&student, submission())
            .await
            .expect("submit");
        fx.service
            .update_status(
                &view.id,
                &officer,
                StatusUpdate {
                    status: None,
                    priority: None,
                    internal_notes: Some("keep an eye on dorm B".to_owned()),
                },
            )
            .await
            .expect("set notes");
        drain_tasks().await;
        fx.mailer.clear().await;
        let after_blank = fx
            .service
            .update_status(
                &view.id,
                &officer,
                StatusUpdate {
                    status: None,
                    priority: None,
                    internal_notes: Some(String::new()),
                },
            )
            .await
            .expect("blank notes accepted");
        assert_eq!(
            after_blank.internal_notes.as_deref(),
            Some("keep an eye on dorm B")
        );
        // An update that changes nothing sends nothing.
        drain_tasks().await;
        assert!(fx.mailer.sent().await.is_empty());
    }

    #[tokio::test]
    async fn list_mine_redacts_internal_notes_for_students() {
        let fx = fixture(None);
        let student = user("Lenni", "a@u.edu", Role::Student);
        let officer = user("Ines", "o@u.edu", Role::Officer);
        fx.users.seed(student.clone()).await;
        fx.users.seed(officer.clone()).await;

        let view = fx
            .service
            .submit(&student, submission())
            .await
            .expect("submit");
        fx.service
            .update_status(
                &view.id,
                &officer,
                StatusUpdate {
                    status: None,
                    priority: None,
                    internal_notes: Some("sensitive".to_owned()),
                },
            )
            .await
            .expect("set notes");

        let mine = fx.service.list_mine(&student).await.expect("list mine");
        assert_eq!(mine.len(), 1);
        assert!(mine[0].internal_notes.is_none());

        let all = fx.service.list_all(&officer).await.expect("list all");
        assert_eq!(all[0].internal_notes.as_deref(), Some("sensitive"));
    }

    #[tokio::test]
    async fn get_one_enforces_ownership_for_students() {
        let fx = fixture(None);
        let student = user("Lenni", "a@u.edu", Role::Student);
        let stranger = user("Mika", "m@u.edu", Role::Student);
        fx.users.seed(student.clone()).await;
        fx.users.seed(stranger.clone()).await;

        let view = fx
            .service
            .submit(&student, submission())
            .await
            .expect("submit");
        let err = fx
            .service
            .get_one(&view.id, &stranger)
            .await
            .expect_err("must fail");
        assert_eq!(err.code, ErrorCode::Forbidden);
        fx.service
            .get_one(&view.id, &student)
            .await
            .expect("owner may read");
    }

    #[tokio::test]
    async fn lists_come_back_newest_first() {
        let fx = fixture(None);
        let student = user("Lenni", "a@u.edu", Role::Student);
        fx.users.seed(student.clone()).await;

        let mut first = submission();
        first.title = "first".to_owned();
        let mut second = submission();
        second.title = "second".to_owned();
        fx.service.submit(&student, first).await.expect("submit");
        fx.service.submit(&student, second).await.expect("submit");

        let mine = fx.service.list_mine(&student).await.expect("list mine");
        let titles: Vec<&str> = mine.iter().map(|g| g.title.as_str()).collect();
        assert_eq!(titles, vec!["second", "first"]);
    }

    #[test]
    fn strip_markup_removes_tags_only() {
        assert_eq!(
            strip_markup("<p>Hello <b>world</b></p>"),
            "Hello world"
        );
        assert_eq!(strip_markup("2 < 3 and plain"), "2 < 3 and plain");
    }
}
