//! Hexagonal ports.
//!
//! Driven ports (`user_repository`, `grievance_repository`, `evidence_store`,
//! `triage`, `mailer`, `password_hasher`) are implemented by outbound
//! adapters. Driving ports (`account`, `grievance_command`,
//! `grievance_query`) are implemented by domain services and consumed by the
//! HTTP layer.

pub mod account;
pub mod evidence_store;
pub mod grievance_command;
pub mod grievance_query;
pub mod grievance_repository;
pub mod mailer;
pub mod password_hasher;
pub mod triage;
pub mod user_repository;

pub use account::AccountService;
pub use evidence_store::{EvidenceStore, EvidenceStoreError, EvidenceUpload};
pub use grievance_command::{GrievanceCommand, SubmitGrievance};
pub use grievance_query::GrievanceQuery;
pub use grievance_repository::{GrievancePersistenceError, GrievanceRepository};
pub use mailer::{MailError, Mailer, OutgoingEmail};
pub use password_hasher::{HasherError, PasswordHasher};
pub use triage::{TriageAssist, TriageError, TriageOutcome};
pub use user_repository::{UserPersistenceError, UserRepository};
