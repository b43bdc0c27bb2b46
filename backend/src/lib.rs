//! Resolve backend: campus grievance reporting service.
//!
//! Students submit grievances with optional image evidence, an AI service
//! triages priority and produces a short summary, and officers/admins manage
//! ticket status. The crate follows a hexagonal layout: `domain` holds
//! entities, services, and port traits; `inbound` maps HTTP onto the domain;
//! `outbound` implements the driven ports (PostgreSQL, object storage, AI
//! triage, SMTP).

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod server;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use middleware::trace::Trace;
