//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! Each submodule is a thin translator between domain types and one piece of
//! infrastructure:
//!
//! - **persistence**: PostgreSQL-backed repositories using Diesel ORM
//! - **storage**: HTTP object store for evidence uploads
//! - **triage**: generative-model API for submission triage
//! - **email**: SMTP relay for best-effort notifications
//! - **security**: Argon2 password hashing
//!
//! Adapters contain no business logic; the rules live in `domain`.

pub mod email;
pub mod persistence;
pub mod security;
pub mod storage;
pub mod triage;
