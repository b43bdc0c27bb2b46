//! Object storage adapters for evidence uploads.

mod http_evidence_store;

pub use http_evidence_store::HttpEvidenceStore;
