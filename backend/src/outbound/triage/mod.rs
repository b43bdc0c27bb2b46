//! AI triage adapters.

mod generative_triage;

pub use generative_triage::GenerativeTriage;
