//! Shared HTTP adapter state.
//!
//! Handlers accept this state via `actix_web::web::Data` so they depend only
//! on the domain ports and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{AccountService, GrievanceCommand, GrievanceQuery};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub accounts: Arc<dyn AccountService>,
    pub commands: Arc<dyn GrievanceCommand>,
    pub queries: Arc<dyn GrievanceQuery>,
}

impl HttpState {
    /// Bundle the port implementations.
    pub fn new(
        accounts: Arc<dyn AccountService>,
        commands: Arc<dyn GrievanceCommand>,
        queries: Arc<dyn GrievanceQuery>,
    ) -> Self {
        Self {
            accounts,
            commands,
            queries,
        }
    }
}
