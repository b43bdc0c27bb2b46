//! Driving port for grievance reads.

use async_trait::async_trait;

use crate::domain::error::Error;
use crate::domain::grievance::GrievanceId;
use crate::domain::user::User;
use crate::domain::views::GrievanceView;

/// Domain use-case port for grievance reads. Responses come back already
/// field-filtered for the caller's role.
#[async_trait]
pub trait GrievanceQuery: Send + Sync {
    /// All grievances reported by the caller, newest first.
    async fn list_mine(&self, caller: &User) -> Result<Vec<GrievanceView>, Error>;

    /// All grievances in the system, newest first, with reporter identities
    /// resolved.
    async fn list_all(&self, caller: &User) -> Result<Vec<GrievanceView>, Error>;

    /// One grievance in full. Students may only fetch their own reports.
    async fn get_one(&self, id: &GrievanceId, caller: &User) -> Result<GrievanceView, Error>;
}
