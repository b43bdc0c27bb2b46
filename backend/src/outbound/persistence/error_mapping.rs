//! Shared mapping from pool and Diesel failures to port error types.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use crate::domain::ports::grievance_repository::GrievancePersistenceError;
use crate::domain::ports::user_repository::UserPersistenceError;

use super::pool::PoolError;

fn log_diesel_error(error: &DieselError) {
    match error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(error),
            "diesel operation failed"
        ),
    }
}

pub(super) fn map_user_pool_error(error: PoolError) -> UserPersistenceError {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            UserPersistenceError::connection(message)
        }
    }
}

/// Map a Diesel failure during a user operation. Unique violations can only
/// come from the `email` constraint; `id` is a freshly generated UUID.
pub(super) fn map_user_diesel_error(error: DieselError) -> UserPersistenceError {
    log_diesel_error(&error);
    match error {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
            UserPersistenceError::DuplicateEmail
        }
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            UserPersistenceError::connection("database connection error")
        }
        DieselError::NotFound => UserPersistenceError::query("record not found"),
        _ => UserPersistenceError::query("database error"),
    }
}

pub(super) fn map_grievance_pool_error(error: PoolError) -> GrievancePersistenceError {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            GrievancePersistenceError::connection(message)
        }
    }
}

pub(super) fn map_grievance_diesel_error(error: DieselError) -> GrievancePersistenceError {
    log_diesel_error(&error);
    match error {
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            GrievancePersistenceError::connection("database connection error")
        }
        DieselError::NotFound => GrievancePersistenceError::query("record not found"),
        _ => GrievancePersistenceError::query("database error"),
    }
}
