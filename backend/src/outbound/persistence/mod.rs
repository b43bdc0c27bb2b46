//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Repositories here only translate between Diesel rows and domain types;
//! aggregate rules stay in the domain. Connections come from a `bb8` pool
//! with native async support through `diesel-async`. Row structs
//! (`models.rs`) and table definitions (`schema.rs`) are implementation
//! details and are never exposed to the domain layer.

mod error_mapping;
pub(crate) mod models;
pub mod pool;
pub mod schema;

mod diesel_grievance_repository;
mod diesel_user_repository;

pub use diesel_grievance_repository::DieselGrievanceRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use pool::{DbPool, PoolConfig, PoolError};
