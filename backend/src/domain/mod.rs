//! Domain layer: entities, services, and port traits.

pub mod account_service;
pub mod auth;
pub mod authorization;
pub mod error;
pub mod grievance;
pub mod grievance_service;
pub mod ports;
pub mod user;
pub mod views;

pub use account_service::PasswordAccountService;
pub use auth::{Credentials, ProfileUpdate, RawPassword, Registration, PASSWORD_MIN};
pub use error::{Error, ErrorCode};
pub use grievance::{
    Category, Comment, Evidence, Grievance, GrievanceId, NewGrievance, Priority, Status,
    StatusUpdate,
};
pub use grievance_service::GrievanceLifecycleService;
pub use user::{EmailAddress, Role, User, UserId, UserName, UserValidationError, NAME_MIN};
pub use views::{CommentAuthor, CommentView, GrievanceView, StudentRef, UserView};
