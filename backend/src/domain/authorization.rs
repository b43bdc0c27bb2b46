//! Role-based access rules, expressed as pure functions.
//!
//! Handlers decide *who* is calling; these rules decide *whether* that caller
//! may act. Keeping them free of I/O makes the whole access matrix unit
//! testable. Most actions are open to any authenticated identity; visibility
//! narrowing for students happens per grievance and per field.

use crate::domain::error::Error;
use crate::domain::grievance::Grievance;
use crate::domain::user::{Role, UserId};

/// What a caller wants to do with a grievance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrievanceAction {
    /// Submit a new grievance.
    Submit,
    /// List every grievance in the system.
    ListAll,
    /// Read one grievance in full.
    ViewOne,
    /// Change status, priority, or internal notes.
    UpdateStatus,
    /// Add a discussion comment.
    Comment,
    /// Toggle an upvote.
    Upvote,
}

/// Check an action that does not depend on a particular grievance.
pub fn authorize(role: Role, action: GrievanceAction) -> Result<(), Error> {
    match action {
        GrievanceAction::UpdateStatus => {
            if role.is_staff() {
                Ok(())
            } else {
                Err(Error::forbidden("Access denied"))
            }
        }
        // Open to every authenticated identity. Reads are narrowed per
        // grievance below and internal notes are filtered per field.
        GrievanceAction::Submit
        | GrievanceAction::ListAll
        | GrievanceAction::ViewOne
        | GrievanceAction::Comment
        | GrievanceAction::Upvote => Ok(()),
    }
}

/// Check a read of a specific grievance: staff see everything, a student only
/// their own reports.
pub fn authorize_view(role: Role, caller: &UserId, grievance: &Grievance) -> Result<(), Error> {
    if role.is_staff() || grievance.is_owned_by(caller) {
        Ok(())
    } else {
        Err(Error::forbidden("Access denied"))
    }
}

/// True when `role` may read internal notes.
pub fn may_see_internal_notes(role: Role) -> bool {
    role.is_staff()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::grievance::{Category, GrievanceId, NewGrievance, Priority};
    use chrono::Utc;
    use rstest::rstest;

    #[rstest]
    #[case(Role::Student, GrievanceAction::Submit, true)]
    #[case(Role::Student, GrievanceAction::ListAll, true)]
    #[case(Role::Student, GrievanceAction::UpdateStatus, false)]
    #[case(Role::Officer, GrievanceAction::UpdateStatus, true)]
    #[case(Role::Admin, GrievanceAction::UpdateStatus, true)]
    #[case(Role::Student, GrievanceAction::Comment, true)]
    #[case(Role::Officer, GrievanceAction::Upvote, true)]
    fn access_matrix(#[case] role: Role, #[case] action: GrievanceAction, #[case] allowed: bool) {
        assert_eq!(authorize(role, action).is_ok(), allowed);
    }

    #[test]
    fn students_only_view_their_own_reports() {
        let owner = UserId::random();
        let grievance = Grievance::open(
            GrievanceId::random(),
            Utc::now(),
            NewGrievance {
                student: owner,
                title: "Broken projector".to_owned(),
                description: "Room 204 projector flickers.".to_owned(),
                category: Category::Infrastructure,
                is_anonymous: false,
                priority: Priority::default(),
                ai_summary: None,
                evidence: None,
            },
        );
        assert!(authorize_view(Role::Student, &owner, &grievance).is_ok());
        assert!(authorize_view(Role::Student, &UserId::random(), &grievance).is_err());
        assert!(authorize_view(Role::Officer, &UserId::random(), &grievance).is_ok());
        assert!(authorize_view(Role::Admin, &UserId::random(), &grievance).is_ok());
    }

    #[test]
    fn internal_notes_are_staff_only() {
        assert!(!may_see_internal_notes(Role::Student));
        assert!(may_see_internal_notes(Role::Officer));
        assert!(may_see_internal_notes(Role::Admin));
    }
}
