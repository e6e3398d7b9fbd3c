//! Derived views over the store: a user's enrollments and ownership checks.

use crate::error::{Result, TutorError};
use crate::model::{Enrollment, EnrollmentId, EnrollmentView, UserId};
use crate::store::TutorStore;

/// Name shown for an enrollment whose language cannot be resolved.
pub const UNKNOWN_LANGUAGE_NAME: &str = "Unknown language";

/// List a user's enrollments in the order they were created.
pub fn list_enrollments(store: &TutorStore, user_id: UserId) -> Vec<EnrollmentView> {
    store
        .enrollments()
        .iter()
        .filter(|e| e.user_id == user_id)
        .map(|e| EnrollmentView {
            enrollment_id: e.id,
            language_id: e.language_id,
            language_name: language_name(store, e),
        })
        .collect()
}

/// Resolve the display name of an enrollment's language.
pub fn language_name(store: &TutorStore, enrollment: &Enrollment) -> String {
    store
        .language(enrollment.language_id)
        .map(|l| l.name.clone())
        .unwrap_or_else(|| UNKNOWN_LANGUAGE_NAME.to_string())
}

/// Fetch an enrollment, requiring that it belongs to `user_id`.
pub fn owned_enrollment(
    store: &TutorStore,
    user_id: UserId,
    enrollment_id: EnrollmentId,
) -> Result<Enrollment> {
    store
        .enrollment(enrollment_id)
        .filter(|e| e.user_id == user_id)
        .copied()
        .ok_or(TutorError::EnrollmentNotFound(enrollment_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::LanguageId;

    fn two_learners() -> (TutorStore, UserId, UserId) {
        let mut store = TutorStore::new();
        let ana = store.create_user("Ana", "ana@example.com", "password1").unwrap().id;
        let ben = store.create_user("Ben", "ben@example.com", "password2").unwrap().id;
        (store, ana, ben)
    }

    #[test]
    fn test_enrollments_in_creation_order() {
        let (mut store, ana, ben) = two_learners();
        // Japanese, then English: creation order, not alphabetical.
        store.create_enrollment(ana, LanguageId::new(9)).unwrap();
        store.create_enrollment(ben, LanguageId::new(2)).unwrap();
        store.create_enrollment(ana, LanguageId::new(1)).unwrap();

        let views = list_enrollments(&store, ana);
        let names: Vec<_> = views.iter().map(|v| v.language_name.as_str()).collect();
        assert_eq!(names, vec!["Japanese", "English"]);
        assert_eq!(views[1].enrollment_id, EnrollmentId::new(3));
    }

    #[test]
    fn test_missing_language_uses_placeholder() {
        let store = TutorStore::new();
        let orphan = Enrollment {
            id: EnrollmentId::new(1),
            user_id: UserId::new(1),
            language_id: LanguageId::new(404),
        };
        assert_eq!(language_name(&store, &orphan), UNKNOWN_LANGUAGE_NAME);
    }

    #[test]
    fn test_owned_enrollment() {
        let (mut store, ana, ben) = two_learners();
        let enrollment = store.create_enrollment(ana, LanguageId::new(2)).unwrap();

        assert_eq!(owned_enrollment(&store, ana, enrollment.id).unwrap(), enrollment);
        assert_eq!(
            owned_enrollment(&store, ben, enrollment.id).unwrap_err(),
            TutorError::EnrollmentNotFound(enrollment.id)
        );
        assert!(owned_enrollment(&store, ana, EnrollmentId::new(50)).is_err());
    }
}
