//! Testing utilities for the tutor.
//!
//! `TestHarness` sets up a seeded tutor with one signed-up learner who is
//! already enrolled in Spanish, so tests can go straight to vocabulary and
//! story generation.

use crate::model::{EnrollmentId, LanguageId, UserId, VocabId};
use crate::store::TutorStore;
use crate::tutor::{Tutor, TutorConfig};

/// Seed used by harness tutors.
pub const HARNESS_SEED: u64 = 0x5EED;

/// Catalog id of Spanish in a default store.
pub const SPANISH: LanguageId = LanguageId::new(2);

/// Test harness for tutor scenarios.
pub struct TestHarness {
    /// The tutor under test.
    pub tutor: Tutor,
    /// The signed-up learner.
    pub user_id: UserId,
    /// The learner's Spanish enrollment.
    pub enrollment_id: EnrollmentId,
}

impl TestHarness {
    /// Create a harness with learner "Ana" enrolled in Spanish.
    pub fn new() -> Self {
        Self::with_learner("Ana", "ana@example.com", "password1")
    }

    /// Create a harness with a custom learner enrolled in Spanish.
    ///
    /// # Panics
    ///
    /// Panics if the account details are rejected.
    pub fn with_learner(name: &str, email: &str, password: &str) -> Self {
        let config = TutorConfig::default().with_seed(HARNESS_SEED);
        let mut tutor = Tutor::with_store(config, TutorStore::new());

        let user = tutor
            .create_user(name, email, password)
            .expect("harness account should be valid");
        let enrollment = tutor
            .enroll(user.id, SPANISH)
            .expect("harness enrollment should succeed");

        Self {
            tutor,
            user_id: user.id,
            enrollment_id: enrollment.id,
        }
    }

    /// Add words to the learner's Spanish enrollment and return their ids.
    ///
    /// # Panics
    ///
    /// Panics if the batch is rejected.
    pub fn add_words(&mut self, raw: &str, proficiency: Option<&str>) -> Vec<VocabId> {
        self.tutor
            .add_vocabulary(self.user_id, self.enrollment_id, raw, None, proficiency)
            .expect("harness words should be accepted")
            .into_iter()
            .map(|item| item.id)
            .collect()
    }

    /// Add words that share a meaning and return their ids.
    pub fn add_words_with_meaning(&mut self, raw: &str, meaning: &str) -> Vec<VocabId> {
        self.tutor
            .add_vocabulary(self.user_id, self.enrollment_id, raw, Some(meaning), None)
            .expect("harness words should be accepted")
            .into_iter()
            .map(|item| item.id)
            .collect()
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}
