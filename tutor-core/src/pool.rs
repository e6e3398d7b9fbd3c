//! Candidate vocabulary for a story, narrowed by proficiency.

use crate::model::{EnrollmentId, VocabularyItem};
use crate::store::TutorStore;

/// Filter value that disables proficiency filtering.
pub const ANY_PROFICIENCY: &str = "any";

/// Collect an enrollment's vocabulary, optionally restricted to one proficiency.
///
/// `None`, blank input and `"any"` (any casing) keep every item. Items
/// without a proficiency tag never match a specific level.
pub fn vocabulary_pool(
    store: &TutorStore,
    enrollment_id: EnrollmentId,
    proficiency: Option<&str>,
) -> Vec<VocabularyItem> {
    let level = proficiency
        .map(str::trim)
        .filter(|p| !p.is_empty() && !p.eq_ignore_ascii_case(ANY_PROFICIENCY));

    store
        .vocabulary()
        .iter()
        .filter(|item| item.enrollment_id == enrollment_id)
        .filter(|item| level.map_or(true, |level| item.has_proficiency(level)))
        .cloned()
        .collect()
}
