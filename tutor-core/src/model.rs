//! Domain entities tracked by the tutor store.
//!
//! Identifiers are newtypes over `u64` so a vocabulary id can never be
//! passed where an enrollment id is expected.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Macro to define a newtype ID wrapper around a store-assigned counter value.
macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(u64);

        impl $name {
            /// Wrap a raw identifier value.
            #[inline]
            pub const fn new(raw: u64) -> Self {
                Self(raw)
            }

            /// Get the raw identifier value.
            #[inline]
            pub const fn get(&self) -> u64 {
                self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = std::num::ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(s.trim().parse()?))
            }
        }
    };
}

define_id!(
    /// Unique identifier for a user account
    UserId
);

define_id!(
    /// Unique identifier for a catalog language
    LanguageId
);

define_id!(
    /// Unique identifier for a user's enrollment in a language
    EnrollmentId
);

define_id!(
    /// Unique identifier for a vocabulary row
    VocabId
);

/// A learner account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    /// Display name shown in stories.
    pub name: String,
    /// Lowercased, unique across the store.
    pub email: String,
    /// Compared verbatim; never hashed.
    pub password: String,
}

/// A language from the fixed catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Language {
    pub id: LanguageId,
    pub name: String,
}

/// A user studying a language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enrollment {
    pub id: EnrollmentId,
    pub user_id: UserId,
    pub language_id: LanguageId,
}

/// A single word recorded under an enrollment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VocabularyItem {
    pub id: VocabId,
    pub enrollment_id: EnrollmentId,
    pub word: String,
    pub meaning: Option<String>,
    /// Free-form tag, stored lowercased.
    pub proficiency: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl VocabularyItem {
    /// Check whether the proficiency tag equals `level`, ignoring case.
    pub fn has_proficiency(&self, level: &str) -> bool {
        self.proficiency
            .as_deref()
            .is_some_and(|p| p.to_lowercase() == level.to_lowercase())
    }

    /// Format as `word (meaning)` for listings.
    pub fn display_label(&self) -> String {
        match &self.meaning {
            Some(meaning) => format!("{} ({})", self.word, meaning),
            None => self.word.clone(),
        }
    }
}

/// Enrollment annotated with its resolved language name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrollmentView {
    pub enrollment_id: EnrollmentId,
    pub language_id: LanguageId,
    pub language_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(proficiency: Option<&str>, meaning: Option<&str>) -> VocabularyItem {
        VocabularyItem {
            id: VocabId::new(1),
            enrollment_id: EnrollmentId::new(1),
            word: "hola".to_string(),
            meaning: meaning.map(str::to_string),
            proficiency: proficiency.map(str::to_string),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_id_display_and_parse() {
        let id: VocabId = " 42 ".parse().unwrap();
        assert_eq!(id, VocabId::new(42));
        assert_eq!(id.to_string(), "42");
        assert_eq!(format!("{id:?}"), "VocabId(42)");
        assert!("abc".parse::<UserId>().is_err());
    }

    #[test]
    fn test_id_serializes_transparently() {
        let json = serde_json::to_string(&EnrollmentId::new(7)).unwrap();
        assert_eq!(json, "7");
    }

    #[test]
    fn test_has_proficiency() {
        assert!(item(Some("beginner"), None).has_proficiency("Beginner"));
        assert!(!item(Some("advanced"), None).has_proficiency("beginner"));
        assert!(!item(None, None).has_proficiency("beginner"));
    }

    #[test]
    fn test_display_label() {
        assert_eq!(item(None, Some("hello")).display_label(), "hola (hello)");
        assert_eq!(item(None, None).display_label(), "hola");
    }
}
