//! In-memory relational store for accounts, enrollments and vocabulary.

use crate::error::{Result, TutorError};
use crate::model::{
    Enrollment, EnrollmentId, Language, LanguageId, User, UserId, VocabId, VocabularyItem,
};
use crate::normalize::{normalize_words, optional_field};
use crate::story::StoryArtifact;
use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::info;

/// Languages available to every store, in catalog order.
pub const LANGUAGE_CATALOG: [&str; 13] = [
    "English",
    "Spanish",
    "French",
    "German",
    "Italian",
    "Portuguese",
    "Russian",
    "Chinese (Mandarin)",
    "Japanese",
    "Korean",
    "Arabic",
    "Hindi",
    "Urdu",
];

/// Minimum accepted password length.
pub const MIN_PASSWORD_LEN: usize = 8;

lazy_static! {
    static ref EMAIL_PATTERN: Regex =
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
            .expect("email pattern is valid");
}

/// Next value of each identifier sequence. Never rewound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counters {
    next_user: u64,
    next_language: u64,
    next_enrollment: u64,
    next_vocab: u64,
}

impl Default for Counters {
    fn default() -> Self {
        Self {
            next_user: 1,
            next_language: 1,
            next_enrollment: 1,
            next_vocab: 1,
        }
    }
}

impl Counters {
    fn user(&mut self) -> UserId {
        let id = UserId::new(self.next_user);
        self.next_user += 1;
        id
    }

    fn language(&mut self) -> LanguageId {
        let id = LanguageId::new(self.next_language);
        self.next_language += 1;
        id
    }

    fn enrollment(&mut self) -> EnrollmentId {
        let id = EnrollmentId::new(self.next_enrollment);
        self.next_enrollment += 1;
        id
    }

    fn vocab(&mut self) -> VocabId {
        let id = VocabId::new(self.next_vocab);
        self.next_vocab += 1;
        id
    }
}

/// The complete tutor state.
///
/// Rows are append-only; the current story is the only value ever replaced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TutorStore {
    users: Vec<User>,
    languages: Vec<Language>,
    enrollments: Vec<Enrollment>,
    vocabulary: Vec<VocabularyItem>,
    #[serde(default)]
    current_story: Option<StoryArtifact>,
    counters: Counters,
}

impl Default for TutorStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TutorStore {
    /// Create a store seeded with the standard language catalog.
    pub fn new() -> Self {
        Self::with_catalog(LANGUAGE_CATALOG)
    }

    /// Create a store seeded with a custom language catalog.
    pub fn with_catalog<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut counters = Counters::default();
        let languages = names
            .into_iter()
            .map(|name| Language {
                id: counters.language(),
                name: name.into(),
            })
            .collect();

        Self {
            users: Vec::new(),
            languages,
            enrollments: Vec::new(),
            vocabulary: Vec::new(),
            current_story: None,
            counters,
        }
    }

    // =========================================================================
    // Read access
    // =========================================================================

    pub fn users(&self) -> &[User] {
        &self.users
    }

    pub fn languages(&self) -> &[Language] {
        &self.languages
    }

    pub fn enrollments(&self) -> &[Enrollment] {
        &self.enrollments
    }

    pub fn vocabulary(&self) -> &[VocabularyItem] {
        &self.vocabulary
    }

    pub fn current_story(&self) -> Option<&StoryArtifact> {
        self.current_story.as_ref()
    }

    pub fn user(&self, id: UserId) -> Option<&User> {
        self.users.iter().find(|u| u.id == id)
    }

    pub fn language(&self, id: LanguageId) -> Option<&Language> {
        self.languages.iter().find(|l| l.id == id)
    }

    pub fn enrollment(&self, id: EnrollmentId) -> Option<&Enrollment> {
        self.enrollments.iter().find(|e| e.id == id)
    }

    /// Find a user by email, ignoring case and surrounding whitespace.
    pub fn find_user_by_email(&self, email: &str) -> Option<&User> {
        let email = canonical_email(email);
        self.users.iter().find(|u| u.email == email)
    }

    // =========================================================================
    // Accounts
    // =========================================================================

    /// Create a new account.
    pub fn create_user(&mut self, name: &str, email: &str, password: &str) -> Result<User> {
        let name = name.trim();
        if name.is_empty() {
            return Err(TutorError::EmptyName);
        }

        let email = canonical_email(email);
        if !EMAIL_PATTERN.is_match(&email) {
            return Err(TutorError::InvalidEmail(email));
        }

        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(TutorError::PasswordTooShort {
                min: MIN_PASSWORD_LEN,
            });
        }

        if self.users.iter().any(|u| u.email == email) {
            return Err(TutorError::DuplicateEmail(email));
        }

        let user = User {
            id: self.counters.user(),
            name: name.to_string(),
            email,
            password: password.to_string(),
        };
        info!(user_id = %user.id, "Created account");
        self.users.push(user.clone());
        Ok(user)
    }

    /// Look up the account matching an email and password.
    pub fn authenticate(&self, email: &str, password: &str) -> Result<User> {
        self.find_user_by_email(email)
            .filter(|u| u.password == password)
            .cloned()
            .ok_or(TutorError::InvalidCredentials)
    }

    // =========================================================================
    // Enrollments
    // =========================================================================

    /// Enroll a user in a language, returning the existing row if already enrolled.
    pub fn create_enrollment(
        &mut self,
        user_id: UserId,
        language_id: LanguageId,
    ) -> Result<Enrollment> {
        if self.user(user_id).is_none() {
            return Err(TutorError::UnknownUser(user_id));
        }
        if self.language(language_id).is_none() {
            return Err(TutorError::UnknownLanguage(language_id));
        }

        if let Some(existing) = self
            .enrollments
            .iter()
            .find(|e| e.user_id == user_id && e.language_id == language_id)
        {
            return Ok(*existing);
        }

        let enrollment = Enrollment {
            id: self.counters.enrollment(),
            user_id,
            language_id,
        };
        info!(
            user_id = %user_id,
            language_id = %language_id,
            enrollment_id = %enrollment.id,
            "Enrolled in language"
        );
        self.enrollments.push(enrollment);
        Ok(enrollment)
    }

    // =========================================================================
    // Vocabulary
    // =========================================================================

    /// Append one row per normalized word of `raw`.
    ///
    /// The batch shares meaning, proficiency and timestamp. Nothing is
    /// written when normalization yields no words.
    pub fn add_vocabulary(
        &mut self,
        enrollment_id: EnrollmentId,
        raw: &str,
        meaning: Option<&str>,
        proficiency: Option<&str>,
        created_at: DateTime<Utc>,
    ) -> Result<Vec<VocabularyItem>> {
        if self.enrollment(enrollment_id).is_none() {
            return Err(TutorError::EnrollmentNotFound(enrollment_id));
        }

        let words = normalize_words(raw);
        if words.is_empty() {
            return Err(TutorError::EmptyInput);
        }

        let meaning = optional_field(meaning);
        let proficiency = optional_field(proficiency).map(|p| p.to_lowercase());

        let added: Vec<VocabularyItem> = words
            .into_iter()
            .map(|word| VocabularyItem {
                id: self.counters.vocab(),
                enrollment_id,
                word,
                meaning: meaning.clone(),
                proficiency: proficiency.clone(),
                created_at,
            })
            .collect();

        info!(
            enrollment_id = %enrollment_id,
            count = added.len(),
            "Added vocabulary"
        );
        self.vocabulary.extend(added.iter().cloned());
        Ok(added)
    }

    // =========================================================================
    // Stories
    // =========================================================================

    /// Replace the current story.
    pub fn set_current_story(&mut self, story: StoryArtifact) {
        self.current_story = Some(story);
    }

    // =========================================================================
    // Integrity
    // =========================================================================

    /// Check every structural invariant, describing the first violation found.
    pub fn validate(&self) -> std::result::Result<(), String> {
        let max_user = unique_ids("user", self.users.iter().map(|u| u.id.get()))?;
        let max_language = unique_ids("language", self.languages.iter().map(|l| l.id.get()))?;
        let max_enrollment =
            unique_ids("enrollment", self.enrollments.iter().map(|e| e.id.get()))?;
        let max_vocab = unique_ids("vocabulary", self.vocabulary.iter().map(|v| v.id.get()))?;

        let counters = [
            ("user", max_user, self.counters.next_user),
            ("language", max_language, self.counters.next_language),
            ("enrollment", max_enrollment, self.counters.next_enrollment),
            ("vocabulary", max_vocab, self.counters.next_vocab),
        ];
        for (kind, max, next) in counters {
            if next <= max {
                return Err(format!("{kind} counter {next} does not exceed assigned id {max}"));
            }
        }

        let mut emails = HashSet::new();
        for user in &self.users {
            if user.email != canonical_email(&user.email) {
                return Err(format!("user {} email is not lowercased", user.id));
            }
            if !emails.insert(user.email.as_str()) {
                return Err(format!("duplicate email {}", user.email));
            }
        }

        let mut pairs = HashSet::new();
        for enrollment in &self.enrollments {
            if self.user(enrollment.user_id).is_none() {
                return Err(format!(
                    "enrollment {} references missing user {}",
                    enrollment.id, enrollment.user_id
                ));
            }
            if self.language(enrollment.language_id).is_none() {
                return Err(format!(
                    "enrollment {} references missing language {}",
                    enrollment.id, enrollment.language_id
                ));
            }
            if !pairs.insert((enrollment.user_id, enrollment.language_id)) {
                return Err(format!(
                    "user {} enrolled twice in language {}",
                    enrollment.user_id, enrollment.language_id
                ));
            }
        }

        for item in &self.vocabulary {
            if self.enrollment(item.enrollment_id).is_none() {
                return Err(format!(
                    "vocabulary {} references missing enrollment {}",
                    item.id, item.enrollment_id
                ));
            }
        }

        Ok(())
    }
}

fn canonical_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Return the largest id (0 when empty), or an error on a repeated id.
fn unique_ids(kind: &str, ids: impl Iterator<Item = u64>) -> std::result::Result<u64, String> {
    let mut seen = HashSet::new();
    let mut max = 0;
    for id in ids {
        if !seen.insert(id) {
            return Err(format!("duplicate {kind} id {id}"));
        }
        max = max.max(id);
    }
    Ok(max)
}
