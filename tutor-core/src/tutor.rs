//! Tutor - the primary public API for the language tutor.
//!
//! A [`Tutor`] owns one store and one random source. Every command runs to
//! completion against the in-memory store; persistence is an explicit,
//! separate step so callers decide when state is written.

use crate::error::{Result, TutorError};
use crate::model::{
    Enrollment, EnrollmentId, EnrollmentView, Language, LanguageId, User, UserId, VocabId,
    VocabularyItem,
};
use crate::persist::{self, PersistError, Snapshot};
use crate::pool::vocabulary_pool;
use crate::resolver::{language_name, list_enrollments, owned_enrollment};
use crate::selection::{select, Strategy, WordBound};
use crate::store::TutorStore;
use crate::story::{synthesize, StoryArtifact, StoryMetadata};
use chrono::Utc;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Configuration for a tutor.
#[derive(Debug, Clone)]
pub struct TutorConfig {
    /// Directory holding the store snapshot.
    pub data_dir: PathBuf,

    /// Directory exported stories are written to.
    pub stories_dir: PathBuf,

    /// Seed for word sampling. `None` seeds from the OS.
    pub seed: Option<u64>,
}

impl TutorConfig {
    /// Create a config rooted at `data_dir`.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        let data_dir = data_dir.into();
        Self {
            stories_dir: data_dir.join("stories"),
            data_dir,
            seed: None,
        }
    }

    /// Read `TUTOR_DATA_DIR`, `TUTOR_STORIES_DIR` and `TUTOR_SEED`.
    pub fn from_env() -> Self {
        let data_dir =
            std::env::var("TUTOR_DATA_DIR").unwrap_or_else(|_| "tutor-data".to_string());
        let mut config = Self::new(data_dir);

        if let Ok(dir) = std::env::var("TUTOR_STORIES_DIR") {
            config.stories_dir = PathBuf::from(dir);
        }

        if let Ok(raw) = std::env::var("TUTOR_SEED") {
            match raw.trim().parse() {
                Ok(seed) => config.seed = Some(seed),
                Err(_) => warn!(value = %raw, "Ignoring invalid TUTOR_SEED"),
            }
        }

        config
    }

    /// Move the data directory. A stories directory still at its default
    /// location follows it.
    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        if self.stories_dir == self.data_dir.join("stories") {
            self.stories_dir = dir.join("stories");
        }
        self.data_dir = dir;
        self
    }

    /// Set the stories directory.
    pub fn with_stories_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.stories_dir = dir.into();
        self
    }

    /// Fix the sampling seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Path of the store snapshot.
    pub fn snapshot_path(&self) -> PathBuf {
        self.data_dir.join("store.json")
    }
}

impl Default for TutorConfig {
    fn default() -> Self {
        Self::new("tutor-data")
    }
}

/// Parameters for one story generation.
#[derive(Debug, Clone)]
pub struct StoryRequest {
    pub enrollment_id: EnrollmentId,
    /// Proficiency filter; `None` or `"any"` keeps everything.
    pub proficiency: Option<String>,
    pub theme: String,
    pub max_words: WordBound,
    pub strategy: Strategy,
    /// Learner-picked words for the manual strategy.
    pub manual_ids: Vec<VocabId>,
}

impl StoryRequest {
    pub fn new(enrollment_id: EnrollmentId, strategy: Strategy) -> Self {
        Self {
            enrollment_id,
            proficiency: None,
            theme: String::new(),
            max_words: WordBound::default(),
            strategy,
            manual_ids: Vec::new(),
        }
    }

    pub fn with_proficiency(mut self, proficiency: impl Into<String>) -> Self {
        self.proficiency = Some(proficiency.into());
        self
    }

    pub fn with_theme(mut self, theme: impl Into<String>) -> Self {
        self.theme = theme.into();
        self
    }

    pub fn with_max_words(mut self, max_words: WordBound) -> Self {
        self.max_words = max_words;
        self
    }

    pub fn with_manual_ids(mut self, ids: impl IntoIterator<Item = VocabId>) -> Self {
        self.manual_ids = ids.into_iter().collect();
        self
    }
}

/// A language tutor session over one store.
pub struct Tutor {
    store: TutorStore,
    rng: StdRng,
    config: TutorConfig,
}

impl Tutor {
    /// Create a tutor with a fresh store.
    pub fn new(config: TutorConfig) -> Self {
        Self::with_store(config, TutorStore::new())
    }

    /// Create a tutor over an existing store.
    pub fn with_store(config: TutorConfig, store: TutorStore) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { store, rng, config }
    }

    /// Open the tutor saved under the config's data directory, or a new one.
    pub async fn open(config: TutorConfig) -> std::result::Result<Self, PersistError> {
        let store = persist::load_store_or_default(config.snapshot_path()).await?;
        Ok(Self::with_store(config, store))
    }

    /// Write the current store to the config's snapshot path.
    pub async fn save(&self) -> std::result::Result<(), PersistError> {
        Snapshot::new(self.store.clone())
            .save_json(self.config.snapshot_path())
            .await
    }

    /// Re-read the store from the snapshot path, keeping the random source.
    pub async fn reload(&mut self) -> std::result::Result<(), PersistError> {
        self.store = persist::load_store_or_default(self.config.snapshot_path()).await?;
        Ok(())
    }

    /// Serialize the store for an external blob store.
    pub fn snapshot(&self) -> std::result::Result<String, PersistError> {
        Snapshot::new(self.store.clone()).to_json()
    }

    /// Replace the store with a previously taken snapshot.
    pub fn restore(&mut self, snapshot: &str) -> std::result::Result<(), PersistError> {
        self.store = Snapshot::from_json(snapshot)?.store;
        Ok(())
    }

    pub fn store(&self) -> &TutorStore {
        &self.store
    }

    pub fn config(&self) -> &TutorConfig {
        &self.config
    }

    pub fn into_store(self) -> TutorStore {
        self.store
    }

    // =========================================================================
    // Accounts and enrollment
    // =========================================================================

    pub fn create_user(&mut self, name: &str, email: &str, password: &str) -> Result<User> {
        self.store.create_user(name, email, password)
    }

    pub fn authenticate(&self, email: &str, password: &str) -> Result<User> {
        self.store.authenticate(email, password)
    }

    /// The language catalog.
    pub fn languages(&self) -> &[Language] {
        self.store.languages()
    }

    /// Enroll a user in a language. Enrolling twice returns the first enrollment.
    pub fn enroll(&mut self, user_id: UserId, language_id: LanguageId) -> Result<Enrollment> {
        self.store.create_enrollment(user_id, language_id)
    }

    pub fn list_enrollments(&self, user_id: UserId) -> Vec<EnrollmentView> {
        list_enrollments(&self.store, user_id)
    }

    // =========================================================================
    // Vocabulary
    // =========================================================================

    /// Add a batch of words to one of the user's enrollments.
    pub fn add_vocabulary(
        &mut self,
        user_id: UserId,
        enrollment_id: EnrollmentId,
        raw_words: &str,
        meaning: Option<&str>,
        proficiency: Option<&str>,
    ) -> Result<Vec<VocabularyItem>> {
        owned_enrollment(&self.store, user_id, enrollment_id)?;
        self.store
            .add_vocabulary(enrollment_id, raw_words, meaning, proficiency, Utc::now())
    }

    /// List the user's words for an enrollment, optionally filtered by proficiency.
    pub fn list_vocabulary(
        &self,
        user_id: UserId,
        enrollment_id: EnrollmentId,
        proficiency: Option<&str>,
    ) -> Result<Vec<VocabularyItem>> {
        owned_enrollment(&self.store, user_id, enrollment_id)?;
        Ok(vocabulary_pool(&self.store, enrollment_id, proficiency))
    }

    // =========================================================================
    // Stories
    // =========================================================================

    /// Generate a practice story and keep it as the current story.
    pub fn generate_story(
        &mut self,
        user_id: UserId,
        request: &StoryRequest,
    ) -> Result<StoryArtifact> {
        let user = self
            .store
            .user(user_id)
            .cloned()
            .ok_or(TutorError::UnknownUser(user_id))?;
        let enrollment = owned_enrollment(&self.store, user_id, request.enrollment_id)?;

        let pool = vocabulary_pool(&self.store, enrollment.id, request.proficiency.as_deref());
        if pool.is_empty() {
            return Err(TutorError::EmptyPool);
        }

        let selection = select(
            request.strategy,
            &pool,
            &request.theme,
            &request.manual_ids,
            request.max_words,
            &mut self.rng,
        )?;

        let language = language_name(&self.store, &enrollment);
        let story = synthesize(&language, &selection.items, &user.name, &request.theme);
        let metadata = StoryMetadata {
            user_name: user.name,
            language_name: language,
            theme: request.theme.trim().to_string(),
            word_count: selection.items.len(),
            strategy: request.strategy,
            theme_fallback: selection.theme_fallback,
            words: selection.items.iter().map(|i| i.word.clone()).collect(),
            generated_at: Utc::now(),
        };

        let artifact = StoryArtifact::new(story, metadata);
        info!(
            enrollment_id = %enrollment.id,
            strategy = %request.strategy,
            words = artifact.metadata.word_count,
            "Generated story"
        );
        self.store.set_current_story(artifact.clone());
        Ok(artifact)
    }

    pub fn current_story(&self) -> Option<&StoryArtifact> {
        self.store.current_story()
    }

    /// Export the current story into the configured stories directory.
    ///
    /// Returns `None` when no story has been generated yet.
    pub async fn export_current_story(&self) -> std::result::Result<Option<PathBuf>, PersistError> {
        self.export_current_story_to(&self.config.stories_dir).await
    }

    /// Export the current story into `dir`.
    pub async fn export_current_story_to(
        &self,
        dir: impl AsRef<Path>,
    ) -> std::result::Result<Option<PathBuf>, PersistError> {
        match self.store.current_story() {
            Some(story) => Ok(Some(persist::export_story(dir, story).await?)),
            None => Ok(None),
        }
    }
}
