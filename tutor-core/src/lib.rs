//! Vocabulary tracker and practice story engine for language learners.
//!
//! This crate provides:
//! - An in-memory store of accounts, language enrollments and vocabulary
//! - Proficiency filtering and three word selection strategies
//! - Deterministic practice story synthesis
//! - Versioned snapshot persistence and plain-text story export
//!
//! # Quick Start
//!
//! ```ignore
//! use tutor_core::{LanguageId, Strategy, StoryRequest, Tutor, TutorConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut tutor = Tutor::open(TutorConfig::from_env()).await?;
//!
//!     let ana = tutor.create_user("Ana", "ana@example.com", "hunter2hunter2")?;
//!     let spanish = tutor.enroll(ana.id, LanguageId::new(2))?;
//!     tutor.add_vocabulary(ana.id, spanish.id, "hola, adios, gracias", None, None)?;
//!
//!     let request = StoryRequest::new(spanish.id, Strategy::Theme).with_theme("greetings");
//!     let story = tutor.generate_story(ana.id, &request)?;
//!     println!("{}", story.text);
//!
//!     tutor.save().await?;
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod model;
pub mod normalize;
pub mod persist;
pub mod pool;
pub mod resolver;
pub mod selection;
pub mod store;
pub mod story;
pub mod testing;
pub mod tutor;

// Primary public API
pub use error::TutorError;
pub use model::{
    Enrollment, EnrollmentId, EnrollmentView, Language, LanguageId, User, UserId, VocabId,
    VocabularyItem,
};
pub use persist::{PersistError, Snapshot};
pub use selection::{Strategy, WordBound};
pub use store::TutorStore;
pub use story::{StoryArtifact, StoryMetadata};
pub use testing::TestHarness;
pub use tutor::{StoryRequest, Tutor, TutorConfig};
