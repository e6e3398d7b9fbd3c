//! Snapshot persistence and story export.
//!
//! The whole store is saved as one versioned JSON document. Restored
//! snapshots are checked against the store invariants before use.

use crate::store::TutorStore;
use crate::story::StoryArtifact;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;
use tracing::{info, warn};

/// Errors from persistence operations.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Version mismatch: expected {expected}, found {found}")]
    VersionMismatch { expected: u32, found: u32 },

    #[error("Corrupt snapshot: {0}")]
    Corrupt(String),
}

/// Current snapshot format version.
pub const SNAPSHOT_VERSION: u32 = 1;

/// A saved copy of the full tutor state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    /// Format version for compatibility checking.
    pub version: u32,

    /// When the snapshot was taken.
    pub saved_at: DateTime<Utc>,

    /// The complete store.
    pub store: TutorStore,
}

impl Snapshot {
    /// Capture a store.
    pub fn new(store: TutorStore) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            saved_at: Utc::now(),
            store,
        }
    }

    /// Serialize to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, PersistError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse and verify a JSON snapshot.
    pub fn from_json(content: &str) -> Result<Self, PersistError> {
        // Check the version before decoding a store that may have another shape.
        #[derive(Deserialize)]
        struct Header {
            version: u32,
        }

        let header: Header = serde_json::from_str(content)?;
        if header.version != SNAPSHOT_VERSION {
            return Err(PersistError::VersionMismatch {
                expected: SNAPSHOT_VERSION,
                found: header.version,
            });
        }

        let snapshot: Self = serde_json::from_str(content)?;
        if let Err(reason) = snapshot.store.validate() {
            warn!(%reason, "Rejected snapshot");
            return Err(PersistError::Corrupt(reason));
        }
        Ok(snapshot)
    }

    /// Write to a JSON file, creating parent directories as needed.
    ///
    /// The file is replaced in one rename so readers never see a partial write.
    pub async fn save_json(&self, path: impl AsRef<Path>) -> Result<(), PersistError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }

        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, self.to_json()?).await?;
        fs::rename(&tmp, path).await?;
        Ok(())
    }

    /// Load from a JSON file.
    pub async fn load_json(path: impl AsRef<Path>) -> Result<Self, PersistError> {
        let content = fs::read_to_string(path).await?;
        Self::from_json(&content)
    }
}

/// Load the store at `path`, or a fresh seeded store when no file exists yet.
pub async fn load_store_or_default(path: impl AsRef<Path>) -> Result<TutorStore, PersistError> {
    let path = path.as_ref();
    if !fs::try_exists(path).await? {
        info!(path = %path.display(), "No snapshot found, starting a new store");
        return Ok(TutorStore::new());
    }
    Ok(Snapshot::load_json(path).await?.store)
}

/// File name for an exported story: `{user}_{language}_{timestamp}.txt`.
pub fn story_file_name(story: &StoryArtifact) -> String {
    let timestamp = story.metadata.generated_at.format("%Y%m%d_%H%M%S");
    format!(
        "{}_{}_{timestamp}.txt",
        sanitize(&story.metadata.user_name),
        sanitize(&story.metadata.language_name)
    )
}

/// Write a story as plain UTF-8 text into `dir`, returning the file path.
pub async fn export_story(
    dir: impl AsRef<Path>,
    story: &StoryArtifact,
) -> Result<PathBuf, PersistError> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir).await?;

    let path = dir.join(story_file_name(story));
    fs::write(&path, story.export_text()).await?;
    info!(path = %path.display(), "Exported story");
    Ok(path)
}

fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect()
}
