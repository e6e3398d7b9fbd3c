//! Practice story synthesis.
//!
//! Stories are assembled from fixed sentence templates so the same inputs
//! always produce the same text.

use crate::model::VocabularyItem;
use crate::selection::Strategy;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Theme used in the summary when the learner gave none.
pub const DEFAULT_THEME: &str = "everyday life";

/// Width of the rule under the export header.
const EXPORT_RULE_WIDTH: usize = 60;

/// Narrative and summary produced by [`synthesize`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Story {
    pub narrative: String,
    pub summary: String,
}

impl Story {
    /// Narrative and summary separated by a blank line.
    pub fn text(&self) -> String {
        format!("{}\n\n{}", self.narrative, self.summary)
    }
}

/// Build a story around `words`, listed verbatim in the given order.
///
/// Callers must pass at least one word.
pub fn synthesize(language: &str, words: &[VocabularyItem], user_name: &str, theme: &str) -> Story {
    let word_list = words
        .iter()
        .map(|item| item.word.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    let theme = theme.trim();
    let theme = if theme.is_empty() { DEFAULT_THEME } else { theme };

    let sentences = [
        format!(
            "{user_name} opened a notebook of {language} words and read them aloud: {word_list}."
        ),
        format!(
            "Each word became a small step along a winding street, and {user_name} repeated every one until it felt familiar."
        ),
        format!(
            "At the corner café a friendly neighbor answered in {language}, and the conversation kept going."
        ),
        format!("{user_name} pointed at things and guessed, then tried again with the new words."),
        format!(
            "By evening the list no longer felt like a list; it felt like a day {user_name} had lived in {language}."
        ),
        "And so the practice ended, with a promise to come back tomorrow.".to_string(),
    ];

    Story {
        narrative: sentences.join(" "),
        summary: format!("Summary: {user_name} practiced {language} with the theme \"{theme}\"."),
    }
}

/// How a story was produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryMetadata {
    pub user_name: String,
    pub language_name: String,
    /// Theme as entered; may be empty.
    pub theme: String,
    pub word_count: usize,
    pub strategy: Strategy,
    /// True when the theme strategy sampled the whole pool instead.
    #[serde(default)]
    pub theme_fallback: bool,
    /// Words used, in story order.
    pub words: Vec<String>,
    pub generated_at: DateTime<Utc>,
}

/// The most recent generated story.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryArtifact {
    pub narrative: String,
    pub summary: String,
    /// Narrative and summary joined by a blank line.
    pub text: String,
    pub metadata: StoryMetadata,
}

impl StoryArtifact {
    pub fn new(story: Story, metadata: StoryMetadata) -> Self {
        let text = story.text();
        Self {
            narrative: story.narrative,
            summary: story.summary,
            text,
            metadata,
        }
    }

    /// Render the plain-text export: a short header followed by the story.
    pub fn export_text(&self) -> String {
        format!(
            "Story for {} - {}\nGenerated on: {}\n{}\n\n{}",
            self.metadata.user_name,
            self.metadata.language_name,
            self.metadata.generated_at.format("%Y-%m-%d %H:%M:%S"),
            "=".repeat(EXPORT_RULE_WIDTH),
            self.text
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{EnrollmentId, VocabId};
    use chrono::TimeZone;

    fn words(list: &[&str]) -> Vec<VocabularyItem> {
        list.iter()
            .enumerate()
            .map(|(i, w)| VocabularyItem {
                id: VocabId::new(i as u64 + 1),
                enrollment_id: EnrollmentId::new(1),
                word: w.to_string(),
                meaning: Some("unused".to_string()),
                proficiency: None,
                created_at: Utc::now(),
            })
            .collect()
    }

    #[test]
    fn test_intro_lists_words_in_order() {
        let story = synthesize(
            "Spanish",
            &words(&["hola", "adios", "gracias"]),
            "Ana",
            "greetings",
        );
        assert!(story.narrative.starts_with(
            "Ana opened a notebook of Spanish words and read them aloud: hola, adios, gracias."
        ));
        assert!(!story.narrative.contains("unused"));
    }

    #[test]
    fn test_summary_mentions_language_and_theme() {
        let story = synthesize("Spanish", &words(&["hola"]), "Ana", "  greetings ");
        assert_eq!(
            story.summary,
            "Summary: Ana practiced Spanish with the theme \"greetings\"."
        );
        assert_eq!(story.text(), format!("{}\n\n{}", story.narrative, story.summary));
    }

    #[test]
    fn test_empty_theme_uses_default() {
        let story = synthesize("French", &words(&["chat"]), "Ben", "");
        assert!(story.summary.contains("\"everyday life\""));
    }

    #[test]
    fn test_synthesis_is_deterministic() {
        let list = words(&["sol", "luna"]);
        assert_eq!(
            synthesize("Spanish", &list, "Ana", "sky"),
            synthesize("Spanish", &list, "Ana", "sky")
        );
    }

    #[test]
    fn test_export_header() {
        let story = synthesize("Spanish", &words(&["hola"]), "Ana", "greetings");
        let artifact = StoryArtifact::new(
            story.clone(),
            StoryMetadata {
                user_name: "Ana".to_string(),
                language_name: "Spanish".to_string(),
                theme: "greetings".to_string(),
                word_count: 1,
                strategy: Strategy::Manual,
                theme_fallback: false,
                words: vec!["hola".to_string()],
                generated_at: Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 0).unwrap(),
            },
        );

        let export = artifact.export_text();
        let mut lines = export.lines();
        assert_eq!(lines.next(), Some("Story for Ana - Spanish"));
        assert_eq!(lines.next(), Some("Generated on: 2024-03-09 14:05:00"));
        assert_eq!(lines.next(), Some("=".repeat(60).as_str()));
        assert_eq!(lines.next(), Some(""));
        assert!(export.ends_with(&story.text()));
    }
}
