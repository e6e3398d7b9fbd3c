//! Strategies that reduce a vocabulary pool to the words used in a story.
//!
//! All three strategies share one bound and never return more items than
//! the pool holds:
//! - **Random** samples uniformly once the pool exceeds the bound.
//! - **Manual** keeps only the ids the learner picked.
//! - **Theme** keeps items whose word or meaning contains a theme token,
//!   falling back to random sampling when nothing matches.
//!
//! Randomness is always drawn from a caller-supplied [`Rng`], so a seeded
//! generator makes every strategy reproducible.

use crate::error::{Result, TutorError};
use crate::model::{VocabId, VocabularyItem};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Bound used when the requested maximum is missing, non-numeric or not positive.
pub const DEFAULT_MAX_WORDS: usize = 20;

/// Largest bound a story may use.
pub const MAX_WORDS_LIMIT: usize = 40;

/// Maximum number of words a story may draw from, always within `1..=40`.
///
/// Deserialized values go through [`WordBound::from_requested`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "i64", into = "i64")]
pub struct WordBound(usize);

impl WordBound {
    /// Clamp a requested word count.
    pub fn from_requested(requested: i64) -> Self {
        if requested <= 0 {
            Self::default()
        } else {
            Self((requested as u64).min(MAX_WORDS_LIMIT as u64) as usize)
        }
    }

    /// Parse raw user input such as a form field.
    pub fn from_input(raw: &str) -> Self {
        let raw = raw.trim();
        match raw.parse::<i64>() {
            Ok(n) => Self::from_requested(n),
            // Digit strings too large for i64 still mean "as many as allowed".
            Err(_) if is_unsigned_digits(raw) => Self(MAX_WORDS_LIMIT),
            Err(_) => Self::default(),
        }
    }

    pub fn get(&self) -> usize {
        self.0
    }
}

impl Default for WordBound {
    fn default() -> Self {
        Self(DEFAULT_MAX_WORDS)
    }
}

impl From<i64> for WordBound {
    fn from(requested: i64) -> Self {
        Self::from_requested(requested)
    }
}

impl From<WordBound> for i64 {
    fn from(bound: WordBound) -> Self {
        bound.0 as i64
    }
}

impl fmt::Display for WordBound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

fn is_unsigned_digits(s: &str) -> bool {
    let digits = s.strip_prefix('+').unwrap_or(s);
    !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit())
}

/// How words are chosen for a story.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    #[default]
    Random,
    Theme,
    Manual,
}

impl Strategy {
    pub fn name(&self) -> &'static str {
        match self {
            Strategy::Random => "random",
            Strategy::Theme => "theme",
            Strategy::Manual => "manual",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error for an unrecognized strategy name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown strategy '{0}' (expected random, theme or manual)")]
pub struct UnknownStrategy(pub String);

impl FromStr for Strategy {
    type Err = UnknownStrategy;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "random" => Ok(Strategy::Random),
            "theme" => Ok(Strategy::Theme),
            "manual" => Ok(Strategy::Manual),
            other => Err(UnknownStrategy(other.to_string())),
        }
    }
}

/// Words chosen by a strategy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub items: Vec<VocabularyItem>,
    /// Set when the theme strategy found no match and sampled the whole pool.
    pub theme_fallback: bool,
}

impl Selection {
    fn direct(items: Vec<VocabularyItem>) -> Self {
        Self {
            items,
            theme_fallback: false,
        }
    }
}

/// Run `strategy` over `pool`.
///
/// `manual_ids` is only consulted by the manual strategy and `theme` only by
/// the theme strategy.
pub fn select<R: Rng + ?Sized>(
    strategy: Strategy,
    pool: &[VocabularyItem],
    theme: &str,
    manual_ids: &[VocabId],
    bound: WordBound,
    rng: &mut R,
) -> Result<Selection> {
    match strategy {
        Strategy::Random => Ok(Selection::direct(select_random(pool, bound, rng))),
        Strategy::Manual => select_manual(pool, manual_ids, bound, rng).map(Selection::direct),
        Strategy::Theme => Ok(select_by_theme(pool, theme, bound, rng)),
    }
}

/// Return the pool untouched when it fits, otherwise a shuffled subset of `bound` items.
pub fn select_random<R: Rng + ?Sized>(
    pool: &[VocabularyItem],
    bound: WordBound,
    rng: &mut R,
) -> Vec<VocabularyItem> {
    if pool.len() <= bound.get() {
        return pool.to_vec();
    }

    debug!(pool = pool.len(), bound = bound.get(), "Sampling vocabulary");
    let mut items = pool.to_vec();
    items.shuffle(rng);
    items.truncate(bound.get());
    items
}

/// Keep the pool items the learner picked, in pool order.
///
/// Fails with [`TutorError::NoSelection`] when none of the ids are in the pool.
pub fn select_manual<R: Rng + ?Sized>(
    pool: &[VocabularyItem],
    ids: &[VocabId],
    bound: WordBound,
    rng: &mut R,
) -> Result<Vec<VocabularyItem>> {
    let wanted: HashSet<VocabId> = ids.iter().copied().collect();
    let picked: Vec<VocabularyItem> = pool
        .iter()
        .filter(|item| wanted.contains(&item.id))
        .cloned()
        .collect();

    if picked.is_empty() {
        return Err(TutorError::NoSelection);
    }
    Ok(select_random(&picked, bound, rng))
}

/// Split a theme into lowercase alphanumeric tokens.
pub fn theme_tokens(theme: &str) -> Vec<String> {
    theme
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

/// Check whether any token occurs in the item's word or meaning.
pub fn matches_theme(item: &VocabularyItem, tokens: &[String]) -> bool {
    let word = item.word.to_lowercase();
    let meaning = item.meaning.as_deref().map(str::to_lowercase);
    tokens.iter().any(|token| {
        word.contains(token.as_str())
            || meaning.as_deref().is_some_and(|m| m.contains(token.as_str()))
    })
}

/// Prefer items related to the theme, sampling the whole pool when none are.
pub fn select_by_theme<R: Rng + ?Sized>(
    pool: &[VocabularyItem],
    theme: &str,
    bound: WordBound,
    rng: &mut R,
) -> Selection {
    let tokens = theme_tokens(theme);
    if tokens.is_empty() {
        debug!("Theme has no tokens, sampling full pool");
        return Selection {
            items: select_random(pool, bound, rng),
            theme_fallback: true,
        };
    }

    let matched: Vec<VocabularyItem> = pool
        .iter()
        .filter(|item| matches_theme(item, &tokens))
        .cloned()
        .collect();

    if matched.is_empty() {
        debug!(?tokens, "No vocabulary matches theme, sampling full pool");
        return Selection {
            items: select_random(pool, bound, rng),
            theme_fallback: true,
        };
    }

    debug!(matched = matched.len(), "Theme matched vocabulary");
    Selection::direct(select_random(&matched, bound, rng))
}
