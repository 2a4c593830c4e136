//! Core types for the drilling engine.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::scheduler::INITIAL_EASINESS;

/// Kind of catalog item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Word,
    Sentence,
}

impl Default for ItemKind {
    fn default() -> Self {
        Self::Word
    }
}

/// Translation direction of a prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    SourceToTarget,
    TargetToSource,
}

/// Exercise mode. The gate in [`crate::modes`] decides which of these a
/// record's stage currently permits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    MultipleChoiceSourceToTarget,
    MultipleChoiceTargetToSource,
    FreeTextSourceToTarget,
    MatchFive,
    ListenMultipleChoice,
    ListenFreeText,
    SentenceConstruction,
}

impl Mode {
    /// Get the mode name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MultipleChoiceSourceToTarget => "multiple_choice_source_to_target",
            Self::MultipleChoiceTargetToSource => "multiple_choice_target_to_source",
            Self::FreeTextSourceToTarget => "free_text_source_to_target",
            Self::MatchFive => "match_five",
            Self::ListenMultipleChoice => "listen_multiple_choice",
            Self::ListenFreeText => "listen_free_text",
            Self::SentenceConstruction => "sentence_construction",
        }
    }
}

/// One drillable catalog entry, immutable for the lifetime of a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogItem {
    /// Stable identity across sessions. Derived from the normalized target
    /// text when the source data carries none.
    pub id: String,
    pub source_text: String,
    pub target_text: String,
    /// Additional acceptable target-language answers.
    #[serde(default)]
    pub alternates: Vec<String>,
    /// Additional source-language renderings.
    #[serde(default)]
    pub alternates_source: Vec<String>,
    pub kind: ItemKind,
    /// Topic labels, used for distractor affinity.
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub notes: String,
    /// Ordered tokens of `target_text` for sentence construction.
    #[serde(default)]
    pub target_tokens: Vec<String>,
}

/// One logged answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerEntry {
    pub at: DateTime<Utc>,
    pub mode: Mode,
    pub was_correct: bool,
}

/// Per-item learning state. Mutated only by
/// [`crate::scheduler::record_answer`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressRecord {
    pub seen_count: u32,
    pub correct_count: u32,
    pub wrong_count: u32,
    /// Consecutive-correct counter, reset to 0 on any wrong answer.
    pub streak: u32,
    /// Difficulty-unlock level in 0..=2, gates exercise modes.
    pub stage: u8,
    /// SM-2 easiness factor, never below 1.3.
    pub easiness: f64,
    /// Days until the next review. 0 means due now.
    pub interval_days: u32,
    /// `None` until the first answer is recorded (always due).
    pub due_at: Option<DateTime<Utc>>,
    /// Latched true once the record first reaches stage 2.
    pub free_text_unlocked: bool,
    /// Append-only answer history. Only the most recent three entries feed
    /// the selector's recency-wrong bonus.
    #[serde(default)]
    pub answer_log: Vec<AnswerEntry>,
}

impl Default for ProgressRecord {
    fn default() -> Self {
        Self {
            seen_count: 0,
            correct_count: 0,
            wrong_count: 0,
            streak: 0,
            stage: 0,
            easiness: INITIAL_EASINESS,
            interval_days: 0,
            due_at: None,
            free_text_unlocked: false,
            answer_log: Vec::new(),
        }
    }
}

impl ProgressRecord {
    /// Whether the item is eligible for "due" filtering.
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.due_at.map_or(true, |due| due <= now)
    }

    /// True when any of the last three logged answers was wrong.
    pub fn recently_wrong(&self) -> bool {
        self.answer_log.iter().rev().take(3).any(|e| !e.was_correct)
    }
}

/// Candidate filters for item selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionFilters {
    pub only_due: bool,
    pub include_words: bool,
    pub include_sentences: bool,
}

impl Default for SessionFilters {
    fn default() -> Self {
        Self {
            only_due: false,
            include_words: true,
            include_sentences: true,
        }
    }
}

/// Aggregate progress counters for a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStats {
    pub total: usize,
    pub unseen: usize,
    pub due: usize,
    pub streak_sum: u32,
}

/// Snapshot metadata used to decide whether persisted progress still
/// belongs to the current catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotMeta {
    pub catalog_hash: String,
    pub updated_at: DateTime<Utc>,
}

/// Serializable progress snapshot. Where the bytes live is the caller's
/// business; the engine only defines the shape and the reuse rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub progress: HashMap<String, ProgressRecord>,
    pub meta: SnapshotMeta,
}
