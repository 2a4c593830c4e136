//! One learner's drilling session: catalog, progress and filters in a
//! single explicit context object. There is no process-wide state; callers
//! own the session and thread their own RNG and clock through it.

use chrono::{DateTime, Utc};
use rand::Rng;

use crate::distractors::{distractors_for, Distractor};
use crate::error::{EngineError, Result};
use crate::matching::{is_acceptable, MatchOutcome};
use crate::modes::draw_mode;
use crate::progress::ProgressStore;
use crate::scheduler::record_answer;
use crate::selector::select_next;
use crate::types::{
    CatalogItem, Direction, Mode, ProgressRecord, SessionFilters, SessionStats, Snapshot,
};

/// A drilling session over one catalog.
#[derive(Debug, Clone)]
pub struct Session {
    items: Vec<CatalogItem>,
    progress: ProgressStore,
    pub filters: SessionFilters,
}

impl Session {
    /// Start a fresh session with default progress for every item.
    pub fn new(items: Vec<CatalogItem>) -> Self {
        let progress = ProgressStore::initialize(&items);
        Self {
            items,
            progress,
            filters: SessionFilters::default(),
        }
    }

    /// Start a session from a persisted snapshot. The snapshot is honored
    /// only when its catalog hash matches `items`, otherwise progress
    /// starts fresh.
    pub fn with_snapshot(items: Vec<CatalogItem>, snapshot: Option<Snapshot>) -> Self {
        let progress = ProgressStore::restore(&items, snapshot);
        Self {
            items,
            progress,
            filters: SessionFilters::default(),
        }
    }

    pub fn items(&self) -> &[CatalogItem] {
        &self.items
    }

    pub fn item(&self, id: &str) -> Option<&CatalogItem> {
        self.items.iter().find(|it| it.id == id)
    }

    pub fn progress(&self) -> &ProgressStore {
        &self.progress
    }

    /// Pick the next item to present under the session filters.
    pub fn next_item<R: Rng + ?Sized>(
        &self,
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> Result<&CatalogItem> {
        select_next(&self.items, &self.progress, &self.filters, now, rng)
    }

    /// Draw a presentation mode for `item` from its record's allowed set.
    pub fn draw_mode<R: Rng + ?Sized>(&self, item: &CatalogItem, rng: &mut R) -> Result<Mode> {
        let record = self.record(&item.id)?;
        Ok(draw_mode(record, item, rng))
    }

    /// Wrong answers for a multiple-choice presentation of `target`.
    pub fn distractors<R: Rng + ?Sized>(
        &self,
        target: &CatalogItem,
        count: usize,
        direction: Direction,
        rng: &mut R,
    ) -> Vec<Distractor> {
        distractors_for(&self.items, target, count, direction, rng)
    }

    /// Judge free-text input against the item's target text and alternates.
    pub fn check_answer(&self, item: &CatalogItem, input: &str) -> MatchOutcome {
        is_acceptable(input, &item.target_text, &item.alternates)
    }

    /// Record an answer outcome for the item with `id`, updating its
    /// schedule. The id must resolve to a known record.
    pub fn record_answer(
        &mut self,
        id: &str,
        was_correct: bool,
        mode: Mode,
        now: DateTime<Utc>,
    ) -> Result<&ProgressRecord> {
        let record = self
            .progress
            .get_mut(id)
            .ok_or_else(|| EngineError::UnknownItem { id: id.to_string() })?;
        record_answer(record, was_correct, mode, now);
        Ok(&*record)
    }

    pub fn stats(&self, now: DateTime<Utc>) -> SessionStats {
        self.progress.stats(now)
    }

    /// Export the progress for persistence.
    pub fn snapshot(&self, now: DateTime<Utc>) -> Snapshot {
        self.progress.snapshot(&self.items, now)
    }

    /// Throw away all learning state for this catalog.
    pub fn reset(&mut self) {
        self.progress.reset(&self.items);
    }

    fn record(&self, id: &str) -> Result<&ProgressRecord> {
        self.progress
            .get(id)
            .ok_or_else(|| EngineError::UnknownItem { id: id.to_string() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::from_csv;
    use chrono::TimeZone;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn session() -> Session {
        let items = from_csv(
            "id,source,target,alts_target,type,tags\n\
             a,the house,la maison,,word,home\n\
             b,the cat,le chat,,word,animals\n\
             c,good morning,bonjour,salut,word,greetings\n",
        )
        .unwrap();
        Session::new(items)
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap()
    }

    #[test]
    fn answers_flow_through_to_the_record() {
        let mut session = session();
        let stage = session
            .record_answer("a", true, Mode::MultipleChoiceSourceToTarget, now())
            .unwrap()
            .stage;
        assert_eq!(stage, 1);
        assert_eq!(session.stats(now()).unseen, 2);
    }

    #[test]
    fn unknown_item_is_a_precondition_error() {
        let mut session = session();
        let err = session
            .record_answer("nope", true, Mode::MultipleChoiceSourceToTarget, now())
            .unwrap_err();
        assert_eq!(
            err,
            EngineError::UnknownItem {
                id: "nope".to_string()
            }
        );
    }

    #[test]
    fn check_answer_accepts_alternates() {
        let session = session();
        let item = session.item("c").unwrap().clone();
        assert!(session.check_answer(&item, "salut").ok);
        assert!(session.check_answer(&item, "bonjour").ok);
        assert!(!session.check_answer(&item, "zzz").ok);
    }

    #[test]
    fn snapshot_survives_a_session_round_trip() {
        let mut session = session();
        session
            .record_answer("a", true, Mode::MultipleChoiceSourceToTarget, now())
            .unwrap();
        let snapshot = session.snapshot(now());

        let reloaded = Session::with_snapshot(session.items().to_vec(), Some(snapshot));
        assert_eq!(reloaded.progress().get("a").unwrap().stage, 1);
    }

    #[test]
    fn reset_discards_learning_state() {
        let mut session = session();
        session
            .record_answer("a", true, Mode::MultipleChoiceSourceToTarget, now())
            .unwrap();
        session.reset();
        assert_eq!(session.stats(now()).unseen, 3);
    }

    #[test]
    fn next_item_respects_filters() {
        let mut session = session();
        session.filters.include_words = false;
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        assert_eq!(
            session.next_item(now(), &mut rng),
            Err(EngineError::EmptyPool)
        );
    }
}
