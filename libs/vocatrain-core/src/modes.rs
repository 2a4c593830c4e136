//! Stage-gated exercise mode selection.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::types::{CatalogItem, ItemKind, Mode, ProgressRecord};

const STAGE_ZERO: &[Mode] = &[Mode::MultipleChoiceSourceToTarget];

const STAGE_ONE: &[Mode] = &[
    Mode::MultipleChoiceTargetToSource,
    Mode::MultipleChoiceSourceToTarget,
];

const STAGE_TWO: &[Mode] = &[
    Mode::MultipleChoiceSourceToTarget,
    Mode::MultipleChoiceTargetToSource,
    Mode::FreeTextSourceToTarget,
    Mode::MatchFive,
    Mode::ListenMultipleChoice,
    Mode::ListenFreeText,
    Mode::SentenceConstruction,
];

/// Modes the record's stage currently permits. Stage 0 is recognition
/// only, stage 1 adds the reverse direction, stage 2 and above opens
/// everything including production modes.
pub fn allowed_modes(record: &ProgressRecord) -> &'static [Mode] {
    match record.stage {
        0 => STAGE_ZERO,
        1 => STAGE_ONE,
        _ => STAGE_TWO,
    }
}

/// Draw a presentation mode for `item` uniformly from its allowed set.
///
/// The gate may offer a mode the item cannot support; re-drawing is the
/// caller's responsibility, and this helper implements it for the one
/// built-in case: sentence construction is excluded for non-sentence
/// items.
pub fn draw_mode<R: Rng + ?Sized>(record: &ProgressRecord, item: &CatalogItem, rng: &mut R) -> Mode {
    let allowed = allowed_modes(record);
    if item.kind == ItemKind::Sentence {
        return allowed
            .choose(rng)
            .copied()
            .unwrap_or(Mode::MultipleChoiceSourceToTarget);
    }
    let supported: Vec<Mode> = allowed
        .iter()
        .copied()
        .filter(|m| *m != Mode::SentenceConstruction)
        .collect();
    supported
        .choose(rng)
        .copied()
        .unwrap_or(Mode::MultipleChoiceSourceToTarget)
}
