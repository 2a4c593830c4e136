//! Tag-biased wrong answers for multiple-choice modes.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::types::{CatalogItem, Direction};

/// One multiple-choice wrong answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Distractor {
    pub id: String,
    pub text: String,
}

/// Choose up to `count` plausible wrong answers for `target`.
///
/// Items sharing at least one tag with the target come first (topically
/// related distractors are harder), the remainder fills up the rest; both
/// partitions are shuffled independently. Returns `min(count, pool size)`
/// entries, never the target itself.
pub fn distractors_for<R: Rng + ?Sized>(
    items: &[CatalogItem],
    target: &CatalogItem,
    count: usize,
    direction: Direction,
    rng: &mut R,
) -> Vec<Distractor> {
    let mut tag_matches: Vec<&CatalogItem> = Vec::new();
    let mut rest: Vec<&CatalogItem> = Vec::new();

    for item in items.iter().filter(|it| it.id != target.id) {
        if item.tags.iter().any(|t| target.tags.contains(t)) {
            tag_matches.push(item);
        } else {
            rest.push(item);
        }
    }

    tag_matches.shuffle(rng);
    rest.shuffle(rng);

    tag_matches
        .into_iter()
        .chain(rest)
        .take(count)
        .map(|it| Distractor {
            id: it.id.clone(),
            text: match direction {
                Direction::SourceToTarget => it.target_text.clone(),
                Direction::TargetToSource => it.source_text.clone(),
            },
        })
        .collect()
}
