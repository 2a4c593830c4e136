//! SM-2 style scheduling of the next review.
//!
//! [`record_answer`] is the only mutation point for a [`ProgressRecord`]:
//! it bumps the counters, moves the stage gate, derives a 0-5 quality grade
//! from the outcome and the post-update streak, and reschedules the item.
//! It is a deterministic function of `(record, was_correct, mode, now)`.

use chrono::{DateTime, Duration, Utc};

use crate::types::{AnswerEntry, Mode, ProgressRecord};

pub const INITIAL_EASINESS: f64 = 2.5;
pub const MINIMUM_EASINESS: f64 = 1.3;

/// Hours until a missed item comes back around.
const WRONG_RETRY_HOURS: i64 = 12;

/// Apply one answer to a progress record.
pub fn record_answer(record: &mut ProgressRecord, was_correct: bool, mode: Mode, now: DateTime<Utc>) {
    record.seen_count += 1;
    record.answer_log.push(AnswerEntry {
        at: now,
        mode,
        was_correct,
    });

    if was_correct {
        record.correct_count += 1;
        record.streak += 1;
    } else {
        record.wrong_count += 1;
        record.streak = 0;
    }

    // Stage moves by at most one per answer. Stage 2 is terminal forward
    // and permanently unlocks free-text entry; wrong answers regress the
    // stage but never below 0.
    if was_correct {
        if record.stage == 0 {
            record.stage = 1;
        } else if record.stage == 1 {
            record.stage = 2;
            record.free_text_unlocked = true;
        }
    } else if record.stage > 0 {
        record.stage -= 1;
    }

    let grade = grade_for(was_correct, record.streak);
    schedule_next(record, grade, now);
}

/// Quality grade in 0..=5 from the outcome and the post-update streak.
fn grade_for(was_correct: bool, streak: u32) -> u8 {
    if was_correct {
        if streak >= 2 {
            5
        } else {
            4
        }
    } else if streak == 0 {
        2
    } else {
        1
    }
}

fn schedule_next(record: &mut ProgressRecord, grade: u8, now: DateTime<Utc>) {
    if grade >= 3 {
        record.interval_days = match record.interval_days {
            0 => 1,
            1 => 3,
            days => (f64::from(days) * record.easiness).round() as u32,
        };
        let lapse = f64::from(5 - grade);
        record.easiness =
            (record.easiness + 0.1 - lapse * (0.08 + lapse * 0.02)).max(MINIMUM_EASINESS);
        record.due_at = Some(now + Duration::days(i64::from(record.interval_days)));
    } else {
        // Interval resets on every wrong answer, independent of the stage
        // bookkeeping above. Easiness is left alone.
        record.interval_days = 0;
        record.due_at = Some(now + Duration::hours(WRONG_RETRY_HOURS));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const MC: Mode = Mode::MultipleChoiceSourceToTarget;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap()
    }

    #[test]
    fn first_correct_answer_graduates_to_stage_one() {
        let mut record = ProgressRecord::default();
        record_answer(&mut record, true, MC, now());

        assert_eq!(record.seen_count, 1);
        assert_eq!(record.correct_count, 1);
        assert_eq!(record.streak, 1);
        assert_eq!(record.stage, 1);
        assert_eq!(record.interval_days, 1);
        assert_eq!(record.due_at, Some(now() + Duration::days(1)));
        assert!(!record.free_text_unlocked);
    }

    #[test]
    fn second_correct_answer_unlocks_free_text() {
        let mut record = ProgressRecord::default();
        record_answer(&mut record, true, MC, now());
        record_answer(&mut record, true, MC, now());

        assert_eq!(record.streak, 2);
        assert_eq!(record.stage, 2);
        assert_eq!(record.interval_days, 3);
        assert_eq!(record.due_at, Some(now() + Duration::days(3)));
        assert!(record.free_text_unlocked);
    }

    #[test]
    fn third_correct_answer_multiplies_by_easiness() {
        let mut record = ProgressRecord::default();
        record_answer(&mut record, true, MC, now());
        record_answer(&mut record, true, MC, now());
        let easiness = record.easiness;
        record_answer(&mut record, true, MC, now());

        assert_eq!(record.interval_days, (3.0 * easiness).round() as u32);
    }

    #[test]
    fn wrong_answer_from_fresh_state_floors_at_stage_zero() {
        let mut record = ProgressRecord::default();
        record_answer(&mut record, false, MC, now());

        assert_eq!(record.stage, 0);
        assert_eq!(record.streak, 0);
        assert_eq!(record.wrong_count, 1);
        assert_eq!(record.interval_days, 0);
        assert_eq!(record.due_at, Some(now() + Duration::hours(12)));
    }

    #[test]
    fn wrong_answer_regresses_stage_and_resets_interval() {
        let mut record = ProgressRecord::default();
        record_answer(&mut record, true, MC, now());
        record_answer(&mut record, true, MC, now());
        let easiness = record.easiness;
        record_answer(&mut record, false, MC, now());

        assert_eq!(record.stage, 1);
        assert_eq!(record.interval_days, 0);
        assert_eq!(record.easiness, easiness);
        assert!(record.free_text_unlocked);
    }

    #[test]
    fn easiness_never_drops_below_minimum() {
        let mut record = ProgressRecord::default();
        record.easiness = MINIMUM_EASINESS;
        for _ in 0..50 {
            record_answer(&mut record, true, MC, now());
            record_answer(&mut record, false, MC, now());
        }
        assert!(record.easiness >= MINIMUM_EASINESS);
    }

    #[test]
    fn strong_streak_raises_easiness() {
        let mut record = ProgressRecord::default();
        for _ in 0..3 {
            record_answer(&mut record, true, MC, now());
        }
        // Grade 5 adds the full 0.1 bonus.
        assert!(record.easiness > INITIAL_EASINESS);
    }

    #[test]
    fn stage_stays_in_bounds_under_any_sequence() {
        let mut record = ProgressRecord::default();
        let outcomes = [true, true, true, false, false, false, true, false, true, true];
        for (i, &ok) in outcomes.iter().cycle().take(100).enumerate() {
            let at = now() + Duration::minutes(i as i64);
            record_answer(&mut record, ok, MC, at);
            assert!(record.stage <= 2);
            assert!(record.easiness >= MINIMUM_EASINESS);
        }
        assert_eq!(record.seen_count, 100);
        assert_eq!(record.answer_log.len(), 100);
    }

    #[test]
    fn correct_answer_is_due_later_than_wrong_one() {
        let mut a = ProgressRecord::default();
        let mut b = ProgressRecord::default();
        record_answer(&mut a, true, MC, now());
        record_answer(&mut b, false, MC, now());
        assert!(a.due_at.unwrap() > b.due_at.unwrap());
    }

    #[test]
    fn counters_are_monotonic() {
        let mut record = ProgressRecord::default();
        record_answer(&mut record, true, MC, now());
        record_answer(&mut record, false, MC, now());
        record_answer(&mut record, true, MC, now());
        assert_eq!(record.seen_count, 3);
        assert_eq!(record.correct_count, 2);
        assert_eq!(record.wrong_count, 1);
    }
}
