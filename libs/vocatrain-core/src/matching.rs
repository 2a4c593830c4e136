//! Answer normalization and typo-tolerant acceptance for typed answers.

use serde::Serialize;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Outcome of judging a typed answer against the expected text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchOutcome {
    /// Whether the answer counts as correct.
    pub ok: bool,
    /// Best edit distance to any accepted candidate (0 on exact match).
    pub distance: usize,
    /// The normalized input on an exact match, `None` otherwise.
    pub matched: Option<String>,
}

const APOSTROPHES: &[char] = &['\u{2019}', '\'', '`', '\u{00B4}'];

const PUNCTUATION: &[char] = &[
    '.', '-', '\u{2013}', '\u{2014}', ',', ':', ';', '!', '?', '\u{00BF}', '\u{00A1}', '(', ')',
    '"', '\u{201C}', '\u{201D}', '\u{00AB}', '\u{00BB}',
];

/// Normalize text for comparison: strip diacritics, drop apostrophes, turn
/// punctuation into spaces, collapse whitespace, lower-case. Total over any
/// input and idempotent.
pub fn normalize(text: &str) -> String {
    let cleaned: String = text
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .filter(|c| !APOSTROPHES.contains(c))
        .map(|c| if PUNCTUATION.contains(&c) { ' ' } else { c })
        .collect();
    cleaned
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Damerau-Levenshtein distance over the normalized forms of `a` and `b`.
/// Insertion, deletion, substitution and adjacent transposition all cost 1.
pub fn edit_distance(a: &str, b: &str) -> usize {
    damerau_levenshtein(&normalize(a), &normalize(b))
}

fn damerau_levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    let m = a.len();
    let n = b.len();

    if m == 0 || n == 0 {
        return m.max(n);
    }

    // Full matrix; the transposition case reaches back two rows.
    let mut dp = vec![vec![0usize; n + 1]; m + 1];
    for (i, row) in dp.iter_mut().enumerate() {
        row[0] = i;
    }
    for j in 0..=n {
        dp[0][j] = j;
    }

    for i in 1..=m {
        for j in 1..=n {
            let cost = if a[i - 1] == b[j - 1] { 0 } else { 1 };

            dp[i][j] = (dp[i - 1][j] + 1) // deletion
                .min(dp[i][j - 1] + 1) // insertion
                .min(dp[i - 1][j - 1] + cost); // substitution

            if i > 1 && j > 1 && a[i - 1] == b[j - 2] && a[i - 2] == b[j - 1] {
                dp[i][j] = dp[i][j].min(dp[i - 2][j - 2] + 1); // transposition
            }
        }
    }

    dp[m][n]
}

/// Decide whether free-text input counts as a correct answer for
/// `expected`, tolerating typos in proportion to the answer length:
/// `threshold = max(1, floor(max_len / 8))` where `max_len` spans the
/// normalized input and the normalized primary expected answer. Alternates
/// widen the accepted candidates but never the threshold.
pub fn is_acceptable(input: &str, expected: &str, alternates: &[String]) -> MatchOutcome {
    let n_input = normalize(input);
    let n_expected = normalize(expected);

    let mut candidates = Vec::with_capacity(alternates.len() + 1);
    candidates.push(n_expected.clone());
    candidates.extend(alternates.iter().map(|alt| normalize(alt)));

    if candidates.iter().any(|c| *c == n_input) {
        return MatchOutcome {
            ok: true,
            distance: 0,
            matched: Some(n_input),
        };
    }

    let best = candidates
        .iter()
        .map(|c| damerau_levenshtein(&n_input, c))
        .min()
        .unwrap_or(usize::MAX);

    let max_len = n_input.chars().count().max(n_expected.chars().count());
    let threshold = (max_len / 8).max(1);

    MatchOutcome {
        ok: best <= threshold,
        distance: best,
        matched: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_strips_diacritics_and_case() {
        assert_eq!(normalize("École"), "ecole");
        assert_eq!(normalize("à bientôt"), "a bientot");
    }

    #[test]
    fn normalize_drops_apostrophes_and_punctuation() {
        assert_eq!(normalize("l'école"), "lecole");
        assert_eq!(normalize("Bonjour, ça va ?"), "bonjour ca va");
        assert_eq!(normalize("  well -  known  "), "well known");
    }

    #[test]
    fn normalize_is_total_and_idempotent() {
        for s in ["", "   ", "déjà-vu!", "Straße", "C'est ça."] {
            let once = normalize(s);
            assert_eq!(normalize(&once), once);
        }
    }

    #[test]
    fn edit_distance_basics() {
        assert_eq!(edit_distance("", ""), 0);
        assert_eq!(edit_distance("abc", ""), 3);
        assert_eq!(edit_distance("", "abc"), 3);
        assert_eq!(edit_distance("kitten", "sitting"), 3);
    }

    #[test]
    fn edit_distance_counts_transposition_once() {
        assert_eq!(edit_distance("maison", "miason"), 1);
        assert_eq!(edit_distance("ab", "ba"), 1);
    }

    #[test]
    fn edit_distance_ignores_accents() {
        assert_eq!(edit_distance("école", "ecole"), 0);
    }

    #[test]
    fn exact_answer_is_distance_zero() {
        let outcome = is_acceptable("la maison", "la maison", &[]);
        assert!(outcome.ok);
        assert_eq!(outcome.distance, 0);
        assert_eq!(outcome.matched.as_deref(), Some("la maison"));
    }

    #[test]
    fn short_answer_tolerates_one_edit() {
        let outcome = is_acceptable("miason", "maison", &[]);
        assert!(outcome.ok);
        assert_eq!(outcome.distance, 1);
        assert!(outcome.matched.is_none());
    }

    #[test]
    fn short_answer_rejects_two_edits() {
        let outcome = is_acceptable("mouson", "maison", &[]);
        assert!(!outcome.ok);
        assert_eq!(outcome.distance, 2);
    }

    #[test]
    fn long_phrase_tolerates_more_edits() {
        // 24 normalized chars -> threshold 3.
        let expected = "je voudrais un cafe noir";
        let outcome = is_acceptable("je voudrais un kafe nir", expected, &[]);
        assert!(outcome.ok);
    }

    #[test]
    fn alternates_widen_acceptance() {
        let alts = vec!["vélo".to_string()];
        let outcome = is_acceptable("velo", "bicyclette", &alts);
        assert!(outcome.ok);
        assert_eq!(outcome.distance, 0);
    }

    #[test]
    fn alternates_do_not_widen_threshold() {
        // Distance to the long alternate is large, threshold comes from the
        // short primary answer only.
        let alts = vec!["une tres longue phrase daccord".to_string()];
        let outcome = is_acceptable("xyzq", "abc", &alts);
        assert!(!outcome.ok);
    }

    #[test]
    fn empty_input_never_panics() {
        let outcome = is_acceptable("", "maison", &[]);
        assert!(!outcome.ok);
        assert_eq!(outcome.distance, 6);
    }
}
