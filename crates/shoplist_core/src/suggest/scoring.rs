//! Match scoring and ranking.
//!
//! Score ladder (case-insensitive):
//! - exact: 1000
//! - prefix: 500
//! - substring: 200
//! - query of 3+ chars, whole-name edit distance `d <= len/2`: `100 - 20d`
//! - otherwise best single-word distance `w <= len/2`: `80 - 15w`
//! - anything else: 0, excluded
//!
//! Final score adds `usage_count / 10`.

use crate::model::history::{HistoryEntry, Suggestion};

const EXACT_SCORE: i64 = 1000;
const PREFIX_SCORE: i64 = 500;
const SUBSTRING_SCORE: i64 = 200;
const FUZZY_NAME_BASE: i64 = 100;
const FUZZY_NAME_STEP: i64 = 20;
const FUZZY_WORD_BASE: i64 = 80;
const FUZZY_WORD_STEP: i64 = 15;
const MIN_FUZZY_QUERY_CHARS: usize = 3;
const USAGE_BOOST_DIVISOR: i64 = 10;

/// Levenshtein distance over lowercased Unicode scalar values.
pub fn edit_distance(a: &str, b: &str) -> usize {
    let a = a.to_lowercase().chars().collect::<Vec<_>>();
    let b = b.to_lowercase().chars().collect::<Vec<_>>();
    folded_distance(&a, &b)
}

fn folded_distance(a: &[char], b: &[char]) -> usize {
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev = (0..=b.len()).collect::<Vec<_>>();
    let mut curr = vec![0; b.len() + 1];
    for (i, a_char) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, b_char) in b.iter().enumerate() {
            let substitution = prev[j] + usize::from(a_char != b_char);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(substitution);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

/// Relevance of `name` for `query` before the usage boost; `0` means no match.
pub fn base_score(name: &str, query: &str) -> i64 {
    let name = name.to_lowercase();
    let query = query.to_lowercase();

    if name == query {
        return EXACT_SCORE;
    }
    if name.starts_with(&query) {
        return PREFIX_SCORE;
    }
    if name.contains(&query) {
        return SUBSTRING_SCORE;
    }

    let query_chars = query.chars().collect::<Vec<_>>();
    if query_chars.len() < MIN_FUZZY_QUERY_CHARS {
        return 0;
    }
    let max_distance = query_chars.len() / 2;

    let name_chars = name.chars().collect::<Vec<_>>();
    let distance = folded_distance(&name_chars, &query_chars);
    if distance <= max_distance {
        return FUZZY_NAME_BASE - FUZZY_NAME_STEP * distance as i64;
    }

    let best_word = name
        .split_whitespace()
        .map(|word| folded_distance(&word.chars().collect::<Vec<_>>(), &query_chars))
        .min();
    match best_word {
        Some(distance) if distance <= max_distance => {
            FUZZY_WORD_BASE - FUZZY_WORD_STEP * distance as i64
        }
        _ => 0,
    }
}

/// Scores, filters and orders candidates, keeping at most `limit`.
///
/// Order: final score desc, then usage count desc. Remaining ties keep the
/// candidate pool order.
pub fn rank_candidates(
    candidates: Vec<HistoryEntry>,
    query: &str,
    limit: usize,
) -> Vec<Suggestion> {
    let mut scored = candidates
        .into_iter()
        .filter_map(|entry| {
            let base = base_score(&entry.name, query);
            (base > 0).then(|| (base + entry.usage_count / USAGE_BOOST_DIVISOR, entry))
        })
        .collect::<Vec<_>>();

    scored.sort_by(|(left_score, left), (right_score, right)| {
        right_score
            .cmp(left_score)
            .then_with(|| right.usage_count.cmp(&left.usage_count))
    });

    scored
        .into_iter()
        .take(limit)
        .map(|(_, entry)| Suggestion::from(entry))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{base_score, edit_distance, rank_candidates};
    use crate::model::history::HistoryEntry;
    use uuid::Uuid;

    fn entry(name: &str, usage_count: i64) -> HistoryEntry {
        HistoryEntry {
            uuid: Uuid::new_v4(),
            name: name.to_string(),
            last_section_uuid: None,
            last_section_name: None,
            usage_count,
            last_used_at: 0,
        }
    }

    #[test]
    fn edit_distance_is_case_insensitive() {
        assert_eq!(edit_distance("Kitten", "sitting"), 3);
        assert_eq!(edit_distance("MILK", "milk"), 0);
        assert_eq!(edit_distance("", "abc"), 3);
        assert_eq!(edit_distance("Äpfel", "äpfel"), 0);
    }

    #[test]
    fn score_ladder_matches_match_kind() {
        assert_eq!(base_score("Milk", "milk"), 1000);
        assert_eq!(base_score("Milkshake", "MILK"), 500);
        assert_eq!(base_score("Almond Milk", "milk"), 200);
        assert_eq!(base_score("Silk", "milk"), 80);
        assert_eq!(base_score("Bread", "milk"), 0);
    }

    #[test]
    fn short_queries_skip_fuzzy_matching() {
        assert_eq!(base_score("ab", "ac"), 0);
        assert_eq!(base_score("abc", "abd"), 80);
    }

    #[test]
    fn word_match_uses_best_word() {
        // Whole name is too far away; "tomatos" is one edit from "tomatoes".
        assert_eq!(base_score("canned tomatos whole", "tomatoes"), 65);
    }

    #[test]
    fn ranking_orders_exact_substring_fuzzy() {
        let ranked = rank_candidates(
            vec![entry("Silk", 1), entry("Almond Milk", 20), entry("Milk", 5)],
            "milk",
            10,
        );
        let names = ranked.iter().map(|s| s.name.as_str()).collect::<Vec<_>>();
        assert_eq!(names, vec!["Milk", "Almond Milk", "Silk"]);
    }

    #[test]
    fn usage_breaks_score_ties_and_limit_applies() {
        let ranked = rank_candidates(
            vec![entry("Eggs large", 2), entry("Eggs small", 9), entry("Eggplant", 1)],
            "egg",
            2,
        );
        let names = ranked.iter().map(|s| s.name.as_str()).collect::<Vec<_>>();
        assert_eq!(names, vec!["Eggs small", "Eggs large"]);
    }

    #[test]
    fn usage_boost_never_creates_a_match() {
        let ranked = rank_candidates(vec![entry("Bread", 10_000)], "milk", 10);
        assert!(ranked.is_empty());
    }
}
