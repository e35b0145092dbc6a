use std::collections::HashSet;

/// Lowercase and strip punctuation, keeping word characters and whitespace.
///
/// STT engines punctuate inconsistently, so scoring ignores punctuation
/// entirely.
pub(crate) fn normalize_words(text: &str) -> Vec<String> {
    text.to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_' || c.is_whitespace())
        .collect::<String>()
        .split_whitespace()
        .map(str::to_owned)
        .collect()
}

/// Word-level accuracy between expected and transcribed text.
///
/// Uses set intersection: order-independent, case-insensitive, and blind to
/// duplicates beyond membership. Engines may reorder or drop filler words;
/// this measures whether the content words were captured at all. Returns a
/// value in `[0, 1]`, with `0.0` for an empty expected set.
#[must_use]
pub fn word_accuracy(expected: &str, got: &str) -> f64 {
    let expected_words: HashSet<String> = normalize_words(expected).into_iter().collect();
    let got_words: HashSet<String> = normalize_words(got).into_iter().collect();

    if expected_words.is_empty() {
        return 0.0;
    }

    let matched = expected_words.intersection(&got_words).count();
    matched as f64 / expected_words.len() as f64
}

/// Word Error Rate via unit-cost Levenshtein distance over word sequences.
///
/// Unlike `word_accuracy`, this preserves order and duplicates and penalizes
/// insertions, so hallucinated extra words raise the score. Lower is better;
/// `0.0` is perfect and values above `1.0` are possible with many insertions.
///
/// An empty reference returns the hypothesis length: there was nothing to
/// match, so every hypothesis word counts as pure hallucination. This is an
/// unbounded "error rate" on purpose; do not clamp it.
#[must_use]
pub fn word_error_rate(reference: &str, hypothesis: &str) -> f64 {
    let ref_words = normalize_words(reference);
    let hyp_words = normalize_words(hypothesis);

    let n = ref_words.len();
    let m = hyp_words.len();

    if n == 0 {
        return if m > 0 { m as f64 } else { 0.0 };
    }

    // dp[i][j] = edit distance between ref[..i] and hyp[..j]
    let mut dp = vec![vec![0usize; m + 1]; n + 1];
    for (i, row) in dp.iter_mut().enumerate() {
        row[0] = i;
    }
    for j in 0..=m {
        dp[0][j] = j;
    }

    for i in 1..=n {
        for j in 1..=m {
            if ref_words[i - 1] == hyp_words[j - 1] {
                dp[i][j] = dp[i - 1][j - 1];
            } else {
                let deletion = dp[i - 1][j];
                let insertion = dp[i][j - 1];
                let substitution = dp[i - 1][j - 1];
                dp[i][j] = 1 + deletion.min(insertion).min(substitution);
            }
        }
    }

    dp[n][m] as f64 / n as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accuracy_identical_text_is_one() {
        assert_eq!(word_accuracy("hello world", "hello world"), 1.0);
    }

    #[test]
    fn accuracy_empty_hypothesis_is_zero() {
        assert_eq!(word_accuracy("hello world", ""), 0.0);
    }

    #[test]
    fn accuracy_empty_expected_is_zero() {
        assert_eq!(word_accuracy("", "anything at all"), 0.0);
    }

    #[test]
    fn accuracy_is_order_insensitive() {
        assert_eq!(word_accuracy("hello world", "world hello"), 1.0);
    }

    #[test]
    fn accuracy_ignores_case_and_punctuation() {
        assert_eq!(word_accuracy("Hello, World!", "hello world"), 1.0);
    }

    #[test]
    fn accuracy_partial_match() {
        assert_eq!(word_accuracy("hello world", "hello"), 0.5);
    }

    #[test]
    fn wer_identical_text_is_zero() {
        assert_eq!(word_error_rate("hello world", "hello world"), 0.0);
        assert_eq!(word_error_rate("", ""), 0.0);
    }

    #[test]
    fn wer_empty_reference_counts_hypothesis_words() {
        // Documented asymmetry: nothing to match, every word is an error.
        assert_eq!(word_error_rate("", "a b"), 2.0);
    }

    #[test]
    fn wer_single_insertion() {
        assert_eq!(word_error_rate("hello world", "hello there world"), 0.5);
    }

    #[test]
    fn wer_single_substitution() {
        assert_eq!(word_error_rate("hello world", "hello word"), 0.5);
    }

    #[test]
    fn wer_all_deletions() {
        let reference = "one two three four five six seven eight nine ten";
        assert_eq!(word_error_rate(reference, "one two three four five"), 0.5);
    }

    #[test]
    fn wer_exceeds_one_with_many_insertions() {
        let wer = word_error_rate("yes", "yes and also several extra words");
        assert!(wer > 1.0, "expected WER above 1.0, got {wer}");
    }

    #[test]
    fn metrics_are_deterministic() {
        let reference = "the quick brown fox jumps over the lazy dog";
        let hypothesis = "the quick brown fox jumped over a lazy dog";
        let a1 = word_accuracy(reference, hypothesis);
        let a2 = word_accuracy(reference, hypothesis);
        let w1 = word_error_rate(reference, hypothesis);
        let w2 = word_error_rate(reference, hypothesis);
        assert_eq!(a1, a2);
        assert_eq!(w1, w2);
    }
}
