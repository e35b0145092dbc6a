// Integration tests for the accuracy metrics.
//
// These pin down the exact scoring semantics shared by every engine
// benchmark, including the empty-reference WER asymmetry.

use stt_harness::{word_accuracy, word_error_rate};

#[test]
fn test_accuracy_perfect_match() {
    assert_eq!(word_accuracy("she sells seashells", "she sells seashells"), 1.0);
}

#[test]
fn test_accuracy_empty_hypothesis() {
    assert_eq!(word_accuracy("she sells seashells", ""), 0.0);
}

#[test]
fn test_wer_perfect_match() {
    assert_eq!(
        word_error_rate("the quick brown fox", "the quick brown fox"),
        0.0
    );
}

#[test]
fn test_wer_empty_reference_asymmetry() {
    // Hypothesis words against an empty reference count one error each.
    assert_eq!(word_error_rate("", ""), 0.0);
    assert_eq!(word_error_rate("", "a b"), 2.0);
}

#[test]
fn test_wer_one_insertion() {
    assert_eq!(word_error_rate("hello world", "hello there world"), 0.5);
}

#[test]
fn test_truncated_hypothesis_end_to_end() {
    // An engine that hears only the first half of a counting stimulus:
    // 5 of 10 expected words captured, and 5 deletions over 10 words.
    let reference = "one two three four five six seven eight nine ten";
    let hypothesis = "one two three four five";

    assert_eq!(word_accuracy(reference, hypothesis), 0.5);
    assert_eq!(word_error_rate(reference, hypothesis), 0.5);
}

#[test]
fn test_normalization_is_shared() {
    // Case and punctuation differences do not count as errors in either
    // metric.
    let reference = "The total is $42.50 today";
    let hypothesis = "the total is 4250 today";

    assert_eq!(word_accuracy(reference, hypothesis), 1.0);
    assert_eq!(word_error_rate(reference, hypothesis), 0.0);
}
