//! Diff-inverse property and word-boundary expansion cases at the public
//! API surface (spec.md §8, §4.2).

use synctext_crdt::{apply_updates, diff_lines};
use synctext_types::Uid;

fn uid() -> Uid {
    Uid::new("diff-tester").unwrap()
}

#[test]
fn diffing_then_applying_reaches_the_new_state() {
    let old = vec!["one".to_string(), "two".to_string(), "three".to_string()];
    let new = vec!["one".to_string(), "TWO".to_string(), "three".to_string(), "four".to_string()];

    let updates = diff_lines(&old, &new, &uid());
    let mut applied = old;
    apply_updates(&mut applied, &updates);

    assert_eq!(applied, new);
}

#[test]
fn word_boundary_expansion_keeps_replace_non_empty_mid_word() {
    // A naive diff of "foo bar" -> "foo Xbar" produces a zero-width insert
    // right on the space/word boundary at column 4; the expansion policy
    // widens it leftward so the replace middle is never zero-width.
    let old = vec!["foo bar".to_string()];
    let new = vec!["foo Xbar".to_string()];

    let updates = diff_lines(&old, &new, &uid());
    assert_eq!(updates.len(), 1);
    assert!(!updates[0].prev.is_empty(), "replace middle should not be zero-width");

    let mut applied = old;
    apply_updates(&mut applied, &updates);
    assert_eq!(applied, new);
}

#[test]
fn no_diff_for_identical_documents() {
    let lines = vec!["same".to_string(), "same again".to_string()];
    assert!(diff_lines(&lines, &lines, &uid()).is_empty());
}
