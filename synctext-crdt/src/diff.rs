//! Line diff (spec.md §4.2): derives a minimal list of `Update`s from two
//! line vectors.

use synctext_types::{Uid, Update, WallClock};

/// Computes the `Update`s that turn `old` into `new`, attributing each to
/// `uid` at the current wall-clock second.
///
/// For each index `i < max(old.len(), new.len())` (treating a missing
/// index as an empty line):
/// - unchanged lines emit nothing;
/// - empty → non-empty emits an `insert` at column 0;
/// - non-empty → empty emits a `delete` over the whole line;
/// - otherwise a `replace` is computed from the longest common
///   prefix/suffix, with the word-boundary expansion policy applied when
///   the resulting middle is empty (see [`expand_to_word_boundary`]).
#[must_use]
pub fn diff_lines(old: &[String], new: &[String], uid: &Uid) -> Vec<Update> {
    let ts = WallClock::now();
    let max_n = old.len().max(new.len());
    let mut updates = Vec::new();

    for i in 0..max_n {
        let old_line = old.get(i).map(String::as_str).unwrap_or("");
        let new_line = new.get(i).map(String::as_str).unwrap_or("");

        if old_line == new_line {
            continue;
        }

        let line = i as i64;

        if old_line.is_empty() && !new_line.is_empty() {
            updates.push(Update::insert(line, 0, new_line, ts, uid.clone()));
            continue;
        }

        if !old_line.is_empty() && new_line.is_empty() {
            updates.push(Update::delete(
                line,
                0,
                old_line.len() as i64,
                old_line,
                ts,
                uid.clone(),
            ));
            continue;
        }

        updates.push(diff_replace(line, old_line, new_line, ts, uid));
    }

    updates
}

fn diff_replace(line: i64, old_line: &str, new_line: &str, ts: WallClock, uid: &Uid) -> Update {
    let old_bytes = old_line.as_bytes();
    let new_bytes = new_line.as_bytes();

    let mut prefix = 0usize;
    while prefix < old_bytes.len()
        && prefix < new_bytes.len()
        && old_bytes[prefix] == new_bytes[prefix]
    {
        prefix += 1;
    }

    let mut suffix = 0usize;
    while suffix < old_bytes.len() - prefix
        && suffix < new_bytes.len() - prefix
        && old_bytes[old_bytes.len() - suffix - 1] == new_bytes[new_bytes.len() - suffix - 1]
    {
        suffix += 1;
    }

    let mut start = prefix;
    let end_old = old_bytes.len() - suffix;
    let end_new = new_bytes.len() - suffix;

    let mut prev_mid = old_line[start..end_old].to_string();
    let mut next_mid = new_line[start..end_new].to_string();

    if prev_mid.is_empty() && start > 0 {
        start = expand_to_word_boundary(old_bytes, start);
        prev_mid = old_line[start..end_old].to_string();
        next_mid = new_line[start..end_new].to_string();
    }

    Update::replace(
        line,
        start as i64,
        (start + prev_mid.len()) as i64,
        prev_mid,
        next_mid,
        ts,
        uid.clone(),
    )
}

/// Word-boundary expansion policy (spec.md §4.2): when a zero-width
/// `replace` middle falls inside a word, walk `start` left until the
/// preceding byte is a space or the start of the line.
///
/// This keeps two peers with divergent tokenization from producing
/// column-incompatible zero-width inserts for what a human would call the
/// same edit (spec.md §9, "LWW resolution policy").
fn expand_to_word_boundary(old_bytes: &[u8], start: usize) -> usize {
    let mut expand = start;
    if expand > 0 {
        expand -= 1;
    }
    while expand > 0 && old_bytes[expand - 1] != b' ' {
        expand -= 1;
    }
    expand
}
