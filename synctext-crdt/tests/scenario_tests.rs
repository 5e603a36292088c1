//! End-to-end scenarios from spec.md §8, exercised at the CRDT layer only
//! (no IPC): local diffs from two peers are merged and applied as the
//! replication engine would.

use synctext_crdt::{apply_updates, diff_lines, merge};
use synctext_types::{Uid, Update, WallClock};

fn lines(v: &[&str]) -> Vec<String> {
    v.iter().map(|s| s.to_string()).collect()
}

fn with_ts(mut u: Update, secs: u64) -> Update {
    u.ts = WallClock::from_secs(secs);
    u
}

#[test]
fn diff_is_inverse_of_apply() {
    let old = lines(&["the quick fox", "second line", ""]);
    let new = lines(&["the slow fox", "second line", "third line"]);
    let uid = Uid::new("a").unwrap();

    let updates = diff_lines(&old, &new, &uid);
    let mut applied = old.clone();
    apply_updates(&mut applied, &updates);
    assert_eq!(applied, new);
}

#[test]
fn scenario_non_conflicting_insert() {
    // Peers A and B start identical, then each appends a different line.
    let base = lines(&["foo", "bar"]);
    let a_doc = lines(&["foo", "bar", "baz"]);
    let b_doc = lines(&["foo", "bar", "qux"]);

    let uid_a = Uid::new("a").unwrap();
    let uid_b = Uid::new("b").unwrap();

    let mut a_updates = diff_lines(&base, &a_doc, &uid_a);
    let mut b_updates = diff_lines(&base, &b_doc, &uid_b);
    for u in &mut a_updates {
        u.ts = WallClock::from_secs(100);
        u.line = 2;
    }
    for u in &mut b_updates {
        u.ts = WallClock::from_secs(101);
        u.line = 3;
    }

    let mut batch = Vec::new();
    batch.extend(a_updates);
    batch.extend(b_updates);
    let winners = merge(&batch);
    assert_eq!(winners.len(), 2);

    let mut doc = base;
    apply_updates(&mut doc, &winners);
    assert_eq!(doc, lines(&["foo", "bar", "baz", "qux"]));
}

#[test]
fn scenario_conflicting_replace_same_span() {
    let base = lines(&["hello"]);
    let uid_a = Uid::new("a").unwrap();
    let uid_b = Uid::new("b").unwrap();

    let a_update = with_ts(
        diff_lines(&base, &lines(&["HELLO"]), &uid_a).remove(0),
        200,
    );
    let b_update = with_ts(
        diff_lines(&base, &lines(&["HeLLo"]), &uid_b).remove(0),
        201,
    );

    let winners = merge(&[a_update, b_update]);
    assert_eq!(winners.len(), 1);
    assert!(winners[0].ts.as_secs() == 201);

    let mut doc = base;
    apply_updates(&mut doc, &winners);
    assert_eq!(doc, lines(&["HeLLo"]));
}

#[test]
fn scenario_insert_at_same_point_tie_breaks_on_uid() {
    let base = lines(&["ab"]);
    let uid_a = Uid::new("a").unwrap();
    let uid_b = Uid::new("b").unwrap();

    let a_update = with_ts(
        diff_lines(&base, &lines(&["aXb"]), &uid_a).remove(0),
        300,
    );
    let b_update = with_ts(
        diff_lines(&base, &lines(&["aXb"]), &uid_b).remove(0),
        300,
    );

    let winners = merge(&[b_update, a_update]);
    assert_eq!(winners.len(), 1);
    assert_eq!(winners[0].uid.as_str(), "a");

    let mut doc = base;
    apply_updates(&mut doc, &winners);
    assert_eq!(doc, lines(&["aXb"]));
}

#[test]
fn scenario_delete_beats_insert_inside_its_span() {
    let base = lines(&["abcdefgh"]);
    let uid_a = Uid::new("a").unwrap();
    let uid_b = Uid::new("b").unwrap();

    // A deletes columns 2..6 ("cdef"); B inserts at column 4, inside that span.
    let a_update = with_ts(
        Update::delete(0, 2, 6, "cdef", WallClock::from_secs(400), uid_a),
        400,
    );
    let b_update = with_ts(
        Update::insert(0, 4, "Z", WallClock::from_secs(399), uid_b),
        399,
    );

    let winners = merge(&[a_update.clone(), b_update]);
    assert_eq!(winners, vec![a_update]);

    let mut doc = base;
    apply_updates(&mut doc, &winners);
    assert_eq!(doc, lines(&["abgh"]));
}
