//! Last-Writer-Wins conflict resolver (spec.md §4.8).

use synctext_types::Update;

/// Returns `true` if `a` and `b` collide: same `line`, overlapping column
/// intervals under the rules in spec.md §4.8.
#[must_use]
pub fn collides(a: &Update, b: &Update) -> bool {
    if a.line != b.line {
        return false;
    }

    let (a_start, a_end) = normalize(a.start_col, a.end_col);
    let (b_start, b_end) = normalize(b.start_col, b.end_col);

    let a_len = a_end - a_start;
    let b_len = b_end - b_start;

    match (a_len == 0, b_len == 0) {
        (true, true) => a_start == b_start,
        (true, false) => a_start >= b_start && a_start < b_end,
        (false, true) => b_start >= a_start && b_start < a_end,
        (false, false) => a_start < b_end && b_start < a_end,
    }
}

fn normalize(start: i64, end: i64) -> (i64, i64) {
    if start <= end {
        (start, end)
    } else {
        (end, start)
    }
}

/// Returns `true` if `a` beats `b` under the LWW predicate: higher `ts`
/// wins, ties broken by lexicographically smaller `uid`.
///
/// This is a total order on distinct `Update`s and is symmetric under
/// swapping `a` and `b` (spec.md §4.8).
#[must_use]
pub fn winner(a: &Update, b: &Update) -> bool {
    if a.ts != b.ts {
        a.ts > b.ts
    } else {
        a.uid < b.uid
    }
}

/// Computes the winners of `batch`: an `O(n^2)` pairwise scan that drops
/// the loser of every colliding pair, in original insertion order.
///
/// `merge` is deterministic given the same input batch regardless of
/// permutation (spec.md §8, "LWW determinism") because `winner` is a total
/// order and every colliding pair is compared directly, not through an
/// order-dependent reduction.
#[must_use]
pub fn merge(batch: &[Update]) -> Vec<Update> {
    let n = batch.len();
    let mut keep = vec![true; n];

    for i in 0..n {
        if !keep[i] {
            continue;
        }
        for j in (i + 1)..n {
            if !keep[j] {
                continue;
            }
            if collides(&batch[i], &batch[j]) {
                if winner(&batch[i], &batch[j]) {
                    keep[j] = false;
                } else {
                    keep[i] = false;
                }
            }
        }
    }

    batch
        .iter()
        .zip(keep)
        .filter_map(|(u, k)| k.then(|| u.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use synctext_types::{Uid, WallClock};

    fn u(line: i64, start: i64, end: i64, ts: u64, uid: &str) -> Update {
        Update::replace(line, start, end, "", "x", WallClock::from_secs(ts), Uid::new(uid).unwrap())
    }

    #[test]
    fn different_lines_never_collide() {
        let a = u(0, 0, 1, 1, "a");
        let b = u(1, 0, 1, 1, "b");
        assert!(!collides(&a, &b));
    }

    #[test]
    fn overlapping_ranges_collide() {
        let a = u(0, 2, 6, 1, "a");
        let b = u(0, 4, 8, 1, "b");
        assert!(collides(&a, &b));
    }

    #[test]
    fn adjacent_ranges_do_not_collide() {
        let a = u(0, 0, 2, 1, "a");
        let b = u(0, 2, 4, 1, "b");
        assert!(!collides(&a, &b));
    }

    #[test]
    fn zero_length_inserts_collide_only_at_same_point() {
        let a = u(0, 3, 3, 1, "a");
        let b = u(0, 3, 3, 1, "b");
        let c = u(0, 4, 4, 1, "c");
        assert!(collides(&a, &b));
        assert!(!collides(&a, &c));
    }

    #[test]
    fn point_inside_range_collides() {
        let range = u(0, 2, 6, 1, "a");
        let point_inside = u(0, 4, 4, 1, "b");
        let point_at_end = u(0, 6, 6, 1, "c");
        assert!(collides(&range, &point_inside));
        assert!(!collides(&range, &point_at_end));
    }

    #[test]
    fn higher_timestamp_wins() {
        let a = u(0, 0, 1, 200, "a");
        let b = u(0, 0, 1, 100, "b");
        assert!(winner(&a, &b));
        assert!(!winner(&b, &a));
    }

    #[test]
    fn tie_breaks_on_uid_lexicographically() {
        let a = u(0, 0, 1, 100, "aaa");
        let b = u(0, 0, 1, 100, "zzz");
        assert!(winner(&a, &b));
        assert!(!winner(&b, &a));
    }

    #[test]
    fn merge_is_symmetric_for_colliding_pair() {
        let a = u(0, 0, 1, 200, "a");
        let b = u(0, 0, 1, 100, "b");
        let winners_ab = merge(&[a.clone(), b.clone()]);
        let winners_ba = merge(&[b, a]);
        assert_eq!(winners_ab.len(), 1);
        assert_eq!(winners_ba.len(), 1);
        assert_eq!(winners_ab[0].ts, winners_ba[0].ts);
    }

    #[test]
    fn non_colliding_batch_is_unchanged() {
        let batch = vec![u(0, 0, 1, 1, "a"), u(1, 0, 1, 1, "b"), u(2, 0, 1, 1, "c")];
        assert_eq!(merge(&batch), batch);
    }

    proptest::proptest! {
        #[test]
        fn merge_is_deterministic_under_permutation(
            seed in proptest::collection::vec((0i64..3, 0i64..5, 0i64..5, 0u64..5, "[a-c]"), 0..8),
        ) {
            let batch: Vec<Update> = seed
                .into_iter()
                .map(|(line, s, e, ts, uid)| u(line, s.min(e), s.max(e), ts, &uid))
                .collect();

            let mut permuted = batch.clone();
            // Reverse is a cheap, deterministic-in-test permutation distinct
            // from the original ordering whenever len > 1.
            permuted.reverse();

            let mut winners_a: Vec<_> = merge(&batch).into_iter().collect();
            let mut winners_b: Vec<_> = merge(&permuted).into_iter().collect();
            winners_a.sort_by(|x, y| (x.line, x.start_col, x.ts, x.uid.as_str()).cmp(&(y.line, y.start_col, y.ts, y.uid.as_str())));
            winners_b.sort_by(|x, y| (x.line, x.start_col, x.ts, x.uid.as_str()).cmp(&(y.line, y.start_col, y.ts, y.uid.as_str())));
            proptest::prop_assert_eq!(winners_a, winners_b);
        }
    }
}
