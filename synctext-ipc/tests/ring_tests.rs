//! Full-ring scenario (spec.md §8, scenario 5), scaled down to a small
//! capacity so the overflow condition is reached without a 4096-message
//! fixture.

use synctext_ipc::RecvRing;

#[test]
fn producer_observes_backpressure_when_ring_fills() {
    let ring: RecvRing<4> = RecvRing::new();
    assert!(ring.push("a".into()));
    assert!(ring.push("b".into()));
    assert!(ring.push("c".into()));
    assert!(!ring.push("d".into()), "ring should report full, not overwrite");

    // Draining one slot makes room for exactly one more push.
    assert_eq!(ring.pop().as_deref(), Some("a"));
    assert!(ring.push("d".into()));
    assert!(!ring.push("e".into()));

    assert_eq!(ring.drain(), vec!["b", "c", "d"]);
}

#[test]
fn no_message_is_duplicated_or_lost_across_a_wraparound() {
    let ring: RecvRing<4> = RecvRing::new();
    let mut received = Vec::new();

    for round in 0..10 {
        assert!(ring.push(format!("msg-{round}")));
        assert!(ring.push(format!("msg-{round}-b")));
        received.extend(ring.drain());
    }

    let expected: Vec<String> = (0..10)
        .flat_map(|round| vec![format!("msg-{round}"), format!("msg-{round}-b")])
        .collect();
    assert_eq!(received, expected);
}
