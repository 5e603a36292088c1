//! Peer churn scenario (spec.md §8, scenario 6): a peer registers,
//! releases, and a different peer can then claim the freed slot.

use synctext_ipc::Registry;
use synctext_types::Uid;

fn test_uid(tag: &str) -> Uid {
    Uid::new(format!("it{}-{}", std::process::id(), tag)).unwrap()
}

#[test]
fn released_slot_is_reusable_by_a_different_peer() {
    let reg = Registry::open().unwrap();
    let first = test_uid("churn-a");
    let second = test_uid("churn-b");

    let slot = reg.register(&first).unwrap();
    assert!(reg.snapshot().iter().any(|p| p.uid == first.as_str()));

    reg.release(slot);
    assert!(!reg.snapshot().iter().any(|p| p.uid == first.as_str()));

    let reused = reg.register(&second).unwrap();
    assert_eq!(reused.0, slot.0);
    assert!(reg.snapshot().iter().any(|p| p.uid == second.as_str()));

    reg.release(reused);
}

#[test]
fn snapshot_excludes_inactive_slots_even_if_uid_bytes_linger() {
    let reg = Registry::open().unwrap();
    let uid = test_uid("linger");
    let slot = reg.register(&uid).unwrap();
    reg.release(slot);
    // release() clears uid bytes too, but the invariant under test is the
    // `active == 1 AND uid non-empty` rule itself, not just the clearing.
    assert!(!reg.snapshot().iter().any(|p| p.uid == uid.as_str()));
}
