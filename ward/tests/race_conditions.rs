//! Decide-then-commit under a concurrently changing filesystem.
//!
//! One thread keeps swapping a workspace directory for a junction that
//! leads outside; the others decide and commit writes below it. Whatever
//! interleaving happens, a commit that succeeds must have been made on a
//! path inside the workspace.

mod common;

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::thread;

use common::{host, sandbox, under, OUTSIDE, WS};
use ward::engine::{DenyReason, Operation};
use ward::path::{Canonicalizer, PathRelationship};

const ROUNDS: usize = 500;

#[test]
fn swap_between_check_and_commit_is_refused() {
    let probe = host();
    let sub = under(WS, "sub");
    probe.mkdir_all(&sub).unwrap();
    let sbx = sandbox("workspace-write", &probe);

    let op = Operation::write(under(&sub, "payload.txt"));
    let verdict = sbx.check(&op);
    assert!(verdict.is_allow());

    probe.replace_with_junction(&sub, OUTSIDE).unwrap();
    let err = sbx.commit(&op, &verdict).unwrap_err();
    assert_eq!(err.reason, DenyReason::OutsideRoots);
}

#[test]
fn swap_back_after_check_still_commits() {
    let probe = host();
    let sub = under(WS, "sub");
    probe.mkdir_all(&sub).unwrap();
    let sbx = sandbox("workspace-write", &probe);

    let op = Operation::write(under(&sub, "payload.txt"));
    let verdict = sbx.check(&op);
    probe.replace_with_junction(&sub, OUTSIDE).unwrap();
    probe.remove(&sub).unwrap();
    probe.mkdir_all(&sub).unwrap();

    sbx.commit(&op, &verdict).unwrap();
}

#[test]
fn concurrent_swaps_never_commit_outside() {
    let probe = host();
    let sub = under(WS, "sub");
    probe.mkdir_all(&sub).unwrap();
    let sbx = sandbox("workspace-write", &probe);
    let ws = Canonicalizer::new(&probe).canonicalize(WS, None).unwrap();

    let done = AtomicBool::new(false);
    let committed = AtomicUsize::new(0);

    thread::scope(|s| {
        s.spawn(|| {
            while !done.load(Ordering::Relaxed) {
                probe.replace_with_junction(&sub, OUTSIDE).unwrap();
                thread::yield_now();
                probe.remove(&sub).unwrap();
                probe.mkdir_all(&sub).unwrap();
                thread::yield_now();
            }
        });

        let workers: Vec<_> = (0..4)
            .map(|n| {
                let op = Operation::write(under(&sub, &format!("worker{n}.txt")));
                let (sbx, ws, committed) = (&sbx, &ws, &committed);
                s.spawn(move || {
                    for _ in 0..ROUNDS {
                        let verdict = sbx.check(&op);
                        match sbx.commit(&op, &verdict) {
                            Ok(()) => {
                                let target = verdict.target().unwrap();
                                assert!(
                                    PathRelationship::is_within(target, ws),
                                    "committed {target} outside the workspace"
                                );
                                committed.fetch_add(1, Ordering::Relaxed);
                            }
                            Err(denied) => assert!(
                                matches!(
                                    denied.reason,
                                    DenyReason::OutsideRoots | DenyReason::AncestryChanged
                                ),
                                "unexpected reason {}",
                                denied.reason
                            ),
                        }
                    }
                })
            })
            .collect();

        for worker in workers {
            worker.join().unwrap();
        }
        done.store(true, Ordering::Relaxed);
    });

    assert!(committed.load(Ordering::Relaxed) <= 4 * ROUNDS);
}

#[test]
fn concurrent_commits_of_one_verdict_agree() {
    let probe = host();
    let sbx = sandbox("workspace-write", &probe);
    let op = Operation::create(under(WS, "shared.txt"));
    let verdict = sbx.check(&op);
    assert!(verdict.is_allow());

    thread::scope(|s| {
        let handles: Vec<_> = (0..8)
            .map(|_| s.spawn(|| sbx.commit(&op, &verdict)))
            .collect();
        for handle in handles {
            assert!(handle.join().unwrap().is_ok());
        }
    });
}

#[test]
fn decisions_are_stable_without_changes() {
    let probe = host();
    let sbx = sandbox("workspace-write", &probe);
    let ops = [
        Operation::create(under(WS, "a.txt")),
        Operation::create(under(OUTSIDE, "b.txt")),
        Operation::mkdir(under(WS, r".git\hooks")),
    ];
    let first: Vec<_> = ops.iter().map(|op| sbx.decide(op)).collect();

    thread::scope(|s| {
        for _ in 0..4 {
            s.spawn(|| {
                for _ in 0..50 {
                    let again: Vec<_> = ops.iter().map(|op| sbx.decide(op)).collect();
                    assert_eq!(again, first);
                }
            });
        }
    });
}
