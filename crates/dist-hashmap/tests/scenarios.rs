// Copyright The kmer-assemble Project Authors. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use dist_hashmap::{DistHashMap, Keyed};
use rma::{local_job, LocalSubstrate, Substrate};
use std::sync::Arc;

/// A minimal record for exercising the table without pulling in the
/// k-mer model: a `u64` key carrying its own hash, a `u64` payload.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct Record {
    key: u64,
    payload: u64,
}

impl Keyed for Record {
    type Key = u64;

    fn key(&self) -> u64 {
        self.key
    }

    /// Identity hash: lets tests place keys at exact, predictable slots.
    fn hash64(key: &u64) -> u64 {
        *key
    }
}

fn spawn_ranks(rank_n: usize) -> Vec<LocalSubstrate> {
    local_job(rank_n).expect("rank_n > 0")
}

fn run_on_ranks<F>(ranks: Vec<LocalSubstrate>, body: F)
where
    F: Fn(LocalSubstrate) + Send + Sync + 'static,
{
    let body = Arc::new(body);
    let handles: Vec<_> = ranks
        .into_iter()
        .map(|rank| {
            let body = body.clone();
            std::thread::spawn(move || body(rank))
        })
        .collect();
    for h in handles {
        h.join().expect("rank thread panicked");
    }
}

/// Like `run_on_ranks`, but returns each rank's result so callers can
/// inspect what every concurrent participant actually observed.
fn run_on_ranks_collecting<F, R>(ranks: Vec<LocalSubstrate>, body: F) -> Vec<R>
where
    F: Fn(LocalSubstrate) -> R + Send + Sync + 'static,
    R: Send + 'static,
{
    let body = Arc::new(body);
    let handles: Vec<_> = ranks
        .into_iter()
        .map(|rank| {
            let body = body.clone();
            std::thread::spawn(move || body(rank))
        })
        .collect();
    handles
        .into_iter()
        .map(|h| h.join().expect("rank thread panicked"))
        .collect()
}

/// Two ranks race to insert the same key into the same table
/// concurrently, with no barrier between them: the atomic fetch-and-add
/// on the shared reservation counter must still arbitrate a single
/// winner, the same way it would under genuine network-level
/// contention.
#[test]
fn two_process_collision_resolves_by_linear_probe() {
    let ranks = spawn_ranks(2);
    let mut counts = run_on_ranks_collecting(ranks, |substrate| {
        let table = DistHashMap::construct(substrate, 8).unwrap();
        futures::executor::block_on(table.insert(Record {
            key: 3,
            payload: 100,
        }))
    });
    counts.sort_unstable();
    assert_eq!(
        counts,
        vec![1, 2],
        "exactly one rank must win the natural slot and the other must probe one step"
    );
}

/// A key whose natural slot is the last slot in the table must wrap
/// around through slot 0 on repeated collision, and once every slot is
/// claimed, insertion fails permanently.
#[test]
fn probe_sequence_wraps_around_table_end() {
    let ranks = spawn_ranks(1);
    run_on_ranks(ranks, |substrate| {
        let table = DistHashMap::construct(substrate, 4).unwrap();
        futures::executor::block_on(async {
            // Every key below hashes to slot 3 (key % 4 == 3), so each
            // successive insert must probe one slot further: 3, then
            // wrapped 0, 1, 2.
            for (payload, expected_count) in [(1u64, 1usize), (2, 2), (3, 3), (4, 4)] {
                let count = table.insert(Record { key: 3, payload }).await;
                assert_eq!(count, expected_count);
            }
            let overflow = table.insert(Record { key: 3, payload: 5 }).await;
            assert_eq!(overflow, 0, "table is full once all 4 slots are claimed");
        });
    });
}

/// Inserting up to half the table's capacity (the reference load factor)
/// must always succeed for every key, across many ranks.
#[test]
fn load_factor_stress_all_inserts_succeed() {
    use rand::{rngs::StdRng, Rng, SeedableRng};

    let rank_n = 4;
    let capacity = 4096usize;
    let keys_per_rank = 400usize; // total 1600, load factor 0.39
    let ranks = spawn_ranks(rank_n);

    run_on_ranks(ranks, move |substrate| {
        let rank_me = substrate.rank_me();
        let table = DistHashMap::construct(substrate, capacity).unwrap();
        let mut rng = StdRng::seed_from_u64(rank_me as u64 + 1);
        futures::executor::block_on(async {
            for i in 0..keys_per_rank {
                let key = (rank_me as u64) * 1_000_000 + i as u64 + rng.gen_range(0..3);
                let count = table.insert(Record { key, payload: key }).await;
                assert!(count > 0, "table unexpectedly full at load factor 0.39");
            }
        });
    });
}

/// A key that was never inserted must resolve to `None`, given at least
/// one free slot on its probe chain.
#[test]
fn lookup_miss_returns_none() {
    let ranks = spawn_ranks(1);
    run_on_ranks(ranks, |substrate| {
        let table = DistHashMap::construct(substrate, 16).unwrap();
        futures::executor::block_on(async {
            table
                .insert(Record {
                    key: 5,
                    payload: 50,
                })
                .await;
            table.barrier().await;
            assert_eq!(table.find(999).await, None);
        });
    });
}

/// Without the phase barrier, a winning rank's put has no ordering
/// guarantee relative to a peer's read; with it, every previously
/// inserted key is found by every rank.
#[test]
fn barrier_makes_every_insert_visible_to_every_rank() {
    let rank_n = 3;
    let capacity = 64;
    let ranks = spawn_ranks(rank_n);

    run_on_ranks(ranks, move |substrate| {
        let rank_me = substrate.rank_me();
        let table = DistHashMap::construct(substrate, capacity).unwrap();
        futures::executor::block_on(async {
            let key = rank_me as u64;
            let count = table.insert(Record { key, payload: key }).await;
            assert!(count > 0);

            table.barrier().await;

            for peer in 0..rank_n {
                let found = table.find(peer as u64).await;
                assert_eq!(
                    found,
                    Some(Record {
                        key: peer as u64,
                        payload: peer as u64
                    }),
                    "rank {rank_me} could not see rank {peer}'s insert after the barrier"
                );
            }
        });
    });
}
