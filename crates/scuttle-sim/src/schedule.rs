//! Delivery schedule generation.
//!
//! A schedule is the order in which one replica receives a graph's events.
//! Exhaustive enumeration is capped by a caller-supplied limit; past that
//! the simulator falls back to seeded random shuffles.

use crate::rng::DeterministicRng;

/// One delivery order, as event names.
pub type Schedule = Vec<String>;

/// Number of ways to merge chains of the given lengths while keeping each
/// chain's internal order, or `None` on overflow.
///
/// This is the multinomial coefficient `(sum n)! / prod(n!)`.
#[must_use]
pub fn interleaving_count(lengths: &[usize]) -> Option<u128> {
    let mut total: u128 = 1;
    let mut placed: u128 = 0;
    for &len in lengths {
        // Multiply by C(placed + len, len), one factor at a time so every
        // intermediate quotient is exact.
        for k in 1..=len as u128 {
            placed += 1;
            total = total.checked_mul(placed)? / k;
        }
    }
    Some(total)
}

/// `n!`, or `None` on overflow.
#[must_use]
pub fn permutation_count(n: usize) -> Option<u128> {
    (1..=n as u128).try_fold(1_u128, u128::checked_mul)
}

/// Every merge of `chains` that preserves each chain's order, up to `limit`.
#[must_use]
pub fn interleavings(chains: &[Vec<String>], limit: usize) -> Vec<Schedule> {
    let mut cursors = vec![0; chains.len()];
    let mut prefix = Vec::with_capacity(chains.iter().map(Vec::len).sum());
    let mut out = Vec::new();
    merge(chains, &mut cursors, &mut prefix, &mut out, limit);
    out
}

fn merge(
    chains: &[Vec<String>],
    cursors: &mut [usize],
    prefix: &mut Schedule,
    out: &mut Vec<Schedule>,
    limit: usize,
) {
    if out.len() >= limit {
        return;
    }
    let mut exhausted = true;
    for (i, chain) in chains.iter().enumerate() {
        let Some(next) = chain.get(cursors[i]) else {
            continue;
        };
        exhausted = false;
        cursors[i] += 1;
        prefix.push(next.clone());
        merge(chains, cursors, prefix, out, limit);
        prefix.pop();
        cursors[i] -= 1;
    }
    if exhausted && out.len() < limit {
        out.push(prefix.clone());
    }
}

/// Every ordering of `names`, in lexicographic order of positions, up to
/// `limit`.
#[must_use]
pub fn permutations(names: &[String], limit: usize) -> Vec<Schedule> {
    let singletons: Vec<Vec<String>> = names.iter().map(|name| vec![name.clone()]).collect();
    // Interleaving single-element chains is exactly permutation.
    interleavings(&singletons, limit)
}

/// `count` seeded Fisher-Yates shuffles of `names`.
#[must_use]
pub fn random_schedules(rng: &mut DeterministicRng, names: &[String], count: usize) -> Vec<Schedule> {
    (0..count)
        .map(|_| {
            let mut schedule = names.to_vec();
            rng.shuffle(&mut schedule);
            schedule
        })
        .collect()
}
