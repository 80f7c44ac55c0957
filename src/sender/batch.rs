//! Per-cycle shuffling and splitting of the group list between workers.

use rand::seq::SliceRandom;
use rand::Rng;

use super::input::GroupTarget;

/// Contiguous slice of one cycle's group order, owned by a single worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch<'a> {
    /// 1-based worker number used in progress output.
    pub worker_id: usize,
    /// Position of the first target within the cycle order.
    pub offset: usize,
    pub targets: &'a [GroupTarget],
}

impl Batch<'_> {
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

/// Fresh random permutation; the loaded list itself is never reordered.
pub fn shuffled(groups: &[GroupTarget], rng: &mut impl Rng) -> Vec<GroupTarget> {
    let mut order = groups.to_vec();
    order.shuffle(rng);
    order
}

/// Split `groups` into at most `worker_count` contiguous batches.
///
/// Sizes differ by at most one and never exceed `ceil(len / worker_count)`;
/// the larger batches come first. Fewer groups than workers gives one
/// single-target batch per group.
pub fn partition(groups: &[GroupTarget], worker_count: usize) -> Vec<Batch<'_>> {
    let batches = worker_count.max(1).min(groups.len());
    if batches == 0 {
        return Vec::new();
    }

    let base = groups.len() / batches;
    let remainder = groups.len() % batches;

    let mut result = Vec::with_capacity(batches);
    let mut offset = 0;
    for index in 0..batches {
        let size = base + usize::from(index < remainder);
        result.push(Batch {
            worker_id: index + 1,
            offset,
            targets: &groups[offset..offset + size],
        });
        offset += size;
    }
    result
}
