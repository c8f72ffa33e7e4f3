use std::collections::HashMap;

use crate::aggregate::InvocationAggregate;

use super::stats::coverage_90pct;

/// Sliding-window width for the Yokota branch-pattern entropy. Spec.md
/// §4.5 fixes this at 16 for reproducibility with existing artifacts, not
/// as a tunable.
const WINDOW: usize = 16;

/// Branch-entropy metrics: how predictable each branch's taken/not-taken
/// history is, by two different measures.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct BranchEntropyReport {
    /// Occurrence-weighted sum of `-p * log2(p)` over distinct 16-bit
    /// taken/not-taken windows, summed across every branch with at least
    /// `WINDOW` recorded outcomes.
    pub yokota_entropy: f64,
    /// As `yokota_entropy`, but each distinct window pattern contributes
    /// once regardless of how often it recurred.
    pub yokota_entropy_per_workload: f64,
    /// Mean of `2 * min(p, 1 - p)` over the same windows, weighted by
    /// occurrence count; `0.0` if no branch reached the window width.
    pub average_entropy: f64,
}

#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ControlReport {
    pub total_unique_branch_instructions: usize,
    pub branch_instructions_90pct: usize,
    pub entropy: BranchEntropyReport,
}

/// Encodes a window of taken/not-taken outcomes as the bits of a `u16`
/// (`WINDOW == 16` so every window fits exactly), preserving exact
/// pattern identity while avoiding a `Vec<bool>`/`String` allocation per
/// window.
fn encode_window(window: &[bool]) -> u16 {
    let mut bits = 0u16;
    for (i, &taken) in window.iter().enumerate() {
        if taken {
            bits |= 1 << i;
        }
    }
    bits
}

fn branch_entropy(branch_ops: &HashMap<u32, Vec<bool>>) -> BranchEntropyReport {
    let mut yokota_entropy = 0.0;
    let mut yokota_entropy_per_workload = 0.0;
    let mut average_entropy_weighted = 0.0;
    let mut window_count = 0u64;

    for sequence in branch_ops.values() {
        if sequence.len() < WINDOW {
            continue;
        }
        let mut patterns: HashMap<u16, u64> = HashMap::new();
        for window in sequence.windows(WINDOW) {
            *patterns.entry(encode_window(window)).or_insert(0) += 1;
        }
        for (pattern, count) in patterns {
            let taken_count = pattern.count_ones() as f64;
            let p = taken_count / WINDOW as f64;
            if p > 0.0 {
                yokota_entropy -= count as f64 * p * p.log2();
                yokota_entropy_per_workload -= p * p.log2();
            }
            let linear = 2.0 * p.min(1.0 - p);
            average_entropy_weighted += count as f64 * linear;
            window_count += count;
        }
    }

    let average_entropy = if window_count == 0 {
        0.0
    } else {
        average_entropy_weighted / window_count as f64
    };

    BranchEntropyReport {
        yokota_entropy,
        yokota_entropy_per_workload,
        average_entropy,
    }
}

impl ControlReport {
    pub(super) fn build(aggregate: &InvocationAggregate) -> Self {
        let total_branch_count: u64 =
            aggregate.branch_ops.values().map(|v| v.len() as u64).sum();

        let mut ranked_lines: Vec<(u32, u64)> = aggregate
            .branch_ops
            .iter()
            .map(|(line, seq)| (*line, seq.len() as u64))
            .collect();
        ranked_lines.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

        let total_unique_branch_instructions = aggregate.branch_ops.len();
        let branch_instructions_90pct = coverage_90pct(&ranked_lines, total_branch_count);

        Self {
            total_unique_branch_instructions,
            branch_instructions_90pct,
            entropy: branch_entropy(&aggregate.branch_ops),
        }
    }
}
