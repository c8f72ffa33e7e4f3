use std::collections::HashMap;

use crate::aggregate::InvocationAggregate;

use super::stats::coverage_90pct;

const LOCAL_ENTROPY_SCALES: usize = 10;

/// Distinct-address footprint, and how concentrated it is.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct FootprintReport {
    pub memory_access_count: u64,
    pub total_memory_footprint: usize,
    pub footprint_90pct: usize,
}

/// Shannon entropy of the address distribution, at native granularity
/// and after dropping the low 1..10 bits to approximate coarser
/// spatial-locality scales.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct EntropyReport {
    pub global_entropy: f64,
    /// Indexed by `k - 1` for `k` in `1..=10` dropped low bits.
    pub local_entropy: [f64; LOCAL_ENTROPY_SCALES],
}

/// How memory traffic splits across address spaces.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct DiversityReport {
    pub total_global_accesses: u64,
    pub total_local_accesses: u64,
    pub total_constant_accesses: u64,
    pub relative_local_pct: f64,
    pub relative_constant_pct: f64,
}

#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct MemoryReport {
    pub footprint: FootprintReport,
    pub entropy: EntropyReport,
    pub diversity: DiversityReport,
}

fn shifted_histogram(addresses: &[usize], shift: u32) -> HashMap<usize, u64> {
    let mut histogram = HashMap::new();
    for &addr in addresses {
        *histogram.entry(addr >> shift).or_insert(0u64) += 1;
    }
    histogram
}

fn shannon_entropy(histogram: &HashMap<usize, u64>, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let mut entropy = 0.0;
    for &count in histogram.values() {
        let p = count as f64 / total as f64;
        if p > 0.0 {
            entropy -= p * p.log2();
        }
    }
    entropy
}

impl MemoryReport {
    pub(super) fn build(aggregate: &InvocationAggregate) -> Self {
        let memory_access_count = aggregate.memory_ops.len() as u64;

        let native = shifted_histogram(&aggregate.memory_ops, 0);
        let total_memory_footprint = native.len();

        let mut ranked_addresses: Vec<(usize, u64)> =
            native.iter().map(|(addr, count)| (*addr, *count)).collect();
        ranked_addresses.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        let footprint_90pct = coverage_90pct(&ranked_addresses, memory_access_count);

        let footprint = FootprintReport {
            memory_access_count,
            total_memory_footprint,
            footprint_90pct,
        };

        let global_entropy = shannon_entropy(&native, memory_access_count);
        let mut local_entropy = [0.0; LOCAL_ENTROPY_SCALES];
        for (i, slot) in local_entropy.iter_mut().enumerate() {
            let k = (i + 1) as u32;
            let histogram = shifted_histogram(&aggregate.memory_ops, k);
            *slot = shannon_entropy(&histogram, memory_access_count);
        }
        let entropy = EntropyReport {
            global_entropy,
            local_entropy,
        };

        let total_global_accesses = aggregate.global_mem_accesses;
        let total_local_accesses = aggregate.local_mem_accesses;
        let total_constant_accesses = aggregate.constant_mem_accesses;
        let tracked_total =
            total_global_accesses + total_local_accesses + total_constant_accesses;
        let (relative_local_pct, relative_constant_pct) = if tracked_total == 0 {
            (0.0, 0.0)
        } else {
            (
                100.0 * total_local_accesses as f64 / tracked_total as f64,
                100.0 * total_constant_accesses as f64 / tracked_total as f64,
            )
        };
        let diversity = DiversityReport {
            total_global_accesses,
            total_local_accesses,
            total_constant_accesses,
            relative_local_pct,
            relative_constant_pct,
        };

        Self {
            footprint,
            entropy,
            diversity,
        }
    }
}
