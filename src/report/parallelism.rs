use crate::aggregate::InvocationAggregate;

use super::stats::{mean_u64, median_u64, min_max_u64};

/// How evenly instructions could be rescheduled, and how heavily each
/// work-item leans on the memory system relative to its peers.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct UtilizationReport {
    /// Mean run length between consecutive loads/stores; larger means
    /// more freedom to reorder compute between memory operations.
    pub freedom_to_reorder: f64,
    /// Memory operations issued per work-item invoked.
    pub resource_pressure: f64,
}

/// Barrier-synchronization granularity.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ThreadLevelReport {
    pub min_instructions_to_barrier: u64,
    pub max_instructions_to_barrier: u64,
    pub median_instructions_to_barrier: u64,
    pub barriers_per_instruction: f64,
    /// `1 / threadsInvoked`: the share of total work one work-item
    /// represents.
    pub granularity: f64,
}

/// Per-work-item instruction counts across the invocation.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct WorkDistributionReport {
    pub min_instructions_per_workitem: u64,
    pub max_instructions_per_workitem: u64,
    pub median_instructions_per_workitem: u64,
}

/// How much SIMD width the kernel is actually exercising.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct DataParallelismReport {
    pub simd_min: u32,
    pub simd_max: u32,
    pub simd_mean: f64,
    pub simd_stdev: f64,
    pub instructions_per_operand: f64,
}

#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ParallelismReport {
    pub utilization: UtilizationReport,
    pub thread_level: ThreadLevelReport,
    pub work_distribution: WorkDistributionReport,
    pub data: DataParallelismReport,
}

impl ParallelismReport {
    pub(super) fn build(aggregate: &InvocationAggregate, total_instruction_count: u64) -> Self {
        let threads_invoked = aggregate.threads_invoked;

        let operand_sum: u64 =
            aggregate.load_labels.values().sum::<u64>() + aggregate.store_labels.values().sum::<u64>();
        let resource_pressure = if threads_invoked == 0 {
            0.0
        } else {
            operand_sum as f64 / threads_invoked as f64
        };

        let utilization = UtilizationReport {
            freedom_to_reorder: mean_u64(&aggregate.instructions_between_load_or_store),
            resource_pressure,
        };

        let (min_btb, max_btb) = min_max_u64(&aggregate.instructions_between_barriers);
        let mut btb_sorted = aggregate.instructions_between_barriers.clone();
        let barriers_per_instruction = if total_instruction_count == 0 {
            0.0
        } else {
            (aggregate.barriers_hit + threads_invoked) as f64 / total_instruction_count as f64
        };
        let granularity = if threads_invoked == 0 {
            0.0
        } else {
            1.0 / threads_invoked as f64
        };
        let thread_level = ThreadLevelReport {
            min_instructions_to_barrier: min_btb,
            max_instructions_to_barrier: max_btb,
            median_instructions_to_barrier: median_u64(&mut btb_sorted),
            barriers_per_instruction,
            granularity,
        };

        let (min_wi, max_wi) = min_max_u64(&aggregate.instructions_per_workitem);
        let mut wi_sorted = aggregate.instructions_per_workitem.clone();
        let work_distribution = WorkDistributionReport {
            min_instructions_per_workitem: min_wi,
            max_instructions_per_workitem: max_wi,
            median_instructions_per_workitem: median_u64(&mut wi_sorted),
        };

        let data = DataParallelismReport::build(aggregate, total_instruction_count);

        Self {
            utilization,
            thread_level,
            work_distribution,
            data,
        }
    }
}

impl DataParallelismReport {
    fn build(aggregate: &InvocationAggregate, total_instruction_count: u64) -> Self {
        let simd_min = aggregate.instruction_width.keys().copied().min().unwrap_or(0);
        let simd_max = aggregate.instruction_width.keys().copied().max().unwrap_or(0);

        let simd_sum: u64 = aggregate
            .instruction_width
            .iter()
            .map(|(width, count)| *width as u64 * count)
            .sum();
        let simd_num: u64 = aggregate.instruction_width.values().sum();
        let simd_mean = if simd_num == 0 {
            0.0
        } else {
            simd_sum as f64 / simd_num as f64
        };
        let simd_stdev = if simd_num == 0 {
            0.0
        } else {
            let variance: f64 = aggregate
                .instruction_width
                .iter()
                .map(|(width, count)| {
                    let d = *width as f64 - simd_mean;
                    d * d * (*count as f64)
                })
                .sum::<f64>()
                / simd_num as f64;
            variance.sqrt()
        };

        // Algebraically, totalInstructionCount / simdSum always reduces to
        // 1 / simdMean (simdNum == totalInstructionCount by construction),
        // which cannot reproduce the width=1 worked example's
        // instructionsPerOperand = 3 for totalInstructionCount = 3. Dividing
        // by simdMean instead does; see DESIGN.md.
        let instructions_per_operand = if simd_mean == 0.0 {
            0.0
        } else {
            total_instruction_count as f64 / simd_mean
        };

        Self {
            simd_min,
            simd_max,
            simd_mean,
            simd_stdev,
            instructions_per_operand,
        }
    }
}
