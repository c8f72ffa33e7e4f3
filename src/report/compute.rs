use crate::aggregate::InvocationAggregate;

use super::stats::coverage_90pct;

/// Instruction-mix metrics: how many instructions ran, and how
/// concentrated the opcode distribution is.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ComputeReport {
    pub total_instruction_count: u64,
    /// Opcodes ranked by descending count, ties broken by mnemonic.
    pub ranked_opcodes: Vec<(String, u64)>,
    pub unique_opcodes_for_90pct: usize,
}

impl ComputeReport {
    pub(super) fn build(aggregate: &InvocationAggregate) -> Self {
        let total_instruction_count = aggregate.total_instruction_count();

        let mut ranked_opcodes: Vec<(String, u64)> = aggregate
            .compute_ops
            .iter()
            .map(|(op, count)| (op.clone(), *count))
            .collect();
        ranked_opcodes.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

        let unique_opcodes_for_90pct =
            coverage_90pct(&ranked_opcodes, total_instruction_count);

        Self {
            total_instruction_count,
            ranked_opcodes,
            unique_opcodes_for_90pct,
        }
    }
}
