//! Group Merger and the kernel-invocation-scoped aggregate it builds.
//!
//! A worker's [`crate::worker::WorkerState`] is folded into an
//! [`InvocationAggregate`] exactly once per work-group, under the single
//! mutex [`crate::plugin::AiwcPlugin`] owns. A single critical section per
//! work-group amortizes synchronization against the potentially millions
//! of per-instruction events the worker observed without ever taking the
//! lock.

use std::collections::HashMap;

use crate::worker::WorkerState;

/// Kernel-invocation-wide aggregate, owned exclusively by
/// [`crate::plugin::AiwcPlugin`] and mutated only while its mutex is held.
#[derive(Default)]
pub struct InvocationAggregate {
    pub compute_ops: HashMap<String, u64>,
    pub memory_ops: Vec<usize>,
    pub branch_ops: HashMap<u32, Vec<bool>>,
    pub instructions_between_barriers: Vec<u64>,
    pub instructions_per_workitem: Vec<u64>,
    pub instructions_between_load_or_store: Vec<u64>,
    pub instruction_width: HashMap<u32, u64>,
    pub load_labels: HashMap<String, u64>,
    pub store_labels: HashMap<String, u64>,

    pub threads_invoked: u64,
    pub barriers_hit: u64,
    pub global_mem_accesses: u64,
    pub local_mem_accesses: u64,
    pub constant_mem_accesses: u64,
}

impl InvocationAggregate {
    /// Folds one worker's contribution into this aggregate. Drains the
    /// worker's containers and zeroes its scalars as it goes, so this call
    /// doubles as the "cleared at `workGroupComplete`" half of the
    /// worker-state lifecycle -- the caller does not need a second pass.
    ///
    /// Order is preserved within a worker's own sequences; no ordering is
    /// implied or required across different workers' contributions, since
    /// every downstream statistic is order-independent (counts,
    /// histograms, entropy, medians).
    pub fn merge_worker(&mut self, worker: &mut WorkerState) {
        for (op, count) in worker.compute_ops.drain() {
            *self.compute_ops.entry(op).or_insert(0) += count;
        }
        self.memory_ops.append(&mut worker.memory_ops);
        for (line, taken) in worker.branch_ops.drain() {
            self.branch_ops.entry(line).or_default().extend(taken);
        }

        self.instructions_between_barriers
            .append(&mut worker.instructions_between_barriers);
        self.instructions_per_workitem
            .append(&mut worker.instructions_per_workitem);
        self.instructions_between_load_or_store
            .append(&mut worker.instructions_between_load_or_store);

        for (label, count) in worker.load_labels.drain() {
            *self.load_labels.entry(label).or_insert(0) += count;
        }
        for (label, count) in worker.store_labels.drain() {
            *self.store_labels.entry(label).or_insert(0) += count;
        }
        for (width, count) in worker.instruction_width.drain() {
            *self.instruction_width.entry(width).or_insert(0) += count;
        }

        self.threads_invoked += std::mem::take(&mut worker.threads_invoked);
        self.barriers_hit += std::mem::take(&mut worker.barriers_hit);
        self.global_mem_accesses += std::mem::take(&mut worker.global_mem_accesses);
        self.local_mem_accesses += std::mem::take(&mut worker.local_mem_accesses);
        self.constant_mem_accesses += std::mem::take(&mut worker.constant_mem_accesses);
    }

    /// Total instructions observed this invocation, `Σ computeOps.values()`.
    pub fn total_instruction_count(&self) -> u64 {
        self.compute_ops.values().sum()
    }

    /// Resets this aggregate to its empty state, readying it for the next
    /// kernel invocation.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::event::{AddressSpace, InstructionInfo, Opcode};

    struct FakeAdd;
    impl InstructionInfo for FakeAdd {
        fn opcode(&self) -> Opcode {
            Opcode::Other
        }
        fn mnemonic(&self) -> &str {
            "add"
        }
        fn operand_count(&self) -> usize {
            0
        }
        fn operand_is_label(&self, _index: usize) -> bool {
            false
        }
        fn operand_text(&self, _index: usize) -> &str {
            ""
        }
        fn pointer_operand_label(&self) -> &str {
            ""
        }
        fn parent_block_label(&self) -> &str {
            ""
        }
        fn pointer_address_space(&self) -> AddressSpace {
            AddressSpace::Private
        }
        fn debug_line(&self) -> u32 {
            0
        }
        fn result_width(&self) -> u32 {
            1
        }
    }

    #[test]
    fn merge_sums_compute_ops_and_clears_worker() {
        let mut worker = WorkerState::default();
        for _ in 0..5 {
            worker.on_instruction_executed(&FakeAdd);
        }

        let mut aggregate = InvocationAggregate::default();
        aggregate.merge_worker(&mut worker);

        assert_eq!(aggregate.compute_ops.get("add"), Some(&5));
        assert!(worker.compute_ops.is_empty());
        assert_eq!(aggregate.total_instruction_count(), 5);
    }

    #[test]
    fn merge_from_two_workers_sums_thread_counts() {
        let mut a = WorkerState::default();
        a.on_work_item_begin();
        let mut b = WorkerState::default();
        b.on_work_item_begin();
        b.on_work_item_begin();

        let mut aggregate = InvocationAggregate::default();
        aggregate.merge_worker(&mut a);
        aggregate.merge_worker(&mut b);

        assert_eq!(aggregate.threads_invoked, 3);
    }
}
