//! Worker-Local Accumulator.
//!
//! Absorbs events from one executing work-group without contention. Every
//! method here runs single-threaded from the perspective of the worker
//! that owns it; nothing in this module takes a lock. State lives behind a
//! `thread_local!` cell, allocated lazily on first use and reused across
//! work-groups, per spec.md §9's guidance on keeping the hot hooks
//! allocation-free.

use std::cell::RefCell;
use std::collections::HashMap;

use crate::error::branch_classification_violation;
use crate::event::{AddressSpace, AtomicOpKind, InstructionInfo, MemoryRegionInfo, Opcode};

/// Per-work-group scratch state for one worker thread.
///
/// Mirrors [`crate::aggregate::InvocationAggregate`]'s containers, plus the
/// transient fields needed to track reorder distance and pending branch
/// context between calls.
#[derive(Default)]
pub struct WorkerState {
    pub(crate) compute_ops: HashMap<String, u64>,
    pub(crate) memory_ops: Vec<usize>,
    pub(crate) branch_ops: HashMap<u32, Vec<bool>>,
    pub(crate) instructions_between_barriers: Vec<u64>,
    pub(crate) instructions_per_workitem: Vec<u64>,
    pub(crate) instructions_between_load_or_store: Vec<u64>,
    pub(crate) instruction_width: HashMap<u32, u64>,
    pub(crate) load_labels: HashMap<String, u64>,
    pub(crate) store_labels: HashMap<String, u64>,

    pub(crate) threads_invoked: u64,
    pub(crate) barriers_hit: u64,
    pub(crate) global_mem_accesses: u64,
    pub(crate) local_mem_accesses: u64,
    pub(crate) constant_mem_accesses: u64,

    ops_between_load_or_store: u64,
    workitem_instruction_count: u64,
    instruction_count: u64,

    previous_instruction_is_branch: bool,
    target1: String,
    target2: String,
    branch_loc: u32,
}

impl WorkerState {
    /// Clears every container and scalar, and the pending-branch transient
    /// fields. Called lazily on first use of a worker and again at each
    /// `workGroupBegin`; `workGroupComplete`'s merge already drains the
    /// containers and zeroes the scalars, so this mostly re-arms the
    /// branch-tracking fields for the next group.
    pub(crate) fn reset_for_group(&mut self) {
        self.compute_ops.clear();
        self.memory_ops.clear();
        self.branch_ops.clear();
        self.instructions_between_barriers.clear();
        self.instructions_per_workitem.clear();
        self.instructions_between_load_or_store.clear();
        self.instruction_width.clear();
        self.load_labels.clear();
        self.store_labels.clear();

        self.threads_invoked = 0;
        self.barriers_hit = 0;
        self.global_mem_accesses = 0;
        self.local_mem_accesses = 0;
        self.constant_mem_accesses = 0;

        self.ops_between_load_or_store = 0;
        self.workitem_instruction_count = 0;
        self.instruction_count = 0;
        self.clear_branch_context();
    }

    pub(crate) fn clear_branch_context(&mut self) {
        self.previous_instruction_is_branch = false;
        self.target1.clear();
        self.target2.clear();
        self.branch_loc = 0;
    }

    pub(crate) fn on_work_item_begin(&mut self) {
        self.threads_invoked += 1;
        self.instruction_count = 0;
        self.workitem_instruction_count = 0;
        self.ops_between_load_or_store = 0;
    }

    pub(crate) fn on_work_item_barrier(&mut self) {
        self.barriers_hit += 1;
        self.instructions_between_barriers.push(self.instruction_count);
        self.instruction_count = 0;
    }

    pub(crate) fn on_work_item_clear_barrier(&mut self) {
        self.instruction_count = 0;
    }

    pub(crate) fn on_work_item_complete(&mut self) {
        self.instructions_between_barriers.push(self.instruction_count);
        self.instructions_per_workitem.push(self.workitem_instruction_count);
    }

    pub(crate) fn classify_memory_access(&mut self, space: AddressSpace) {
        match space {
            AddressSpace::Local => self.local_mem_accesses += 1,
            AddressSpace::Global => self.global_mem_accesses += 1,
            AddressSpace::Constant => self.constant_mem_accesses += 1,
            AddressSpace::Private => {}
        }
    }

    pub(crate) fn on_memory_op(&mut self, space: AddressSpace, address: usize) {
        if space.is_tracked() {
            self.memory_ops.push(address);
        }
    }

    pub(crate) fn on_instruction_executed(&mut self, instr: &dyn InstructionInfo) {
        *self.compute_ops.entry(instr.mnemonic().to_owned()).or_insert(0) += 1;

        match instr.opcode() {
            Opcode::Load | Opcode::Store => {
                self.classify_memory_access(instr.pointer_address_space());
            }
            _ => {}
        }

        self.ops_between_load_or_store += 1;
        if matches!(instr.opcode(), Opcode::Load | Opcode::Store) {
            let label = instr.pointer_operand_label().to_owned();
            let labels = match instr.opcode() {
                Opcode::Load => &mut self.load_labels,
                _ => &mut self.store_labels,
            };
            *labels.entry(label).or_insert(0) += 1;
            self.instructions_between_load_or_store.push(self.ops_between_load_or_store);
            self.ops_between_load_or_store = 0;
        }

        if self.previous_instruction_is_branch {
            let successor = instr.parent_block_label();
            let taken = if successor == self.target1 {
                true
            } else if successor == self.target2 {
                false
            } else {
                branch_classification_violation(
                    successor,
                    &self.target1,
                    &self.target2,
                    self.branch_loc,
                );
            };
            self.branch_ops.entry(self.branch_loc).or_default().push(taken);
            self.previous_instruction_is_branch = false;
        }

        if instr.is_conditional_branch() {
            self.target1 = instr.operand_text(1).to_owned();
            self.target2 = instr.operand_text(2).to_owned();
            self.branch_loc = instr.debug_line();
            self.previous_instruction_is_branch = true;
        }

        self.instruction_count += 1;
        self.workitem_instruction_count += 1;
        *self.instruction_width.entry(instr.result_width()).or_insert(0) += 1;
    }

    pub(crate) fn on_memory_atomic(&mut self, kind: AtomicOpKind, space: AddressSpace, address: usize) {
        let _ = kind;
        // Open question (spec.md §9): the original filters atomic accesses
        // by `addressSpace != 0` rather than `!= Private`. The enum here
        // has no numeric encoding to misread, so there is nothing to
        // preserve literally; we filter on the tag directly.
        self.on_memory_op(space, address);
    }
}

thread_local! {
    static WORKER_STATE: RefCell<Option<WorkerState>> = const { RefCell::new(None) };
}

/// Runs `f` against the calling thread's [`WorkerState`], allocating it on
/// first use.
fn with_state<R>(f: impl FnOnce(&mut WorkerState) -> R) -> R {
    WORKER_STATE.with(|cell| {
        let mut slot = cell.borrow_mut();
        let state = slot.get_or_insert_with(WorkerState::default);
        f(state)
    })
}

pub(crate) fn work_group_begin() {
    with_state(WorkerState::reset_for_group);
}

pub(crate) fn work_item_begin() {
    with_state(WorkerState::on_work_item_begin);
}

pub(crate) fn work_item_barrier() {
    with_state(WorkerState::on_work_item_barrier);
}

pub(crate) fn work_item_clear_barrier() {
    with_state(WorkerState::on_work_item_clear_barrier);
}

pub(crate) fn work_item_complete() {
    with_state(WorkerState::on_work_item_complete);
}

pub(crate) fn instruction_executed(instr: &dyn InstructionInfo) {
    with_state(|state| state.on_instruction_executed(instr));
}

pub(crate) fn memory_load(region: &dyn MemoryRegionInfo, address: usize) {
    with_state(|state| state.on_memory_op(region.address_space(), address));
}

pub(crate) fn memory_store(region: &dyn MemoryRegionInfo, address: usize) {
    with_state(|state| state.on_memory_op(region.address_space(), address));
}

pub(crate) fn memory_atomic_load(region: &dyn MemoryRegionInfo, address: usize) {
    with_state(|state| state.on_memory_atomic(AtomicOpKind::Load, region.address_space(), address));
}

pub(crate) fn memory_atomic_store(region: &dyn MemoryRegionInfo, address: usize) {
    with_state(|state| {
        state.on_memory_atomic(AtomicOpKind::Store, region.address_space(), address)
    });
}

/// Runs `f` against the calling thread's state and leaves it cleared
/// afterwards, implementing the "merged and cleared at `workGroupComplete`"
/// lifecycle rule. `f` is expected to drain `state`'s containers (e.g. via
/// [`crate::aggregate::InvocationAggregate::merge_worker`]), which already
/// empties the maps/vectors and zeroes the scalar counters; this only
/// re-arms the branch-tracking transient fields left untouched by a merge.
pub(crate) fn work_group_complete(f: impl FnOnce(&mut WorkerState)) {
    with_state(|state| {
        f(state);
        state.clear_branch_context();
    });
}

#[cfg(test)]
mod test {
    use super::*;

    struct FakeInstr {
        opcode: Opcode,
        mnemonic: &'static str,
        operands: Vec<(&'static str, bool)>,
        block: &'static str,
        pointer_label: &'static str,
        pointer_space: AddressSpace,
        line: u32,
        width: u32,
    }

    impl InstructionInfo for FakeInstr {
        fn opcode(&self) -> Opcode {
            self.opcode
        }
        fn mnemonic(&self) -> &str {
            self.mnemonic
        }
        fn operand_count(&self) -> usize {
            self.operands.len()
        }
        fn operand_is_label(&self, index: usize) -> bool {
            self.operands[index].1
        }
        fn operand_text(&self, index: usize) -> &str {
            self.operands[index].0
        }
        fn pointer_operand_label(&self) -> &str {
            self.pointer_label
        }
        fn parent_block_label(&self) -> &str {
            self.block
        }
        fn pointer_address_space(&self) -> AddressSpace {
            self.pointer_space
        }
        fn debug_line(&self) -> u32 {
            self.line
        }
        fn result_width(&self) -> u32 {
            self.width
        }
    }

    fn add(width: u32) -> FakeInstr {
        FakeInstr {
            opcode: Opcode::Other,
            mnemonic: "add",
            operands: vec![],
            block: "",
            pointer_label: "",
            pointer_space: AddressSpace::Private,
            line: 0,
            width,
        }
    }

    #[test]
    fn three_adds_single_workitem() {
        let mut state = WorkerState::default();
        state.on_work_item_begin();
        for _ in 0..3 {
            state.on_instruction_executed(&add(1));
        }
        state.on_work_item_complete();

        assert_eq!(state.compute_ops.get("add"), Some(&3));
        assert_eq!(state.threads_invoked, 1);
        assert_eq!(state.instruction_width.get(&1), Some(&3));
        assert_eq!(state.instructions_per_workitem, vec![3]);
    }

    #[test]
    fn branch_classification_records_taken_flag() {
        let mut state = WorkerState::default();
        state.on_work_item_begin();

        let br = FakeInstr {
            opcode: Opcode::Br,
            mnemonic: "br",
            operands: vec![("%cond", false), ("%then", true), ("%else", true)],
            block: "%entry",
            pointer_label: "",
            pointer_space: AddressSpace::Private,
            line: 17,
            width: 1,
        };
        state.on_instruction_executed(&br);
        assert!(state.previous_instruction_is_branch);

        let successor = FakeInstr {
            opcode: Opcode::Other,
            mnemonic: "add",
            operands: vec![],
            block: "%then",
            pointer_label: "",
            pointer_space: AddressSpace::Private,
            line: 18,
            width: 1,
        };
        state.on_instruction_executed(&successor);

        assert_eq!(state.branch_ops.get(&17), Some(&vec![true]));
        assert!(!state.previous_instruction_is_branch);
    }

    #[test]
    #[should_panic(expected = "host contract violation")]
    fn branch_classification_failure_panics() {
        let mut state = WorkerState::default();
        state.on_work_item_begin();

        let br = FakeInstr {
            opcode: Opcode::Br,
            mnemonic: "br",
            operands: vec![("%cond", false), ("%then", true), ("%else", true)],
            block: "%entry",
            pointer_label: "",
            pointer_space: AddressSpace::Private,
            line: 17,
            width: 1,
        };
        state.on_instruction_executed(&br);

        let successor = FakeInstr {
            opcode: Opcode::Other,
            mnemonic: "add",
            operands: vec![],
            block: "%neither",
            pointer_label: "",
            pointer_space: AddressSpace::Private,
            line: 18,
            width: 1,
        };
        state.on_instruction_executed(&successor);
    }

    #[test]
    fn private_memory_ops_are_dropped() {
        let mut state = WorkerState::default();
        state.on_memory_op(AddressSpace::Private, 0x1000);
        state.on_memory_op(AddressSpace::Global, 0x2000);
        assert_eq!(state.memory_ops, vec![0x2000]);
    }
}
