//! Event Sink Interface.
//!
//! This is the contract by which the host LLVM-IR interpreter notifies the
//! characterization core of execution events. The host owns exactly one
//! [`EventSink`] implementation -- [`crate::plugin::AiwcPlugin`] -- and
//! calls its methods directly from whichever OS thread is executing the
//! corresponding work-item or work-group. No method on this trait may
//! block except `work_group_complete`, `kernel_begin`, `kernel_end`, and
//! the `host_memory_*` hooks, which briefly take the plugin's mutex; the
//! per-instruction and per-memory-op hooks are called from the
//! interpreter's hot loop and must stay lock-free.

mod instruction;
mod region;

pub use instruction::{InstructionInfo, Opcode};
pub use region::{AddressSpace, AtomicOpKind, MemoryRegionInfo};

/// Work-group identifier, opaque to the core beyond equality.
pub type GroupId = u64;

/// Work-item identifier, opaque to the core beyond equality.
pub type WorkItemId = u64;

/// Callback hooks the host interpreter drives as a kernel executes.
///
/// See the module docs for the concurrency contract each method operates
/// under.
pub trait EventSink {
    /// Fires before the first work-item of an enqueued kernel runs.
    fn kernel_begin(&self, kernel_name: &str);
    /// Fires after all work-items of a kernel have completed.
    fn kernel_end(&self, kernel_name: &str);

    /// Fires when the first work-item of a group starts.
    fn work_group_begin(&self, group_id: GroupId);
    /// Fires when the last work-item of a group finishes.
    fn work_group_complete(&self, group_id: GroupId);

    /// Fires when a work-item begins executing.
    fn work_item_begin(&self, item_id: WorkItemId);
    /// Fires when a work-item finishes normally.
    fn work_item_complete(&self, item_id: WorkItemId);
    /// Fires when a work-item reaches a barrier.
    fn work_item_barrier(&self, item_id: WorkItemId);
    /// Fires when a work-item resumes past a barrier.
    fn work_item_clear_barrier(&self, item_id: WorkItemId);

    /// Fires after each IR instruction retires.
    fn instruction_executed(&self, instr: &dyn InstructionInfo);

    /// Fires on a non-atomic load.
    fn memory_load(&self, region: &dyn MemoryRegionInfo, address: usize, size: usize);
    /// Fires on a non-atomic store.
    fn memory_store(&self, region: &dyn MemoryRegionInfo, address: usize, size: usize);
    /// Fires on an atomic load.
    fn memory_atomic_load(&self, region: &dyn MemoryRegionInfo, address: usize, size: usize);
    /// Fires on an atomic store.
    fn memory_atomic_store(&self, region: &dyn MemoryRegionInfo, address: usize, size: usize);

    /// Fires on a host-side read of a device buffer, outside any kernel.
    fn host_memory_load(&self, region: &dyn MemoryRegionInfo, address: usize, size: usize);
    /// Fires on a host-side write to a device buffer, outside any kernel.
    fn host_memory_store(&self, region: &dyn MemoryRegionInfo, address: usize, size: usize);
}
