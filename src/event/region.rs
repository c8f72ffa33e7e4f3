/// Classification of a memory region's address space.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AddressSpace {
    /// Per-work-item. Loads, stores, and atomics into this space are
    /// silently excluded from every sequence and histogram the core
    /// builds -- this is the one address space the spec treats as noise.
    Private,
    /// Per-work-group, shared by work-items within a group.
    Local,
    /// Per-device, visible to every work-item in the kernel.
    Global,
    /// Read-only, device-visible.
    Constant,
}

impl AddressSpace {
    /// Whether accesses to this space are tracked at all.
    pub fn is_tracked(self) -> bool {
        self != AddressSpace::Private
    }
}

/// Which atomic operation fired: `atomic load` vs `atomic store`. The two
/// hooks in [`super::EventSink`] already distinguish this, but the
/// distinction is exposed here too since some host interpreters only have
/// a single `memoryAtomic` hook parameterized by op kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AtomicOpKind {
    Load,
    Store,
}

/// A memory region handle, as exposed by the host interpreter.
pub trait MemoryRegionInfo {
    fn address_space(&self) -> AddressSpace;
}
