//! The plugin facade: the one [`EventSink`] implementation a host
//! interpreter links against, wiring every hook to the worker-local
//! accumulator, the group merger, the host-transfer tracker, and the
//! report builder.

use std::sync::Mutex;

use crate::aggregate::InvocationAggregate;
use crate::config::AiwcConfig;
use crate::event::{EventSink, GroupId, InstructionInfo, MemoryRegionInfo, WorkItemId};
use crate::report::Report;
use crate::transfer::HostTransferLog;
use crate::worker;

/// Owns the kernel-invocation-scoped state that survives across
/// work-groups: the running aggregate and the plugin-lifetime host
/// transfer log. Per-work-group state lives in thread-local
/// [`worker::WorkerState`] cells and never touches these locks except at
/// `workGroupComplete`.
pub struct AiwcPlugin {
    config: AiwcConfig,
    aggregate: Mutex<InvocationAggregate>,
    transfers: Mutex<HostTransferLog>,
}

impl AiwcPlugin {
    pub fn new(config: AiwcConfig) -> Self {
        Self {
            config,
            aggregate: Mutex::new(InvocationAggregate::default()),
            transfers: Mutex::new(HostTransferLog::new()),
        }
    }

    pub fn config(&self) -> &AiwcConfig {
        &self.config
    }
}

impl EventSink for AiwcPlugin {
    fn kernel_begin(&self, kernel_name: &str) {
        if !self.config.enabled() {
            return;
        }
        self.transfers.lock().unwrap().kernel_begin(kernel_name);
    }

    fn kernel_end(&self, kernel_name: &str) {
        if !self.config.enabled() {
            return;
        }
        let aggregate = std::mem::take(&mut *self.aggregate.lock().unwrap());
        let report = Report::build(kernel_name, aggregate);

        println!("{}", report.to_markdown());
        if let Err(e) = report.write_csv(self.config.output_dir()) {
            eprintln!("aiwc: failed to write report csv for kernel {kernel_name:?}: {e}");
        }
    }

    fn work_group_begin(&self, _group_id: GroupId) {
        if !self.config.enabled() {
            return;
        }
        worker::work_group_begin();
    }

    fn work_group_complete(&self, _group_id: GroupId) {
        if !self.config.enabled() {
            return;
        }
        let mut aggregate = self.aggregate.lock().unwrap();
        worker::work_group_complete(|state| aggregate.merge_worker(state));
    }

    fn work_item_begin(&self, _item_id: WorkItemId) {
        if self.config.enabled() {
            worker::work_item_begin();
        }
    }

    fn work_item_complete(&self, _item_id: WorkItemId) {
        if self.config.enabled() {
            worker::work_item_complete();
        }
    }

    fn work_item_barrier(&self, _item_id: WorkItemId) {
        if self.config.enabled() {
            worker::work_item_barrier();
        }
    }

    fn work_item_clear_barrier(&self, _item_id: WorkItemId) {
        if self.config.enabled() {
            worker::work_item_clear_barrier();
        }
    }

    fn instruction_executed(&self, instr: &dyn InstructionInfo) {
        if self.config.enabled() {
            worker::instruction_executed(instr);
        }
    }

    fn memory_load(&self, region: &dyn MemoryRegionInfo, address: usize, _size: usize) {
        if self.config.enabled() {
            worker::memory_load(region, address);
        }
    }

    fn memory_store(&self, region: &dyn MemoryRegionInfo, address: usize, _size: usize) {
        if self.config.enabled() {
            worker::memory_store(region, address);
        }
    }

    fn memory_atomic_load(&self, region: &dyn MemoryRegionInfo, address: usize, _size: usize) {
        if self.config.enabled() {
            worker::memory_atomic_load(region, address);
        }
    }

    fn memory_atomic_store(&self, region: &dyn MemoryRegionInfo, address: usize, _size: usize) {
        if self.config.enabled() {
            worker::memory_atomic_store(region, address);
        }
    }

    fn host_memory_load(&self, _region: &dyn MemoryRegionInfo, _address: usize, _size: usize) {
        if !self.config.enabled() {
            return;
        }
        self.transfers.lock().unwrap().host_memory_load();
    }

    fn host_memory_store(&self, _region: &dyn MemoryRegionInfo, _address: usize, _size: usize) {
        if !self.config.enabled() {
            return;
        }
        self.transfers.lock().unwrap().host_memory_store();
    }
}

impl Drop for AiwcPlugin {
    /// Flushes the host-transfer log, which is plugin-lifetime rather than
    /// kernel-scoped and so has no other natural flush point.
    fn drop(&mut self) {
        if !self.config.enabled() {
            return;
        }
        if let Ok(transfers) = self.transfers.lock() {
            if let Err(e) = transfers.write_csv(self.config.output_dir()) {
                eprintln!("aiwc: failed to write host-transfer csv: {e}");
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::event::{AddressSpace, Opcode};

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

    struct FakeRegion(AddressSpace);
    impl MemoryRegionInfo for FakeRegion {
        fn address_space(&self) -> AddressSpace {
            self.0
        }
    }

    #[test]
    fn disabled_plugin_ignores_every_hook() {
        let dir = tempfile::tempdir().unwrap();
        let config = AiwcConfig::new().set_enabled(false).set_output_dir(dir.path());
        let plugin = AiwcPlugin::new(config);

        plugin.work_group_begin(0);
        plugin.work_item_begin(0);
        plugin.instruction_executed(&FakeAdd);
        plugin.work_item_complete(0);
        plugin.work_group_complete(0);
        plugin.kernel_end("noop");

        drop(plugin);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn a_full_kernel_writes_a_report_csv() {
        let dir = tempfile::tempdir().unwrap();
        let config = AiwcConfig::new().set_output_dir(dir.path());
        let plugin = AiwcPlugin::new(config);

        plugin.kernel_begin("vecadd");
        plugin.work_group_begin(0);
        plugin.work_item_begin(0);
        plugin.instruction_executed(&FakeAdd);
        plugin.instruction_executed(&FakeAdd);
        plugin.instruction_executed(&FakeAdd);
        plugin.work_item_complete(0);
        plugin.work_group_complete(0);
        plugin.kernel_end("vecadd");

        let has_report = std::fs::read_dir(dir.path())
            .unwrap()
            .any(|entry| entry.unwrap().file_name().to_string_lossy().starts_with("aiwc_vecadd"));
        assert!(has_report);
    }

    #[test]
    fn host_transfers_flush_on_drop() {
        let dir = tempfile::tempdir().unwrap();
        let config = AiwcConfig::new().set_output_dir(dir.path());
        let plugin = AiwcPlugin::new(config);

        let region = FakeRegion(AddressSpace::Global);
        plugin.host_memory_store(&region, 0x1000, 8);
        plugin.kernel_begin("vecadd");
        drop(plugin);

        let path = dir.path().join("aiwc_memory_transfers_0.csv");
        let contents = std::fs::read_to_string(path).unwrap();
        assert!(contents.contains("vecadd"));
    }
}
