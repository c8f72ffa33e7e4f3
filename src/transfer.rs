//! Host-Transfer Tracker.
//!
//! OpenCL applications often write device buffers before the kernel that
//! will consume them is named -- the buffer writes happen, then the
//! enqueue of the kernel names it. Host-to-device stores are therefore
//! tagged with the *last known* kernel name at the moment they fire, and
//! retroactively relabeled to the newly-enqueued kernel's name once it
//! becomes known. Device-to-host loads are tagged once and never
//! relabeled. This state is plugin-lifetime, not kernel-scoped, and
//! persists across every kernel invocation.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;

use crate::error::AiwcError;
use crate::filename::create_sequenced;

const MAX_FILENAME_ATTEMPTS: u32 = 1 << 20;

/// A copy direction, for reporting.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum TransferDirection {
    HostToDevice,
    DeviceToHost,
}

impl TransferDirection {
    fn metric_name(self) -> &'static str {
        match self {
            TransferDirection::HostToDevice => "transfer: host to device",
            TransferDirection::DeviceToHost => "transfer: device to host",
        }
    }
}

#[derive(Default)]
pub struct HostTransferLog {
    host_to_device_copy: Vec<String>,
    device_to_host_copy: Vec<String>,
    /// Count of `hostMemoryStore` calls since the last `kernelBegin`;
    /// exactly this many trailing entries of `host_to_device_copy` get
    /// relabeled at the next `kernelBegin`.
    pending_before_next_kernel: usize,
    last_named_kernel: String,
}

impl HostTransferLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a host-to-device write, tagged with the last-named kernel.
    pub fn host_memory_store(&mut self) {
        self.host_to_device_copy.push(self.last_named_kernel.clone());
        self.pending_before_next_kernel += 1;
    }

    /// Records a device-to-host read, tagged with the last-named kernel.
    /// Never retroactively relabeled.
    pub fn host_memory_load(&mut self) {
        self.device_to_host_copy.push(self.last_named_kernel.clone());
    }

    /// Relabels the trailing run of host-to-device stores observed since
    /// the previous `kernelBegin` to `kernel_name`, and zeroes the pending
    /// counter.
    pub fn kernel_begin(&mut self, kernel_name: &str) {
        let n = self.pending_before_next_kernel;
        let len = self.host_to_device_copy.len();
        for entry in &mut self.host_to_device_copy[len.saturating_sub(n)..] {
            *entry = kernel_name.to_owned();
        }
        self.pending_before_next_kernel = 0;
        self.last_named_kernel = kernel_name.to_owned();
    }

    fn counts_by_kernel(copies: &[String]) -> BTreeMap<&str, u64> {
        let mut counts = BTreeMap::new();
        for name in copies {
            *counts.entry(name.as_str()).or_insert(0) += 1;
        }
        counts
    }

    /// Per-kernel transfer counts, keyed by kernel name, in each direction.
    pub fn summary(&self) -> Vec<(&str, TransferDirection, u64)> {
        let mut rows = Vec::new();
        for (name, count) in Self::counts_by_kernel(&self.host_to_device_copy) {
            rows.push((name, TransferDirection::HostToDevice, count));
        }
        for (name, count) in Self::counts_by_kernel(&self.device_to_host_copy) {
            rows.push((name, TransferDirection::DeviceToHost, count));
        }
        rows
    }

    /// Writes `aiwc_memory_transfers_<n>.csv` into `dir`, for the smallest
    /// `n` not already in use.
    pub fn write_csv(&self, dir: &Path) -> Result<std::path::PathBuf, AiwcError> {
        let (path, mut file) =
            create_sequenced(dir, "aiwc_memory_transfers", MAX_FILENAME_ATTEMPTS)?;

        let write_all = |file: &mut std::fs::File| -> std::io::Result<()> {
            writeln!(file, "metric,kernel,count")?;
            for (name, direction, count) in self.summary() {
                writeln!(file, "{},{},{}", direction.metric_name(), name, count)?;
            }
            Ok(())
        };

        write_all(&mut file).map_err(|source| AiwcError::CsvWrite {
            path: path.clone(),
            source,
        })?;

        Ok(path)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn host_to_device_stores_are_relabeled_on_kernel_begin() {
        let mut log = HostTransferLog::new();
        log.host_memory_store();
        log.host_memory_store();
        log.kernel_begin("K");

        let mut counts = BTreeMap::new();
        for (name, direction, count) in log.summary() {
            counts.insert((name.to_owned(), direction), count);
        }
        assert_eq!(
            counts.get(&("K".to_owned(), TransferDirection::HostToDevice)),
            Some(&2)
        );
    }

    #[test]
    fn device_to_host_loads_tag_with_last_named_kernel_and_never_relabel() {
        let mut log = HostTransferLog::new();
        log.host_memory_store();
        log.host_memory_store();
        log.kernel_begin("K");
        log.host_memory_load();

        let mut counts = BTreeMap::new();
        for (name, direction, count) in log.summary() {
            counts.insert((name.to_owned(), direction), count);
        }
        assert_eq!(
            counts.get(&("K".to_owned(), TransferDirection::DeviceToHost)),
            Some(&1)
        );
        assert_eq!(
            counts.get(&("K".to_owned(), TransferDirection::HostToDevice)),
            Some(&2)
        );
    }

    #[test]
    fn subsequent_kernel_does_not_relabel_earlier_transfers() {
        let mut log = HostTransferLog::new();
        log.host_memory_store();
        log.kernel_begin("First");
        log.host_memory_store();
        log.kernel_begin("Second");

        let mut counts = BTreeMap::new();
        for (name, direction, count) in log.summary() {
            counts.insert((name.to_owned(), direction), count);
        }
        assert_eq!(
            counts.get(&("First".to_owned(), TransferDirection::HostToDevice)),
            Some(&1)
        );
        assert_eq!(
            counts.get(&("Second".to_owned(), TransferDirection::HostToDevice)),
            Some(&1)
        );
    }
}
