//! Report Builder: turns a finished [`InvocationAggregate`] into the four
//! characterization reports, a Markdown rendering for stdout, and a CSV
//! rendering for the per-kernel artifact file.

mod compute;
mod control;
mod csv;
mod markdown;
mod memory;
mod parallelism;
mod stats;

pub use compute::ComputeReport;
pub use control::{BranchEntropyReport, ControlReport};
pub use memory::{DiversityReport, EntropyReport, FootprintReport, MemoryReport};
pub use parallelism::{
    DataParallelismReport, ParallelismReport, ThreadLevelReport, UtilizationReport,
    WorkDistributionReport,
};

use std::path::{Path, PathBuf};

use crate::aggregate::InvocationAggregate;
use crate::error::AiwcError;
use crate::filename::create_sequenced;

const MAX_FILENAME_ATTEMPTS: u32 = 1 << 20;

/// The full architecture-independent characterization of one kernel
/// invocation. Built once, at `kernelEnd`, from the invocation's
/// [`InvocationAggregate`]; immutable afterward.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Report {
    pub kernel_name: String,
    pub threads_invoked: u64,
    pub barriers_hit: u64,
    pub operand_sum: u64,
    pub compute: ComputeReport,
    pub parallelism: ParallelismReport,
    pub memory: MemoryReport,
    pub control: ControlReport,
}

impl Report {
    /// Consumes `aggregate`, computing every derived metric exactly once.
    pub fn build(kernel_name: impl Into<String>, aggregate: InvocationAggregate) -> Self {
        let compute = ComputeReport::build(&aggregate);
        let parallelism = ParallelismReport::build(&aggregate, compute.total_instruction_count);
        let memory = MemoryReport::build(&aggregate);
        let control = ControlReport::build(&aggregate);

        let operand_sum =
            aggregate.load_labels.values().sum::<u64>() + aggregate.store_labels.values().sum::<u64>();

        Self {
            kernel_name: kernel_name.into(),
            threads_invoked: aggregate.threads_invoked,
            barriers_hit: aggregate.barriers_hit,
            operand_sum,
            compute,
            parallelism,
            memory,
            control,
        }
    }

    /// Renders the Markdown report written to stdout at `kernelEnd`.
    pub fn to_markdown(&self) -> String {
        markdown::render(self)
    }

    /// Writes `aiwc_<sanitized kernel name>_<n>.csv` into `dir`, for the
    /// smallest `n` not already in use, and returns the path written.
    pub fn write_csv(&self, dir: &Path) -> Result<PathBuf, AiwcError> {
        let prefix = format!("aiwc_{}", sanitize(&self.kernel_name));
        let (path, mut file) = create_sequenced(dir, &prefix, MAX_FILENAME_ATTEMPTS)?;

        let write_all = |file: &mut std::fs::File| -> std::io::Result<()> {
            use std::io::Write;
            writeln!(file, "metric,count")?;
            for (metric, value) in csv::rows(self) {
                writeln!(file, "{metric},{value}")?;
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

/// Replaces everything but ASCII alphanumerics, `-`, and `_` with `_`, so
/// kernel names survive as filesystem-safe path components.
fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
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

    fn three_adds_one_workitem() -> InvocationAggregate {
        let mut worker = crate::worker::WorkerState::default();
        worker.on_work_item_begin();
        for _ in 0..3 {
            worker.on_instruction_executed(&FakeAdd);
        }
        worker.on_work_item_complete();

        let mut aggregate = InvocationAggregate::default();
        aggregate.merge_worker(&mut worker);
        aggregate
    }

    #[test]
    fn single_workitem_three_adds_matches_worked_example() {
        let report = Report::build("vecadd", three_adds_one_workitem());

        assert_eq!(report.compute.total_instruction_count, 3);
        assert_eq!(report.compute.unique_opcodes_for_90pct, 1);
        assert_eq!(report.threads_invoked, 1);
        assert_eq!(report.parallelism.thread_level.granularity, 1.0);
        assert_eq!(report.parallelism.data.simd_min, 1);
        assert_eq!(report.parallelism.data.simd_max, 1);
        assert_eq!(report.parallelism.data.simd_mean, 1.0);
        assert_eq!(report.parallelism.data.simd_stdev, 0.0);
        assert_eq!(report.parallelism.data.instructions_per_operand, 3.0);
    }

    #[test]
    fn markdown_mentions_kernel_name() {
        let report = Report::build("vecadd", three_adds_one_workitem());
        assert!(report.to_markdown().contains("vecadd"));
    }

    #[test]
    fn csv_round_trips_through_a_real_directory() {
        let dir = tempfile::tempdir().unwrap();
        let report = Report::build("vecadd", three_adds_one_workitem());
        let path = report.write_csv(dir.path()).unwrap();
        let contents = std::fs::read_to_string(path).unwrap();
        assert!(contents.starts_with("metric,count\n"));
        assert!(contents.contains("total instruction count,3"));
    }
}
