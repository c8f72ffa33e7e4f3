//! Error types for the characterization pipeline.
//!
//! Most of the statistical edge cases spec'd for this plugin (empty
//! sequences, missing SIMD samples) are not modeled as errors at all: they
//! coerce to zero, per the report builder's contract. The only conditions
//! that surface as a [`AiwcError`] are ones a host integration can actually
//! recover from -- everything else (a host contract violation such as an
//! instruction following a conditional branch that lands in neither
//! recorded target) is a bug in the interpreter driving us, not something
//! we can report our way out of, and is raised as a panic instead.

use std::io;
use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, AiwcError>;

/// Failures surfaced by the report builder and host-transfer tracker.
#[derive(Debug, thiserror::Error)]
pub enum AiwcError {
    /// A CSV artifact could not be created. The spec treats this as fatal
    /// for the plugin's single output artifact; callers that want that
    /// behavior should `unwrap`/`expect` or otherwise abort on this
    /// variant rather than attempt to continue without a report.
    #[error("failed to create csv artifact at {path}: {source}")]
    CsvCreate {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A CSV artifact could not be written to after creation.
    #[error("failed to write csv artifact at {path}: {source}")]
    CsvWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The filename-disambiguation probe loop could not find a free slot
    /// within the given number of attempts. In practice this only fires
    /// if something external is racing us or salting the directory with
    /// adversarial input; spec.md §9 accepts the probe-then-open race as a
    /// caveat but assumes it eventually succeeds.
    #[error("could not find an unused output filename under {dir} after {attempts} attempts")]
    FilenameExhausted { dir: PathBuf, attempts: u32 },
}

/// Host contract violation: an instruction immediately following a
/// conditional branch belongs to neither of the branch's two recorded
/// target blocks. Spec.md §7 item 1 calls this fatal and expects a
/// diagnostic naming the observed label and both expected targets; there
/// is no way to recover a meaningful report once this happens; the
/// interpreter driving us produced an event stream that violates its own
/// contract (we are not in the protocol state we think we are in).
pub fn branch_classification_violation(
    observed: &str,
    target1: &str,
    target2: &str,
    line: u32,
) -> ! {
    eprintln!(
        "aiwc: branch classification failure at line {line}: successor block {observed:?} \
         matches neither recorded target {target1:?} nor {target2:?}"
    );
    panic!(
        "aiwc: host contract violation at line {line}: instruction following conditional \
         branch belongs to neither target block"
    );
}
