//! Architecture-Independent Workload Characterization (AIWC).
//!
//! An instrumentation plugin for an OpenCL LLVM-IR simulator: a host
//! interpreter drives a single [`plugin::AiwcPlugin`] through
//! [`event::EventSink`] as it executes a kernel's work-items, and the
//! plugin emits a compute/parallelism/memory/control characterization of
//! that kernel, independent of the host's own instruction-set or
//! microarchitecture.
//!
//! # Layout
//!
//! - [`event`] -- the callback contract the host drives ([`event::EventSink`]).
//! - [`worker`] -- thread-local, lock-free per-work-group accumulation.
//! - [`aggregate`] -- the kernel-invocation-wide merge target, folded into
//!   under a single mutex once per work-group.
//! - [`transfer`] -- host-to-device/device-to-host buffer transfer
//!   attribution, which outlives any single kernel invocation.
//! - [`report`] -- turns a finished aggregate into the four
//!   characterization reports, plus Markdown and CSV renderings.
//! - [`config`] -- plugin activation and output-directory configuration.
//! - [`plugin`] -- the [`plugin::AiwcPlugin`] facade wiring all of the above
//!   together behind [`event::EventSink`].

pub mod aggregate;
pub mod config;
pub mod error;
pub mod event;
pub mod filename;
pub mod plugin;
pub mod report;
pub mod transfer;
pub mod worker;

pub use config::AiwcConfig;
pub use error::{AiwcError, Result};
pub use event::EventSink;
pub use plugin::AiwcPlugin;
pub use report::Report;
