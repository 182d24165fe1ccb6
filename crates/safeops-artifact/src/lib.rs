//! SafeOps Artifact
//!
//! Per-run state and artifact placement for SafeOps.
//!
//! A [`RunContext`] is created once per run and threaded through the engine.
//! It owns the run identifier, the directory where step artifacts are
//! written, the optional persistent log directory and the [`StepOutputTable`]
//! that later steps read from.
//!
//! Artifacts are plain files. When a step declares an output
//! `{workflow.outputs.<key>}`, [`allocate_outputs`] hands the step a path
//! `<output_dir>/<key>.txt`; once the step succeeds the driver records the
//! allocation with [`RunContext::record`].

mod context;
mod error;
mod store;
mod table;

pub use context::{RunContext, TEMP_DIR_NAME};
pub use error::ArtifactError;
pub use store::{AllocatedOutputs, allocate_outputs};
pub use table::{Missing, RecordedOutput, StepOutputTable};
