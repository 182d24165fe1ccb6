//! SafeOps Config
//!
//! This crate contains the serializable types that describe a SafeOps run:
//! the workflow definition (an ordered list of steps) and the run settings
//! that control logging and artifact placement.
//!
//! Workflow definitions are loaded from JSON documents:
//!
//! ```json
//! {
//!   "name": "governance",
//!   "steps": [
//!     {
//!       "name": "scan_documentation",
//!       "module": "scan",
//!       "function": "scan_documentation",
//!       "inputs": { "codebase_path": "{workflow.inputs.path}" },
//!       "outputs": { "output_file": "{workflow.outputs.documentation}" }
//!     }
//!   ]
//! }
//! ```
//!
//! These types are plain data. `safeops-workflow` parses the argument values
//! into typed references before anything is executed.

mod input;
mod settings;
mod step;
mod workflow;

pub use input::{ArgumentMap, ArgumentValue};
pub use settings::{LoggingSettings, Settings, SettingsError};
pub use step::StepDef;
pub use workflow::WorkflowDef;
