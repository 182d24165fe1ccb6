//! Argument value types for step configuration.
//!
//! Every step declares its named arguments in two mappings, `inputs` and
//! `outputs`. A value is either a literal JSON value, passed to the step as is,
//! or a string placeholder that the engine replaces at run time:
//!
//! ```json
//! {
//!   "codebase_path": "{workflow.inputs.path}",
//!   "gitingest_file_path": "{steps.ingest_codebase.outputs.output_file}",
//!   "executed_steps": "{workflow.all_steps}",
//!   "log_dir": "{workflow.log_dir}",
//!   "max_findings": 50
//! }
//! ```

/// A single declared argument value, before reference parsing.
pub type ArgumentValue = serde_json::Value;

/// Named step arguments in declaration order.
pub type ArgumentMap = serde_json::Map<String, ArgumentValue>;
