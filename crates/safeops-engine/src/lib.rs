//! SafeOps Pipeline Engine
//!
//! Drives a workflow's steps strictly in sequence and reports progress as
//! [`ExecutionEvent`]s.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      WorkflowEngine                         │
//! │  - run(workflow, inputs, context, notifier) → RunSummary    │
//! │  - Starting → Running(i) → Completed | Failed               │
//! │  - appends workflow_log.txt when a log dir is configured    │
//! └─────────────────────────────────────────────────────────────┘
//!                               │ per step
//!                               ▼
//! ┌──────────────────┐  ┌──────────────────┐  ┌─────────────────┐
//! │  InputResolver   │→ │ allocate_outputs │→ │     invoke      │
//! │  references →    │  │ {workflow.       │  │ StepRegistry    │
//! │  values          │  │  outputs.k} →    │  │ (module,        │
//! │                  │  │  <dir>/k.txt     │  │  function)      │
//! └──────────────────┘  └──────────────────┘  └─────────────────┘
//!                               │
//!                               ▼
//!                 RunContext::record → StepOutputTable
//! ```
//!
//! # Usage
//!
//! ```ignore
//! let engine = WorkflowEngine::new(Arc::new(registry));
//! let mut context = RunContext::new(".", None);
//! let summary = engine
//!   .run(&workflow, &inputs, &mut context, &LineNotifier::stdio())
//!   .await?;
//! ```

mod engine;
mod error;
mod events;
mod run_log;

pub use engine::{RunSummary, WorkflowEngine};
pub use error::{EngineError, RunError, UNKNOWN_STEP};
pub use events::{
  ChannelNotifier, ExecutionEvent, ExecutionNotifier, LOG_DISABLED, LineNotifier, NoopNotifier,
};
pub use run_log::RUN_LOG_FILE;
