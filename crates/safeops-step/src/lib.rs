//! SafeOps Step
//!
//! A step is a unit of analysis work bound by name. Steps are registered in a
//! [`StepRegistry`] under a `(module, function)` pair at process start and
//! looked up only when the pipeline reaches them, so a workflow may name a
//! step that is never registered as long as the run fails before it.
//!
//! Steps take named arguments only ([`StepArgs`]): the union of the resolved
//! inputs and outputs declared in the workflow.

mod args;
mod error;
mod invoke;
mod registry;
mod step;

pub use args::StepArgs;
pub use error::{InvokeError, StepError};
pub use invoke::invoke;
pub use registry::StepRegistry;
pub use step::{FnStep, Step, step_fn};
