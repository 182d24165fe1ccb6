//! SafeOps Workflow
//!
//! This crate provides the "locked" workflow representation for SafeOps.
//! A locked workflow is a parsed form of a [`safeops_config::WorkflowDef`]
//! that is ready for execution.
//!
//! Key differences from `safeops-config`:
//! - Every argument value is parsed into a typed [`Reference`] or
//!   [`OutputTarget`], so a malformed placeholder fails at load time
//! - Steps keep declaration order and are addressed by name
//!
//! No ordering checks are made: a step may still reference the outputs of a
//! later step, and that only fails when the reference is resolved.

mod error;
mod load;
mod reference;
mod step;
mod workflow;

pub use error::WorkflowError;
pub use load::{load, load_file};
pub use reference::{OutputTarget, Reference, ReferenceError};
pub use step::StepSpec;
pub use workflow::Workflow;
