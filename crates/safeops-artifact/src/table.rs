use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::error::ArtifactError;

/// An output recorded for a completed step.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedOutput {
  /// A file allocated by the engine for `{workflow.outputs.<key>}`.
  Artifact(PathBuf),
  /// A literal output value, recorded so that key lookups stay consistent.
  Literal(Value),
}

impl RecordedOutput {
  /// The file path this output refers to, if any.
  ///
  /// Literal strings are taken as paths the step was told to write to.
  pub fn path(&self) -> Option<&Path> {
    match self {
      Self::Artifact(path) => Some(path),
      Self::Literal(Value::String(s)) => Some(Path::new(s)),
      Self::Literal(_) => None,
    }
  }

  /// The value handed to a consumer that asked for the path itself.
  pub fn to_value(&self) -> Value {
    match self {
      Self::Artifact(path) => Value::String(path.to_string_lossy().into_owned()),
      Self::Literal(value) => value.clone(),
    }
  }
}

/// Why a step output lookup failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Missing {
  /// The step has not completed (it runs later, or it failed).
  StepNotCompleted,
  /// The step completed but never declared this output.
  KeyNotProduced,
}

impl fmt::Display for Missing {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::StepNotCompleted => f.write_str("step has not completed"),
      Self::KeyNotProduced => f.write_str("step did not produce this output"),
    }
  }
}

/// Outputs of every completed step, keyed by step name then output argument.
///
/// Append-only: each step is inserted exactly once, after it succeeded.
#[derive(Debug, Clone, Default)]
pub struct StepOutputTable {
  entries: HashMap<String, HashMap<String, RecordedOutput>>,
}

impl StepOutputTable {
  pub fn new() -> Self {
    Self::default()
  }

  /// Insert the outputs of a completed step.
  pub fn insert(
    &mut self,
    step: &str,
    outputs: impl IntoIterator<Item = (String, RecordedOutput)>,
  ) -> Result<(), ArtifactError> {
    if self.entries.contains_key(step) {
      return Err(ArtifactError::AlreadyRecorded {
        step: step.to_string(),
      });
    }
    self
      .entries
      .insert(step.to_string(), outputs.into_iter().collect());
    Ok(())
  }

  /// Look up a recorded output.
  pub fn get(&self, step: &str, key: &str) -> Result<&RecordedOutput, Missing> {
    self
      .entries
      .get(step)
      .ok_or(Missing::StepNotCompleted)?
      .get(key)
      .ok_or(Missing::KeyNotProduced)
  }

  /// Number of completed steps.
  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }
}
