//! Typed step argument references.
//!
//! Inputs accept four placeholder grammars, each a braced string:
//!
//! | Placeholder                      | Resolves to                                  |
//! |----------------------------------|----------------------------------------------|
//! | `{workflow.inputs.<key>}`        | the run input `<key>`                        |
//! | `{workflow.log_dir}`             | the persistent log directory, or null        |
//! | `{workflow.all_steps}`           | every step name, in declaration order        |
//! | `{steps.<step>.outputs.<key>}`   | an output recorded by an earlier step        |
//!
//! Outputs accept one: `{workflow.outputs.<key>}`, which asks the engine to
//! allocate an artifact file for the step to write.
//!
//! Anything else is a literal and is passed through unchanged, including
//! `{workflow.<field>}` for any field not listed above. A string that opens one
//! of the four grammars but is ill-formed (missing brace, empty key, a
//! `{steps.` reference without `.outputs.`) is rejected.

use std::fmt;

use serde_json::Value;
use thiserror::Error;

const INPUTS_PREFIX: &str = "{workflow.inputs.";
const LOG_DIR: &str = "{workflow.log_dir}";
const ALL_STEPS: &str = "{workflow.all_steps}";
const STEPS_PREFIX: &str = "{steps.";
const OUTPUTS_SEPARATOR: &str = ".outputs.";

/// Reasons a placeholder string fails to parse.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReferenceError {
  #[error("reference '{value}' is missing its closing brace")]
  Unterminated { value: String },

  #[error("reference '{value}' has an empty key")]
  EmptyKey { value: String },

  #[error("step reference '{value}' must have the form {{steps.<step>.outputs.<key>}}")]
  InvalidStepOutput { value: String },
}

/// A parsed step input value.
#[derive(Debug, Clone, PartialEq)]
pub enum Reference {
  /// A literal value, passed through unchanged.
  Literal(Value),
  /// `{workflow.inputs.<key>}`
  WorkflowInput(String),
  /// `{workflow.log_dir}`
  LogDir,
  /// `{workflow.all_steps}`
  AllSteps,
  /// `{steps.<step>.outputs.<key>}`
  StepOutput { step: String, key: String },
}

impl Reference {
  /// Parse a declared input value.
  pub fn parse(value: &Value) -> Result<Self, ReferenceError> {
    let Some(text) = value.as_str() else {
      return Ok(Self::Literal(value.clone()));
    };

    if text.starts_with(INPUTS_PREFIX) {
      let key = braced_body(text, INPUTS_PREFIX)?;
      return Ok(Self::WorkflowInput(non_empty(key, text)?.to_string()));
    }

    match text {
      LOG_DIR => return Ok(Self::LogDir),
      ALL_STEPS => return Ok(Self::AllSteps),
      _ => {}
    }

    if text.starts_with(STEPS_PREFIX) {
      let body = braced_body(text, STEPS_PREFIX)?;
      let (step, key) =
        body
          .split_once(OUTPUTS_SEPARATOR)
          .ok_or_else(|| ReferenceError::InvalidStepOutput {
            value: text.to_string(),
          })?;
      if step.is_empty() {
        return Err(ReferenceError::InvalidStepOutput {
          value: text.to_string(),
        });
      }
      return Ok(Self::StepOutput {
        step: step.to_string(),
        key: non_empty(key, text)?.to_string(),
      });
    }

    Ok(Self::Literal(value.clone()))
  }
}

impl fmt::Display for Reference {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Literal(value) => match value {
        Value::String(s) => f.write_str(s),
        other => write!(f, "{}", other),
      },
      Self::WorkflowInput(key) => write!(f, "{{workflow.inputs.{}}}", key),
      Self::LogDir => f.write_str(LOG_DIR),
      Self::AllSteps => f.write_str(ALL_STEPS),
      Self::StepOutput { step, key } => write!(f, "{{steps.{}.outputs.{}}}", step, key),
    }
  }
}

/// A parsed step output value.
#[derive(Debug, Clone, PartialEq)]
pub enum OutputTarget {
  /// A literal value, passed to the step without allocating anything.
  Literal(Value),
  /// `{workflow.outputs.<key>}`: allocate an artifact file named after `<key>`.
  Artifact(String),
}

impl OutputTarget {
  /// Parse a declared output value.
  ///
  /// Only `{workflow.outputs.<key>}` is special; every other value, including
  /// strings that look like input placeholders, is a literal.
  pub fn parse(value: &Value) -> Result<Self, ReferenceError> {
    const OUTPUTS_PREFIX: &str = "{workflow.outputs.";

    match value.as_str() {
      Some(text) if text.starts_with(OUTPUTS_PREFIX) => {
        let key = braced_body(text, OUTPUTS_PREFIX)?;
        Ok(Self::Artifact(non_empty(key, text)?.to_string()))
      }
      _ => Ok(Self::Literal(value.clone())),
    }
  }
}

impl fmt::Display for OutputTarget {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Literal(Value::String(s)) => f.write_str(s),
      Self::Literal(other) => write!(f, "{}", other),
      Self::Artifact(key) => write!(f, "{{workflow.outputs.{}}}", key),
    }
  }
}

/// Strip `prefix` and the closing brace, rejecting nested or missing braces.
fn braced_body<'a>(text: &'a str, prefix: &str) -> Result<&'a str, ReferenceError> {
  let body = text[prefix.len()..]
    .strip_suffix('}')
    .ok_or_else(|| ReferenceError::Unterminated {
      value: text.to_string(),
    })?;

  if body.contains(['{', '}']) {
    return Err(ReferenceError::Unterminated {
      value: text.to_string(),
    });
  }

  Ok(body)
}

fn non_empty<'a>(key: &'a str, text: &str) -> Result<&'a str, ReferenceError> {
  if key.is_empty() {
    Err(ReferenceError::EmptyKey {
      value: text.to_string(),
    })
  } else {
    Ok(key)
  }
}
