use std::path::PathBuf;

use serde_json::{Map, Value};

use crate::error::StepError;

/// Named arguments passed to a step.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepArgs {
  values: Map<String, Value>,
}

impl StepArgs {
  pub fn new(values: Map<String, Value>) -> Self {
    Self { values }
  }

  pub fn get(&self, name: &str) -> Option<&Value> {
    self.values.get(name)
  }

  pub fn len(&self) -> usize {
    self.values.len()
  }

  pub fn is_empty(&self) -> bool {
    self.values.is_empty()
  }

  pub fn into_inner(self) -> Map<String, Value> {
    self.values
  }

  /// A required string argument.
  pub fn require_str(&self, name: &str) -> Result<&str, StepError> {
    self
      .optional_str(name)?
      .ok_or_else(|| StepError::MissingArgument {
        name: name.to_string(),
      })
  }

  /// An optional string argument. Absent and `null` both yield `None`.
  pub fn optional_str(&self, name: &str) -> Result<Option<&str>, StepError> {
    match self.values.get(name) {
      None | Some(Value::Null) => Ok(None),
      Some(Value::String(s)) => Ok(Some(s)),
      Some(other) => Err(StepError::invalid_argument(
        name,
        format!("expected a string, got {}", other),
      )),
    }
  }

  /// A required path argument.
  pub fn require_path(&self, name: &str) -> Result<PathBuf, StepError> {
    self.require_str(name).map(PathBuf::from)
  }

  /// An optional path argument.
  pub fn optional_path(&self, name: &str) -> Result<Option<PathBuf>, StepError> {
    Ok(self.optional_str(name)?.map(PathBuf::from))
  }

  /// A list of strings. A single string is taken as a one-element list.
  pub fn string_list(&self, name: &str) -> Result<Vec<String>, StepError> {
    match self.values.get(name) {
      None => Err(StepError::MissingArgument {
        name: name.to_string(),
      }),
      Some(Value::String(s)) => Ok(vec![s.clone()]),
      Some(Value::Array(items)) => items
        .iter()
        .map(|item| {
          item.as_str().map(str::to_string).ok_or_else(|| {
            StepError::invalid_argument(name, format!("expected a list of strings, found {}", item))
          })
        })
        .collect(),
      Some(other) => Err(StepError::invalid_argument(
        name,
        format!("expected a list of strings, got {}", other),
      )),
    }
  }
}

impl From<Map<String, Value>> for StepArgs {
  fn from(values: Map<String, Value>) -> Self {
    Self::new(values)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  fn args(value: Value) -> StepArgs {
    match value {
      Value::Object(map) => StepArgs::new(map),
      _ => panic!("expected an object"),
    }
  }

  #[test]
  fn test_string_accessors() {
    let args = args(json!({ "codebase_path": "/repo", "log_dir": null, "limit": 3 }));

    assert_eq!(args.require_str("codebase_path").unwrap(), "/repo");
    assert_eq!(args.require_path("codebase_path").unwrap(), PathBuf::from("/repo"));
    assert_eq!(args.optional_str("log_dir").unwrap(), None);
    assert_eq!(args.optional_path("absent").unwrap(), None);

    assert!(matches!(
      args.require_str("log_dir"),
      Err(StepError::MissingArgument { .. })
    ));
    assert!(matches!(
      args.require_str("limit"),
      Err(StepError::InvalidArgument { .. })
    ));
  }

  #[test]
  fn test_string_list() {
    let args = args(json!({ "steps": ["a", "b"], "one": "a", "bad": [1], "num": 1 }));

    assert_eq!(args.string_list("steps").unwrap(), vec!["a", "b"]);
    assert_eq!(args.string_list("one").unwrap(), vec!["a"]);
    assert!(args.string_list("bad").is_err());
    assert!(args.string_list("num").is_err());
    assert!(args.string_list("missing").is_err());
  }
}
