use serde::{Deserialize, Serialize};

use crate::step::StepDef;

/// A workflow definition: a name and an ordered list of steps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowDef {
  pub name: String,
  pub steps: Vec<StepDef>,
}

impl WorkflowDef {
  /// Parse a workflow definition from a JSON document.
  pub fn from_json(source: &str) -> Result<Self, serde_json::Error> {
    serde_json::from_str(source)
  }

  /// Names of all steps in declaration order.
  pub fn step_names(&self) -> Vec<&str> {
    self.steps.iter().map(|s| s.name.as_str()).collect()
  }
}
