use safeops_config::WorkflowDef;

use crate::error::WorkflowError;
use crate::step::StepSpec;

/// A locked workflow ready for execution.
#[derive(Debug, Clone, PartialEq)]
pub struct Workflow {
  pub name: String,
  pub steps: Vec<StepSpec>,
}

impl Workflow {
  /// Lock a workflow definition.
  pub fn lock(def: WorkflowDef) -> Result<Self, WorkflowError> {
    let steps = def
      .steps
      .into_iter()
      .map(StepSpec::lock)
      .collect::<Result<Vec<_>, _>>()?;

    Ok(Self {
      name: def.name,
      steps,
    })
  }

  /// Names of all steps in declaration order.
  pub fn step_names(&self) -> Vec<String> {
    self.steps.iter().map(|s| s.name.clone()).collect()
  }
}
