use safeops_config::{ArgumentMap, StepDef};

use crate::error::WorkflowError;
use crate::reference::{OutputTarget, Reference, ReferenceError};

/// A locked step: arguments parsed, declaration order kept.
#[derive(Debug, Clone, PartialEq)]
pub struct StepSpec {
  pub name: String,
  pub module: String,
  pub function: String,
  pub inputs: Vec<(String, Reference)>,
  pub outputs: Vec<(String, OutputTarget)>,
}

impl StepSpec {
  /// Lock a step definition, parsing every argument value.
  pub fn lock(def: StepDef) -> Result<Self, WorkflowError> {
    let inputs = parse_arguments(&def.name, def.inputs, Reference::parse)?;
    let outputs = parse_arguments(&def.name, def.outputs, OutputTarget::parse)?;

    Ok(Self {
      name: def.name,
      module: def.module,
      function: def.function,
      inputs,
      outputs,
    })
  }

  /// The registry identifier of the callable, `module.function`.
  pub fn callable_id(&self) -> String {
    format!("{}.{}", self.module, self.function)
  }
}

fn parse_arguments<T>(
  step: &str,
  arguments: ArgumentMap,
  parse: fn(&serde_json::Value) -> Result<T, ReferenceError>,
) -> Result<Vec<(String, T)>, WorkflowError> {
  arguments
    .into_iter()
    .map(|(argument, value)| match parse(&value) {
      Ok(parsed) => Ok((argument, parsed)),
      Err(e) => Err(WorkflowError::InvalidReference {
        step: step.to_string(),
        argument,
        source: e,
      }),
    })
    .collect()
}
