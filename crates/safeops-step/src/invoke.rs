use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::args::StepArgs;
use crate::error::InvokeError;
use crate::registry::StepRegistry;

/// Bind and call the step registered as `module.function`.
///
/// The step receives the resolved inputs followed by the allocated outputs as
/// one set of named arguments. An argument name declared on both sides is
/// rejected before the step runs.
pub async fn invoke(
  registry: &StepRegistry,
  step_name: &str,
  module: &str,
  function: &str,
  inputs: Map<String, Value>,
  outputs: Map<String, Value>,
) -> Result<(), InvokeError> {
  let step = registry
    .get(module, function)
    .ok_or_else(|| InvokeError::StepNotFound {
      module: module.to_string(),
      function: function.to_string(),
    })?;

  let mut arguments = inputs;
  for (name, value) in outputs {
    if arguments.contains_key(&name) {
      return Err(InvokeError::ConflictingArgument {
        step_name: step_name.to_string(),
        name,
      });
    }
    arguments.insert(name, value);
  }

  debug!(
    step = %step_name,
    callable = %format!("{}.{}", module, function),
    arguments = arguments.len(),
    "invoking step"
  );

  step
    .call(StepArgs::new(arguments))
    .await
    .map_err(|source| InvokeError::StepExecutionFailed {
      step_name: step_name.to_string(),
      source,
    })?;

  info!(step = %step_name, "step returned");
  Ok(())
}
