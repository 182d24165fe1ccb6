use serde::{Deserialize, Serialize};

use crate::input::ArgumentMap;

/// A single pipeline step as written in the workflow document.
///
/// `module` and `function` together name the callable in the step registry.
/// All five fields are required; `inputs` and `outputs` may be empty objects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepDef {
  pub name: String,
  pub module: String,
  pub function: String,
  pub inputs: ArgumentMap,
  pub outputs: ArgumentMap,
}
