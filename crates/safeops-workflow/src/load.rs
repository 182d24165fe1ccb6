use std::path::Path;

use safeops_config::WorkflowDef;

use crate::error::WorkflowError;
use crate::workflow::Workflow;

/// Parse and lock a workflow from a JSON document.
pub fn load(source: &str) -> Result<Workflow, WorkflowError> {
  let def = WorkflowDef::from_json(source).map_err(|e| WorkflowError::malformed(e.to_string()))?;
  Workflow::lock(def)
}

/// Read, parse and lock a workflow file.
pub async fn load_file(path: &Path) -> Result<Workflow, WorkflowError> {
  let source = tokio::fs::read_to_string(path)
    .await
    .map_err(|source| WorkflowError::Read {
      path: path.to_path_buf(),
      source,
    })?;
  load(&source)
}
