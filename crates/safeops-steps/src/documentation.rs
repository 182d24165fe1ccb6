//! `scan.scan_documentation`: check a codebase root for key project documents.

use std::collections::HashMap;
use std::path::PathBuf;

use safeops_step::{StepArgs, StepError};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Documents looked for, with the file names accepted for each, in
/// preference order. Matching is case-insensitive.
const CHECKS: [(&str, &[&str]); 3] = [
  ("README", &["README.md", "README.rst", "README"]),
  ("LICENSE", &["LICENSE", "LICENSE.md", "LICENSE.txt"]),
  ("CONTRIBUTING", &["CONTRIBUTING.md", "CONTRIBUTING.rst"]),
];

/// The outcome of one document check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentCheck {
  pub check_name: String,
  pub found: bool,
  pub path: Option<PathBuf>,
}

/// The JSON written by `scan_documentation`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentationReport {
  pub files: Vec<DocumentCheck>,
}

impl DocumentationReport {
  pub fn missing(&self) -> impl Iterator<Item = &str> {
    self
      .files
      .iter()
      .filter(|check| !check.found)
      .map(|check| check.check_name.as_str())
  }
}

pub async fn scan_documentation(args: StepArgs) -> Result<(), StepError> {
  let root = args.require_path("codebase_path")?;
  let output = args.require_path("output_file")?;

  if !root.is_dir() {
    return Err(StepError::invalid_argument(
      "codebase_path",
      format!("'{}' is not a valid directory", root.display()),
    ));
  }

  // Lower-cased name -> actual name, for the root directory only.
  let mut names = HashMap::new();
  let mut entries = tokio::fs::read_dir(&root).await?;
  while let Some(entry) = entries.next_entry().await? {
    let name = entry.file_name().to_string_lossy().into_owned();
    names.insert(name.to_lowercase(), name);
  }

  let files = CHECKS
    .iter()
    .map(|(check_name, variants)| {
      let found = variants
        .iter()
        .find_map(|variant| names.get(&variant.to_lowercase()));
      DocumentCheck {
        check_name: check_name.to_string(),
        found: found.is_some(),
        path: found.map(|name| root.join(name)),
      }
    })
    .collect();
  let report = DocumentationReport { files };

  tokio::fs::write(&output, serde_json::to_string_pretty(&report)?).await?;
  info!(
    root = %root.display(),
    missing = ?report.missing().collect::<Vec<_>>(),
    "documentation scan completed"
  );
  Ok(())
}
