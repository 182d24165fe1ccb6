//! `report.generate_governance_report`: combine the scan results into a
//! markdown governance report.
//!
//! Each scan result is read on a best-effort basis. A result that cannot be
//! read or parsed is reported in its section instead of failing the step, so
//! the report is still produced for a partially broken run.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use safeops_step::{StepArgs, StepError};
use serde::de::DeserializeOwned;
use tracing::{info, warn};

use crate::documentation::DocumentationReport;
use crate::secrets::SecretFindings;

/// A scan result, or why it could not be used.
pub type Section<T> = Result<T, String>;

/// Everything the report is rendered from.
#[derive(Debug, Clone)]
pub struct ReportInputs {
  pub generated_at: DateTime<Utc>,
  pub executed_steps: Vec<String>,
  pub documentation: Section<DocumentationReport>,
  pub tech_stack: Section<BTreeMap<String, String>>,
  pub secrets: Section<SecretFindings>,
  pub log_dir: Option<PathBuf>,
}

pub async fn generate_governance_report(args: StepArgs) -> Result<(), StepError> {
  let output = args.require_path("output_file")?;

  let inputs = ReportInputs {
    generated_at: Utc::now(),
    executed_steps: args.string_list("executed_steps")?,
    documentation: read_section(&args.require_path("documentation_file")?).await,
    tech_stack: read_section(&args.require_path("tech_stack_file")?).await,
    secrets: read_section(&args.require_path("secrets_file")?).await,
    log_dir: args.optional_path("log_dir")?,
  };

  tokio::fs::write(&output, render(&inputs)).await?;
  info!(output = %output.display(), "governance report written");
  Ok(())
}

async fn read_section<T: DeserializeOwned>(path: &Path) -> Section<T> {
  let result = match tokio::fs::read_to_string(path).await {
    Ok(text) => serde_json::from_str(&text).map_err(|e| e.to_string()),
    Err(e) => Err(e.to_string()),
  };
  result.map_err(|e| {
    warn!(path = %path.display(), error = %e, "scan result unusable");
    format!("could not read '{}': {}", path.display(), e)
  })
}

fn title(step: &str) -> String {
  step
    .split('_')
    .filter(|w| !w.is_empty())
    .map(|w| {
      let mut chars = w.chars();
      match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
        None => String::new(),
      }
    })
    .collect::<Vec<_>>()
    .join(" ")
}

/// Render the report markdown.
pub fn render(inputs: &ReportInputs) -> String {
  let mut lines = vec![
    "# SafeOps Governance Report".to_string(),
    format!("_Generated {}_", inputs.generated_at.format("%Y-%m-%d %H:%M:%S UTC")),
    "---".to_string(),
  ];
  let mut recommendations = Vec::new();

  lines.push("\n## Executed Steps".to_string());
  if inputs.executed_steps.is_empty() {
    lines.push("*   None".to_string());
  }
  for (i, step) in inputs.executed_steps.iter().enumerate() {
    lines.push(format!("{}.  {} (`{}`)", i + 1, title(step), step));
  }

  lines.push("\n## Documentation".to_string());
  match &inputs.documentation {
    Ok(report) => {
      for check in &report.files {
        match (&check.path, check.found) {
          (Some(path), true) => lines.push(format!(
            "*   ✅ **{}** found: {}",
            check.check_name,
            path.display()
          )),
          _ => {
            lines.push(format!("*   ❌ **{}** missing", check.check_name));
            recommendations.push(format!("Add a {} file to the repository root.", check.check_name));
          }
        }
      }
    }
    Err(e) => lines.push(format!("*   Error: {}", e)),
  }

  lines.push("\n## Technology Stack".to_string());
  match &inputs.tech_stack {
    Ok(languages) if languages.is_empty() => lines.push("*   No known languages detected.".to_string()),
    Ok(languages) => lines.extend(languages.keys().map(|l| format!("*   {}", l))),
    Err(e) => lines.push(format!("*   Error: {}", e)),
  }

  lines.push("\n## Secrets".to_string());
  match &inputs.secrets {
    Ok(findings) if findings.is_empty() => lines.push("*   ✅ No issues found.".to_string()),
    Ok(findings) => {
      let total: usize = findings.values().map(Vec::len).sum();
      lines.push(format!(
        "*   **[High]** {} potential secret(s) in {} file(s)",
        total,
        findings.len()
      ));
      for (file, hits) in findings {
        lines.push(format!("    *   **File:** {}", file));
        lines.extend(hits.iter().map(|hit| format!("        *   {}", hit)));
      }
      recommendations.push(
        "Remove committed credentials, rotate them and load secrets from the environment.".to_string(),
      );
    }
    Err(e) => lines.push(format!("*   Error: {}", e)),
  }

  if !recommendations.is_empty() {
    lines.push("\n## Recommendations".to_string());
    for (i, rec) in recommendations.iter().enumerate() {
      lines.push(format!("{}.  **{}**", i + 1, rec));
    }
  }

  lines.push("\n---\n".to_string());
  match &inputs.log_dir {
    Some(dir) => lines.push(format!("For full details, see the log files in:\n{}", dir.display())),
    None => lines.push("Local log files are disabled for this run.".to_string()),
  }

  let mut text = lines.join("\n");
  text.push('\n');
  text
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::documentation::DocumentCheck;
  use chrono::TimeZone;

  fn inputs() -> ReportInputs {
    ReportInputs {
      generated_at: Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap(),
      executed_steps: vec!["ingest".to_string(), "scan_secrets".to_string()],
      documentation: Ok(DocumentationReport {
        files: vec![
          DocumentCheck {
            check_name: "README".to_string(),
            found: true,
            path: Some(PathBuf::from("/repo/README.md")),
          },
          DocumentCheck {
            check_name: "LICENSE".to_string(),
            found: false,
            path: None,
          },
        ],
      }),
      tech_stack: Ok(BTreeMap::from([("rust".to_string(), "detected".to_string())])),
      secrets: Ok(BTreeMap::from([(
        "ci.yml".to_string(),
        vec!["Secret Type: GitHub Token (line 1)".to_string()],
      )])),
      log_dir: Some(PathBuf::from("/logs")),
    }
  }

  #[test]
  fn test_title() {
    assert_eq!(title("scan_tech_stack"), "Scan Tech Stack");
    assert_eq!(title("ingest"), "Ingest");
  }

  #[test]
  fn test_render_sections() {
    let report = render(&inputs());

    assert!(report.starts_with("# SafeOps Governance Report\n_Generated 2026-01-02 03:04:05 UTC_\n"));
    assert!(report.contains("1.  Ingest (`ingest`)\n2.  Scan Secrets (`scan_secrets`)"));
    assert!(report.contains("*   ✅ **README** found: /repo/README.md"));
    assert!(report.contains("*   ❌ **LICENSE** missing"));
    assert!(report.contains("*   rust"));
    assert!(report.contains("1 potential secret(s) in 1 file(s)"));
    assert!(report.contains("        *   Secret Type: GitHub Token (line 1)"));
    assert!(report.contains("1.  **Add a LICENSE file to the repository root.**"));
    assert!(report.contains("2.  **Remove committed credentials"));
    assert!(report.ends_with("see the log files in:\n/logs\n"));
  }

  #[test]
  fn test_render_unreadable_sections() {
    let mut inputs = inputs();
    inputs.secrets = Err("could not read '/x': not found".to_string());
    inputs.log_dir = None;
    inputs.documentation = Ok(DocumentationReport::default());

    let report = render(&inputs);

    assert!(report.contains("## Secrets\n*   Error: could not read '/x': not found"));
    assert!(!report.contains("## Recommendations"));
    assert!(report.ends_with("Local log files are disabled for this run.\n"));
  }

  #[tokio::test]
  async fn test_read_section_reports_failures() {
    let dir = tempfile::tempdir().unwrap();
    let bad = dir.path().join("bad.json");
    std::fs::write(&bad, "not json").unwrap();

    let missing: Section<SecretFindings> = read_section(&dir.path().join("none.json")).await;
    let invalid: Section<SecretFindings> = read_section(&bad).await;

    assert!(missing.unwrap_err().starts_with("could not read"));
    assert!(invalid.is_err());
  }
}
