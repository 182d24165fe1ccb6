//! `scan.scan_secrets`: look for credentials committed to the codebase.
//!
//! Each file in the digest is matched line by line against a fixed set of
//! detectors. Findings are keyed by file path and name the detector and the
//! line within that file, never the matched text.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;
use safeops_step::{StepArgs, StepError};
use tracing::info;

use crate::digest::Digest;

struct Detector {
  name: &'static str,
  pattern: Regex,
}

fn detector(name: &'static str, pattern: &str) -> Detector {
  Detector {
    name,
    pattern: Regex::new(pattern).expect("secret detector pattern is valid"),
  }
}

static DETECTORS: Lazy<Vec<Detector>> = Lazy::new(|| {
  vec![
    detector("AWS Access Key", r"\b(?:AKIA|ASIA|AGPA|AIDA|AROA|ANPA)[0-9A-Z]{16}\b"),
    detector("Private Key", r"-----BEGIN (?:[A-Z]+ )*PRIVATE KEY-----"),
    detector("GitHub Token", r"\b(?:gh[pousr]_[A-Za-z0-9]{36}|github_pat_[A-Za-z0-9_]{22,})\b"),
    detector("Slack Token", r"\bxox[abposr]-[A-Za-z0-9-]{10,}"),
    detector("Stripe Access Key", r"\b(?:sk|rk)_live_[0-9A-Za-z]{24,}\b"),
    detector("JSON Web Token", r"\beyJ[A-Za-z0-9_-]{10,}\.eyJ[A-Za-z0-9_-]{10,}\.[A-Za-z0-9_-]{10,}"),
  ]
});

/// Findings per file, as `Secret Type: <type> (line <n>)`.
pub type SecretFindings = BTreeMap<String, Vec<String>>;

/// Scan every file of a digest. Files without findings are left out.
pub fn scan_digest(digest: &Digest) -> SecretFindings {
  let mut findings = SecretFindings::new();

  for file in &digest.files {
    let hits: Vec<String> = file
      .content
      .lines()
      .enumerate()
      .flat_map(|(index, line)| {
        DETECTORS
          .iter()
          .filter(move |d| d.pattern.is_match(line))
          .map(move |d| format!("Secret Type: {} (line {})", d.name, index + 1))
      })
      .collect();

    if !hits.is_empty() {
      findings.insert(file.path.clone(), hits);
    }
  }

  findings
}

pub async fn scan_secrets(args: StepArgs) -> Result<(), StepError> {
  let digest_path = args.require_path("gitingest_file_path")?;
  let output = args.require_path("output_file")?;

  let digest = Digest::parse(&tokio::fs::read_to_string(&digest_path).await?);
  let findings = scan_digest(&digest);

  tokio::fs::write(&output, serde_json::to_string_pretty(&findings)?).await?;
  info!(
    files = findings.len(),
    findings = findings.values().map(Vec::len).sum::<usize>(),
    "secret scan completed"
  );
  Ok(())
}
