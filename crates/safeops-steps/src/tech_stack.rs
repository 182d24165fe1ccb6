//! `scan.scan_tech_stack`: detect the languages a codebase uses from the
//! file list in its digest.

use std::collections::BTreeMap;

use safeops_step::{StepArgs, StepError};
use tracing::info;

use crate::digest::Digest;

const DETECTED: &str = "detected";

/// Language by file extension.
const EXTENSIONS: &[(&str, &str)] = &[
  ("py", "python"),
  ("go", "go"),
  ("js", "javascript"),
  ("jsx", "javascript"),
  ("mjs", "javascript"),
  ("ts", "typescript"),
  ("tsx", "typescript"),
  ("java", "java"),
  ("rb", "ruby"),
  ("php", "php"),
  ("cs", "c#"),
  ("cpp", "c++"),
  ("cc", "c++"),
  ("hpp", "c++"),
  ("c", "c"),
  ("h", "c"),
  ("swift", "swift"),
  ("kt", "kotlin"),
  ("kts", "kotlin"),
  ("scala", "scala"),
  ("rs", "rust"),
  ("dart", "dart"),
];

/// Language by manifest file name.
const MANIFESTS: &[(&str, &str)] = &[
  ("Cargo.toml", "rust"),
  ("go.mod", "go"),
  ("package.json", "javascript"),
  ("tsconfig.json", "typescript"),
  ("pyproject.toml", "python"),
  ("requirements.txt", "python"),
  ("setup.py", "python"),
  ("pom.xml", "java"),
  ("build.gradle", "java"),
  ("Gemfile", "ruby"),
  ("composer.json", "php"),
  ("Package.swift", "swift"),
  ("pubspec.yaml", "dart"),
];

/// Languages detected among `paths`, sorted by name.
pub fn detect_languages<'a>(paths: impl IntoIterator<Item = &'a str>) -> BTreeMap<String, String> {
  let mut detected = BTreeMap::new();

  for path in paths {
    let name = path.rsplit('/').next().unwrap_or(path);
    let by_manifest = MANIFESTS.iter().find(|(m, _)| *m == name);
    let by_extension = name
      .rsplit_once('.')
      .map(|(_, ext)| ext.to_ascii_lowercase())
      .and_then(|ext| EXTENSIONS.iter().find(|(e, _)| *e == ext));

    for (_, language) in by_manifest.into_iter().chain(by_extension) {
      detected.insert(language.to_string(), DETECTED.to_string());
    }
  }

  detected
}

pub async fn scan_tech_stack(args: StepArgs) -> Result<(), StepError> {
  let digest_path = args.require_path("gitingest_file_path")?;
  let output = args.require_path("output_file")?;

  let digest = Digest::parse(&tokio::fs::read_to_string(&digest_path).await?);
  let languages = detect_languages(digest.listed.iter().map(String::as_str));

  tokio::fs::write(&output, serde_json::to_string_pretty(&languages)?).await?;
  info!(languages = ?languages.keys().collect::<Vec<_>>(), "tech stack scan completed");
  Ok(())
}
