//! `ingest.ingest_codebase`: snapshot a codebase into a digest file.

use std::path::Path;

use ignore::WalkBuilder;
use safeops_step::{StepArgs, StepError};
use tracing::{debug, info, warn};

use crate::digest::{self, DigestFile};

/// Files larger than this are listed but their contents are left out.
const MAX_FILE_BYTES: u64 = 512 * 1024;

/// Directories never walked: VCS metadata and SafeOps' own run artifacts.
const SKIPPED_DIRS: [&str; 2] = [".git", ".safeops"];

/// Walk `path` (gitignore-aware) and write the digest to `output_file`.
pub async fn ingest_codebase(args: StepArgs) -> Result<(), StepError> {
  let root = args.require_path("path")?;
  let output = args.require_path("output_file")?;

  if !root.is_dir() {
    return Err(StepError::invalid_argument(
      "path",
      format!("'{}' is not a directory", root.display()),
    ));
  }

  let walk_root = root.clone();
  let (text, listed, included) = tokio::task::spawn_blocking(move || build_digest(&walk_root))
    .await
    .map_err(|e| StepError::failed(format!("codebase walk did not finish: {}", e)))?;

  tokio::fs::write(&output, text).await?;
  info!(
    root = %root.display(),
    output = %output.display(),
    listed,
    included,
    "codebase ingested"
  );
  Ok(())
}

/// Build the digest text, returning it with the listed and included counts.
fn build_digest(root: &Path) -> (String, usize, usize) {
  let walker = WalkBuilder::new(root)
    .hidden(false)
    .git_ignore(true)
    .git_exclude(true)
    .require_git(false)
    .filter_entry(|entry| {
      let name = entry.file_name().to_string_lossy();
      !SKIPPED_DIRS.contains(&name.as_ref())
    })
    .build();

  let mut entries = Vec::new();
  for entry in walker {
    let entry = match entry {
      Ok(entry) => entry,
      Err(error) => {
        warn!(%error, "skipping unreadable entry");
        continue;
      }
    };
    if !entry.file_type().is_some_and(|t| t.is_file()) {
      continue;
    }
    let Ok(rel) = entry.path().strip_prefix(root) else {
      continue;
    };
    let rel = rel
      .components()
      .map(|c| c.as_os_str().to_string_lossy().into_owned())
      .collect::<Vec<_>>()
      .join("/");
    entries.push((rel, entry.into_path()));
  }
  entries.sort();

  let listed: Vec<String> = entries.iter().map(|(rel, _)| rel.clone()).collect();
  let files: Vec<DigestFile> = entries
    .iter()
    .filter_map(|(rel, path)| {
      read_text(path).map(|content| DigestFile {
        path: rel.clone(),
        content,
      })
    })
    .collect();

  let root_name = root
    .file_name()
    .map(|n| n.to_string_lossy().into_owned())
    .unwrap_or_else(|| root.display().to_string());

  let text = digest::render(&root_name, &listed, &files);
  (text, listed.len(), files.len())
}

/// The file's contents if it is a reasonably sized text file.
fn read_text(path: &Path) -> Option<String> {
  let size = std::fs::metadata(path).ok()?.len();
  if size > MAX_FILE_BYTES {
    debug!(path = %path.display(), size, "file too large for digest");
    return None;
  }

  let bytes = std::fs::read(path).ok()?;
  if bytes.contains(&0) {
    return None;
  }
  String::from_utf8(bytes).ok()
}
