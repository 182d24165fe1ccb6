//! The persistent run log, `<log_dir>/workflow_log.txt`.
//!
//! Writes are best-effort. A failure to append is reported through tracing
//! and never replaces the outcome of the run.

use std::error::Error;
use std::path::{Path, PathBuf};

use tokio::io::AsyncWriteExt;
use tracing::warn;

/// File name of the run log inside the log directory.
pub const RUN_LOG_FILE: &str = "workflow_log.txt";

/// Appends lines to the run log when a log directory is configured.
#[derive(Debug, Clone)]
pub(crate) struct RunLog {
  path: Option<PathBuf>,
}

impl RunLog {
  pub(crate) fn new(log_dir: Option<&Path>) -> Self {
    Self {
      path: log_dir.map(|dir| dir.join(RUN_LOG_FILE)),
    }
  }

  pub(crate) async fn line(&self, text: &str) {
    self.append(&[text.to_string()]).await;
  }

  /// Record a failure: the message, one `caused by:` line per cause not
  /// already in the message, then the full structured error as `detail:`.
  pub(crate) async fn failure<E>(&self, error: &E)
  where
    E: Error + 'static,
  {
    let mut lines = vec![error.to_string()];
    lines.extend(
      error_chain(error)
        .into_iter()
        .map(|cause| format!("  caused by: {}", cause)),
    );
    lines.push(format!("  detail: {:?}", error));
    self.append(&lines).await;
  }

  async fn append(&self, lines: &[String]) {
    let Some(path) = &self.path else {
      return;
    };

    if let Err(error) = append_lines(path, lines).await {
      warn!(path = %path.display(), %error, "failed to write run log");
    }
  }
}

async fn append_lines(path: &Path, lines: &[String]) -> std::io::Result<()> {
  if let Some(dir) = path.parent() {
    tokio::fs::create_dir_all(dir).await?;
  }

  let mut file = tokio::fs::OpenOptions::new()
    .create(true)
    .append(true)
    .open(path)
    .await?;

  let mut buf = String::new();
  for line in lines {
    buf.push_str(line);
    buf.push('\n');
  }
  file.write_all(buf.as_bytes()).await?;
  file.flush().await
}

/// The causes of an error, outermost first.
///
/// Wrapper errors often repeat their cause in their own message; a cause whose
/// text already appears in the previous line adds nothing and is skipped.
fn error_chain(error: &(dyn Error + 'static)) -> Vec<String> {
  let mut causes = Vec::new();
  let mut previous = error.to_string();
  let mut current = error.source();

  while let Some(cause) = current {
    let text = cause.to_string();
    if !previous.contains(&text) {
      causes.push(text.clone());
    }
    previous = text;
    current = cause.source();
  }

  causes
}
