use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::ArtifactError;
use crate::table::{RecordedOutput, StepOutputTable};

/// Directory created under the temp root to hold ephemeral run directories.
pub const TEMP_DIR_NAME: &str = ".safeops";

/// Per-execution state.
///
/// Created once per run and passed by reference to the resolver and artifact
/// allocation, and by mutable reference to the driver, which is the only
/// writer of the output table.
#[derive(Debug)]
pub struct RunContext {
  run_id: String,
  work_dir: PathBuf,
  log_dir: Option<PathBuf>,
  outputs: StepOutputTable,
}

impl RunContext {
  /// Create a context with a fresh run id.
  ///
  /// Ephemeral artifacts go to `<temp_root>/.safeops/temp/<run_id>`. When
  /// `log_dir` is set, artifacts are written there instead and the run log is
  /// kept.
  pub fn new(temp_root: impl AsRef<Path>, log_dir: Option<PathBuf>) -> Self {
    Self::with_run_id(uuid::Uuid::new_v4().to_string(), temp_root, log_dir)
  }

  /// Create a context with a caller-chosen run id.
  pub fn with_run_id(
    run_id: impl Into<String>,
    temp_root: impl AsRef<Path>,
    log_dir: Option<PathBuf>,
  ) -> Self {
    let run_id = run_id.into();
    let work_dir = temp_root
      .as_ref()
      .join(TEMP_DIR_NAME)
      .join("temp")
      .join(&run_id);

    Self {
      run_id,
      work_dir,
      log_dir,
      outputs: StepOutputTable::new(),
    }
  }

  pub fn run_id(&self) -> &str {
    &self.run_id
  }

  /// The ephemeral directory for this run. It may not exist yet.
  pub fn work_dir(&self) -> &Path {
    &self.work_dir
  }

  /// The persistent log directory, if logging is enabled.
  pub fn log_dir(&self) -> Option<&Path> {
    self.log_dir.as_deref()
  }

  /// Where step artifacts are written: the log directory if enabled,
  /// otherwise the ephemeral run directory.
  pub fn output_dir(&self) -> &Path {
    self.log_dir.as_deref().unwrap_or(&self.work_dir)
  }

  pub fn outputs(&self) -> &StepOutputTable {
    &self.outputs
  }

  /// Record the outputs of a step that has just completed.
  pub fn record(
    &mut self,
    step: &str,
    outputs: impl IntoIterator<Item = (String, RecordedOutput)>,
  ) -> Result<(), ArtifactError> {
    self.outputs.insert(step, outputs)?;
    debug!(run_id = %self.run_id, step = %step, "step outputs recorded");
    Ok(())
  }

  /// Remove the ephemeral run directory. The log directory is never touched.
  pub async fn cleanup(&self) -> Result<(), ArtifactError> {
    match tokio::fs::remove_dir_all(&self.work_dir).await {
      Ok(()) => Ok(()),
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
      Err(source) => Err(ArtifactError::Cleanup {
        path: self.work_dir.clone(),
        source,
      }),
    }
  }
}
