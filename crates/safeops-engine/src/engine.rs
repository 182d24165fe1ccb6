//! Sequential pipeline driver.
//!
//! The `WorkflowEngine` runs the steps of a workflow one at a time, in
//! declaration order. For each step it resolves inputs, allocates outputs,
//! invokes the registered step and records what it produced, so later steps
//! can consume it. The first failure halts the run.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use safeops_artifact::{RunContext, allocate_outputs};
use safeops_resolver::{InputResolver, RunInputs};
use safeops_step::{StepRegistry, invoke};
use safeops_workflow::{StepSpec, Workflow};
use tracing::{debug, error, info, instrument};

use crate::error::{EngineError, RunError};
use crate::events::{ExecutionEvent, ExecutionNotifier};
use crate::run_log::RunLog;

/// Result of a completed run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
  pub run_id: String,
  pub workflow_name: String,
  /// Steps that completed, in execution order.
  pub completed_steps: Vec<String>,
  /// Absolute persistent log directory, if logging was enabled.
  pub log_location: Option<PathBuf>,
}

/// Where a run is. Terminal states do not resume.
#[derive(Debug)]
enum RunState {
  Starting,
  Running { index: usize },
  Completed,
  Failed(RunError),
}

/// The pipeline engine.
///
/// Holds the step registry; everything specific to one run lives in the
/// [`RunContext`] passed to [`WorkflowEngine::run`].
#[derive(Debug, Clone)]
pub struct WorkflowEngine {
  registry: Arc<StepRegistry>,
}

impl WorkflowEngine {
  pub fn new(registry: Arc<StepRegistry>) -> Self {
    Self { registry }
  }

  /// Run a loaded workflow to completion or to its first failure.
  ///
  /// Emits `AllSteps`, a `StepStart`/`StepDone` pair per completed step and
  /// finally `WorkflowComplete` or `WorkflowError`. On failure the error is
  /// returned after the event has been emitted.
  #[instrument(
    name = "workflow_run",
    skip_all,
    fields(workflow_name = %workflow.name, run_id = %context.run_id())
  )]
  pub async fn run(
    &self,
    workflow: &Workflow,
    inputs: &RunInputs,
    context: &mut RunContext,
    notifier: &dyn ExecutionNotifier,
  ) -> Result<RunSummary, RunError> {
    let log = RunLog::new(context.log_dir());
    let mut completed_steps = Vec::with_capacity(workflow.steps.len());
    let mut state = RunState::Starting;

    loop {
      state = match state {
        RunState::Starting => {
          info!(steps = workflow.steps.len(), "starting workflow");
          notifier.notify(ExecutionEvent::AllSteps {
            steps: workflow.step_names(),
          });

          log
            .line(&format!(
              "Running workflow: {} (Run ID: {})",
              workflow.name,
              context.run_id()
            ))
            .await;
          if let Some(dir) = context.log_dir() {
            log
              .line(&format!("Log directory: {}", dir.display()))
              .await;
          }

          RunState::Running { index: 0 }
        }

        RunState::Running { index } => match workflow.steps.get(index) {
          None => RunState::Completed,
          Some(step) => {
            match self
              .run_step(workflow, step, inputs, context, notifier, &log)
              .await
            {
              Ok(()) => {
                completed_steps.push(step.name.clone());
                RunState::Running { index: index + 1 }
              }
              Err(source) => RunState::Failed(RunError::in_step(&step.name, source)),
            }
          }
        },

        RunState::Completed => {
          let log_location = context.log_dir().map(absolute);
          info!(completed = completed_steps.len(), "workflow completed");
          notifier.notify(ExecutionEvent::WorkflowComplete {
            workflow_name: workflow.name.clone(),
            log_location: log_location.clone(),
          });

          return Ok(RunSummary {
            run_id: context.run_id().to_string(),
            workflow_name: workflow.name.clone(),
            completed_steps,
            log_location,
          });
        }

        RunState::Failed(err) => return Err(fail(err, &log, notifier).await),
      };
    }
  }

  /// Load a workflow from JSON text and run it.
  ///
  /// A definition that does not load is reported like any other failure,
  /// attributed to the `Unknown` step.
  pub async fn run_source(
    &self,
    source: &str,
    inputs: &RunInputs,
    context: &mut RunContext,
    notifier: &dyn ExecutionNotifier,
  ) -> Result<RunSummary, RunError> {
    match safeops_workflow::load(source) {
      Ok(workflow) => self.run(&workflow, inputs, context, notifier).await,
      Err(e) => Err(fail_before_start(e.into(), context, notifier).await),
    }
  }

  /// Load a workflow file and run it.
  pub async fn run_file(
    &self,
    path: &Path,
    inputs: &RunInputs,
    context: &mut RunContext,
    notifier: &dyn ExecutionNotifier,
  ) -> Result<RunSummary, RunError> {
    match safeops_workflow::load_file(path).await {
      Ok(workflow) => self.run(&workflow, inputs, context, notifier).await,
      Err(e) => Err(fail_before_start(e.into(), context, notifier).await),
    }
  }

  /// Resolve, invoke and record a single step.
  async fn run_step(
    &self,
    workflow: &Workflow,
    step: &StepSpec,
    inputs: &RunInputs,
    context: &mut RunContext,
    notifier: &dyn ExecutionNotifier,
    log: &RunLog,
  ) -> Result<(), EngineError> {
    notifier.notify(ExecutionEvent::StepStart {
      step: step.name.clone(),
    });
    log.line(&format!("Running step: {}", step.name)).await;
    info!(step = %step.name, callable = %step.callable_id(), "running step");

    let resolved = InputResolver::new(workflow, inputs, context)
      .resolve_step(step)
      .await?;
    let (outputs, recorded) = allocate_outputs(context, step).await?.into_parts();
    debug!(
      step = %step.name,
      inputs = resolved.len(),
      outputs = outputs.len(),
      "step arguments bound"
    );

    invoke(
      &self.registry,
      &step.name,
      &step.module,
      &step.function,
      resolved,
      outputs,
    )
    .await?;

    context.record(&step.name, recorded)?;

    notifier.notify(ExecutionEvent::StepDone {
      step: step.name.clone(),
    });
    log
      .line(&format!("Step '{}' completed successfully.", step.name))
      .await;
    Ok(())
  }
}

/// Report a halted run to the log and the notifier, then hand it back.
async fn fail(err: RunError, log: &RunLog, notifier: &dyn ExecutionNotifier) -> RunError {
  error!(step = %err.step_name(), error = %err.source, "workflow failed");
  log.failure(&err).await;
  notifier.notify(ExecutionEvent::WorkflowError {
    message: err.to_string(),
  });
  err
}

async fn fail_before_start(
  source: EngineError,
  context: &RunContext,
  notifier: &dyn ExecutionNotifier,
) -> RunError {
  let log = RunLog::new(context.log_dir());
  fail(RunError::before_start(source), &log, notifier).await
}

fn absolute(dir: &Path) -> PathBuf {
  std::path::absolute(dir).unwrap_or_else(|_| dir.to_path_buf())
}
