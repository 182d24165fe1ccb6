//! Execution events and notifiers.
//!
//! Events are emitted as the pipeline advances so that a front end can track
//! progress. Their [`Display`](std::fmt::Display) form is the line protocol
//! read by the desktop UI:
//!
//! ```text
//! ALL_STEPS:ingest,scan_docs,report
//! STEP_START:ingest
//! STEP_DONE:ingest
//! WORKFLOW_COMPLETE:governance;;/abs/log/dir
//! WORKFLOW_ERROR:Error during step 'ingest': ...
//! ```

use std::fmt;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::warn;

/// Log location reported when no persistent log directory is configured.
pub const LOG_DISABLED: &str = "Disabled";

/// Events emitted during a pipeline run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExecutionEvent {
  /// The run has started; carries every step name in declaration order.
  AllSteps { steps: Vec<String> },

  /// A step is about to have its inputs resolved and be invoked.
  StepStart { step: String },

  /// A step returned and its outputs were recorded.
  StepDone { step: String },

  /// Every step completed.
  WorkflowComplete {
    workflow_name: String,
    log_location: Option<PathBuf>,
  },

  /// The run halted.
  WorkflowError { message: String },
}

impl ExecutionEvent {
  /// Whether the event belongs on the error stream.
  pub fn is_error(&self) -> bool {
    matches!(self, Self::WorkflowError { .. })
  }
}

impl fmt::Display for ExecutionEvent {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::AllSteps { steps } => write!(f, "ALL_STEPS:{}", steps.join(",")),
      Self::StepStart { step } => write!(f, "STEP_START:{}", step),
      Self::StepDone { step } => write!(f, "STEP_DONE:{}", step),
      Self::WorkflowComplete {
        workflow_name,
        log_location,
      } => match log_location {
        Some(dir) => write!(f, "WORKFLOW_COMPLETE:{};;{}", workflow_name, dir.display()),
        None => write!(f, "WORKFLOW_COMPLETE:{};;{}", workflow_name, LOG_DISABLED),
      },
      Self::WorkflowError { message } => write!(f, "WORKFLOW_ERROR:{}", message),
    }
  }
}

/// Trait for receiving execution events.
///
/// The engine calls `notify` for each event, in order, from the task driving
/// the run. Implementations decide what to do with them.
pub trait ExecutionNotifier: Send + Sync {
  fn notify(&self, event: ExecutionEvent);
}

/// A notifier that discards all events.
#[derive(Debug, Clone, Default)]
pub struct NoopNotifier;

impl ExecutionNotifier for NoopNotifier {
  fn notify(&self, _event: ExecutionEvent) {}
}

/// A notifier that sends events to an unbounded channel.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
  // At most two events per step, so the queue stays small.
  sender: mpsc::UnboundedSender<ExecutionEvent>,
}

impl ChannelNotifier {
  pub fn new(sender: mpsc::UnboundedSender<ExecutionEvent>) -> Self {
    Self { sender }
  }
}

impl ExecutionNotifier for ChannelNotifier {
  fn notify(&self, event: ExecutionEvent) {
    // The receiver may have been dropped.
    let _ = self.sender.send(event);
  }
}

/// A notifier that writes the line protocol.
///
/// Progress lines go to `out`, `WORKFLOW_ERROR` lines to `err`. Every line is
/// flushed as soon as it is written so a reader sees progress live.
#[derive(Debug)]
pub struct LineNotifier<O, E> {
  out: Mutex<O>,
  err: Mutex<E>,
}

impl LineNotifier<io::Stdout, io::Stderr> {
  /// Write progress to stdout and failures to stderr.
  pub fn stdio() -> Self {
    Self::new(io::stdout(), io::stderr())
  }
}

impl<O, E> LineNotifier<O, E>
where
  O: Write + Send,
  E: Write + Send,
{
  pub fn new(out: O, err: E) -> Self {
    Self {
      out: Mutex::new(out),
      err: Mutex::new(err),
    }
  }

  /// Take back the underlying writers.
  pub fn into_inner(self) -> (O, E) {
    let out = self.out.into_inner().unwrap_or_else(|e| e.into_inner());
    let err = self.err.into_inner().unwrap_or_else(|e| e.into_inner());
    (out, err)
  }
}

fn write_line<W: Write>(mut writer: MutexGuard<'_, W>, line: &str) -> io::Result<()> {
  writeln!(writer, "{}", line)?;
  writer.flush()
}

impl<O, E> ExecutionNotifier for LineNotifier<O, E>
where
  O: Write + Send,
  E: Write + Send,
{
  fn notify(&self, event: ExecutionEvent) {
    let line = event.to_string();
    let result = if event.is_error() {
      write_line(self.err.lock().unwrap_or_else(|e| e.into_inner()), &line)
    } else {
      write_line(self.out.lock().unwrap_or_else(|e| e.into_inner()), &line)
    };

    if let Err(error) = result {
      warn!(%error, event = %line, "failed to write protocol line");
    }
  }
}
