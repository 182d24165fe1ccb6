use std::sync::{Arc, Mutex};

use safeops_artifact::{Missing, RunContext};
use safeops_engine::{
  ChannelNotifier, EngineError, ExecutionEvent, LineNotifier, RUN_LOG_FILE, WorkflowEngine,
};
use safeops_resolver::{ResolveError, RunInputs};
use safeops_step::{InvokeError, StepArgs, StepError, StepRegistry, step_fn};
use serde_json::{Map, Value, json};
use tokio::sync::mpsc;

type Calls = Arc<Mutex<Vec<(String, Map<String, Value>)>>>;

/// A registry with `demo.write` (writes `"  hello  \n"` to `o`), `demo.read`
/// and `demo.boom`, recording the arguments of every call.
fn registry(calls: &Calls) -> StepRegistry {
  let mut registry = StepRegistry::new();

  let seen = calls.clone();
  registry.register(
    "demo",
    "write",
    step_fn(move |args: StepArgs| {
      let seen = seen.clone();
      async move {
        let output = args.require_path("o")?;
        tokio::fs::write(&output, "  hello  \n").await?;
        seen
          .lock()
          .unwrap()
          .push(("write".to_string(), args.into_inner()));
        Ok::<(), StepError>(())
      }
    }),
  );

  let seen = calls.clone();
  registry.register(
    "demo",
    "read",
    step_fn(move |args: StepArgs| {
      let seen = seen.clone();
      async move {
        seen
          .lock()
          .unwrap()
          .push(("read".to_string(), args.into_inner()));
        Ok::<(), StepError>(())
      }
    }),
  );

  registry.register(
    "demo",
    "boom",
    step_fn(|_| async { Err(StepError::failed("boom")) }),
  );

  registry
}

fn demo_workflow(first: &str) -> String {
  json!({
    "name": "demo",
    "steps": [
      { "name": "s1", "module": "demo", "function": first,
        "inputs": { "p": "{workflow.inputs.path}" },
        "outputs": { "o": "{workflow.outputs.o}" } },
      { "name": "s2", "module": "demo", "function": "read",
        "inputs": { "v": "{steps.s1.outputs.o}" },
        "outputs": {} }
    ]
  })
  .to_string()
}

fn inputs() -> RunInputs {
  let mut inputs = RunInputs::new();
  inputs.insert("path".to_string(), json!("/repo"));
  inputs
}

fn drain(rx: &mut mpsc::UnboundedReceiver<ExecutionEvent>) -> Vec<String> {
  let mut lines = Vec::new();
  while let Ok(event) = rx.try_recv() {
    lines.push(event.to_string());
  }
  lines
}

#[tokio::test]
async fn test_demo_workflow_end_to_end() {
  let dir = tempfile::tempdir().unwrap();
  let calls = Calls::default();
  let engine = WorkflowEngine::new(Arc::new(registry(&calls)));
  let (tx, mut rx) = mpsc::unbounded_channel();
  let mut context = RunContext::new(dir.path(), None);

  let summary = engine
    .run_source(
      &demo_workflow("write"),
      &inputs(),
      &mut context,
      &ChannelNotifier::new(tx),
    )
    .await
    .unwrap();

  assert_eq!(
    drain(&mut rx),
    vec![
      "ALL_STEPS:s1,s2",
      "STEP_START:s1",
      "STEP_DONE:s1",
      "STEP_START:s2",
      "STEP_DONE:s2",
      "WORKFLOW_COMPLETE:demo;;Disabled",
    ]
  );
  assert_eq!(summary.completed_steps, vec!["s1", "s2"]);
  assert_eq!(summary.log_location, None);

  let calls = calls.lock().unwrap();
  let (_, s1_args) = &calls[0];
  assert_eq!(s1_args["p"], "/repo");
  let allocated = s1_args["o"].as_str().unwrap();
  assert!(allocated.starts_with(context.work_dir().to_str().unwrap()));
  assert!(allocated.ends_with("o.txt"));

  let (_, s2_args) = &calls[1];
  assert_eq!(s2_args["v"], "hello");
}

#[tokio::test]
async fn test_failing_step_halts_run() {
  let dir = tempfile::tempdir().unwrap();
  let calls = Calls::default();
  let engine = WorkflowEngine::new(Arc::new(registry(&calls)));
  let (tx, mut rx) = mpsc::unbounded_channel();
  let mut context = RunContext::new(dir.path(), None);

  let err = engine
    .run_source(
      &demo_workflow("boom"),
      &inputs(),
      &mut context,
      &ChannelNotifier::new(tx),
    )
    .await
    .unwrap_err();

  assert_eq!(err.step.as_deref(), Some("s1"));
  assert_eq!(
    drain(&mut rx),
    vec![
      "ALL_STEPS:s1,s2",
      "STEP_START:s1",
      "WORKFLOW_ERROR:Error during step 's1': boom",
    ]
  );
  assert!(calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_forward_reference_fails_at_consumer() {
  let dir = tempfile::tempdir().unwrap();
  let calls = Calls::default();
  let engine = WorkflowEngine::new(Arc::new(registry(&calls)));
  let (tx, mut rx) = mpsc::unbounded_channel();
  let mut context = RunContext::new(dir.path(), None);

  let source = json!({
    "name": "forward",
    "steps": [
      { "name": "early", "module": "demo", "function": "read",
        "inputs": { "v": "{steps.late.outputs.o}" }, "outputs": {} },
      { "name": "late", "module": "demo", "function": "write",
        "inputs": {}, "outputs": { "o": "{workflow.outputs.o}" } }
    ]
  })
  .to_string();

  let err = engine
    .run_source(&source, &inputs(), &mut context, &ChannelNotifier::new(tx))
    .await
    .unwrap_err();

  assert_eq!(err.step.as_deref(), Some("early"));
  assert!(matches!(
    err.source,
    EngineError::Resolve(ResolveError::UnresolvedStepOutput { .. })
  ));

  let lines = drain(&mut rx);
  let errors: Vec<_> = lines
    .iter()
    .filter(|l| l.starts_with("WORKFLOW_ERROR:"))
    .collect();
  assert_eq!(errors.len(), 1);
  assert!(errors[0].starts_with("WORKFLOW_ERROR:Error during step 'early': "));
  assert!(calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_unproduced_output_fails_at_consumer() {
  let dir = tempfile::tempdir().unwrap();
  let calls = Calls::default();
  let engine = WorkflowEngine::new(Arc::new(registry(&calls)));
  let (tx, mut rx) = mpsc::unbounded_channel();
  let mut context = RunContext::new(dir.path(), None);

  let source = json!({
    "name": "unproduced",
    "steps": [
      { "name": "s1", "module": "demo", "function": "write",
        "inputs": {}, "outputs": { "o": "{workflow.outputs.o}" } },
      { "name": "s2", "module": "demo", "function": "read",
        "inputs": { "v": "{steps.s1.outputs.missing}" }, "outputs": {} }
    ]
  })
  .to_string();

  let err = engine
    .run_source(&source, &inputs(), &mut context, &ChannelNotifier::new(tx))
    .await
    .unwrap_err();

  assert_eq!(err.step_name(), "s2");
  match &err.source {
    EngineError::Resolve(ResolveError::UnresolvedStepOutput { step, key, reason }) => {
      assert_eq!(step, "s1");
      assert_eq!(key, "missing");
      assert_eq!(*reason, Missing::KeyNotProduced);
    }
    other => panic!("unexpected error: {:?}", other),
  }

  let lines = drain(&mut rx);
  assert_eq!(
    lines[..4],
    ["ALL_STEPS:s1,s2", "STEP_START:s1", "STEP_DONE:s1", "STEP_START:s2"]
  );
  assert_eq!(lines.len(), 5);
  assert!(lines[4].starts_with("WORKFLOW_ERROR:Error during step 's2': "));

  // Only the producer ran.
  let calls = calls.lock().unwrap();
  assert_eq!(calls.len(), 1);
  assert_eq!(calls[0].0, "write");
}

#[tokio::test]
async fn test_missing_workflow_input() {
  let dir = tempfile::tempdir().unwrap();
  let engine = WorkflowEngine::new(Arc::new(registry(&Calls::default())));
  let mut context = RunContext::new(dir.path(), None);

  let err = engine
    .run_source(
      &demo_workflow("write"),
      &RunInputs::new(),
      &mut context,
      &safeops_engine::NoopNotifier,
    )
    .await
    .unwrap_err();

  assert!(matches!(
    err.source,
    EngineError::Resolve(ResolveError::MissingWorkflowInput { ref key }) if key == "path"
  ));
  assert_eq!(
    err.to_string(),
    "Error during step 's1': missing workflow input 'path'"
  );
}

#[tokio::test]
async fn test_unregistered_step() {
  let dir = tempfile::tempdir().unwrap();
  let engine = WorkflowEngine::new(Arc::new(StepRegistry::new()));
  let mut context = RunContext::new(dir.path(), None);

  let err = engine
    .run_source(
      &demo_workflow("write"),
      &inputs(),
      &mut context,
      &safeops_engine::NoopNotifier,
    )
    .await
    .unwrap_err();

  assert!(matches!(
    err.source,
    EngineError::Invoke(InvokeError::StepNotFound { .. })
  ));
  assert_eq!(
    err.to_string(),
    "Error during step 's1': step 'demo.write' not found"
  );
}

#[tokio::test]
async fn test_unloadable_workflow_is_attributed_to_unknown() {
  let dir = tempfile::tempdir().unwrap();
  let engine = WorkflowEngine::new(Arc::new(StepRegistry::new()));
  let notifier = LineNotifier::new(Vec::new(), Vec::new());
  let mut context = RunContext::new(dir.path(), None);

  let err = engine
    .run_source("{\"name\": \"x\"}", &inputs(), &mut context, &notifier)
    .await
    .unwrap_err();

  assert_eq!(err.step, None);
  let (out, err_stream) = notifier.into_inner();
  assert!(out.is_empty());
  let err_stream = String::from_utf8(err_stream).unwrap();
  assert!(err_stream.starts_with("WORKFLOW_ERROR:Error during step 'Unknown': malformed workflow"));
}

#[tokio::test]
async fn test_every_step_reports_start_and_done() {
  let dir = tempfile::tempdir().unwrap();
  let engine = WorkflowEngine::new(Arc::new(registry(&Calls::default())));
  let (tx, mut rx) = mpsc::unbounded_channel();
  let mut context = RunContext::new(dir.path(), None);

  let steps: Vec<Value> = (0..5)
    .map(|i| {
      json!({ "name": format!("step{}", i), "module": "demo", "function": "read",
              "inputs": { "all": "{workflow.all_steps}" }, "outputs": {} })
    })
    .collect();
  let source = json!({ "name": "five", "steps": steps }).to_string();

  engine
    .run_source(&source, &inputs(), &mut context, &ChannelNotifier::new(tx))
    .await
    .unwrap();

  let lines = drain(&mut rx);
  assert_eq!(lines.len(), 1 + 5 * 2 + 1);
  assert_eq!(lines[0], "ALL_STEPS:step0,step1,step2,step3,step4");
  for i in 0..5 {
    assert_eq!(lines[1 + i * 2], format!("STEP_START:step{}", i));
    assert_eq!(lines[2 + i * 2], format!("STEP_DONE:step{}", i));
  }
  assert_eq!(lines[11], "WORKFLOW_COMPLETE:five;;Disabled");
}

#[tokio::test]
async fn test_run_log_records_progress_and_failure() {
  let dir = tempfile::tempdir().unwrap();
  let log_dir = dir.path().join("logs");
  let calls = Calls::default();
  let engine = WorkflowEngine::new(Arc::new(registry(&calls)));

  let source = json!({
    "name": "logged",
    "steps": [
      { "name": "s1", "module": "demo", "function": "write",
        "inputs": {}, "outputs": { "o": "{workflow.outputs.o}" } },
      { "name": "s2", "module": "demo", "function": "boom",
        "inputs": {}, "outputs": {} }
    ]
  })
  .to_string();

  let mut context = RunContext::with_run_id("run-1", dir.path(), Some(log_dir.clone()));
  let err = engine
    .run_source(&source, &inputs(), &mut context, &safeops_engine::NoopNotifier)
    .await
    .unwrap_err();
  assert_eq!(err.step_name(), "s2");

  // Artifacts land next to the run log when logging is enabled.
  assert!(log_dir.join("o.txt").exists());

  let log = std::fs::read_to_string(log_dir.join(RUN_LOG_FILE)).unwrap();
  let (progress, detail) = log.rsplit_once("  detail: ").unwrap();
  let expected = format!(
    "Running workflow: logged (Run ID: run-1)\n\
     Log directory: {}\n\
     Running step: s1\n\
     Step 's1' completed successfully.\n\
     Running step: s2\n\
     Error during step 's2': boom\n",
    log_dir.display()
  );
  assert_eq!(progress, expected);
  assert!(detail.starts_with("RunError {"));
  assert!(detail.contains("StepExecutionFailed"));
  assert!(detail.contains("\"boom\""));
  assert!(detail.ends_with("}\n"));
}

#[tokio::test]
async fn test_complete_reports_absolute_log_dir() {
  let dir = tempfile::tempdir().unwrap();
  let log_dir = dir.path().join("logs");
  let engine = WorkflowEngine::new(Arc::new(registry(&Calls::default())));
  let (tx, mut rx) = mpsc::unbounded_channel();
  let mut context = RunContext::new(dir.path(), Some(log_dir.clone()));

  let summary = engine
    .run_source(
      &demo_workflow("write"),
      &inputs(),
      &mut context,
      &ChannelNotifier::new(tx),
    )
    .await
    .unwrap();

  assert_eq!(summary.log_location.as_deref(), Some(log_dir.as_path()));
  assert_eq!(
    drain(&mut rx).last().unwrap(),
    &format!("WORKFLOW_COMPLETE:demo;;{}", log_dir.display())
  );
}
