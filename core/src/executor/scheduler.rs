use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use serde_json::{Map, Value};
use tracing::instrument;

use crate::error::ExecutorError;

use super::aggregate::PlanAggregator;
use super::traits::JobRunner;
use super::types::{ExecutionOpts, ExecutionPlan, ExecutionStep, JobStatus, TaskResult, TaskStatus};

const GENERIC_SCRIPT_FAILURE: &str = "Script execution failed";

/// A finished plan handed back to the caller together with its summary.
#[derive(Debug, Clone)]
pub struct PlanOutcome {
    pub plan: ExecutionPlan,
    pub result: TaskResult,
}

/// Walks a plan's steps strictly in order, one at a time.
///
/// Each step's dependencies must already have completed in the same run;
/// the first unmet dependency or step failure halts the walk.
pub struct StepScheduler {
    runner: Arc<dyn JobRunner>,
    opts: ExecutionOpts,
}

impl StepScheduler {
    pub fn new(runner: Arc<dyn JobRunner>, opts: ExecutionOpts) -> Self {
        Self { runner, opts }
    }

    pub fn runner(&self) -> &Arc<dyn JobRunner> {
        &self.runner
    }

    pub fn opts(&self) -> &ExecutionOpts {
        &self.opts
    }

    /// Execute `plan`, consuming it, and return it with its final statuses.
    #[instrument(skip_all, fields(task_id = %plan.task_id, steps = plan.steps.len()))]
    pub async fn execute(&self, mut plan: ExecutionPlan) -> PlanOutcome {
        // Terminal plans are final: hand them back untouched.
        if !plan.status.can_advance_to(TaskStatus::Executing) {
            let error = format!("Plan {} already {}", plan.task_id, plan.status);
            tracing::warn!(
                target: "conductor.scheduler",
                stage = "scheduler.plan.rejected",
                status = %plan.status,
                "plan cannot be executed"
            );
            let mut result = TaskResult::failed(plan.task_id.clone(), error);
            result.total_steps = plan.total_steps();
            return PlanOutcome { plan, result };
        }

        let mut aggregator = PlanAggregator::new(plan.task_id.clone(), plan.total_steps());
        let mut step_results: HashMap<u32, Value> = HashMap::new();

        plan.status = TaskStatus::Executing;
        tracing::info!(
            target: "conductor.scheduler",
            stage = "scheduler.plan.start",
            skill = plan.skill.as_deref().unwrap_or("-"),
            "executing plan"
        );

        for step in plan.steps.iter_mut() {
            match self.run_step(step, &step_results).await {
                Ok(value) => {
                    step_results.insert(step.step_number, value.clone());
                    aggregator.record_success(value);
                }
                Err(err) => {
                    tracing::error!(
                        target: "conductor.scheduler",
                        stage = "scheduler.step.failed",
                        step = step.step_number,
                        code = err.error_code(),
                        error = %err,
                        "step execution failed"
                    );
                    aggregator.record_failure(err.to_string());
                    break;
                }
            }
        }

        let result = aggregator.finish();
        plan.status = result.status;

        tracing::info!(
            target: "conductor.scheduler",
            stage = "scheduler.plan.end",
            status = %result.status,
            steps_completed = result.steps_completed,
            total_steps = result.total_steps,
            execution_time_ms = result.execution_time_ms,
            "plan finished"
        );

        PlanOutcome { plan, result }
    }

    async fn run_step(
        &self,
        step: &mut ExecutionStep,
        completed: &HashMap<u32, Value>,
    ) -> Result<Value, ExecutorError> {
        let number = step.step_number;
        check_dependencies(step, completed)?;
        let input = prepare_input(step, completed);

        step.mark_executing()
            .map_err(|e| ExecutorError::step_failed(number, e))?;
        tracing::info!(
            target: "conductor.scheduler",
            stage = "scheduler.step.start",
            step = number,
            description = %step.description,
            script = step.script_path.as_deref().unwrap_or("-"),
            passthrough = step.is_passthrough(),
            "executing step"
        );

        match self.dispatch(step.script_path.as_deref(), input).await {
            Ok(value) => {
                step.mark_completed(value.clone())
                    .map_err(|e| ExecutorError::step_failed(number, e))?;
                Ok(value)
            }
            Err(cause) => {
                step.mark_failed(cause.clone())
                    .map_err(|e| ExecutorError::step_failed(number, e))?;
                Err(ExecutorError::step_failed(number, cause))
            }
        }
    }

    async fn dispatch(
        &self,
        script_path: Option<&str>,
        input: Map<String, Value>,
    ) -> Result<Value, String> {
        let Some(script_path) = script_path else {
            return Ok(Value::Object(input));
        };

        let job = self
            .runner
            .submit(script_path, input, true, self.opts.job_timeout)
            .await;

        match job.status {
            JobStatus::Completed => Ok(job.result.unwrap_or(Value::Null)),
            _ => Err(job
                .error
                .unwrap_or_else(|| GENERIC_SCRIPT_FAILURE.to_string())),
        }
    }

    /// Run one script outside of any plan and report it as a one-step task.
    #[instrument(skip(self, args))]
    pub async fn execute_single_script(
        &self,
        script_path: &str,
        args: Map<String, Value>,
    ) -> TaskResult {
        let start = Instant::now();
        let job = self
            .runner
            .submit(script_path, args, true, self.opts.job_timeout)
            .await;
        let execution_time_ms = start.elapsed().as_millis() as u64;

        if job.status == JobStatus::Completed {
            TaskResult {
                task_id: job.job_id,
                status: TaskStatus::Completed,
                result: job.result,
                error: None,
                execution_time_ms,
                steps_completed: 1,
                total_steps: 1,
            }
        } else {
            TaskResult {
                task_id: job.job_id,
                status: TaskStatus::Failed,
                result: None,
                error: Some(
                    job.error
                        .unwrap_or_else(|| GENERIC_SCRIPT_FAILURE.to_string()),
                ),
                execution_time_ms,
                steps_completed: 0,
                total_steps: 1,
            }
        }
    }
}

fn check_dependencies(
    step: &ExecutionStep,
    completed: &HashMap<u32, Value>,
) -> Result<(), ExecutorError> {
    if step.depends_on.iter().all(|dep| completed.contains_key(dep)) {
        Ok(())
    } else {
        Err(ExecutorError::DependenciesNotMet(step.step_number))
    }
}

/// Copy the step's params and inject `step_<id>_result` for each dependency.
/// Keys supplied by the plan author win over injected ones.
fn prepare_input(step: &ExecutionStep, completed: &HashMap<u32, Value>) -> Map<String, Value> {
    let mut input = step.input_params.clone();
    for dep in &step.depends_on {
        if let Some(result) = completed.get(dep) {
            input
                .entry(format!("step_{}_result", dep))
                .or_insert_with(|| result.clone());
        }
    }
    input
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::sync::Mutex;
    use std::time::Duration;

    use crate::executor::types::RemoteJobResult;

    #[derive(Default)]
    struct ScriptedRunner {
        responses: HashMap<String, RemoteJobResult>,
        calls: Mutex<Vec<(String, Map<String, Value>, bool, Duration)>>,
    }

    impl ScriptedRunner {
        fn respond(mut self, script: &str, result: RemoteJobResult) -> Self {
            self.responses.insert(script.to_string(), result);
            self
        }

        fn calls(&self) -> Vec<(String, Map<String, Value>, bool, Duration)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl JobRunner for ScriptedRunner {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn submit(
            &self,
            script_path: &str,
            args: Map<String, Value>,
            wait: bool,
            timeout: Duration,
        ) -> RemoteJobResult {
            self.calls
                .lock()
                .unwrap()
                .push((script_path.to_string(), args, wait, timeout));
            self.responses
                .get(script_path)
                .cloned()
                .unwrap_or_else(|| RemoteJobResult::failed("", "unknown script"))
        }
    }

    fn scheduler(runner: Arc<ScriptedRunner>) -> StepScheduler {
        StepScheduler::new(runner, ExecutionOpts::default())
    }

    fn ok(job: &str, value: Value) -> RemoteJobResult {
        RemoteJobResult::completed(job, value, Duration::from_millis(5))
    }

    #[tokio::test]
    async fn test_steps_run_in_declared_order() {
        let runner = Arc::new(
            ScriptedRunner::default()
                .respond("c", ok("j3", json!("c")))
                .respond("a", ok("j1", json!("a")))
                .respond("b", ok("j2", json!("b"))),
        );
        let plan = ExecutionPlan::new("u", "r").with_steps(vec![
            ExecutionStep::new(3, "third").with_script("c"),
            ExecutionStep::new(1, "first").with_script("a"),
            ExecutionStep::new(2, "second").with_script("b"),
        ]);

        let outcome = scheduler(runner.clone()).execute(plan).await;

        let order: Vec<String> = runner.calls().into_iter().map(|c| c.0).collect();
        assert_eq!(order, vec!["c", "a", "b"]);
        assert_eq!(outcome.result.status, TaskStatus::Completed);
        assert_eq!(outcome.result.result, Some(json!("b")));
        assert_eq!(outcome.plan.status, TaskStatus::Completed);
    }

    #[tokio::test]
    async fn test_dependency_results_are_injected() {
        let runner = Arc::new(
            ScriptedRunner::default()
                .respond("A", ok("ja", json!({"x": 1})))
                .respond("B", ok("jb", json!({"done": true}))),
        );
        let plan = ExecutionPlan::new("u", "r").with_steps(vec![
            ExecutionStep::new(1, "one").with_script("A"),
            ExecutionStep::new(2, "two")
                .with_script("B")
                .with_param("user_id", "u")
                .depends_on([1]),
        ]);

        let outcome = scheduler(runner.clone()).execute(plan).await;

        let calls = runner.calls();
        assert_eq!(calls.len(), 2);
        let (_, args, wait, timeout) = &calls[1];
        assert_eq!(args.get("step_1_result"), Some(&json!({"x": 1})));
        assert_eq!(args.get("user_id"), Some(&json!("u")));
        assert!(*wait);
        assert_eq!(*timeout, Duration::from_secs(300));

        let result = outcome.result;
        assert_eq!(result.status, TaskStatus::Completed);
        assert_eq!(result.steps_completed, 2);
        assert_eq!(result.total_steps, 2);
        assert_eq!(result.result, Some(json!({"done": true})));
        // injected keys never leak back into the stored plan
        assert!(!outcome.plan.steps[1].input_params.contains_key("step_1_result"));
    }

    #[tokio::test]
    async fn test_caller_keys_are_not_overwritten() {
        let runner = Arc::new(ScriptedRunner::default());
        let plan = ExecutionPlan::new("u", "r").with_steps(vec![
            ExecutionStep::new(1, "one").with_param("v", 1),
            ExecutionStep::new(2, "two")
                .with_param("step_1_result", "mine")
                .depends_on([1]),
        ]);

        let outcome = scheduler(runner).execute(plan).await;
        assert_eq!(
            outcome.result.result,
            Some(json!({"step_1_result": "mine"}))
        );
    }

    #[tokio::test]
    async fn test_passthrough_returns_prepared_input() {
        let runner = Arc::new(ScriptedRunner::default().respond("A", ok("ja", json!(7))));
        let plan = ExecutionPlan::new("u", "r").with_steps(vec![
            ExecutionStep::new(1, "remote").with_script("A"),
            ExecutionStep::new(2, "echo")
                .with_param("note", "hi")
                .depends_on([1]),
        ]);

        let outcome = scheduler(runner.clone()).execute(plan).await;

        assert_eq!(runner.calls().len(), 1);
        let expected = json!({"note": "hi", "step_1_result": 7});
        assert_eq!(outcome.result.result, Some(expected.clone()));
        assert_eq!(outcome.plan.steps[1].result, Some(expected));
        assert_eq!(outcome.plan.steps[1].status, TaskStatus::Completed);
    }

    #[tokio::test]
    async fn test_failure_halts_walk() {
        let runner = Arc::new(
            ScriptedRunner::default()
                .respond("A", RemoteJobResult::failed("ja", "Unexpected status: 500"))
                .respond("B", ok("jb", json!(1))),
        );
        let plan = ExecutionPlan::new("u", "r").with_steps(vec![
            ExecutionStep::new(1, "one").with_script("A"),
            ExecutionStep::new(2, "two").with_script("B").depends_on([1]),
            ExecutionStep::new(3, "independent"),
        ]);

        let outcome = scheduler(runner.clone()).execute(plan).await;

        assert_eq!(runner.calls().len(), 1);
        let result = &outcome.result;
        assert_eq!(result.status, TaskStatus::Failed);
        assert_eq!(result.steps_completed, 0);
        assert_eq!(result.total_steps, 3);
        assert_eq!(
            result.error.as_deref(),
            Some("Step 1 failed: Unexpected status: 500")
        );
        assert!(result.result.is_none());

        let steps = &outcome.plan.steps;
        assert_eq!(steps[0].status, TaskStatus::Failed);
        assert_eq!(steps[0].error.as_deref(), Some("Unexpected status: 500"));
        assert_eq!(steps[1].status, TaskStatus::Pending);
        assert_eq!(steps[2].status, TaskStatus::Pending);
        assert_eq!(outcome.plan.status, TaskStatus::Failed);
    }

    #[tokio::test]
    async fn test_failure_without_error_uses_generic_message() {
        let mut timed_out = RemoteJobResult::timed_out("j", Duration::from_secs(1));
        timed_out.error = None;
        let runner = Arc::new(ScriptedRunner::default().respond("A", timed_out));
        let plan = ExecutionPlan::new("u", "r")
            .with_steps(vec![ExecutionStep::new(1, "one").with_script("A")]);

        let outcome = scheduler(runner).execute(plan).await;
        assert_eq!(
            outcome.result.error.as_deref(),
            Some("Step 1 failed: Script execution failed")
        );
    }

    #[tokio::test]
    async fn test_later_step_failure_keeps_previous_result() {
        let runner = Arc::new(
            ScriptedRunner::default()
                .respond("A", ok("ja", json!("a")))
                .respond("B", RemoteJobResult::failed("jb", "boom")),
        );
        let plan = ExecutionPlan::new("u", "r").with_steps(vec![
            ExecutionStep::new(1, "one").with_script("A"),
            ExecutionStep::new(2, "two").with_script("B"),
        ]);

        let result = scheduler(runner).execute(plan).await.result;
        assert_eq!(result.steps_completed, 1);
        assert_eq!(result.result, Some(json!("a")));
        assert_eq!(result.error.as_deref(), Some("Step 2 failed: boom"));
    }

    #[tokio::test]
    async fn test_unmet_dependency_aborts_without_touching_step() {
        let runner = Arc::new(ScriptedRunner::default().respond("A", ok("ja", json!(1))));
        let plan = ExecutionPlan::new("u", "r").with_steps(vec![
            ExecutionStep::new(1, "one").with_script("A"),
            ExecutionStep::new(2, "forward ref").with_script("A").depends_on([3]),
            ExecutionStep::new(3, "three").with_script("A"),
        ]);

        let outcome = scheduler(runner.clone()).execute(plan).await;

        assert_eq!(runner.calls().len(), 1);
        assert_eq!(outcome.result.status, TaskStatus::Failed);
        assert_eq!(outcome.result.steps_completed, 1);
        assert_eq!(
            outcome.result.error.as_deref(),
            Some("Step 2 dependencies not met")
        );
        assert_eq!(outcome.plan.steps[1].status, TaskStatus::Pending);
        assert!(outcome.plan.steps[1].error.is_none());
        assert_eq!(outcome.plan.steps[2].status, TaskStatus::Pending);
    }

    #[tokio::test]
    async fn test_non_pending_step_is_reported_as_failure() {
        let runner = Arc::new(ScriptedRunner::default());
        let mut done = ExecutionStep::new(1, "already done");
        done.status = TaskStatus::Completed;
        let plan = ExecutionPlan::new("u", "r").with_steps(vec![done]);

        let outcome = scheduler(runner).execute(plan).await;
        let error = outcome.result.error.unwrap();
        assert!(error.starts_with("Step 1 failed: Invalid status transition"));
        assert_eq!(outcome.plan.steps[0].status, TaskStatus::Completed);
    }

    #[tokio::test]
    async fn test_empty_plan_completes() {
        let outcome = scheduler(Arc::new(ScriptedRunner::default()))
            .execute(ExecutionPlan::new("u", "r"))
            .await;
        assert_eq!(outcome.result.status, TaskStatus::Completed);
        assert_eq!(outcome.result.total_steps, 0);
    }

    #[tokio::test]
    async fn test_finished_plan_is_not_executed_again() {
        let runner = Arc::new(ScriptedRunner::default().respond("A", ok("ja", json!(1))));
        let plan = ExecutionPlan::new("u", "r")
            .with_steps(vec![ExecutionStep::new(1, "one").with_script("A")]);
        let sched = scheduler(runner.clone());

        let first = sched.execute(plan).await;
        assert_eq!(first.plan.status, TaskStatus::Completed);
        let task_id = first.plan.task_id.clone();

        let second = sched.execute(first.plan).await;

        assert_eq!(runner.calls().len(), 1);
        assert_eq!(second.plan.status, TaskStatus::Completed);
        assert_eq!(second.plan.steps[0].status, TaskStatus::Completed);
        assert_eq!(second.result.status, TaskStatus::Failed);
        assert_eq!(second.result.total_steps, 1);
        assert_eq!(
            second.result.error,
            Some(format!("Plan {} already completed", task_id))
        );
    }

    #[tokio::test]
    async fn test_failed_plan_stays_failed() {
        let runner = Arc::new(ScriptedRunner::default());
        let mut plan = ExecutionPlan::new("u", "r");
        plan.status = TaskStatus::Failed;

        let outcome = scheduler(runner.clone()).execute(plan).await;

        assert!(runner.calls().is_empty());
        assert_eq!(outcome.plan.status, TaskStatus::Failed);
        assert_eq!(outcome.result.status, TaskStatus::Failed);
        assert!(outcome.result.error.unwrap().ends_with("already failed"));
    }

    #[tokio::test]
    async fn test_single_script_success_and_failure() {
        let runner = Arc::new(
            ScriptedRunner::default()
                .respond("ok", ok("job-ok", json!({"n": 1})))
                .respond("bad", RemoteJobResult::failed("job-bad", "exploded")),
        );
        let scheduler = scheduler(runner);

        let good = scheduler.execute_single_script("ok", Map::new()).await;
        assert_eq!(good.task_id, "job-ok");
        assert_eq!(good.status, TaskStatus::Completed);
        assert_eq!(good.steps_completed, 1);
        assert_eq!(good.total_steps, 1);

        let bad = scheduler.execute_single_script("bad", Map::new()).await;
        assert_eq!(bad.task_id, "job-bad");
        assert_eq!(bad.status, TaskStatus::Failed);
        assert_eq!(bad.steps_completed, 0);
        assert_eq!(bad.error.as_deref(), Some("exploded"));
    }
}
