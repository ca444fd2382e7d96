mod common;

use std::sync::Arc;

use common::FakeBackend;
use conductor_core::api::{
    ExecutionOpts, ExecutionPlan, ExecutionStep, Orchestrator, StepScheduler, TaskRequest,
    TaskStatus,
};
use pretty_assertions::assert_eq;
use serde_json::{json, Map};

fn two_step_plan() -> ExecutionPlan {
    ExecutionPlan::new("user-1", "do A then B").with_steps(vec![
        ExecutionStep::new(1, "run A").with_script("A"),
        ExecutionStep::new(2, "run B").with_script("B").depends_on([1]),
    ])
}

fn request(content: &str) -> TaskRequest {
    TaskRequest {
        user_id: "user-1".into(),
        session_id: "sess-1".into(),
        content: content.into(),
        conversation_id: None,
        skill: None,
        context: Map::new(),
        metadata: Map::new(),
    }
}

#[tokio::test]
async fn two_step_plan_completes_with_last_result() {
    let backend = Arc::new(
        FakeBackend::default()
            .complete("A", json!({"x": 1}))
            .complete("B", json!({"published": true})),
    );
    let scheduler = StepScheduler::new(backend.clone(), ExecutionOpts::default());

    let outcome = scheduler.execute(two_step_plan()).await;
    let result = outcome.result;

    assert_eq!(result.status, TaskStatus::Completed);
    assert_eq!(result.steps_completed, 2);
    assert_eq!(result.total_steps, 2);
    assert_eq!(result.result, Some(json!({"published": true})));
    assert!(result.error.is_none());
    assert_eq!(
        backend.args_for("B").unwrap().get("step_1_result"),
        Some(&json!({"x": 1}))
    );
}

#[tokio::test]
async fn first_step_failure_leaves_second_pending() {
    let backend = Arc::new(
        FakeBackend::default()
            .fail("A", "Unexpected status: 500")
            .complete("B", json!({})),
    );
    let scheduler = StepScheduler::new(backend.clone(), ExecutionOpts::default());

    let outcome = scheduler.execute(two_step_plan()).await;

    assert_eq!(outcome.result.status, TaskStatus::Failed);
    assert_eq!(outcome.result.steps_completed, 0);
    assert!(outcome
        .result
        .error
        .as_deref()
        .unwrap()
        .contains("Step 1 failed"));
    assert_eq!(outcome.plan.steps[1].status, TaskStatus::Pending);
    assert_eq!(backend.scripts_called(), vec!["A"]);
}

#[tokio::test]
async fn failure_at_step_k_counts_k_minus_one() {
    for k in 1..=4u32 {
        let mut backend = FakeBackend::default();
        let mut steps = Vec::new();
        for n in 1..=4u32 {
            let script = format!("s{n}");
            backend = if n == k {
                backend.fail(&script, "boom")
            } else {
                backend.complete(&script, json!(n))
            };
            steps.push(ExecutionStep::new(n, format!("step {n}")).with_script(script));
        }
        let scheduler = StepScheduler::new(Arc::new(backend), ExecutionOpts::default());

        let outcome = scheduler
            .execute(ExecutionPlan::new("u", "r").with_steps(steps))
            .await;

        assert_eq!(outcome.result.steps_completed, (k - 1) as usize);
        let expected = format!("Step {k} failed: boom");
        assert_eq!(outcome.result.error.as_deref(), Some(expected.as_str()));
        for step in outcome.plan.steps.iter().filter(|s| s.step_number > k) {
            assert_eq!(step.status, TaskStatus::Pending);
        }
    }
}

#[tokio::test]
async fn dependency_on_later_step_halts_before_it() {
    let backend = Arc::new(FakeBackend::default().complete("A", json!(1)));
    let scheduler = StepScheduler::new(backend, ExecutionOpts::default());
    let plan = ExecutionPlan::new("u", "r").with_steps(vec![
        ExecutionStep::new(1, "a").with_script("A"),
        ExecutionStep::new(2, "b").depends_on([5]),
    ]);

    let result = scheduler.execute(plan).await.result;
    assert_eq!(result.steps_completed, 1);
    assert_eq!(result.error.as_deref(), Some("Step 2 dependencies not met"));
}

#[tokio::test]
async fn dependencies_do_not_carry_over_between_runs() {
    let backend = Arc::new(FakeBackend::default().complete("A", json!(1)));
    let scheduler = StepScheduler::new(backend, ExecutionOpts::default());

    let first = ExecutionPlan::new("u", "r")
        .with_steps(vec![ExecutionStep::new(1, "a").with_script("A")]);
    assert!(scheduler.execute(first).await.result.is_success());

    let second = ExecutionPlan::new("u", "r")
        .with_steps(vec![ExecutionStep::new(2, "needs 1").depends_on([1])]);
    let result = scheduler.execute(second).await.result;
    assert_eq!(result.error.as_deref(), Some("Step 2 dependencies not met"));
}

#[tokio::test]
async fn orchestrator_runs_analytics_report() {
    let backend = Arc::new(
        FakeBackend::default()
            .complete("f/openanalyst/analytics/fetch_metrics", json!({"rows": 10}))
            .complete("f/openanalyst/analytics/generate_report", json!({"url": "r.pdf"})),
    );
    let orchestrator = Orchestrator::new(StepScheduler::new(
        backend.clone(),
        ExecutionOpts::default(),
    ));

    let result = orchestrator.run_task(request("build the monthly report")).await;

    assert_eq!(result.status, TaskStatus::Completed);
    assert_eq!(result.total_steps, 2);
    assert_eq!(result.result, Some(json!({"url": "r.pdf"})));
    let report_args = backend
        .args_for("f/openanalyst/analytics/generate_report")
        .unwrap();
    assert_eq!(report_args.get("step_1_result"), Some(&json!({"rows": 10})));
    assert_eq!(report_args.get("user_id"), Some(&json!("user-1")));
}

#[tokio::test]
async fn orchestrator_reports_backend_failure_as_task_result() {
    let backend = Arc::new(FakeBackend::default());
    let orchestrator = Orchestrator::new(StepScheduler::new(backend, ExecutionOpts::default()));

    let result = orchestrator.run_task(request("please help")).await;

    assert_eq!(result.status, TaskStatus::Failed);
    assert_eq!(result.total_steps, 1);
    assert_eq!(
        result.error.as_deref(),
        Some("Step 1 failed: Unexpected status: 404")
    );
}

#[tokio::test]
async fn orchestrator_workflow_request_is_passthrough() {
    let backend = Arc::new(FakeBackend::default());
    let orchestrator = Orchestrator::new(StepScheduler::new(
        backend.clone(),
        ExecutionOpts::default(),
    ));

    let result = orchestrator.run_task(request("automate onboarding")).await;

    assert!(result.is_success());
    assert!(backend.scripts_called().is_empty());
    assert_eq!(result.result.unwrap()["content"], json!("automate onboarding"));
}

#[tokio::test]
async fn orchestrator_runs_single_script() {
    let backend = Arc::new(FakeBackend::default().complete("f/x", json!([1, 2])));
    let orchestrator = Orchestrator::new(StepScheduler::new(backend, ExecutionOpts::default()));

    let result = orchestrator.run_script("f/x", Map::new()).await;
    assert_eq!(result.task_id, "job-f/x");
    assert_eq!(result.result, Some(json!([1, 2])));
    assert!(orchestrator.runner().create_user_folder("u1").await);
}
