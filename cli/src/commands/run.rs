use conductor_core::api::{CliError, Orchestrator, TaskRequest, TaskResult};
use serde_json::{Map, Value};

use super::cli::{RunArgs, ScriptArgs};

/// Exit code for a task that ran but did not complete.
pub const EXIT_TASK_FAILED: i32 = 1;

pub async fn handle_run(args: RunArgs, orchestrator: &Orchestrator) -> Result<i32, CliError> {
    let request = TaskRequest {
        user_id: args.user,
        session_id: args
            .session
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
        content: args.content,
        conversation_id: None,
        skill: args.skill,
        context: Map::new(),
        metadata: Map::new(),
    };

    let result = orchestrator.run_task(request).await;
    print_result(&result)
}

pub async fn handle_script(args: ScriptArgs, orchestrator: &Orchestrator) -> Result<i32, CliError> {
    let script_args = parse_script_args(&args.args)?;
    let result = orchestrator.run_script(&args.path, script_args).await;
    print_result(&result)
}

pub fn parse_script_args(raw: &str) -> Result<Map<String, Value>, CliError> {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(CliError::Command(format!(
            "--args must be a JSON object, got {}",
            json_kind(&other)
        ))),
        Err(e) => Err(CliError::Command(format!("invalid --args JSON: {e}"))),
    }
}

fn json_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn print_result(result: &TaskResult) -> Result<i32, CliError> {
    let out = serde_json::to_string_pretty(result).map_err(|e| CliError::Anyhow(e.into()))?;
    println!("{out}");
    Ok(if result.is_success() { 0 } else { EXIT_TASK_FAILED })
}
