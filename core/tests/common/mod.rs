use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use conductor_core::api::{JobRunner, RemoteJobResult};
use serde_json::{Map, Value};

/// In-memory backend: canned result per script, call log in submission order.
#[derive(Default)]
pub struct FakeBackend {
    responses: HashMap<String, RemoteJobResult>,
    calls: Mutex<Vec<(String, Map<String, Value>)>>,
    folders: Mutex<Vec<String>>,
}

impl FakeBackend {
    pub fn complete(mut self, script: &str, result: Value) -> Self {
        self.responses.insert(
            script.to_string(),
            RemoteJobResult::completed(format!("job-{script}"), result, Duration::from_millis(1)),
        );
        self
    }

    pub fn fail(mut self, script: &str, error: &str) -> Self {
        self.responses.insert(
            script.to_string(),
            RemoteJobResult::failed(format!("job-{script}"), error),
        );
        self
    }

    pub fn scripts_called(&self) -> Vec<String> {
        self.calls.lock().unwrap().iter().map(|c| c.0.clone()).collect()
    }

    pub fn args_for(&self, script: &str) -> Option<Map<String, Value>> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.0 == script)
            .map(|c| c.1.clone())
    }
}

#[async_trait]
impl JobRunner for FakeBackend {
    fn name(&self) -> &str {
        "fake"
    }

    async fn submit(
        &self,
        script_path: &str,
        args: Map<String, Value>,
        _wait: bool,
        _timeout: Duration,
    ) -> RemoteJobResult {
        self.calls
            .lock()
            .unwrap()
            .push((script_path.to_string(), args));
        self.responses
            .get(script_path)
            .cloned()
            .unwrap_or_else(|| RemoteJobResult::failed("", "Unexpected status: 404"))
    }

    async fn create_user_folder(&self, user_id: &str) -> bool {
        self.folders.lock().unwrap().push(user_id.to_string());
        true
    }
}
