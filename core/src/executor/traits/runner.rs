use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::executor::types::RemoteJobResult;

/// Remote job backend used by the scheduler for scripted steps.
///
/// Implementations never return a transport error: every failure is folded
/// into a terminal `RemoteJobResult`.
#[async_trait]
pub trait JobRunner: Send + Sync {
    /// Backend name (unique identifier)
    fn name(&self) -> &str;

    /// Submit `script_path` with `args`.
    ///
    /// With `wait` the call blocks until a terminal status or until `timeout`
    /// elapses; without it the result is `running` with the job id.
    async fn submit(
        &self,
        script_path: &str,
        args: Map<String, Value>,
        wait: bool,
        timeout: Duration,
    ) -> RemoteJobResult;

    async fn health_check(&self) -> bool {
        true
    }

    /// Provision a per-user folder. Backends without folders report `false`.
    async fn create_user_folder(&self, _user_id: &str) -> bool {
        false
    }
}
