use chrono::{DateTime, Local};
use conductor_core::api::{AppConfig, Orchestrator};
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockWriteGuard};

/// Shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<Orchestrator>,
    pub config: Arc<AppConfig>,
    pub stats: Arc<RwLock<ServerStats>>,
}

impl AppState {
    pub fn new(orchestrator: Orchestrator, config: AppConfig) -> Self {
        Self {
            orchestrator: Arc::new(orchestrator),
            config: Arc::new(config),
            stats: Arc::new(RwLock::new(ServerStats::new())),
        }
    }

    /// Stats are best effort: a poisoned lock is recovered, never propagated.
    pub fn stats_mut(&self) -> RwLockWriteGuard<'_, ServerStats> {
        self.stats.write().unwrap_or_else(|e| e.into_inner())
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        let stats = self.stats.read().unwrap_or_else(|e| e.into_inner());
        StatsSnapshot {
            requests_total: stats.requests_total,
            tasks_failed: stats.tasks_failed,
            uptime_seconds: stats.uptime_seconds(),
        }
    }
}

pub struct ServerStats {
    pub requests_total: u64,
    pub requests_by_endpoint: HashMap<String, u64>,
    pub tasks_failed: u64,
    pub start_time: DateTime<Local>,
}

#[derive(Debug, Clone, Copy)]
pub struct StatsSnapshot {
    pub requests_total: u64,
    pub tasks_failed: u64,
    pub uptime_seconds: f64,
}

impl ServerStats {
    pub fn new() -> Self {
        Self {
            requests_total: 0,
            requests_by_endpoint: HashMap::new(),
            tasks_failed: 0,
            start_time: Local::now(),
        }
    }

    pub fn increment_request(&mut self, endpoint: &str) {
        self.requests_total += 1;
        *self
            .requests_by_endpoint
            .entry(endpoint.to_string())
            .or_insert(0) += 1;
    }

    pub fn increment_task_failure(&mut self) {
        self.tasks_failed += 1;
    }

    pub fn uptime_seconds(&self) -> f64 {
        (Local::now() - self.start_time).num_milliseconds() as f64 / 1000.0
    }
}

impl Default for ServerStats {
    fn default() -> Self {
        Self::new()
    }
}
