use std::time::{Duration, Instant};

use async_trait::async_trait;
use conductor_core::api::{JobRunner, RemoteJobResult, WindmillConfig};
use serde_json::{json, Map, Value};

use super::error::{decode_body, parse_job_id, WindmillHttpError};

const FOLDER_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const HEALTH_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Windmill REST client. Immutable after construction; clones share the
/// underlying connection pool.
#[derive(Clone)]
pub struct WindmillClient {
    http: reqwest::Client,
    token: String,
    base_url: String,
    // {base}/api/w/{workspace}
    workspace_url: String,
    submit_timeout: Duration,
    poll_request_timeout: Duration,
    poll_interval: Duration,
}

impl WindmillClient {
    pub fn new(cfg: &WindmillConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder().build()?;
        let base_url = cfg.base_url.trim_end_matches('/').to_string();
        let workspace_url = format!("{}/api/w/{}", base_url, cfg.workspace.trim_matches('/'));
        Ok(Self {
            http,
            token: cfg.token.clone(),
            base_url,
            workspace_url,
            submit_timeout: Duration::from_millis(cfg.submit_timeout_ms),
            poll_request_timeout: Duration::from_millis(cfg.poll_request_timeout_ms),
            poll_interval: Duration::from_millis(cfg.poll_interval_ms),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn auth(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        if self.token.trim().is_empty() {
            req
        } else {
            req.bearer_auth(&self.token)
        }
    }

    /// Submit and optionally wait. Never errors: failures become a
    /// terminal result.
    pub async fn run_script(
        &self,
        script_path: &str,
        args: Map<String, Value>,
        wait: bool,
        timeout: Duration,
    ) -> RemoteJobResult {
        let started = Instant::now();
        let job_id = match self.start_job(script_path, &args).await {
            Ok(id) => id,
            Err(err) => {
                tracing::error!(
                    target: "conductor.windmill",
                    stage = "windmill.submit.error",
                    script = %script_path,
                    error = %err
                );
                return RemoteJobResult::failed("", err.to_string());
            }
        };

        tracing::info!(
            target: "conductor.windmill",
            stage = "windmill.submit.out",
            script = %script_path,
            job_id = %job_id
        );

        if !wait {
            return RemoteJobResult::running(job_id);
        }
        self.wait_for_job(&job_id, timeout, started).await
    }

    pub async fn start_job(
        &self,
        script_path: &str,
        args: &Map<String, Value>,
    ) -> Result<String, WindmillHttpError> {
        let url = format!(
            "{}/jobs/run/p/{}",
            self.workspace_url,
            script_path.trim_start_matches('/')
        );
        tracing::debug!(
            target: "conductor.windmill",
            stage = "windmill.submit.in",
            url = %url,
            args = args.len()
        );

        let req = self.http.post(&url).json(args).timeout(self.submit_timeout);
        let resp = self
            .auth(req)
            .send()
            .await
            .map_err(|err| WindmillHttpError::from_reqwest(err, &url))?;
        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|err| WindmillHttpError::from_reqwest(err, &url))?;

        if !status.is_success() {
            return Err(WindmillHttpError::status_error(status.as_u16(), &url, &body));
        }
        Ok(parse_job_id(&body))
    }

    /// Poll the completed-result endpoint until a terminal answer or until
    /// `timeout` has elapsed since `started`. Neither a single poll request
    /// nor the pause between polls outlasts what is left of `timeout`.
    pub async fn wait_for_job(
        &self,
        job_id: &str,
        timeout: Duration,
        started: Instant,
    ) -> RemoteJobResult {
        let url = format!("{}/jobs/completed/get_result/{}", self.workspace_url, job_id);

        loop {
            let remaining = timeout.saturating_sub(started.elapsed());
            if remaining.is_zero() {
                tracing::warn!(
                    target: "conductor.windmill",
                    stage = "windmill.poll.timeout",
                    job_id = %job_id,
                    timeout_secs = timeout.as_secs_f64()
                );
                return RemoteJobResult::timed_out(job_id, timeout);
            }

            let req = self
                .http
                .get(&url)
                .timeout(self.poll_request_timeout.min(remaining));
            let resp = match self.auth(req).send().await {
                Ok(resp) => resp,
                Err(err) => {
                    let err = WindmillHttpError::from_reqwest(err, &url);
                    tracing::warn!(
                        target: "conductor.windmill",
                        stage = "windmill.poll.retry",
                        job_id = %job_id,
                        error = %err
                    );
                    self.pause(timeout, started).await;
                    continue;
                }
            };

            match resp.status().as_u16() {
                200 => {
                    let body = match resp.text().await {
                        Ok(body) => body,
                        Err(err) => {
                            let err = WindmillHttpError::from_reqwest(err, &url);
                            return RemoteJobResult::failed(job_id, err.to_string());
                        }
                    };
                    return match decode_body(200, &url, &body) {
                        Ok(value) => {
                            tracing::info!(
                                target: "conductor.windmill",
                                stage = "windmill.poll.completed",
                                job_id = %job_id,
                                elapsed_ms = started.elapsed().as_millis() as u64
                            );
                            RemoteJobResult::completed(job_id, value, started.elapsed())
                        }
                        Err(err) => RemoteJobResult::failed(job_id, err.to_string()),
                    };
                }
                404 => {
                    tracing::trace!(target: "conductor.windmill", job_id = %job_id, "job not finished");
                    self.pause(timeout, started).await;
                }
                code => {
                    tracing::error!(
                        target: "conductor.windmill",
                        stage = "windmill.poll.error",
                        job_id = %job_id,
                        status = code
                    );
                    return RemoteJobResult::failed(job_id, format!("Unexpected status: {}", code));
                }
            }
        }
    }

    async fn pause(&self, timeout: Duration, started: Instant) {
        let remaining = timeout.saturating_sub(started.elapsed());
        tokio::time::sleep(self.poll_interval.min(remaining)).await;
    }

    /// `GET {base}/api/version`.
    pub async fn health_check(&self) -> bool {
        let url = format!("{}/api/version", self.base_url);
        match self.http.get(&url).timeout(HEALTH_REQUEST_TIMEOUT).send().await {
            Ok(resp) => resp.status().as_u16() == 200,
            Err(err) => {
                tracing::debug!(target: "conductor.windmill", error = %err, "health check failed");
                false
            }
        }
    }

    /// Creates folder `u/<user_id>`. An existing folder counts as success.
    pub async fn create_user_folder(&self, user_id: &str) -> bool {
        let url = format!("{}/folders/create", self.workspace_url);
        let body = json!({ "name": format!("u/{}", user_id) });
        match self.post_json(&url, &body).await {
            Ok(code) => matches!(code, 200 | 201 | 409),
            Err(err) => {
                tracing::error!(target: "conductor.windmill", user_id = %user_id, error = %err, "failed to create user folder");
                false
            }
        }
    }

    pub async fn create_script(
        &self,
        path: &str,
        content: &str,
        language: &str,
        summary: &str,
    ) -> bool {
        let url = format!("{}/scripts/create", self.workspace_url);
        let body = json!({
            "path": path,
            "content": content,
            "language": language,
            "summary": summary,
        });
        match self.post_json(&url, &body).await {
            Ok(code) => matches!(code, 200 | 201),
            Err(err) => {
                tracing::error!(target: "conductor.windmill", path = %path, error = %err, "failed to create script");
                false
            }
        }
    }

    async fn post_json(&self, url: &str, body: &Value) -> Result<u16, WindmillHttpError> {
        let req = self.http.post(url).json(body).timeout(FOLDER_REQUEST_TIMEOUT);
        let resp = self
            .auth(req)
            .send()
            .await
            .map_err(|err| WindmillHttpError::from_reqwest(err, url))?;
        Ok(resp.status().as_u16())
    }
}

#[async_trait]
impl JobRunner for WindmillClient {
    fn name(&self) -> &str {
        "windmill"
    }

    async fn submit(
        &self,
        script_path: &str,
        args: Map<String, Value>,
        wait: bool,
        timeout: Duration,
    ) -> RemoteJobResult {
        self.run_script(script_path, args, wait, timeout).await
    }

    async fn health_check(&self) -> bool {
        WindmillClient::health_check(self).await
    }

    async fn create_user_folder(&self, user_id: &str) -> bool {
        WindmillClient::create_user_folder(self, user_id).await
    }
}
