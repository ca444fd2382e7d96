use serde_json::Value;
use std::{error::Error as StdError, fmt};

const BODY_PREVIEW_LIMIT: usize = 512;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindmillHttpErrorKind {
    Timeout,
    Connect,
    Request,
    Body,
    Decode,
    Status,
    Unknown,
}

impl WindmillHttpErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Timeout => "timeout",
            Self::Connect => "connect",
            Self::Request => "request",
            Self::Body => "body",
            Self::Decode => "decode",
            Self::Status => "status",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for WindmillHttpErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure talking to the Windmill API. Its `Display` ends up verbatim in
/// the `error` field of failed job results.
#[derive(Debug)]
pub struct WindmillHttpError {
    kind: WindmillHttpErrorKind,
    status: Option<u16>,
    url: Option<String>,
    message: String,
    source: Option<anyhow::Error>,
}

impl WindmillHttpError {
    pub fn kind(&self) -> WindmillHttpErrorKind {
        self.kind
    }

    pub fn status(&self) -> Option<u16> {
        self.status
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    pub(crate) fn from_reqwest(err: reqwest::Error, url: &str) -> Self {
        let kind = if err.is_timeout() {
            WindmillHttpErrorKind::Timeout
        } else if err.is_connect() {
            WindmillHttpErrorKind::Connect
        } else if err.is_request() {
            WindmillHttpErrorKind::Request
        } else if err.is_body() {
            WindmillHttpErrorKind::Body
        } else if err.is_decode() {
            WindmillHttpErrorKind::Decode
        } else {
            WindmillHttpErrorKind::Unknown
        };
        WindmillHttpError {
            kind,
            status: err.status().map(|s| s.as_u16()),
            url: Some(url.to_string()),
            message: err.to_string(),
            source: Some(anyhow::Error::new(err)),
        }
    }

    pub(crate) fn status_error(status: u16, url: &str, body: &str) -> Self {
        WindmillHttpError {
            kind: WindmillHttpErrorKind::Status,
            status: Some(status),
            url: Some(url.to_string()),
            message: preview_body(body),
            source: None,
        }
    }

    pub(crate) fn decode_error(status: u16, url: &str, err: serde_json::Error, body: &str) -> Self {
        let message = format!(
            "failed to decode response body: {} | body={}",
            err,
            preview_body(body)
        );
        WindmillHttpError {
            kind: WindmillHttpErrorKind::Decode,
            status: Some(status),
            url: Some(url.to_string()),
            message,
            source: Some(anyhow::Error::new(err)),
        }
    }
}

impl fmt::Display for WindmillHttpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "windmill http error kind={}", self.kind)?;
        if let Some(status) = self.status {
            write!(f, " status={}", status)?;
        }
        if let Some(url) = &self.url {
            write!(f, " url={}", url)?;
        }
        write!(f, ": {}", self.message)
    }
}

impl StdError for WindmillHttpError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|err| &**err as &(dyn StdError + 'static))
    }
}

pub(crate) fn preview_body(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "<empty body>".to_string();
    }

    let mut out: String = trimmed.chars().take(BODY_PREVIEW_LIMIT).collect();
    if trimmed.chars().nth(BODY_PREVIEW_LIMIT).is_some() {
        out.push_str("...");
    }
    out
}

/// Decode a 2xx body. Empty bodies are `null`.
pub(crate) fn decode_body(status: u16, url: &str, body: &str) -> Result<Value, WindmillHttpError> {
    if body.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str::<Value>(body)
        .map_err(|err| WindmillHttpError::decode_error(status, url, err, body))
}

/// Job ids come back as a JSON string; tolerate a bare id as well.
pub(crate) fn parse_job_id(body: &str) -> String {
    body.trim().trim_matches('"').to_string()
}
