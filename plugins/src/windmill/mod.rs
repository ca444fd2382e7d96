//! Windmill job backend.
//!
//! ```text
//! POST {base}/api/w/{ws}/jobs/run/p/{script}          -> "<job id>"
//! GET  {base}/api/w/{ws}/jobs/completed/get_result/{id}
//!        200 result | 404 still running | other = failure
//! ```

mod client;
mod error;

pub use client::WindmillClient;
pub use error::{WindmillHttpError, WindmillHttpErrorKind};
