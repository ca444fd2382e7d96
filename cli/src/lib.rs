//! conductor-cli library: exposes modules for unit tests.

pub mod commands;
pub mod http;
