pub mod agents;
pub mod api;
pub mod config;
pub mod error;
pub mod executor;
