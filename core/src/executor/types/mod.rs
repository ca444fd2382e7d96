pub mod config;
pub mod plan;
pub mod result;
pub mod status;

pub use config::*;
pub use plan::*;
pub use result::*;
pub use status::*;
