pub mod config;
pub mod time;
pub mod types;

pub use config::GateConfig;
pub use types::*;
