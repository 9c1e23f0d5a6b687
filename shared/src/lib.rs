pub mod config;
pub mod cors;
pub mod state;

pub use config::{Config, ConfigError};
pub use state::AppState;
