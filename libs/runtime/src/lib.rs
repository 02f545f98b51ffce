//! Process-level plumbing shared by the server binary: layered configuration,
//! home directory resolution and logging initialization.

pub mod config;
pub mod home_dir;
pub mod logging;

pub use config::{
    default_logging_config, AppConfig, CliArgs, DatabaseConfig, LoggingConfig, Section,
    ServerConfig,
};
pub use home_dir::resolve_home_dir;
pub use logging::init_logging_from_config;
