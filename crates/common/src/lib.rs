pub mod config;
pub mod logging;
pub mod telemetry;

pub use config::{Environment, env_optional, env_parse, env_string};
pub use logging::setup_logging;
pub use telemetry::TelemetryGuard;
