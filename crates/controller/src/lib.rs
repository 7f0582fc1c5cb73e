pub mod cli;
pub mod config;
pub mod publisher;
pub mod report;
pub mod state_machine;
pub mod store;

pub use config::{ControllerConfig, OverlapPolicy};
pub use publisher::Subscription;
pub use report::DetectionReport;
pub use state_machine::{DetectionState, FAILURE_FALLBACK};
pub use store::DetectionStateStore;
