pub mod client;
pub mod config;
pub mod errors;
pub mod postprocessing;
pub mod service;

// Re-export commonly used types for convenience
pub use client::{HttpInferenceClient, InferenceClient};
pub use config::InferenceConfig;
pub use errors::{DetectionError, ErrorKind, InferenceError};
pub use service::DetectionService;
