//! Relay between clients and the RunningHub image-generation API: uploads an
//! image, triggers a ComfyUI workflow on it, and forwards status polling and
//! cancellation.

pub mod config;
pub mod error;
pub mod image;
pub mod logger;
pub mod models;
pub mod orchestrator;
pub mod runninghub;
#[cfg(feature = "server")]
pub mod server;

pub use config::{Config, ProviderConfig};
pub use error::{ErrorKind, RelayError, Result};
pub use image::{ImageFormat, ImagePayload};
pub use models::*;
pub use orchestrator::Orchestrator;
pub use runninghub::{ProviderApi, RunningHubClient};
