// Runpod Core - Job Lifecycle Domain Logic & Ports
// NO HTTP dependencies: the transport is injected through `port::Transport`

pub mod application;
pub mod domain;
pub mod error;
pub mod port;

pub use error::{ClientError, Result};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
