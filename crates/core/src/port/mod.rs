// Port Layer - Interfaces for external dependencies

pub mod transport;

// Re-exports
pub use transport::{HttpMethod, Transport};
