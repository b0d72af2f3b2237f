// Application Layer - Job lifecycle use cases

pub mod batch;
pub mod cancel;
pub mod constants;
pub mod lifecycle;

// Re-exports
pub use batch::{BatchCoordinator, BatchOutcome};
pub use cancel::{cancel_channel, CancelHandle, CancelToken};
pub use lifecycle::{JobLifecycleClient, LifecycleConfig};
