//! Adapter implementations
//!
//! - [`NativeAdapter`]: calamine, in-process
//! - [`SubprocessAdapter`]: the subject implementation, one child process per call

pub mod native;
pub mod subprocess;

pub use native::NativeAdapter;
pub use subprocess::SubprocessAdapter;

use crate::config::HarnessConfig;

/// Build the `(subject, reference)` adapter pair for a configuration
pub fn create_adapters(config: &HarnessConfig) -> (SubprocessAdapter, NativeAdapter) {
    (
        SubprocessAdapter::from_config(&config.subject),
        NativeAdapter::with_name(config.reference_name.clone()),
    )
}
