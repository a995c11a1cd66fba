//! Common test utilities for escargo tests

pub mod fixtures;
pub mod mock_editor;
pub mod mock_platform;

// Re-exports for convenience - not all test binaries use all exports
#[allow(unused_imports)]
pub use fixtures::*;
#[allow(unused_imports)]
pub use mock_editor::MockEditor;
#[allow(unused_imports)]
pub use mock_platform::{Call, MockPlatformService};
