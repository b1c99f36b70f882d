pub mod builders;
pub mod component;
pub mod fake_backend;

// Re-export commonly used items
pub use builders::EventBuilder;
pub use component::ComponentTestHarness;
pub use fake_backend::FakeBackend;

use std::time::Duration;

pub const TEST_TERMINAL_WIDTH: u16 = 100;
pub const TEST_TERMINAL_HEIGHT: u16 = 30;
pub const TEST_TIMEOUT: Duration = Duration::from_secs(5);
