pub mod log_builders;
pub mod setup;

// Re-export main utilities for use by test files
#[allow(unused_imports)]
pub use log_builders::{answer, LogBuilder, QuestionBuilder};
#[allow(unused_imports)]
pub use setup::{TestSetup, TestSetupBuilder};
