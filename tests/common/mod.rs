#![allow(dead_code)]

pub mod strategies;
pub mod stubs;

pub use strategies::*;
pub use stubs::*;

/// Install the crate's subscriber once per test binary
pub fn init_test_logging() {
    resilient_ops::logging::init_structured_logging();
}
