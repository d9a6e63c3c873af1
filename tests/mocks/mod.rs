//! Centralized mocks and fixtures for testing
//!
//! Settings tuned for tests and scripted runtimes for the chains of the
//! bundled registry dataset.

pub mod configs;
pub mod entities;

#[allow(unused_imports)]
pub use configs::MockConfigs;
#[allow(unused_imports)]
pub use entities::{MockEntities, TestConstants};
