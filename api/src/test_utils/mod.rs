//! Test utilities
//!
//! Manual mock implementations and test fixtures for unit testing.
//!
//! Why manual mocks instead of mockall?
//! - mockall has lifetime issues with traits containing `&str` parameters
//! - Manual mocks are more explicit and easier to debug
//! - We control exactly what they return without macro magic
//!
//! Note: AppState is built over the PostgreSQL adapters, so HTTP-level tests
//! cover stateless routes only. Service tests run against these mocks.

pub mod fixtures;
pub mod mocks;

pub use fixtures::*;
pub use mocks::*;
