//! End-to-end test support for Searchlight
//!
//! - `harness`: isolated on-disk indexes and coordinators wired for tests
//! - `mocks`: controllable remote sources and realistic result fixtures


pub use harness::{TestIndexManager, fast_config};
pub use mocks::{SourceBehavior, TestDataFactory, TestSource};
