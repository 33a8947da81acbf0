//! Shared test utilities

#![allow(dead_code)]

pub mod bus;
pub mod registry;

pub use bus::{expect_no_update, spawn_update_collector, wait_for_update};
pub use registry::{MockRegistry, create_test_cache, start_notifier};
