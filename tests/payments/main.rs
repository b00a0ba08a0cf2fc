//! Payment service integration tests.

mod support;
mod service;

#[cfg(feature = "sqlite")]
mod sqlite;
