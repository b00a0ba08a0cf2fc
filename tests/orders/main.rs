//! Order service integration tests.

mod support;
mod contract;
mod service;
