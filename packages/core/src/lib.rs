// Library root; the binary in `src/main.rs` and the tests in `tests/` both
// build on these modules.

pub mod cache;
pub mod chain;
pub mod cli;
pub mod config;
pub mod dashboard;
pub mod derivation;
pub mod error;
pub mod gateway;
pub mod logging;
pub mod metrics;
pub mod services;
