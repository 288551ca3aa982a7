//! carprice: used-car fair price estimation.
//!
//! Library crate exposing all modules for use by integration tests
//! and the binary entry point.

pub mod config;
pub mod types;
pub mod features;
pub mod model;
pub mod predictor;
pub mod server;
