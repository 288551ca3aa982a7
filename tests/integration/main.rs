//! Integration tests for the pricing pipeline.

mod artifacts;
mod pipeline;
mod stub_model;
