//! Integration tests for the quantization engine and block codec.
//!
//! These tests drive the public API end to end: engine scenarios with known
//! outcomes, and full compress/decompress runs on synthetic grids.

mod engine_scenarios;
mod pipeline;
