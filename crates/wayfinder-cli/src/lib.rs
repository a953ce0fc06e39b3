//! Wayfinder CLI library.
//!
//! This crate provides command-line interface utilities for the indoor route
//! planner, including logging setup and output formatting.

pub mod logging;
pub mod output;
