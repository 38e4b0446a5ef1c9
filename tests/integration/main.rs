//! Integration tests for Excavator
//!
//! These tests use wiremock to stand in for the dictionary site and run the
//! orchestrator end-to-end against a SQLite database in a temporary
//! workspace.

mod cache_tests;
mod common;
mod pipeline_tests;
mod run_tests;
