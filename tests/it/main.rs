//! Single test binary entry point.
//!
//! This consolidates all tests into a single binary following matklad's best practices,
//! reducing linking overhead.
//!
//! Structure:
//! - helpers: Fixtures over the in-memory host
//! - integration: Full drag sessions through the engine and plugins
//! - unit: Single-component unit tests

mod helpers;
mod integration;
