//! Shared canonical store integration tests.
//!
//! Tests the canonical store interfaces against all implementations so the
//! SQL translation and in-memory evaluation agree on semantics.
//! Each implementation module imports these test functions and runs them.

pub mod catalog_store_tests;
