//! Integration test utilities for the segmentation service
//!
//! This crate provides helpers for running end-to-end HTTP tests against a
//! spawned server, backed by the in-memory store or by PostgreSQL.

pub mod fixtures;
pub mod helpers;

pub use fixtures::*;
pub use helpers::*;
