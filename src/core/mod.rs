//! Core harness modules
//!
//! Contains configuration, error and type definitions, critical sections
//! and release-time arithmetic.

pub mod config;
pub mod critical;
pub mod error;
pub mod types;
pub mod time;
pub mod cs_cell;
