//! # Tally Shared Library
//!
//! This crate contains the storage models, authentication flows and the
//! completion aggregator used by the Tally API server.
//!
//! ## Module Organization
//!
//! - `models`: Database models and their SQL
//! - `auth`: Tokens, passwords, sessions, magic links and the access gate
//! - `preview`: Interval-bucketed completion aggregation and recording
//! - `db`: Connection pool and schema bootstrap

pub mod auth;
pub mod db;
pub mod models;
pub mod preview;

/// Current version of the Tally shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
