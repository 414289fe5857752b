//! # Tally API Server Library
//!
//! HTTP surface of the Tally habit tracker: cookie-authenticated JSON
//! endpoints for tasks, completions and magic-link logins.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Configuration management
//! - `cookie`: Session cookie headers
//! - `error`: Error handling and HTTP response mapping
//! - `extract`: Authentication and body extractors
//! - `routes`: API route handlers

pub mod app;
pub mod config;
pub mod cookie;
pub mod error;
pub mod extract;
pub mod routes;
