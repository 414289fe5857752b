/// API route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `health`: Health check endpoint
/// - `auth`: Login, logout, sessions and magic links
/// - `tasks`: Tasks, completions and previews

pub mod auth;
pub mod health;
pub mod tasks;
