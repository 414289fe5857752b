/// Database models for Tally
///
/// Each model owns the SQL for its table.
///
/// # Models
///
/// - `user`: Accounts and password hashes
/// - `session`: Session tokens
/// - `magic_link`: Passwordless login links
/// - `task`: Recurring tasks and their `Interval`
/// - `completion`: Append-only completion log

pub mod completion;
pub mod magic_link;
pub mod session;
pub mod task;
pub mod user;
