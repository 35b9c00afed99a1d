//! Assorted helpers shared by the server crates

mod or_log;
pub use or_log::OrLog;

mod time_utils;
pub use time_utils::*;
