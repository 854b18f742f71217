//! Redis cluster diagnostics

pub mod commands;
pub mod status;

pub use commands::{db_size, flush_all};
pub use status::resolve;
