//! Command implementations
//!
//! Each module corresponds to a subcommand in the CLI.

pub mod check;
pub mod prompt;
pub mod send;

pub use check::{inspect, CheckReport};
pub use send::{run as send_run, SendArgs};
