//! Command-line surface of the driver.

pub mod args;

pub use args::{parse, Command, RunArgs, RunMode, USAGE};
