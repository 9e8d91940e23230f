//! Library side of the `silver-pipeline` binary.

pub mod cli;
pub mod commands;
pub mod logging;
pub mod summary;
