//! Library half of the `libris` command: logging setup, settings and
//! terminal output.

pub mod logging;
pub mod output;
pub mod settings;
