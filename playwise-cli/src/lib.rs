//! # PlayWise Console
//!
//! Line-oriented shell over a [`playwise_core::Library`]: command parsing and
//! execution, shared by the `playwise` binary and the tests.

pub mod command;
pub mod error;
pub mod shell;

pub use command::Command;
pub use error::CommandError;
pub use shell::{Shell, ShellControl};
