//! Shared utilities

pub mod config;
pub mod diagnostic;
pub mod fs;
pub mod host;
pub mod process;

pub use config::Config;
pub use diagnostic::Diagnostic;
pub use host::{Host, SystemHost};
pub use process::{ProcessBuilder, ProcessOutput};
