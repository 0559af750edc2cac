//! Infrastructure adapters and runtime bootstrap.

pub mod assets;
pub mod error;
pub mod http;
pub mod memory;
pub mod options_file;
pub mod telemetry;
