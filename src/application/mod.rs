//! Application services: option resolution, script generation, asset injection
//! and incremental batches.

pub mod batch;
pub mod error;
pub mod footer;
pub mod options;
pub mod registry;
pub mod repos;
pub mod script;
