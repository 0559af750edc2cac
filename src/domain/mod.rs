//! Domain layer types and invariants.

pub mod error;
pub mod hash;
pub mod options;
pub mod posts;
pub mod routing;
