//! Infinite scrolling for post listings.
//!
//! A listing page gets a generated, content-addressed script that hides the
//! pager and appends the next batch of posts as the reader nears the bottom.

pub mod application;
pub mod config;
pub mod domain;
pub mod infra;
pub mod presentation;
