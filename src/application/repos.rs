//! Repository traits describing the host collaborators.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::posts::PostRecord;
use crate::domain::routing::{Cursor, RoutingContext};

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("persistence error: {0}")]
    Persistence(String),
    #[error("invalid stored data: {message}")]
    InvalidData { message: String },
}

impl RepoError {
    pub fn from_persistence(err: impl std::fmt::Display) -> Self {
        Self::Persistence(err.to_string())
    }

    pub fn invalid_data(message: impl Into<String>) -> Self {
        Self::InvalidData {
            message: message.into(),
        }
    }
}

/// Key-value option storage owned by the host.
#[async_trait]
pub trait OptionsRepo: Send + Sync {
    async fn get_option(&self, key: &str) -> Result<Option<String>, RepoError>;
    async fn set_option(&self, key: &str, value: &str) -> Result<(), RepoError>;

    /// Store every entry or none of them.
    async fn set_options(&self, entries: &[(String, String)]) -> Result<(), RepoError>;
}

/// Read access to published posts, newest first.
#[async_trait]
pub trait PostsRepo: Send + Sync {
    /// Posts matching `context`, skipping `offset` and returning at most `limit`.
    async fn list_posts(
        &self,
        context: &RoutingContext,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<PostRecord>, RepoError>;

    /// Up to `limit` posts matching `context` that follow `cursor` in listing order.
    ///
    /// An unknown cursor yields an empty batch.
    async fn posts_after(
        &self,
        cursor: &Cursor,
        context: &RoutingContext,
        limit: usize,
    ) -> Result<Vec<PostRecord>, RepoError>;

    async fn count_posts(&self, context: &RoutingContext) -> Result<usize, RepoError>;

    async fn find_post(&self, slug: &str) -> Result<Option<PostRecord>, RepoError>;
}
