//! Incremental batches and the listing pages they continue.

use std::sync::Arc;

use thiserror::Error;

use crate::application::options::OptionsService;
use crate::application::repos::{PostsRepo, RepoError};
use crate::domain::options::PagelessConfig;
use crate::domain::posts::PostRecord;
use crate::domain::routing::{Cursor, RoutingContext};

#[derive(Debug, Error)]
pub enum BatchError {
    #[error(transparent)]
    Repo(#[from] RepoError),
}

/// Posts following a cursor, ready to be rendered as a fragment.
#[derive(Debug, Clone)]
pub struct Batch {
    pub config: PagelessConfig,
    pub posts: Vec<PostRecord>,
}

/// One page of a listing as the host renders it before any scrolling.
#[derive(Debug, Clone)]
pub struct ListingPage {
    pub config: PagelessConfig,
    pub posts: Vec<PostRecord>,
    pub page: usize,
    pub has_older: bool,
}

#[derive(Clone)]
pub struct BatchService {
    posts: Arc<dyn PostsRepo>,
    options: OptionsService,
}

impl BatchService {
    pub fn new(posts: Arc<dyn PostsRepo>, options: OptionsService) -> Self {
        Self { posts, options }
    }

    pub fn options(&self) -> &OptionsService {
        &self.options
    }

    /// The next `batch_size` posts after `cursor` within `context`.
    pub async fn next_batch(
        &self,
        cursor: &Cursor,
        context: &RoutingContext,
    ) -> Result<Batch, BatchError> {
        let config = self.options.resolve_config().await?;
        let posts = self
            .posts
            .posts_after(cursor, context, config.batch_size as usize)
            .await?;
        Ok(Batch { config, posts })
    }

    /// Page `page` (1-based) of a listing, sized by the configured batch size.
    pub async fn listing_page(
        &self,
        context: &RoutingContext,
        page: usize,
    ) -> Result<ListingPage, BatchError> {
        let config = self.options.resolve_config().await?;
        let page = page.max(1);
        let per_page = (config.batch_size as usize).max(1);
        let offset = (page - 1).saturating_mul(per_page);

        let posts = self.posts.list_posts(context, offset, per_page).await?;
        let total = self.posts.count_posts(context).await?;
        let has_older = offset.saturating_add(posts.len()) < total;

        Ok(ListingPage {
            config,
            posts,
            page,
            has_older,
        })
    }

    pub async fn find_post(&self, slug: &str) -> Result<Option<PostRecord>, BatchError> {
        Ok(self.posts.find_post(slug).await?)
    }
}
