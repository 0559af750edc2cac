//! In-memory adapters: option storage and an archive-backed posts repository.

use std::path::Path;

use async_trait::async_trait;
use dashmap::DashMap;
use serde::Deserialize;
use time::Date;

use crate::application::repos::{OptionsRepo, PostsRepo, RepoError};
use crate::domain::posts::{ARCHIVE_DATE_FORMAT, PostRecord};
use crate::domain::routing::{Cursor, RoutingContext};

/// Process-local option storage.
#[derive(Debug, Default)]
pub struct InMemoryOptions {
    values: DashMap<String, String>,
}

impl InMemoryOptions {
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let values = DashMap::new();
        for (key, value) in pairs {
            values.insert(key.to_string(), value.to_string());
        }
        Self { values }
    }
}

#[async_trait]
impl OptionsRepo for InMemoryOptions {
    async fn get_option(&self, key: &str) -> Result<Option<String>, RepoError> {
        Ok(self.values.get(key).map(|entry| entry.value().clone()))
    }

    async fn set_option(&self, key: &str, value: &str) -> Result<(), RepoError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn set_options(&self, entries: &[(String, String)]) -> Result<(), RepoError> {
        for (key, value) in entries {
            self.values.insert(key.clone(), value.clone());
        }
        Ok(())
    }
}

/// Posts loaded once from a TOML archive, kept newest first.
#[derive(Debug, Clone, Default)]
pub struct ArchivePosts {
    posts: Vec<PostRecord>,
}

#[derive(Debug, Deserialize)]
struct RawArchive {
    #[serde(default)]
    posts: Vec<RawPost>,
}

#[derive(Debug, Deserialize)]
struct RawPost {
    slug: String,
    title: String,
    published: String,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    body_html: String,
}

impl ArchivePosts {
    pub fn new(mut posts: Vec<PostRecord>) -> Self {
        posts.sort_by(|a, b| {
            b.published
                .cmp(&a.published)
                .then_with(|| a.slug.cmp(&b.slug))
        });
        Self { posts }
    }

    /// Parse an archive of `[[posts]]` tables.
    pub fn from_toml(source: &str) -> Result<Self, RepoError> {
        let raw: RawArchive = toml::from_str(source)
            .map_err(|err| RepoError::invalid_data(format!("malformed archive: {err}")))?;

        let mut posts = Vec::with_capacity(raw.posts.len());
        for post in raw.posts {
            Cursor::parse(&post.slug).map_err(|err| RepoError::invalid_data(err.to_string()))?;
            let published = Date::parse(post.published.trim(), ARCHIVE_DATE_FORMAT).map_err(|err| {
                RepoError::invalid_data(format!(
                    "post `{}` has invalid date `{}`: {err}",
                    post.slug, post.published
                ))
            })?;
            posts.push(PostRecord {
                slug: post.slug,
                title: post.title,
                published,
                tags: post.tags,
                body_html: post.body_html,
            });
        }

        Ok(Self::new(posts))
    }

    pub async fn load(path: &Path) -> Result<Self, RepoError> {
        let source = tokio::fs::read_to_string(path)
            .await
            .map_err(|err| RepoError::from_persistence(format!("{}: {err}", path.display())))?;
        Self::from_toml(&source)
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }

    fn matching<'a>(
        &'a self,
        context: &'a RoutingContext,
    ) -> impl Iterator<Item = &'a PostRecord> + 'a {
        self.posts.iter().filter(move |post| post.matches(context))
    }
}

#[async_trait]
impl PostsRepo for ArchivePosts {
    async fn list_posts(
        &self,
        context: &RoutingContext,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<PostRecord>, RepoError> {
        Ok(self
            .matching(context)
            .skip(offset)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn posts_after(
        &self,
        cursor: &Cursor,
        context: &RoutingContext,
        limit: usize,
    ) -> Result<Vec<PostRecord>, RepoError> {
        let Some(position) = self
            .posts
            .iter()
            .position(|post| post.slug == cursor.as_str())
        else {
            return Ok(Vec::new());
        };

        Ok(self.posts[position + 1..]
            .iter()
            .filter(|post| post.matches(context))
            .take(limit)
            .cloned()
            .collect())
    }

    async fn count_posts(&self, context: &RoutingContext) -> Result<usize, RepoError> {
        Ok(self.matching(context).count())
    }

    async fn find_post(&self, slug: &str) -> Result<Option<PostRecord>, RepoError> {
        Ok(self.posts.iter().find(|post| post.slug == slug).cloned())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) const SAMPLE_ARCHIVE: &str = r#"
[[posts]]
slug = "first"
title = "First"
published = "2024-01-05"
tags = ["rust"]
body_html = "<p>One</p>"

[[posts]]
slug = "second"
title = "Second"
published = "2024-02-10"
tags = ["news"]
body_html = "<p>Two</p>"

[[posts]]
slug = "third"
title = "Third"
published = "2024-03-15"
tags = ["rust", "news"]
body_html = "<p>Three</p>"

[[posts]]
slug = "fourth"
title = "Fourth"
published = "2024-04-20"
tags = ["news"]
body_html = "<p>Four</p>"

[[posts]]
slug = "fifth"
title = "Fifth"
published = "2024-05-25"
tags = ["misc"]
body_html = "<p>Five</p>"
"#;

    pub(crate) fn sample_posts() -> Vec<PostRecord> {
        ArchivePosts::from_toml(SAMPLE_ARCHIVE)
            .expect("sample archive parses")
            .posts
    }

    #[test]
    fn archive_is_sorted_newest_first() {
        let archive = ArchivePosts::new(sample_posts());
        let slugs: Vec<_> = archive.posts.iter().map(|p| p.slug.as_str()).collect();
        assert_eq!(slugs, ["fifth", "fourth", "third", "second", "first"]);
    }

    #[test]
    fn malformed_dates_are_reported() {
        let err = ArchivePosts::from_toml(
            "[[posts]]\nslug = \"a\"\ntitle = \"A\"\npublished = \"yesterday\"\n",
        )
        .expect_err("invalid date");
        assert!(err.to_string().contains("invalid date"));
    }

    #[test]
    fn slugs_must_be_cursor_safe() {
        let err = ArchivePosts::from_toml(
            "[[posts]]\nslug = \"a b\"\ntitle = \"A\"\npublished = \"2024-01-01\"\n",
        )
        .expect_err("invalid slug");
        assert!(err.to_string().contains("invalid cursor"));
    }

    #[tokio::test]
    async fn options_round_trip() {
        let store = InMemoryOptions::default();
        assert_eq!(store.get_option("k").await.expect("get"), None);
        store.set_option("k", "v").await.expect("set");
        assert_eq!(store.get_option("k").await.expect("get").as_deref(), Some("v"));
    }

    #[tokio::test]
    async fn date_context_counts() {
        let archive = ArchivePosts::new(sample_posts());
        let context = RoutingContext::Date {
            year: 2024,
            month: Some(3),
            day: None,
        };
        assert_eq!(archive.count_posts(&context).await.expect("count"), 1);
    }
}
