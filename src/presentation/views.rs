use askama::{Error as AskamaError, Template};
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use thiserror::Error;

use crate::application::batch::{Batch, ListingPage};
use crate::application::error::{ErrorReport, HttpError};
use crate::application::footer::AssetRef;
use crate::domain::posts::PostRecord;

#[derive(Debug, Error)]
#[error("{public_message}")]
pub struct TemplateRenderError {
    pub(crate) source: &'static str,
    pub(crate) public_message: &'static str,
    #[source]
    pub(crate) error: AskamaError,
}

impl TemplateRenderError {
    pub fn new(source: &'static str, public_message: &'static str, error: AskamaError) -> Self {
        Self {
            source,
            public_message,
            error,
        }
    }
}

impl From<TemplateRenderError> for HttpError {
    fn from(err: TemplateRenderError) -> Self {
        let TemplateRenderError {
            source,
            public_message,
            error,
        } = err;

        HttpError::from_error(
            source,
            StatusCode::INTERNAL_SERVER_ERROR,
            public_message,
            &error,
        )
    }
}

/// Render a non-HTML template (scripts, fragments) to a plain string.
pub fn render_text<T: Template>(
    template: T,
    source: &'static str,
) -> Result<String, TemplateRenderError> {
    template
        .render()
        .map_err(|err| TemplateRenderError::new(source, "Template rendering failed", err))
}

pub fn render_template<T: Template>(template: T) -> Result<Html<String>, HttpError> {
    render_text(template, "presentation::views::render_template")
        .map(Html)
        .map_err(HttpError::from)
}

pub fn render_template_response<T: Template>(template: T, status: StatusCode) -> Response {
    match render_template(template) {
        Ok(html) => (status, html).into_response(),
        Err(err) => err.into_response(),
    }
}

pub fn render_not_found_response(base_url: &str) -> Response {
    let mut response = render_template_response(
        NotFoundTemplate {
            base_url: base_url.to_string(),
        },
        StatusCode::NOT_FOUND,
    );
    ErrorReport::from_message(
        "presentation::views::render_not_found_response",
        StatusCode::NOT_FOUND,
        "Resource not found",
    )
    .attach(&mut response);
    response
}

#[derive(Debug, Clone)]
pub struct PostView {
    pub slug: String,
    pub title: String,
    pub date: String,
    pub tags: Vec<String>,
    pub body_html: String,
}

impl From<&PostRecord> for PostView {
    fn from(post: &PostRecord) -> Self {
        Self {
            slug: post.slug.clone(),
            title: post.title.clone(),
            date: post.human_date(),
            tags: post.tags.clone(),
            body_html: post.body_html.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ScriptTag {
    pub id: String,
    pub src: String,
}

impl From<&AssetRef> for ScriptTag {
    fn from(asset: &AssetRef) -> Self {
        Self {
            id: asset.id.clone(),
            src: asset.url.clone(),
        }
    }
}

/// Articles appended by the browser after the last rendered post.
#[derive(Template)]
#[template(path = "partials/batch.html")]
pub struct BatchFragment {
    pub base_url: String,
    pub post_class: String,
    pub posts: Vec<PostView>,
}

impl BatchFragment {
    pub fn new(base_url: &str, batch: &Batch) -> Self {
        Self {
            base_url: base_url.to_string(),
            post_class: batch.config.post_class.clone(),
            posts: batch.posts.iter().map(PostView::from).collect(),
        }
    }
}

#[derive(Template)]
#[template(path = "listing.html")]
pub struct ListingTemplate {
    pub base_url: String,
    pub heading: String,
    pub post_class: String,
    pub pager_id: String,
    pub posts: Vec<PostView>,
    pub newer_href: Option<String>,
    pub older_href: Option<String>,
    pub footer_scripts: Vec<ScriptTag>,
}

impl ListingTemplate {
    pub fn new(
        base_url: &str,
        heading: String,
        listing: &ListingPage,
        page_href: impl Fn(usize) -> String,
        footer: &[AssetRef],
    ) -> Self {
        let newer_href = (listing.page > 1).then(|| page_href(listing.page - 1));
        let older_href = listing.has_older.then(|| page_href(listing.page + 1));

        Self {
            base_url: base_url.to_string(),
            heading,
            post_class: listing.config.post_class.clone(),
            pager_id: listing.config.pager_id.clone(),
            posts: listing.posts.iter().map(PostView::from).collect(),
            newer_href,
            older_href,
            footer_scripts: footer.iter().map(ScriptTag::from).collect(),
        }
    }
}

#[derive(Template)]
#[template(path = "post.html")]
pub struct PostTemplate {
    pub base_url: String,
    pub post_class: String,
    pub post: PostView,
}

#[derive(Template)]
#[template(path = "not_found.html")]
pub struct NotFoundTemplate {
    pub base_url: String,
}
