use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    extract::{Path, Query, State},
    http::{
        HeaderMap, HeaderValue, StatusCode,
        header::{CACHE_CONTROL, CONTENT_TYPE, ETAG, EXPIRES, IF_NONE_MATCH},
    },
    middleware,
    response::{IntoResponse, Response},
    routing::get,
};
use metrics::counter;
use serde::Deserialize;
use time::{Duration, OffsetDateTime, format_description::FormatItem, macros::format_description};
use tracing::debug;

use crate::{
    application::{
        batch::BatchService,
        error::{ErrorReport, HttpError},
        footer::{AssetStack, FooterInjector, StackKind},
        registry::ScriptRegistry,
        script::{GeneratedScript, fetch_url_template, generate_script},
    },
    domain::{
        hash::parse_script_file_name,
        routing::{Cursor, HandlerVars, RoutingContext, RoutingError, ViewContext},
    },
    presentation::views::{
        BatchFragment, ListingTemplate, PostTemplate, PostView, render_not_found_response,
        render_template, render_template_response,
    },
};

use super::middleware::{log_responses, set_request_context};

/// Ten years, the lifetime of a content-addressed script.
const SCRIPT_MAX_AGE_SECS: i64 = 315_360_000;
const SCRIPT_CONTENT_TYPE: &str = "text/javascript";
const HTTP_DATE: &[FormatItem<'static>] = format_description!(
    "[weekday repr:short], [day] [month repr:short] [year] [hour]:[minute]:[second] GMT"
);

#[derive(Clone)]
pub struct HttpState {
    pub batches: Arc<BatchService>,
    pub injector: Arc<FooterInjector>,
    pub registry: Arc<ScriptRegistry>,
    /// Public base URL without a trailing slash.
    pub base_url: String,
}

pub fn build_router(state: HttpState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/tag/{tag}", get(tag_index))
        .route("/archive/{year}", get(archive_index))
        .route("/archive/{year}/{month}", get(archive_index))
        .route("/archive/{year}/{month}/{day}", get(archive_index))
        .route("/search", get(search_index))
        .route("/posts/{slug}", get(post_detail))
        .route("/pageless/{slug}", get(batch_query))
        .route("/pageless/{slug}/{filter}/{*param}", get(batch_path))
        .route("/scripts/{file}", get(pageless_script))
        .route(
            "/static/pageless/{*path}",
            get(crate::infra::assets::serve_pageless),
        )
        .route("/_health", get(health))
        .fallback(fallback)
        .with_state(state)
        .layer(middleware::from_fn(log_responses))
        .layer(middleware::from_fn(set_request_context))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PageQuery {
    page: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SearchQuery {
    criteria: Option<String>,
    page: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FilterQuery {
    #[serde(rename = "type")]
    filter: Option<String>,
    param: Option<String>,
}

async fn index(State(state): State<HttpState>, Query(query): Query<PageQuery>) -> Response {
    let view = ViewContext::from_handler_vars(&HandlerVars::new());
    render_listing(&state, view, "All posts".to_string(), query.page, "/").await
}

async fn tag_index(
    State(state): State<HttpState>,
    Path(tag): Path<String>,
    Query(query): Query<PageQuery>,
) -> Response {
    let vars = HandlerVars::from([("tag".to_string(), tag.clone())]);
    let view = ViewContext::from_handler_vars(&vars);
    let path = format!("/tag/{tag}");
    render_listing(&state, view, format!("Posts tagged “{tag}”"), query.page, &path).await
}

async fn archive_index(
    State(state): State<HttpState>,
    Path(vars): Path<HandlerVars>,
    Query(query): Query<PageQuery>,
) -> Response {
    let view = ViewContext::from_handler_vars(&vars);
    let param = match view.listing() {
        Some(context @ RoutingContext::Date { .. }) => context.filter_param(),
        _ => None,
    };

    // The batch route must be able to rebuild the same filter.
    let Some(param) = param.filter(|param| {
        RoutingContext::from_filter(Some("date"), Some(param)).is_ok()
            && param.split('/').count() == vars.len()
    }) else {
        return render_not_found_response(&state.base_url);
    };

    let path = format!("/archive/{param}");
    render_listing(&state, view, format!("Archive for {param}"), query.page, &path).await
}

async fn search_index(
    State(state): State<HttpState>,
    Query(query): Query<SearchQuery>,
) -> Response {
    let mut vars = HandlerVars::new();
    let mut path = "/search".to_string();
    let heading = match query.criteria.map(|value| value.trim().to_string()) {
        Some(criteria) if !criteria.is_empty() => {
            let encoded = url::form_urlencoded::Serializer::new(String::new())
                .append_pair("criteria", &criteria)
                .finish();
            path = format!("/search?{encoded}");
            vars.insert("criteria".to_string(), criteria.clone());
            format!("Search results for “{criteria}”")
        }
        _ => "All posts".to_string(),
    };

    let view = ViewContext::from_handler_vars(&vars);
    render_listing(&state, view, heading, query.page, &path).await
}

async fn render_listing(
    state: &HttpState,
    view: ViewContext,
    heading: String,
    page: Option<usize>,
    path: &str,
) -> Response {
    let Some(context) = view.listing() else {
        return render_not_found_response(&state.base_url);
    };

    let page = page.unwrap_or(1);
    let listing = match state.batches.listing_page(context, page).await {
        Ok(listing) => listing,
        Err(err) => return HttpError::from(err).into_response(),
    };
    if listing.posts.is_empty() && listing.page > 1 {
        return render_not_found_response(&state.base_url);
    }

    let mut stack = AssetStack::default();
    state
        .injector
        .inject_assets(&mut stack, &view, &listing.config);

    let base_url = state.base_url.as_str();
    let separator = if path.contains('?') { '&' } else { '?' };
    let page_href = |page: usize| {
        if page <= 1 {
            format!("{base_url}{path}")
        } else {
            format!("{base_url}{path}{separator}page={page}")
        }
    };

    render_template_response(
        ListingTemplate::new(
            base_url,
            heading,
            &listing,
            page_href,
            stack.entries(StackKind::Footer),
        ),
        StatusCode::OK,
    )
}

async fn post_detail(State(state): State<HttpState>, Path(slug): Path<String>) -> Response {
    let post = match state.batches.find_post(&slug).await {
        Ok(Some(post)) => post,
        Ok(None) => return render_not_found_response(&state.base_url),
        Err(err) => return HttpError::from(err).into_response(),
    };
    let config = match state.batches.options().resolve_config().await {
        Ok(config) => config,
        Err(err) => return HttpError::from(err).into_response(),
    };

    // Single items never get the scroll script.
    let vars = HandlerVars::from([("slug".to_string(), slug)]);
    let mut stack = AssetStack::default();
    state
        .injector
        .inject_assets(&mut stack, &ViewContext::from_handler_vars(&vars), &config);

    render_template_response(
        PostTemplate {
            base_url: state.base_url.clone(),
            post_class: config.post_class,
            post: PostView::from(&post),
        },
        StatusCode::OK,
    )
}

async fn batch_query(
    State(state): State<HttpState>,
    Path(slug): Path<String>,
    Query(query): Query<FilterQuery>,
) -> Response {
    serve_batch(
        &state,
        &slug,
        query.filter.as_deref(),
        query.param.as_deref(),
    )
    .await
}

async fn batch_path(
    State(state): State<HttpState>,
    Path((slug, filter, param)): Path<(String, String, String)>,
) -> Response {
    serve_batch(&state, &slug, Some(&filter), Some(&param)).await
}

async fn serve_batch(
    state: &HttpState,
    slug: &str,
    filter: Option<&str>,
    param: Option<&str>,
) -> Response {
    const SOURCE: &str = "infra::http::public::serve_batch";

    let cursor = match Cursor::parse(slug) {
        Ok(cursor) => cursor,
        Err(err) => {
            return HttpError::from_error(SOURCE, StatusCode::NOT_FOUND, "Unknown post", &err)
                .into_response();
        }
    };
    let context = match RoutingContext::from_filter(filter, param) {
        Ok(context) => context,
        Err(err @ RoutingError::UnknownFilter(_)) => {
            return HttpError::from_error(SOURCE, StatusCode::NOT_FOUND, "Unknown filter", &err)
                .into_response();
        }
        Err(err) => return HttpError::from(err).into_response(),
    };

    let batch = match state.batches.next_batch(&cursor, &context).await {
        Ok(batch) => batch,
        Err(err) => return HttpError::from(err).into_response(),
    };

    match render_template(BatchFragment::new(&state.base_url, &batch)) {
        Ok(html) => {
            counter!("pageless_batch_served_total").increment(1);
            debug!(
                target = "pageless::http::batch",
                cursor = %cursor,
                filter = ?context.filter_type(),
                posts = batch.posts.len(),
                "batch served"
            );
            html.into_response()
        }
        Err(err) => err.into_response(),
    }
}

async fn pageless_script(
    State(state): State<HttpState>,
    Path(file): Path<String>,
    headers: HeaderMap,
) -> Response {
    const SOURCE: &str = "infra::http::public::pageless_script";

    let hash = match parse_script_file_name(&file) {
        Ok(hash) => hash,
        Err(err) => {
            counter!("pageless_script_unknown_hash_total").increment(1);
            return HttpError::from_error(SOURCE, StatusCode::NOT_FOUND, "Script not found", &err)
                .into_response();
        }
    };

    let Some(entry) = state.registry.lookup(&hash) else {
        counter!("pageless_script_unknown_hash_total").increment(1);
        return HttpError::new(
            SOURCE,
            StatusCode::NOT_FOUND,
            "Script not found",
            format!("no configuration registered for hash `{hash}`"),
        )
        .into_response();
    };

    let injector_urls = state.injector.urls();
    let fetch_template = fetch_url_template(&state.base_url, &entry.context);
    let script = match generate_script(
        &entry.config,
        &ViewContext::Listing(entry.context),
        &injector_urls.asset_base_url,
        &fetch_template,
    ) {
        Ok(Some(script)) => script,
        Ok(None) => {
            return HttpError::new(
                SOURCE,
                StatusCode::NOT_FOUND,
                "Script not found",
                "registered context is not a listing",
            )
            .into_response();
        }
        Err(err) => return HttpError::from(err).into_response(),
    };

    let etag = script.etag_header();
    if if_none_match(&headers, &etag) {
        counter!("pageless_script_not_modified_total").increment(1);
        let mut response = StatusCode::NOT_MODIFIED.into_response();
        if let Ok(value) = HeaderValue::from_str(&etag) {
            response.headers_mut().insert(ETAG, value);
        }
        return response;
    }

    counter!("pageless_script_served_total").increment(1);
    script_response(script, &etag)
}

fn if_none_match(headers: &HeaderMap, etag: &str) -> bool {
    headers
        .get_all(IF_NONE_MATCH)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .map(|candidate| candidate.trim().trim_start_matches("W/"))
        .any(|candidate| candidate == "*" || candidate == etag)
}

fn script_response(script: GeneratedScript, etag: &str) -> Response {
    let mut response = Response::new(Body::from(script.body));
    let headers = response.headers_mut();

    headers.insert(CONTENT_TYPE, HeaderValue::from_static(SCRIPT_CONTENT_TYPE));
    if let Ok(value) = HeaderValue::from_str(etag) {
        headers.insert(ETAG, value);
    }
    if let Some(value) = expires_header(OffsetDateTime::now_utc()) {
        headers.insert(EXPIRES, value);
    }
    headers.insert(
        CACHE_CONTROL,
        HeaderValue::from_static("public, max-age=315360000"),
    );

    response
}

fn expires_header(now: OffsetDateTime) -> Option<HeaderValue> {
    let expires = now + Duration::seconds(SCRIPT_MAX_AGE_SECS);
    let formatted = expires.format(HTTP_DATE).ok()?;
    HeaderValue::from_str(&formatted).ok()
}

async fn health() -> Response {
    StatusCode::NO_CONTENT.into_response()
}

async fn fallback(State(state): State<HttpState>) -> Response {
    let mut response = render_not_found_response(&state.base_url);
    ErrorReport::from_message(
        "infra::http::public::fallback",
        StatusCode::NOT_FOUND,
        "No route matched",
    )
    .attach(&mut response);
    response
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use super::*;

    #[test]
    fn expires_is_ten_years_out_in_http_date_form() {
        let value = expires_header(datetime!(2024-01-01 00:00:00 UTC)).expect("header");
        assert_eq!(value.to_str().expect("ascii"), "Thu, 29 Dec 2033 00:00:00 GMT");
    }

    #[test]
    fn if_none_match_accepts_lists_and_weak_tags() {
        let mut headers = HeaderMap::new();
        headers.insert(
            IF_NONE_MATCH,
            HeaderValue::from_static("\"other\", W/\"abc\""),
        );
        assert!(if_none_match(&headers, "\"abc\""));
        assert!(!if_none_match(&headers, "\"def\""));
        assert!(!if_none_match(&HeaderMap::new(), "\"abc\""));
    }
}
