#![allow(dead_code)]

use std::num::NonZeroUsize;
use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, Response, StatusCode},
};
use http_body_util::BodyExt;
use pageless::application::{
    batch::BatchService,
    footer::{AssetUrls, FooterInjector},
    options::OptionsService,
    registry::ScriptRegistry,
};
use pageless::infra::{
    http::{AdminState, HttpState, build_admin_router, build_router},
    memory::{ArchivePosts, InMemoryOptions},
};
use tower::ServiceExt;

pub const ARCHIVE: &str = r#"
[[posts]]
slug = "first-rust"
title = "First"
published = "2024-01-01"
tags = ["rust"]
body_html = "<p>The first post of the archive, about ownership and borrowing.</p>"

[[posts]]
slug = "second-both"
title = "Second"
published = "2024-02-01"
tags = ["news", "rust"]
body_html = "<p>The second post, filed under both news and rust.</p>"

[[posts]]
slug = "third-news"
title = "Third"
published = "2024-03-01"
tags = ["news"]
body_html = "<p>The third post, a short news item.</p>"

[[posts]]
slug = "fourth-rust"
title = "Fourth"
published = "2024-04-01"
tags = ["rust"]
body_html = "<p>The fourth post, more rust.</p>"

[[posts]]
slug = "fifth-news"
title = "Fifth"
published = "2024-05-01"
tags = ["news"]
body_html = "<p>The fifth and newest post.</p>"
"#;

pub struct TestApp {
    pub public: Router,
    pub admin: Router,
    pub store: Arc<InMemoryOptions>,
    pub registry: Arc<ScriptRegistry>,
}

/// Public and admin routers over the sample archive with a batch size of 2.
pub fn app() -> TestApp {
    app_with_capacity(8)
}

pub fn app_with_capacity(capacity: usize) -> TestApp {
    let store = Arc::new(InMemoryOptions::from_pairs([
        ("pageless__num_item", "2"),
        ("pageless__post_class", "hentry"),
        ("pageless__pager_id", "page-selector"),
    ]));
    let options = OptionsService::new(store.clone(), "pageless");
    let posts = Arc::new(ArchivePosts::from_toml(ARCHIVE).expect("sample archive parses"));
    let registry = Arc::new(ScriptRegistry::new(
        NonZeroUsize::new(capacity).expect("non-zero capacity"),
    ));
    let injector = Arc::new(FooterInjector::new(
        registry.clone(),
        AssetUrls {
            jquery_url: "https://cdn.example/jquery.min.js".into(),
            asset_base_url: "/static/pageless".into(),
            script_base_url: String::new(),
        },
    ));

    let public = build_router(HttpState {
        batches: Arc::new(BatchService::new(posts, options.clone())),
        injector,
        registry: registry.clone(),
        base_url: String::new(),
    });
    let admin = build_admin_router(AdminState { options });

    TestApp {
        public,
        admin,
        store,
        registry,
    }
}

pub async fn send(router: &Router, request: Request<Body>) -> Response<Body> {
    router
        .clone()
        .oneshot(request)
        .await
        .expect("router should respond")
}

pub async fn get(router: &Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("request should build");
    send(router, request).await
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body should collect")
        .to_bytes();
    String::from_utf8(bytes.to_vec()).expect("utf-8 body")
}

/// Pull the generated script URL out of a rendered listing.
pub fn script_src(html: &str) -> String {
    let start = html
        .find("/scripts/jquery.pageless_")
        .expect("listing links the generated script");
    let end = html[start..].find('"').expect("closing quote") + start;
    html[start..end].to_string()
}

pub async fn ok_text(router: &Router, uri: &str) -> String {
    let response = get(router, uri).await;
    assert_eq!(response.status(), StatusCode::OK, "GET {uri}");
    body_text(response).await
}
