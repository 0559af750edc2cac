mod support;

use axum::{
    body::Body,
    http::{Request, StatusCode, header::CONTENT_TYPE},
};
use pageless::application::repos::OptionsRepo;

use support::{app, body_text, get, ok_text, send};

fn form_post(body: &'static str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/admin/pageless")
        .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body))
        .expect("request should build")
}

#[tokio::test]
async fn form_shows_current_values() {
    let app = app();
    let html = ok_text(&app.admin, "/admin/pageless").await;

    assert!(html.contains(r#"action="/admin/pageless""#));
    assert!(html.contains(r#"name="num_item" value="2""#));
    assert!(html.contains(r#"name="post_class" value="hentry""#));
    assert!(html.contains(r#"name="pager_id" value="page-selector""#));
    assert!(!html.contains("Options saved"));
}

#[tokio::test]
async fn valid_submission_is_persisted_and_used_by_listings() {
    let app = app();

    let response = send(
        &app.admin,
        form_post("num_item=1&post_class=post&pager_id=older-newer"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("Options saved"));
    assert!(html.contains(r#"name="num_item" value="1""#));

    let stored = app
        .store
        .get_option("pageless__num_item")
        .await
        .expect("store readable");
    assert_eq!(stored.as_deref(), Some("1"));

    let listing = ok_text(&app.public, "/tag/news").await;
    assert!(listing.contains(r#"<article id="entry-fifth-news" class="post">"#));
    assert!(!listing.contains("entry-third-news"));
    assert!(listing.contains(r#"<nav id="older-newer">"#));
}

#[tokio::test]
async fn invalid_submission_keeps_input_and_previous_values() {
    let app = app();

    let response = send(
        &app.admin,
        form_post("num_item=-1&post_class=&pager_id=page-selector"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let html = body_text(response).await;
    assert!(html.contains("This field must be positive integer."));
    assert!(html.contains(r#"name="num_item" value="-1""#));
    assert!(html.contains("field--invalid"));
    assert!(!html.contains("Options saved"));

    let stored = app
        .store
        .get_option("pageless__num_item")
        .await
        .expect("store readable");
    assert_eq!(stored.as_deref(), Some("2"));
}

#[tokio::test]
async fn admin_health_and_unknown_routes() {
    let app = app();
    assert_eq!(
        get(&app.admin, "/_health").await.status(),
        StatusCode::NO_CONTENT
    );
    assert_eq!(
        get(&app.admin, "/tag/news").await.status(),
        StatusCode::NOT_FOUND
    );
}
