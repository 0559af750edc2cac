//! Embedded static assets: the spinner plugin and its image.

use axum::{
    body::Body,
    extract::Path,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use include_dir::{Dir, include_dir};
use mime_guess::Mime;

use crate::application::error::ErrorReport;

static STATIC_PAGELESS_ASSETS: Dir<'_> = include_dir!("$OUT_DIR/static_pageless");

/// Serve files mounted under `/static/pageless/`.
pub async fn serve_pageless(path: Option<Path<String>>) -> Response {
    let captured = path.map(|Path(value)| value);
    match resolve_asset(&STATIC_PAGELESS_ASSETS, captured.as_deref()) {
        Some(asset) => asset.into_response(),
        None => {
            let mut response = StatusCode::NOT_FOUND.into_response();
            ErrorReport::from_message(
                "infra::assets::serve_pageless",
                StatusCode::NOT_FOUND,
                "Static asset not found",
            )
            .attach(&mut response);
            response
        }
    }
}

struct Asset {
    contents: &'static [u8],
    mime: Mime,
}

fn resolve_asset(bundle: &'static Dir<'static>, path: Option<&str>) -> Option<Asset> {
    let candidate = path.unwrap_or_default().trim_start_matches('/');

    // No traversal, no directory listings.
    if candidate.is_empty() || candidate.ends_with('/') || candidate.contains("..") {
        return None;
    }

    let file = bundle.get_file(candidate)?;
    Some(Asset {
        contents: file.contents(),
        mime: mime_guess::from_path(candidate).first_or_octet_stream(),
    })
}

impl IntoResponse for Asset {
    fn into_response(self) -> Response {
        let bytes = Bytes::from_static(self.contents);
        let len = bytes.len();
        let mut response = Response::new(Body::from(bytes));

        let headers = response.headers_mut();
        if let Ok(value) = HeaderValue::from_str(self.mime.as_ref()) {
            headers.insert(header::CONTENT_TYPE, value);
        }
        if let Ok(value) = HeaderValue::from_str(&len.to_string()) {
            headers.insert(header::CONTENT_LENGTH, value);
        }
        headers.insert(
            header::CACHE_CONTROL,
            HeaderValue::from_static("public, max-age=31536000, immutable"),
        );

        response
    }
}
