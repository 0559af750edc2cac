mod options;
mod state;

pub use state::AdminState;

use axum::{
    Router, http::StatusCode, middleware, response::IntoResponse, routing::get,
};

use super::middleware::{log_responses, set_request_context};

pub(crate) const OPTIONS_FORM_ACTION: &str = "/admin/pageless";

pub fn build_admin_router(state: AdminState) -> Router {
    Router::new()
        .route(
            OPTIONS_FORM_ACTION,
            get(options::admin_options).post(options::admin_options_update),
        )
        .route("/_health", get(|| async { StatusCode::NO_CONTENT.into_response() }))
        .with_state(state)
        .layer(middleware::from_fn(log_responses))
        .layer(middleware::from_fn(set_request_context))
}
