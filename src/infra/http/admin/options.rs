use axum::{
    extract::{Form, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;

use crate::application::error::{ErrorReport, HttpError};
use crate::application::options::{OptionsError, UpdateOptionsCommand};
use crate::presentation::admin::{OptionsFormTemplate, OptionsFormView};
use crate::presentation::views::render_template_response;

use super::{AdminState, OPTIONS_FORM_ACTION};

const SOURCE_BASE: &str = "infra::http::admin_options";
const SAVED_NOTICE: &str = "Options saved";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub(super) struct AdminOptionsForm {
    num_item: String,
    post_class: String,
    pager_id: String,
}

impl From<AdminOptionsForm> for UpdateOptionsCommand {
    fn from(form: AdminOptionsForm) -> Self {
        Self {
            num_item: form.num_item,
            post_class: form.post_class,
            pager_id: form.pager_id,
        }
    }
}

pub(super) async fn admin_options(State(state): State<AdminState>) -> Response {
    match state.options.resolve_config().await {
        Ok(config) => render_template_response(
            OptionsFormTemplate {
                view: OptionsFormView::from_config(OPTIONS_FORM_ACTION, &config, None),
            },
            StatusCode::OK,
        ),
        Err(err) => HttpError::from(err).into_response(),
    }
}

pub(super) async fn admin_options_update(
    State(state): State<AdminState>,
    Form(form): Form<AdminOptionsForm>,
) -> Response {
    let command = UpdateOptionsCommand::from(form);

    match state.options.update(&command).await {
        Ok(config) => render_template_response(
            OptionsFormTemplate {
                view: OptionsFormView::from_config(
                    OPTIONS_FORM_ACTION,
                    &config,
                    Some(SAVED_NOTICE.to_string()),
                ),
            },
            StatusCode::OK,
        ),
        Err(OptionsError::Invalid(errors)) => {
            let fields = errors.keys().copied().collect::<Vec<_>>().join(", ");
            let mut response = render_template_response(
                OptionsFormTemplate {
                    view: OptionsFormView::from_submission(OPTIONS_FORM_ACTION, &command, &errors),
                },
                StatusCode::UNPROCESSABLE_ENTITY,
            );
            ErrorReport::from_message(
                "infra::http::admin_options::update",
                StatusCode::UNPROCESSABLE_ENTITY,
                format!("invalid fields: {fields}"),
            )
            .attach(&mut response);
            response
        }
        Err(OptionsError::Repo(err)) => HttpError::from_error(
            SOURCE_BASE,
            StatusCode::SERVICE_UNAVAILABLE,
            "Options could not be saved",
            &err,
        )
        .into_response(),
    }
}
