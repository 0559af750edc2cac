use askama::Template;

use crate::application::options::{FieldErrors, UpdateOptionsCommand};
use crate::domain::options::{OptionKey, PagelessConfig};

#[derive(Clone)]
pub struct OptionsFieldView {
    pub name: &'static str,
    pub label: &'static str,
    pub value: String,
    pub error: Option<String>,
}

#[derive(Clone)]
pub struct OptionsFormView {
    pub heading: String,
    pub form_action: String,
    pub fields: Vec<OptionsFieldView>,
    pub notice: Option<String>,
}

impl OptionsFormView {
    /// Form pre-filled with the stored configuration.
    pub fn from_config(form_action: &str, config: &PagelessConfig, notice: Option<String>) -> Self {
        let command = UpdateOptionsCommand {
            num_item: config.batch_size.to_string(),
            post_class: config.post_class.clone(),
            pager_id: config.pager_id.clone(),
        };
        Self::build(form_action, &command, &FieldErrors::new(), notice)
    }

    /// Form echoing a rejected submission with a message beside each bad field.
    pub fn from_submission(
        form_action: &str,
        command: &UpdateOptionsCommand,
        errors: &FieldErrors,
    ) -> Self {
        Self::build(form_action, command, errors, None)
    }

    pub fn has_errors(&self) -> bool {
        self.fields.iter().any(|field| field.error.is_some())
    }

    fn build(
        form_action: &str,
        command: &UpdateOptionsCommand,
        errors: &FieldErrors,
        notice: Option<String>,
    ) -> Self {
        let field = |key: OptionKey, label: &'static str, value: &str| OptionsFieldView {
            name: key.as_str(),
            label,
            value: value.to_string(),
            error: errors.get(key.as_str()).map(ToString::to_string),
        };

        Self {
            heading: "Pageless".to_string(),
            form_action: form_action.to_string(),
            fields: vec![
                field(OptionKey::NumItem, "Posts per batch", &command.num_item),
                field(OptionKey::PostClass, "Post CSS class", &command.post_class),
                field(OptionKey::PagerId, "Pager element id", &command.pager_id),
            ],
            notice,
        }
    }
}

#[derive(Template)]
#[template(path = "admin/pageless.html")]
pub struct OptionsFormTemplate {
    pub view: OptionsFormView,
}
