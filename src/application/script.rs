//! Script generator: renders the browser-side infinite scroll program.

use url::form_urlencoded;

use crate::domain::hash::ConfigHash;
use crate::domain::options::PagelessConfig;
use crate::domain::routing::{RoutingContext, ViewContext};
use crate::presentation::script::PagelessScriptTemplate;
use crate::presentation::views::{TemplateRenderError, render_text};

/// Responses at or below this many characters are read as "no more posts".
pub const MINIMUM_RESPONSE_LENGTH: usize = 100;

/// Placeholder the browser replaces with the cursor of the last rendered post.
pub const SLUG_PLACEHOLDER: &str = "{slug}";

pub const SPINNER_IMAGE: &str = "spinnersmalldark.svg";

/// A rendered script together with its content hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedScript {
    pub body: String,
    pub etag: String,
}

impl GeneratedScript {
    fn new(body: String) -> Self {
        let etag = ConfigHash::of_bytes(body.as_bytes()).to_hex();
        Self { body, etag }
    }

    /// ETag header value (quoted).
    pub fn etag_header(&self) -> String {
        format!("\"{}\"", self.etag)
    }
}

/// Render the script for a view.
///
/// Pure in its inputs: identical arguments give byte-identical output. Single
/// item views get no script.
pub fn generate_script(
    config: &PagelessConfig,
    view: &ViewContext,
    asset_base_url: &str,
    fetch_url_template: &str,
) -> Result<Option<GeneratedScript>, TemplateRenderError> {
    if view.listing().is_none() {
        return Ok(None);
    }

    let template = PagelessScriptTemplate {
        pager_id: js_string(&config.pager_id),
        post_class: js_string(&config.post_class),
        fetch_url_template: js_string(fetch_url_template),
        slug_placeholder: js_string(SLUG_PLACEHOLDER),
        spinner_image_url: js_string(&format!(
            "{}/{SPINNER_IMAGE}",
            asset_base_url.trim_end_matches('/')
        )),
        minimum_response_length: MINIMUM_RESPONSE_LENGTH,
    };

    render_text(template, "application::script::generate_script")
        .map(|body| Some(GeneratedScript::new(body)))
}

/// URL the browser fetches the next batch from, with `{slug}` left for the cursor.
///
/// The routing filter is baked in as `type`/`param` query parameters.
pub fn fetch_url_template(base_url: &str, context: &RoutingContext) -> String {
    let mut url = format!(
        "{}/pageless/{SLUG_PLACEHOLDER}",
        base_url.trim_end_matches('/')
    );

    if let (Some(filter), Some(param)) = (context.filter_type(), context.filter_param()) {
        let query = form_urlencoded::Serializer::new(String::new())
            .append_pair("type", filter.as_str())
            .append_pair("param", &param)
            .finish();
        url.push('?');
        url.push_str(&query);
    }

    url
}

/// Encode a value as a JavaScript string literal, safe to embed anywhere in a script.
pub fn js_string(value: &str) -> String {
    let encoded = serde_json::to_string(value).unwrap_or_else(|_| String::from("\"\""));
    encoded
        .replace("</", "<\\/")
        .replace('\u{2028}', "\\u2028")
        .replace('\u{2029}', "\\u2029")
}
