use askama::Template;

/// The infinite scroll program served under `/scripts/`.
///
/// String fields hold JavaScript literals, already quoted and escaped.
#[derive(Template)]
#[template(path = "pageless.js", escape = "none")]
pub struct PagelessScriptTemplate {
    pub pager_id: String,
    pub post_class: String,
    pub fetch_url_template: String,
    pub slug_placeholder: String,
    pub spinner_image_url: String,
    pub minimum_response_length: usize,
}
