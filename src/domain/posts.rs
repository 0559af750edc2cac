//! Posts as seen by the batch endpoint and the demonstration host.

use serde::Serialize;
use time::{Date, format_description::FormatItem, macros::format_description};

use super::routing::RoutingContext;

pub const HUMAN_DATE_FORMAT: &[FormatItem<'static>] =
    format_description!("[month repr:long] [day padding:none], [year]");
pub const ARCHIVE_DATE_FORMAT: &[FormatItem<'static>] = format_description!("[year]-[month]-[day]");

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostRecord {
    pub slug: String,
    pub title: String,
    pub published: Date,
    pub tags: Vec<String>,
    pub body_html: String,
}

impl PostRecord {
    /// Whether the post belongs to the listing described by `context`.
    pub fn matches(&self, context: &RoutingContext) -> bool {
        match context {
            RoutingContext::None => true,
            RoutingContext::Tag { tag } => self.tags.iter().any(|t| t.eq_ignore_ascii_case(tag)),
            RoutingContext::Date { year, month, day } => {
                i32::from(*year) == self.published.year()
                    && month.is_none_or(|m| m == u8::from(self.published.month()))
                    && day.is_none_or(|d| d == self.published.day())
            }
            RoutingContext::Search { criteria } => {
                let needle = criteria.to_lowercase();
                self.title.to_lowercase().contains(&needle)
                    || self.body_html.to_lowercase().contains(&needle)
            }
        }
    }

    pub fn human_date(&self) -> String {
        self.published
            .format(HUMAN_DATE_FORMAT)
            .unwrap_or_else(|_| self.published.to_string())
    }
}

#[cfg(test)]
mod tests {
    use time::Month;

    use super::*;

    fn post() -> PostRecord {
        PostRecord {
            slug: "hello".into(),
            title: "Hello Rust".into(),
            published: Date::from_calendar_date(2024, Month::May, 12).expect("valid date"),
            tags: vec!["News".into()],
            body_html: "<p>First post</p>".into(),
        }
    }

    #[test]
    fn matches_each_filter_kind() {
        let post = post();
        assert!(post.matches(&RoutingContext::None));
        assert!(post.matches(&RoutingContext::Tag { tag: "news".into() }));
        assert!(!post.matches(&RoutingContext::Tag { tag: "misc".into() }));
        assert!(post.matches(&RoutingContext::Date {
            year: 2024,
            month: Some(5),
            day: None
        }));
        assert!(!post.matches(&RoutingContext::Date {
            year: 2024,
            month: Some(5),
            day: Some(13)
        }));
        assert!(post.matches(&RoutingContext::Search {
            criteria: "RUST".into()
        }));
    }

    #[test]
    fn human_date_is_long_form() {
        assert_eq!(post().human_date(), "May 12, 2024");
    }
}
