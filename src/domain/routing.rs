//! Per-request routing context: which listing (if any) the visitor is looking at.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Raw variables captured by the host router for the current request.
pub type HandlerVars = BTreeMap<String, String>;

/// Listing filter implied by the current page.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RoutingContext {
    None,
    Tag {
        tag: String,
    },
    Date {
        year: u16,
        month: Option<u8>,
        day: Option<u8>,
    },
    Search {
        criteria: String,
    },
}

/// What the host is rendering: a listing of posts or a single item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewContext {
    Listing(RoutingContext),
    Single { slug: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterType {
    Tag,
    Date,
    Search,
}

impl FilterType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterType::Tag => "tag",
            FilterType::Date => "date",
            FilterType::Search => "search",
        }
    }
}

impl fmt::Display for FilterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RoutingError {
    #[error("unknown filter type `{0}`")]
    UnknownFilter(String),
    #[error("filter `{filter}` is missing its parameter")]
    MissingParam { filter: &'static str },
    #[error("invalid date filter `{0}`")]
    InvalidDate(String),
    #[error("invalid cursor `{0}`")]
    InvalidCursor(String),
}

impl FromStr for FilterType {
    type Err = RoutingError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "tag" => Ok(FilterType::Tag),
            "date" => Ok(FilterType::Date),
            "search" => Ok(FilterType::Search),
            other => Err(RoutingError::UnknownFilter(other.to_string())),
        }
    }
}

impl RoutingContext {
    pub fn filter_type(&self) -> Option<FilterType> {
        match self {
            RoutingContext::None => None,
            RoutingContext::Tag { .. } => Some(FilterType::Tag),
            RoutingContext::Date { .. } => Some(FilterType::Date),
            RoutingContext::Search { .. } => Some(FilterType::Search),
        }
    }

    /// Parameter sent alongside the filter type, `year[/month[/day]]` for dates.
    pub fn filter_param(&self) -> Option<String> {
        match self {
            RoutingContext::None => None,
            RoutingContext::Tag { tag } => Some(tag.clone()),
            RoutingContext::Date { year, month, day } => {
                let mut param = year.to_string();
                if let Some(month) = month {
                    param.push_str(&format!("/{month}"));
                    if let Some(day) = day {
                        param.push_str(&format!("/{day}"));
                    }
                }
                Some(param)
            }
            RoutingContext::Search { criteria } => Some(criteria.clone()),
        }
    }

    /// Rebuild a context from the `type`/`param` pair carried by a batch request.
    pub fn from_filter(filter: Option<&str>, param: Option<&str>) -> Result<Self, RoutingError> {
        let Some(filter) = filter.filter(|value| !value.is_empty()) else {
            return Ok(RoutingContext::None);
        };
        let filter = filter.parse::<FilterType>()?;
        let param = param
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .ok_or(RoutingError::MissingParam {
                filter: filter.as_str(),
            })?;

        match filter {
            FilterType::Tag => Ok(RoutingContext::Tag {
                tag: param.to_string(),
            }),
            FilterType::Search => Ok(RoutingContext::Search {
                criteria: param.to_string(),
            }),
            FilterType::Date => parse_date_param(param),
        }
    }
}

fn parse_date_param(param: &str) -> Result<RoutingContext, RoutingError> {
    let invalid = || RoutingError::InvalidDate(param.to_string());
    let mut parts = param.trim_matches('/').split('/');

    let year = parts
        .next()
        .and_then(|value| value.parse::<u16>().ok())
        .ok_or_else(invalid)?;
    let month = parts
        .next()
        .map(|value| value.parse::<u8>().map_err(|_| invalid()))
        .transpose()?;
    let day = parts
        .next()
        .map(|value| value.parse::<u8>().map_err(|_| invalid()))
        .transpose()?;
    if parts.next().is_some() {
        return Err(invalid());
    }
    if month.is_some_and(|m| !(1..=12).contains(&m)) || day.is_some_and(|d| !(1..=31).contains(&d))
    {
        return Err(invalid());
    }

    Ok(RoutingContext::Date { year, month, day })
}

impl ViewContext {
    /// Derive the view from host handler variables.
    ///
    /// Precedence: `slug` (single item), `tag`, `year` with optional `month`
    /// and `day`, `criteria`, then an unfiltered listing.
    pub fn from_handler_vars(vars: &HandlerVars) -> Self {
        if let Some(slug) = vars.get("slug") {
            return ViewContext::Single { slug: slug.clone() };
        }

        if let Some(tag) = vars.get("tag") {
            return ViewContext::Listing(RoutingContext::Tag { tag: tag.clone() });
        }

        if let Some(year) = vars.get("year").and_then(|value| value.parse::<u16>().ok()) {
            let month = vars.get("month").and_then(|value| value.parse::<u8>().ok());
            let day = month.and_then(|_| vars.get("day").and_then(|value| value.parse::<u8>().ok()));
            return ViewContext::Listing(RoutingContext::Date { year, month, day });
        }

        if let Some(criteria) = vars.get("criteria") {
            return ViewContext::Listing(RoutingContext::Search {
                criteria: criteria.clone(),
            });
        }

        ViewContext::Listing(RoutingContext::None)
    }

    pub fn listing(&self) -> Option<&RoutingContext> {
        match self {
            ViewContext::Listing(context) => Some(context),
            ViewContext::Single { .. } => None,
        }
    }
}

/// Identifier of the last post rendered on the page.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Cursor(String);

impl Cursor {
    /// Accepts the same alphabet the batch route does: ASCII letters, digits and `-`.
    pub fn parse(value: &str) -> Result<Self, RoutingError> {
        if value.is_empty()
            || !value
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'-')
        {
            return Err(RoutingError::InvalidCursor(value.to_string()));
        }
        Ok(Self(value.to_string()))
    }

    /// Build a cursor from a post element id such as `entry-hello-world`.
    pub fn from_element_id(id: &str) -> Result<Self, RoutingError> {
        let stripped = id
            .strip_prefix("entry-")
            .or_else(|| id.strip_prefix("page-"))
            .unwrap_or(id);
        Self::parse(stripped)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
