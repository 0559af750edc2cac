//! Plugin configuration: the three named options and their validation rules.

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_BATCH_SIZE: u32 = 3;
pub const DEFAULT_POST_CLASS: &str = "hentry";
pub const DEFAULT_PAGER_ID: &str = "page-selector";
pub const DEFAULT_NAMESPACE: &str = "pageless";

/// Resolved plugin configuration.
///
/// Field order is part of the config hash input; do not reorder.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PagelessConfig {
    pub batch_size: u32,
    pub post_class: String,
    pub pager_id: String,
}

impl Default for PagelessConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            post_class: DEFAULT_POST_CLASS.to_string(),
            pager_id: DEFAULT_PAGER_ID.to_string(),
        }
    }
}

/// Names of the persisted options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OptionKey {
    NumItem,
    PostClass,
    PagerId,
}

impl OptionKey {
    pub const ALL: [OptionKey; 3] = [OptionKey::NumItem, OptionKey::PostClass, OptionKey::PagerId];

    pub fn as_str(&self) -> &'static str {
        match self {
            OptionKey::NumItem => "num_item",
            OptionKey::PostClass => "post_class",
            OptionKey::PagerId => "pager_id",
        }
    }

    /// Key under which the option lives in the host's key-value store.
    pub fn storage_key(&self, namespace: &str) -> String {
        format!("{namespace}__{}", self.as_str())
    }

    pub fn default_value(&self) -> String {
        match self {
            OptionKey::NumItem => DEFAULT_BATCH_SIZE.to_string(),
            OptionKey::PostClass => DEFAULT_POST_CLASS.to_string(),
            OptionKey::PagerId => DEFAULT_PAGER_ID.to_string(),
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("This field must be positive integer.")]
    NotUnsignedInteger,
    #[error("This field must be positive integer.")]
    OutOfRange,
    #[error("A value for this field is required.")]
    Required,
}

/// Parse a batch size typed by an administrator.
///
/// Only a non-empty run of ASCII digits is accepted: signs, decimal points and
/// surrounding whitespace are rejected.
pub fn validate_batch_size(input: &str) -> Result<u32, ValidationError> {
    if input.is_empty() || !input.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ValidationError::NotUnsignedInteger);
    }
    input.parse::<u32>().map_err(|_| ValidationError::OutOfRange)
}

pub fn validate_required(input: &str) -> Result<&str, ValidationError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Required);
    }
    Ok(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batch_size_accepts_plain_digits() {
        assert_eq!(validate_batch_size("3"), Ok(3));
        assert_eq!(validate_batch_size("0"), Ok(0));
        assert_eq!(validate_batch_size("0012"), Ok(12));
    }

    #[test]
    fn batch_size_rejects_signs_fractions_and_words() {
        assert_eq!(
            validate_batch_size("-1"),
            Err(ValidationError::NotUnsignedInteger)
        );
        assert_eq!(
            validate_batch_size("3.5"),
            Err(ValidationError::NotUnsignedInteger)
        );
        assert_eq!(
            validate_batch_size("abc"),
            Err(ValidationError::NotUnsignedInteger)
        );
        assert_eq!(
            validate_batch_size(""),
            Err(ValidationError::NotUnsignedInteger)
        );
        assert_eq!(
            validate_batch_size("+4"),
            Err(ValidationError::NotUnsignedInteger)
        );
        assert_eq!(
            validate_batch_size(" 3"),
            Err(ValidationError::NotUnsignedInteger)
        );
    }

    #[test]
    fn batch_size_rejects_values_beyond_u32() {
        assert_eq!(
            validate_batch_size("99999999999"),
            Err(ValidationError::OutOfRange)
        );
    }

    #[test]
    fn required_trims_and_rejects_blank() {
        assert_eq!(validate_required("  hentry "), Ok("hentry"));
        assert_eq!(validate_required("   "), Err(ValidationError::Required));
    }

    #[test]
    fn storage_keys_are_namespaced() {
        assert_eq!(
            OptionKey::NumItem.storage_key(DEFAULT_NAMESPACE),
            "pageless__num_item"
        );
        assert_eq!(OptionKey::PagerId.storage_key("blog"), "blog__pager_id");
    }
}
