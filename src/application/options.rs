//! Configuration resolver: reads, seeds and updates the plugin options.

use std::collections::BTreeMap;
use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};

use crate::application::repos::{OptionsRepo, RepoError};
use crate::domain::options::{
    OptionKey, PagelessConfig, ValidationError, validate_batch_size, validate_required,
};

#[derive(Debug, Error)]
pub enum OptionsError {
    #[error("options form has {} invalid field(s)", .0.len())]
    Invalid(FieldErrors),
    #[error(transparent)]
    Repo(#[from] RepoError),
}

/// Per-field validation messages keyed by form field name.
pub type FieldErrors = BTreeMap<&'static str, ValidationError>;

/// Raw values submitted through the administrative form.
#[derive(Debug, Clone, Default)]
pub struct UpdateOptionsCommand {
    pub num_item: String,
    pub post_class: String,
    pub pager_id: String,
}

impl UpdateOptionsCommand {
    /// Validate every field; the result is either a full config or every error found.
    pub fn validate(&self) -> Result<PagelessConfig, FieldErrors> {
        let mut errors = FieldErrors::new();

        let batch_size = match validate_required(&self.num_item)
            .and_then(|_| validate_batch_size(&self.num_item))
        {
            Ok(value) => Some(value),
            Err(err) => {
                errors.insert(OptionKey::NumItem.as_str(), err);
                None
            }
        };
        let post_class = match validate_required(&self.post_class) {
            Ok(value) => Some(value.to_string()),
            Err(err) => {
                errors.insert(OptionKey::PostClass.as_str(), err);
                None
            }
        };
        let pager_id = match validate_required(&self.pager_id) {
            Ok(value) => Some(value.to_string()),
            Err(err) => {
                errors.insert(OptionKey::PagerId.as_str(), err);
                None
            }
        };

        match (batch_size, post_class, pager_id) {
            (Some(batch_size), Some(post_class), Some(pager_id)) if errors.is_empty() => {
                Ok(PagelessConfig {
                    batch_size,
                    post_class,
                    pager_id,
                })
            }
            _ => Err(errors),
        }
    }
}

#[derive(Clone)]
pub struct OptionsService {
    repo: Arc<dyn OptionsRepo>,
    namespace: String,
}

impl OptionsService {
    pub fn new(repo: Arc<dyn OptionsRepo>, namespace: impl Into<String>) -> Self {
        Self {
            repo,
            namespace: namespace.into(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Read the three options, substituting defaults for anything unset.
    pub async fn resolve_config(&self) -> Result<PagelessConfig, RepoError> {
        let defaults = PagelessConfig::default();

        let batch_size = match self.read(OptionKey::NumItem).await? {
            Some(raw) => match validate_batch_size(raw.trim()) {
                Ok(value) => value,
                Err(err) => {
                    warn!(
                        target = "pageless::options",
                        key = %OptionKey::NumItem.storage_key(&self.namespace),
                        value = %raw,
                        error = %err,
                        "stored batch size is invalid; using default"
                    );
                    defaults.batch_size
                }
            },
            None => defaults.batch_size,
        };

        let post_class = self
            .read(OptionKey::PostClass)
            .await?
            .filter(|value| !value.trim().is_empty())
            .unwrap_or(defaults.post_class);
        let pager_id = self
            .read(OptionKey::PagerId)
            .await?
            .filter(|value| !value.trim().is_empty())
            .unwrap_or(defaults.pager_id);

        Ok(PagelessConfig {
            batch_size,
            post_class,
            pager_id,
        })
    }

    /// Persist defaults for unset options. Existing values are left untouched.
    ///
    /// Returns the keys that were seeded.
    pub async fn activate(&self) -> Result<Vec<OptionKey>, RepoError> {
        let mut seeded = Vec::new();
        for key in OptionKey::ALL {
            if self.read(key).await?.is_none() {
                seeded.push(key);
            }
        }

        let entries: Vec<_> = seeded
            .iter()
            .map(|key| (key.storage_key(&self.namespace), key.default_value()))
            .collect();
        if !entries.is_empty() {
            self.repo.set_options(&entries).await?;
        }

        if !seeded.is_empty() {
            info!(
                target = "pageless::options",
                namespace = %self.namespace,
                seeded = ?seeded.iter().map(OptionKey::as_str).collect::<Vec<_>>(),
                "seeded default options"
            );
        }
        Ok(seeded)
    }

    /// Validate and store a form submission. Nothing is written unless every field is valid.
    pub async fn update(
        &self,
        command: &UpdateOptionsCommand,
    ) -> Result<PagelessConfig, OptionsError> {
        let config = command.validate().map_err(OptionsError::Invalid)?;

        let entries = [
            (OptionKey::NumItem, config.batch_size.to_string()),
            (OptionKey::PostClass, config.post_class.clone()),
            (OptionKey::PagerId, config.pager_id.clone()),
        ]
        .map(|(key, value)| (key.storage_key(&self.namespace), value));
        self.repo.set_options(&entries).await?;

        info!(
            target = "pageless::options",
            batch_size = config.batch_size,
            post_class = %config.post_class,
            pager_id = %config.pager_id,
            "options saved"
        );
        Ok(config)
    }

    async fn read(&self, key: OptionKey) -> Result<Option<String>, RepoError> {
        self.repo
            .get_option(&key.storage_key(&self.namespace))
            .await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::infra::memory::InMemoryOptions;

    fn service() -> (Arc<InMemoryOptions>, OptionsService) {
        let store = Arc::new(InMemoryOptions::default());
        let service = OptionsService::new(store.clone(), "pageless");
        (store, service)
    }

    #[tokio::test]
    async fn unset_options_resolve_to_defaults() {
        let (_, service) = service();
        let config = service.resolve_config().await.expect("resolve");
        assert_eq!(config, PagelessConfig::default());
    }

    #[tokio::test]
    async fn activation_is_idempotent_and_keeps_custom_values() {
        let (store, service) = service();

        let seeded = service.activate().await.expect("first activation");
        assert_eq!(seeded.len(), 3);

        store
            .set_option("pageless__num_item", "10")
            .await
            .expect("customise");
        store
            .set_option("pageless__post_class", "post")
            .await
            .expect("customise");

        let seeded = service.activate().await.expect("second activation");
        assert!(seeded.is_empty());

        let config = service.resolve_config().await.expect("resolve");
        assert_eq!(config.batch_size, 10);
        assert_eq!(config.post_class, "post");
        assert_eq!(config.pager_id, "page-selector");
    }

    #[tokio::test]
    async fn corrupt_batch_size_falls_back_to_default() {
        let (store, service) = service();
        store
            .set_option("pageless__num_item", "many")
            .await
            .expect("store");
        let config = service.resolve_config().await.expect("resolve");
        assert_eq!(config.batch_size, 3);
    }

    #[tokio::test]
    async fn invalid_update_saves_nothing() {
        let (store, service) = service();
        service.activate().await.expect("activate");

        let command = UpdateOptionsCommand {
            num_item: "3.5".into(),
            post_class: "post".into(),
            pager_id: String::new(),
        };
        let err = service.update(&command).await.expect_err("invalid form");
        match err {
            OptionsError::Invalid(errors) => {
                assert_eq!(
                    errors.get("num_item"),
                    Some(&ValidationError::NotUnsignedInteger)
                );
                assert_eq!(errors.get("pager_id"), Some(&ValidationError::Required));
                assert!(!errors.contains_key("post_class"));
            }
            other => panic!("unexpected error: {other}"),
        }

        let stored = store
            .get_option("pageless__post_class")
            .await
            .expect("read");
        assert_eq!(stored.as_deref(), Some("hentry"));
    }

    #[tokio::test]
    async fn valid_update_is_persisted_trimmed() {
        let (_, service) = service();
        let command = UpdateOptionsCommand {
            num_item: "5".into(),
            post_class: " post ".into(),
            pager_id: "pager".into(),
        };
        let saved = service.update(&command).await.expect("update");
        assert_eq!(saved.batch_size, 5);
        assert_eq!(service.resolve_config().await.expect("resolve"), saved);
    }

    #[tokio::test]
    async fn padded_batch_size_is_rejected() {
        let (store, service) = service();
        service.activate().await.expect("activate");

        for (input, expected) in [
            (" 5 ", ValidationError::NotUnsignedInteger),
            ("5\n", ValidationError::NotUnsignedInteger),
            ("   ", ValidationError::Required),
        ] {
            let command = UpdateOptionsCommand {
                num_item: input.into(),
                post_class: "post".into(),
                pager_id: "pager".into(),
            };
            match service.update(&command).await {
                Err(OptionsError::Invalid(errors)) => {
                    assert_eq!(errors.get("num_item"), Some(&expected), "{input:?}");
                }
                other => panic!("{input:?} should be rejected, got {other:?}"),
            }
        }

        let stored = store.get_option("pageless__num_item").await.expect("read");
        assert_eq!(stored.as_deref(), Some("3"));
    }

    /// Counts batch writes and fails every one after the first `allowed`.
    struct FlakyStore {
        inner: InMemoryOptions,
        allowed: usize,
        batches: Mutex<Vec<usize>>,
    }

    #[async_trait]
    impl OptionsRepo for FlakyStore {
        async fn get_option(&self, key: &str) -> Result<Option<String>, RepoError> {
            self.inner.get_option(key).await
        }

        async fn set_option(&self, key: &str, value: &str) -> Result<(), RepoError> {
            self.set_options(&[(key.to_string(), value.to_string())]).await
        }

        async fn set_options(&self, entries: &[(String, String)]) -> Result<(), RepoError> {
            {
                let mut batches = self.batches.lock().expect("batches lock");
                if batches.len() >= self.allowed {
                    return Err(RepoError::from_persistence("disk full"));
                }
                batches.push(entries.len());
            }
            self.inner.set_options(entries).await
        }
    }

    #[tokio::test]
    async fn update_writes_all_fields_in_one_batch() {
        let store = Arc::new(FlakyStore {
            inner: InMemoryOptions::default(),
            allowed: 1,
            batches: Mutex::new(Vec::new()),
        });
        let service = OptionsService::new(store.clone(), "pageless");
        let command = UpdateOptionsCommand {
            num_item: "7".into(),
            post_class: "post".into(),
            pager_id: "pager".into(),
        };

        service.update(&command).await.expect("first update");
        assert_eq!(*store.batches.lock().expect("batches lock"), [3]);

        let retry = UpdateOptionsCommand {
            num_item: "9".into(),
            post_class: "entry".into(),
            pager_id: "nav".into(),
        };
        let err = service.update(&retry).await.expect_err("store refuses");
        assert!(matches!(err, OptionsError::Repo(_)));

        let config = service.resolve_config().await.expect("resolve");
        assert_eq!(config.batch_size, 7);
        assert_eq!(config.post_class, "post");
        assert_eq!(config.pager_id, "pager");
    }
}
