//! Option storage persisted as a flat TOML table of strings.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

use crate::application::repos::{OptionsRepo, RepoError};

pub struct TomlOptionsFile {
    path: PathBuf,
    values: Mutex<BTreeMap<String, String>>,
}

impl TomlOptionsFile {
    /// Open the file, treating a missing file as an empty store.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, RepoError> {
        let path = path.into();
        let values = match tokio::fs::read_to_string(&path).await {
            Ok(source) => toml::from_str::<BTreeMap<String, String>>(&source).map_err(|err| {
                RepoError::invalid_data(format!("{}: {err}", path.display()))
            })?,
            Err(err) if err.kind() == ErrorKind::NotFound => BTreeMap::new(),
            Err(err) => {
                return Err(RepoError::from_persistence(format!(
                    "{}: {err}",
                    path.display()
                )));
            }
        };

        Ok(Self {
            path,
            values: Mutex::new(values),
        })
    }

    async fn persist(&self, values: &BTreeMap<String, String>) -> Result<(), RepoError> {
        let rendered = toml::to_string(values).map_err(RepoError::from_persistence)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(RepoError::from_persistence)?;
        }

        // Write beside the target and rename so readers never see a partial file.
        let staging = self.path.with_extension("toml.tmp");
        tokio::fs::write(&staging, rendered)
            .await
            .map_err(RepoError::from_persistence)?;
        tokio::fs::rename(&staging, &self.path)
            .await
            .map_err(RepoError::from_persistence)?;

        debug!(
            target = "pageless::options_file",
            path = %self.path.display(),
            entries = values.len(),
            "options file written"
        );
        Ok(())
    }
}

#[async_trait]
impl OptionsRepo for TomlOptionsFile {
    async fn get_option(&self, key: &str) -> Result<Option<String>, RepoError> {
        Ok(self.values.lock().await.get(key).cloned())
    }

    async fn set_option(&self, key: &str, value: &str) -> Result<(), RepoError> {
        self.set_options(&[(key.to_string(), value.to_string())])
            .await
    }

    async fn set_options(&self, entries: &[(String, String)]) -> Result<(), RepoError> {
        let mut values = self.values.lock().await;
        let mut staged = values.clone();
        for (key, value) in entries {
            staged.insert(key.clone(), value.clone());
        }

        // The file is rewritten once; memory only changes after it succeeds.
        self.persist(&staged).await?;
        *values = staged;
        Ok(())
    }
}
