use crate::error::{Error, Result};
use serde::Deserialize;
use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

/// Runtime settings for the downloader, archive store and region cache.
///
/// Every field has a default, so a YAML file only needs the keys it changes:
///
/// ```yaml
/// data_dir: /var/lib/accidents
/// request_timeout_secs: 120
/// ```
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// HTML page listing the yearly archives.
    pub index_url: String,
    /// Directory holding the zip archives and the region cache files.
    pub data_dir: PathBuf,
    /// Cache file name; `{}` is replaced by the region code.
    pub cache_file_template: String,
    pub user_agent: String,
    pub request_timeout_secs: u64,
    pub max_concurrent_downloads: usize,
    /// Where the binary exports the assembled dataset.
    pub output: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            index_url: "https://ehw.fit.vutbr.cz/izv/".to_string(),
            data_dir: PathBuf::from("data"),
            cache_file_template: "data_{}.parquet".to_string(),
            user_agent: "Mozilla 5.0".to_string(),
            request_timeout_secs: 60,
            max_concurrent_downloads: 3,
            output: PathBuf::from("accidents.parquet"),
        }
    }
}

impl Config {
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(text).map_err(|e| Error::Config {
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| Error::Config {
            message: format!("reading {}: {}", path.display(), e),
        })?;
        Self::from_yaml_str(&text)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Cache file path for a region code.
    pub fn cache_path(&self, region_code: &str) -> PathBuf {
        self.data_dir
            .join(self.cache_file_template.replace("{}", region_code))
    }

    fn validate(&self) -> Result<()> {
        if !self.cache_file_template.contains("{}") {
            return Err(Error::Config {
                message: format!(
                    "cache_file_template {:?} must contain a {{}} placeholder",
                    self.cache_file_template
                ),
            });
        }
        if self.max_concurrent_downloads == 0 {
            return Err(Error::Config {
                message: "max_concurrent_downloads must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    #[test]
    fn partial_yaml_keeps_defaults() -> Result<()> {
        let config = Config::from_yaml_str("data_dir: /tmp/accidents\nrequest_timeout_secs: 5\n")?;
        assert_eq!(config.data_dir, PathBuf::from("/tmp/accidents"));
        assert_eq!(config.request_timeout(), Duration::from_secs(5));
        assert_eq!(config.index_url, Config::default().index_url);
        assert_eq!(
            config.cache_path("MSK"),
            PathBuf::from("/tmp/accidents/data_MSK.parquet")
        );
        Ok(())
    }

    #[test]
    fn template_without_placeholder_is_rejected() {
        let err = Config::from_yaml_str("cache_file_template: cache.parquet\n").unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }
}
