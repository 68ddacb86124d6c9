// src/fetch/mod.rs
//! Archive store: a local directory mirroring the yearly zip archives listed
//! on the remote index page.

pub mod urls;
pub mod zips;

use reqwest::Client;
use std::{
    collections::HashSet,
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};
use tokio::sync::Semaphore;
use tracing::{debug, error, info, instrument, warn};
use url::Url;

use crate::config::Config;
use crate::error::{Error, Result};
pub use zips::Download;

/// Outcome of [`ArchiveStore::ensure_available`].
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct EnsureReport {
    /// Archives downloaded by this call.
    pub fetched: Vec<String>,
    /// Archives that were already on disk.
    pub skipped: Vec<String>,
}

pub struct ArchiveStore {
    dir: PathBuf,
    index_url: Url,
    client: Client,
    max_concurrent: usize,
}

impl ArchiveStore {
    /// Build a store from `config`, with a browser-like user agent and the
    /// configured request timeout.
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| Error::Config {
                message: format!("building HTTP client: {}", e),
            })?;
        let index_url = Url::parse(&config.index_url).map_err(|e| Error::Url {
            url: config.index_url.clone(),
            source: e,
        })?;
        Ok(Self::with_client(
            &config.data_dir,
            index_url,
            client,
            config.max_concurrent_downloads,
        ))
    }

    pub fn with_client(
        dir: impl Into<PathBuf>,
        index_url: Url,
        client: Client,
        max_concurrent: usize,
    ) -> Self {
        Self {
            dir: dir.into(),
            index_url,
            client,
            max_concurrent: max_concurrent.max(1),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Create the store directory; an existing directory is fine.
    pub fn create_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        Ok(())
    }

    /// Make sure every archive linked from the index exists locally.
    ///
    /// Archives already present are skipped without any freshness check.
    /// Missing ones are downloaded concurrently; a failed download does not
    /// stop the others, and the first failure is returned once all are done.
    #[instrument(level = "info", skip(self), fields(dir = %self.dir.display()))]
    pub async fn ensure_available(&self) -> Result<EnsureReport> {
        self.create_dir()?;

        let links = urls::fetch_zip_urls(&self.client, &self.index_url).await?;
        let mut report = EnsureReport::default();
        let mut names = HashSet::new();
        let sem = Arc::new(Semaphore::new(self.max_concurrent));
        let mut handles = Vec::new();

        for url in links {
            let Some(name) = zips::archive_name(&url) else {
                warn!(url = %url, "archive link without file name");
                continue;
            };
            if !names.insert(name.clone()) {
                continue;
            }
            if self.dir.join(&name).is_file() {
                debug!(name = %name, "already downloaded");
                report.skipped.push(name);
                continue;
            }

            let client = self.client.clone();
            let dir = self.dir.clone();
            let sem = Arc::clone(&sem);
            handles.push(tokio::spawn(async move {
                let _permit = sem.acquire_owned().await.ok();
                info!(name = %name, "downloading");
                let result = zips::download_zip(&client, &url, &dir).await;
                (name, result)
            }));
        }

        let mut first_err = None;
        for handle in handles {
            let (name, result) = handle.await?;
            match result {
                Ok(Download::Fetched(path)) => {
                    info!(name = %name, path = %path.display(), "downloaded");
                    report.fetched.push(name);
                }
                Ok(Download::AlreadyPresent(_)) => {
                    debug!(name = %name, "written concurrently by another process");
                    report.skipped.push(name);
                }
                Err(e) => {
                    error!(name = %name, "download failed: {}", e);
                    first_err.get_or_insert(e);
                }
            }
        }

        match first_err {
            Some(e) => Err(e),
            None => Ok(report),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{zip_bytes, TestServer};
    use anyhow::Result;
    use std::time::Duration;
    use tempfile::{tempdir, NamedTempFile};
    use tokio::net::TcpListener;

    fn store_for(server: &TestServer, dir: &Path) -> ArchiveStore {
        let config = Config {
            index_url: server.url("/izv/"),
            data_dir: dir.to_path_buf(),
            request_timeout_secs: 5,
            ..Config::default()
        };
        ArchiveStore::new(&config).unwrap()
    }

    fn index_page() -> Vec<u8> {
        br#"<html><body>
            <a href="data/datagis2016.zip">ZIP</a>
            <a href="data/datagis-01-2020.zip">ZIP</a>
            <a href="data/missing.zip">ZIP</a>
        </body></html>"#
            .to_vec()
    }

    #[tokio::test]
    async fn second_call_fetches_nothing() -> Result<()> {
        let archive = zip_bytes(&[("07.csv", b"")])?;
        let server = TestServer::start(vec![
            ("/izv/".to_string(), index_page()),
            ("/izv/data/datagis2016.zip".to_string(), archive.clone()),
            ("/izv/data/datagis-01-2020.zip".to_string(), archive.clone()),
            ("/izv/data/missing.zip".to_string(), archive),
        ])
        .await?;
        let dir = tempdir()?;
        let store = store_for(&server, &dir.path().join("data"));

        let first = store.ensure_available().await?;
        assert_eq!(first.fetched.len(), 3);
        assert!(first.skipped.is_empty());
        let after_first = server.archive_requests();

        let second = store.ensure_available().await?;
        assert!(second.fetched.is_empty());
        assert_eq!(second.skipped.len(), 3);
        assert_eq!(server.archive_requests(), after_first);
        Ok(())
    }

    #[tokio::test]
    async fn failed_download_leaves_no_partial_file() -> Result<()> {
        let archive = zip_bytes(&[("07.csv", b"")])?;
        // `missing.zip` is not served, so its fetch fails with 404
        let server = TestServer::start(vec![
            ("/izv/".to_string(), index_page()),
            ("/izv/data/datagis2016.zip".to_string(), archive.clone()),
            ("/izv/data/datagis-01-2020.zip".to_string(), archive),
        ])
        .await?;
        let dir = tempdir()?;
        let store = store_for(&server, dir.path());

        let err = store.ensure_available().await.unwrap_err();
        assert!(matches!(err, Error::HttpStatus { .. }));
        assert!(!err.is_retryable());

        assert!(dir.path().join("datagis2016.zip").is_file());
        assert!(dir.path().join("datagis-01-2020.zip").is_file());
        assert!(!dir.path().join("missing.zip").exists());
        assert_eq!(fs::read_dir(dir.path())?.count(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn unreachable_index_is_a_fetch_error() -> Result<()> {
        let dir = tempdir()?;
        let config = Config {
            // nothing listens on the discard port
            index_url: "http://127.0.0.1:9/izv/".to_string(),
            data_dir: dir.path().to_path_buf(),
            request_timeout_secs: 2,
            ..Config::default()
        };
        let store = ArchiveStore::new(&config)?;
        let err = store.ensure_available().await.unwrap_err();
        assert!(matches!(err, Error::Fetch { .. } | Error::Timeout { .. }));
        assert_eq!(config.request_timeout(), Duration::from_secs(2));
        Ok(())
    }

    #[tokio::test]
    async fn silent_index_times_out_and_is_retryable() -> Result<()> {
        // accepts connections and never answers
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((stream, _)) = listener.accept().await {
                held.push(stream);
            }
        });

        let dir = tempdir()?;
        let config = Config {
            index_url: format!("http://{}/izv/", addr),
            data_dir: dir.path().to_path_buf(),
            request_timeout_secs: 1,
            ..Config::default()
        };
        let store = ArchiveStore::new(&config)?;
        let err = store.ensure_available().await.unwrap_err();
        assert!(matches!(err, Error::Timeout { .. }), "got {err}");
        assert!(err.is_retryable());
        Ok(())
    }

    #[tokio::test]
    async fn data_dir_that_is_a_file_is_fatal() -> Result<()> {
        let server = TestServer::start(vec![("/izv/".to_string(), index_page())]).await?;
        let file = NamedTempFile::new()?;
        let store = store_for(&server, file.path());

        let err = store.ensure_available().await.unwrap_err();
        assert!(matches!(err, Error::Io(_)), "got {err}");
        assert!(!err.is_retryable());
        assert!(server.requests().is_empty());
        Ok(())
    }
}
