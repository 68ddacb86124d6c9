use reqwest::Client;
use std::{
    io::{self, Write},
    path::{Path, PathBuf},
};
use tempfile::NamedTempFile;
use url::Url;

use crate::error::{Error, Result};

/// What happened to one archive during a download attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Download {
    Fetched(PathBuf),
    /// Another writer created the file while this one was downloading.
    AlreadyPresent(PathBuf),
}

/// Local file name of an archive URL: its last non-empty path segment.
pub fn archive_name(url: &Url) -> Option<String> {
    url.path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|name| !name.is_empty())
        .map(str::to_string)
}

/// Download the given ZIP URL and save it under `dest_dir` using the original filename.
///
/// The bytes land in a temporary file inside `dest_dir` and are moved into
/// place only once complete, so a failed fetch never leaves a truncated archive.
pub async fn download_zip(client: &Client, url: &Url, dest_dir: impl AsRef<Path>) -> Result<Download> {
    let name = archive_name(url).ok_or_else(|| Error::ArchiveName {
        file: url.to_string(),
    })?;
    let dest_path = dest_dir.as_ref().join(name);

    let resp = client
        .get(url.clone())
        .send()
        .await
        .map_err(|e| Error::from_reqwest(url.as_str(), e))?;
    if !resp.status().is_success() {
        return Err(Error::HttpStatus {
            url: url.to_string(),
            status: resp.status(),
        });
    }
    let bytes = resp
        .bytes()
        .await
        .map_err(|e| Error::from_reqwest(url.as_str(), e))?;

    tokio::task::spawn_blocking(move || persist_bytes(&bytes, &dest_path)).await?
}

fn persist_bytes(bytes: &[u8], dest_path: &Path) -> Result<Download> {
    let dir = dest_path.parent().unwrap_or_else(|| Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;

    match tmp.persist_noclobber(dest_path) {
        Ok(_) => Ok(Download::Fetched(dest_path.to_path_buf())),
        Err(e) if e.error.kind() == io::ErrorKind::AlreadyExists => {
            Ok(Download::AlreadyPresent(dest_path.to_path_buf()))
        }
        Err(e) => Err(e.error.into()),
    }
}
