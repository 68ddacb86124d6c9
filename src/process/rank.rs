use once_cell::sync::Lazy;
use regex::Regex;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Optional two-digit month, optional dash, four-digit year.
static ARCHIVE_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d{2})?-?(\d{4})").expect("archive date pattern should be valid"));

/// Position of an archive in the newest-first processing order.
///
/// Ordered by year, then month; an archive without a month sorts below every
/// month-tagged archive of the same year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ArchiveRank {
    pub year: u32,
    pub month: Option<u32>,
}

impl ArchiveRank {
    /// Parse the month/year token out of an archive file name.
    pub fn from_file_name(name: &str) -> Result<Self> {
        let caps = ARCHIVE_DATE.captures(name).ok_or_else(|| Error::ArchiveName {
            file: name.to_string(),
        })?;
        let bad_name = || Error::ArchiveName {
            file: name.to_string(),
        };
        let year = caps[2].parse().map_err(|_| bad_name())?;
        let month = match caps.get(1) {
            Some(m) => Some(m.as_str().parse().map_err(|_| bad_name())?),
            None => None,
        };
        Ok(Self { year, month })
    }
}

/// Sort archive paths newest first by the date token in their file names.
pub fn sort_newest_first(paths: Vec<PathBuf>) -> Result<Vec<PathBuf>> {
    let mut ranked = paths
        .into_iter()
        .map(|p| Ok((rank_of(&p)?, p)))
        .collect::<Result<Vec<_>>>()?;
    ranked.sort_by(|a, b| b.0.cmp(&a.0));
    Ok(ranked.into_iter().map(|(_, p)| p).collect())
}

fn rank_of(path: &Path) -> Result<ArchiveRank> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    ArchiveRank::from_file_name(&name)
}
