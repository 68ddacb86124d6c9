// src/process/extract.rs
use encoding_rs::WINDOWS_1250;
use glob::{glob, Pattern};
use std::{
    fs::File,
    io::Read,
    path::{Path, PathBuf},
    vec,
};
use tracing::{debug, instrument, warn};
use zip::{result::ZipError, ZipArchive};

use super::rank::sort_newest_first;
use super::utils::strip_quotes;
use crate::error::{Error, Result};
use crate::region::Region;
use crate::schema::RAW_FIELDS;

/// Upper bound on the buffer reserved up front for a region file; the size in
/// the zip header is only a hint from the archive itself.
const MAX_PREALLOC: u64 = 64 * 1024 * 1024;

/// One source line: the region it came from plus exactly [`RAW_FIELDS`] text fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord {
    pub region: Region,
    pub fields: Vec<String>,
}

impl RawRecord {
    /// Split a `;`-delimited line. Fields past the 64th (a known trailing
    /// artifact) are dropped; short lines are padded with empty fields.
    pub fn from_line(region: Region, line: &str) -> Self {
        let mut fields: Vec<String> = line
            .split(';')
            .take(RAW_FIELDS)
            .map(str::to_string)
            .collect();
        if fields.len() < RAW_FIELDS {
            debug!(region = %region, found = fields.len(), "short record padded");
            fields.resize(RAW_FIELDS, String::new());
        }
        Self { region, fields }
    }

    /// Accident identifier, without quotes.
    pub fn id(&self) -> &str {
        strip_quotes(&self.fields[0])
    }

    /// Value of dataset column `column`; column 0 is the region code.
    pub fn value(&self, column: usize) -> &str {
        match column {
            0 => self.region.code(),
            c => &self.fields[c - 1],
        }
    }
}

/// Every `*.zip` archive in `dir`, newest first.
pub fn list_archives(dir: &Path) -> Result<Vec<PathBuf>> {
    let pattern = format!("{}/*.zip", Pattern::escape(&dir.to_string_lossy()));
    let mut paths = Vec::new();
    for entry in glob(&pattern).map_err(|source| Error::ArchivePattern {
        pattern: pattern.clone(),
        source,
    })? {
        let path = entry.map_err(|e| Error::Io(e.into_error()))?;
        if path.is_file() {
            paths.push(path);
        }
    }
    sort_newest_first(paths)
}

/// Decoded text of `region`'s file inside `archive`, or `None` when the
/// archive has no file for that region.
#[instrument(level = "debug", skip(archive), fields(archive = %archive.display()))]
pub fn read_region_text(archive: &Path, region: Region) -> Result<Option<String>> {
    let zip_err = |source| Error::Zip {
        archive: archive.to_path_buf(),
        source,
    };
    let file = File::open(archive)?;
    let mut zip = ZipArchive::new(file).map_err(zip_err)?;
    let mut entry = match zip.by_name(region.file_name()) {
        Ok(entry) => entry,
        Err(ZipError::FileNotFound) => return Ok(None),
        Err(e) => return Err(zip_err(e)),
    };

    let mut buf = Vec::with_capacity(initial_capacity(entry.size()));
    entry.read_to_end(&mut buf)?;
    let (text, had_errors) = WINDOWS_1250.decode_without_bom_handling(&buf);
    if had_errors {
        warn!(region = %region, "undecodable bytes replaced");
    }
    Ok(Some(text.into_owned()))
}

fn initial_capacity(declared: u64) -> usize {
    usize::try_from(declared.min(MAX_PREALLOC)).unwrap_or(0)
}

/// Lazily yields a region's records across archives, newest archive first.
/// Each archive is opened and decoded only when the previous one is exhausted.
pub struct RawRecords {
    region: Region,
    archives: vec::IntoIter<PathBuf>,
    current: vec::IntoIter<RawRecord>,
}

impl RawRecords {
    fn load_next_archive(&mut self) -> Option<Result<()>> {
        let archive = self.archives.next()?;
        match read_region_text(&archive, self.region) {
            Ok(Some(text)) => {
                let records: Vec<RawRecord> = text
                    .lines()
                    .filter(|line| !line.trim().is_empty())
                    .map(|line| RawRecord::from_line(self.region, line))
                    .collect();
                debug!(
                    region = %self.region,
                    archive = %archive.display(),
                    records = records.len(),
                    "archive read"
                );
                self.current = records.into_iter();
                Some(Ok(()))
            }
            Ok(None) => {
                warn!(
                    region = %self.region,
                    archive = %archive.display(),
                    file = self.region.file_name(),
                    "archive has no file for region, skipped"
                );
                self.current = Vec::new().into_iter();
                Some(Ok(()))
            }
            Err(e) => Some(Err(e)),
        }
    }
}

impl Iterator for RawRecords {
    type Item = Result<RawRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(record) = self.current.next() {
                return Some(Ok(record));
            }
            if let Err(e) = self.load_next_archive()? {
                return Some(Err(e));
            }
        }
    }
}

/// Records of `region` from every archive in `dir`, newest archive first.
///
/// Fails up front when an archive name carries no year token.
pub fn extract_raw_records(dir: &Path, region: Region) -> Result<RawRecords> {
    let archives = list_archives(dir)?;
    debug!(region = %region, archives = archives.len(), "extracting");
    Ok(RawRecords {
        region,
        archives: archives.into_iter(),
        current: Vec::new().into_iter(),
    })
}
