// src/process/mod.rs
//! Turning archived region files into typed columns: extraction in archive
//! precedence order, deduplication by accident identifier, column typing.

pub mod convert;
pub mod date_parser;
pub mod dedup;
pub mod extract;
pub mod rank;
pub mod time;
pub mod utils;

use arrow::record_batch::RecordBatch;
use std::path::Path;
use tracing::{info, instrument};

use crate::error::Result;
use crate::region::Region;

pub use convert::type_columns;
pub use dedup::{dedup_newest_first, Deduplicator};
pub use extract::{extract_raw_records, RawRecord};
pub use rank::ArchiveRank;
pub use time::TimeOfDay;

/// Extract, deduplicate and type one region from the archives in `dir`.
#[instrument(level = "info", skip(dir), fields(dir = %dir.display()))]
pub fn parse_region(dir: &Path, region: Region) -> Result<RecordBatch> {
    let records = dedup_newest_first(extract_raw_records(dir, region)?)?;
    info!(region = %region, accidents = records.len(), "deduplicated");
    type_columns(region, &records)
}
