use std::collections::HashSet;

use super::extract::RawRecord;
use crate::error::Result;

/// Keeps the first record seen for each accident identifier.
///
/// Fed newest-first, the first copy seen is the newest one.
#[derive(Debug, Default)]
pub struct Deduplicator {
    seen: HashSet<String>,
}

impl Deduplicator {
    pub fn new() -> Self {
        Self::default()
    }

    /// `true` the first time `record`'s identifier shows up.
    pub fn admit(&mut self, record: &RawRecord) -> bool {
        if self.seen.contains(record.id()) {
            return false;
        }
        self.seen.insert(record.id().to_string())
    }

    pub fn distinct(&self) -> usize {
        self.seen.len()
    }
}

/// Collect one record per identifier from a newest-first record stream.
pub fn dedup_newest_first<I>(records: I) -> Result<Vec<RawRecord>>
where
    I: IntoIterator<Item = Result<RawRecord>>,
{
    let mut dedup = Deduplicator::new();
    let mut kept = Vec::new();
    for record in records {
        let record = record?;
        if dedup.admit(&record) {
            kept.push(record);
        }
    }
    Ok(kept)
}
