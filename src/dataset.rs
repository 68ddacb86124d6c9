// src/dataset.rs
use arrow::{
    array::{new_empty_array, Array, ArrayRef, Int16Array},
    compute::concat,
    record_batch::RecordBatch,
};
use std::{path::Path, sync::Arc};
use tracing::{info, instrument};

use crate::cache::{read_entry, write_entry, RegionCache};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::process::TimeOfDay;
use crate::region::Region;
use crate::schema::{column_index, dataset_schema, header, table::TIME_COLUMN};

/// Column names plus one array per column, all the same length.
#[derive(Debug, Clone)]
pub struct Dataset {
    header: Vec<String>,
    columns: Vec<ArrayRef>,
}

impl Dataset {
    /// Dataset with every column empty.
    pub fn empty() -> Self {
        let columns = dataset_schema()
            .fields()
            .iter()
            .map(|f| new_empty_array(f.data_type()))
            .collect();
        Self {
            header: header(),
            columns,
        }
    }

    /// Concatenate region batches column by column, keeping their order.
    pub fn from_batches(batches: &[RecordBatch]) -> Result<Self> {
        if batches.is_empty() {
            return Ok(Self::empty());
        }
        let columns = (0..dataset_schema().fields().len())
            .map(|i| {
                let parts: Vec<&dyn Array> = batches.iter().map(|b| b.column(i).as_ref()).collect();
                concat(&parts)
            })
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(Self {
            header: header(),
            columns,
        })
    }

    pub fn header(&self) -> &[String] {
        &self.header
    }

    pub fn columns(&self) -> &[ArrayRef] {
        &self.columns
    }

    pub fn into_parts(self) -> (Vec<String>, Vec<ArrayRef>) {
        (self.header, self.columns)
    }

    /// Number of accidents.
    pub fn len(&self) -> usize {
        self.columns.first().map_or(0, |c| c.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn column(&self, name: &str) -> Option<&ArrayRef> {
        column_index(name).map(|i| &self.columns[i])
    }

    /// Decoded accident times, unknown parts as `-1`.
    pub fn times(&self) -> Vec<TimeOfDay> {
        self.columns[TIME_COLUMN]
            .as_any()
            .downcast_ref::<Int16Array>()
            .map(|arr| arr.values().iter().map(|&v| TimeOfDay::decode(v)).collect())
            .unwrap_or_default()
    }

    /// Hour of each accident, `None` where the source marks it unknown.
    pub fn hours(&self) -> Vec<Option<u8>> {
        self.times().iter().map(TimeOfDay::hour).collect()
    }

    pub fn to_record_batch(&self) -> Result<RecordBatch> {
        Ok(RecordBatch::try_new(dataset_schema(), self.columns.clone())?)
    }

    /// Export to a compressed Parquet file for downstream analysis.
    pub fn write_parquet(&self, path: impl AsRef<Path>) -> Result<()> {
        write_entry(path.as_ref(), &self.to_record_batch()?)
    }

    pub fn read_parquet(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_batches(&[read_entry(path.as_ref())?])
    }
}

/// Assembles datasets for lists of regions through a [`RegionCache`].
pub struct DataDownloader {
    cache: Arc<RegionCache>,
}

impl DataDownloader {
    pub fn new(config: Config) -> Result<Self> {
        Ok(Self::with_cache(Arc::new(RegionCache::new(config)?)))
    }

    pub fn with_cache(cache: Arc<RegionCache>) -> Self {
        Self { cache }
    }

    pub fn cache(&self) -> &Arc<RegionCache> {
        &self.cache
    }

    /// Dataset for `regions`, rows grouped by region in request order.
    ///
    /// Unknown codes fail before any work is done. Requesting a region twice
    /// yields its rows twice.
    #[instrument(level = "info", skip(self, regions), fields(regions = regions.len()))]
    pub async fn get_dataset<S: AsRef<str>>(&self, regions: &[S]) -> Result<Dataset> {
        let regions = Region::parse_all(regions)?;
        self.get_regions(&regions).await
    }

    /// Dataset for all fourteen regions.
    pub async fn get_all(&self) -> Result<Dataset> {
        self.get_regions(&Region::ALL).await
    }

    pub async fn get_regions(&self, regions: &[Region]) -> Result<Dataset> {
        let batches = self.cache.get_many(regions).await?;
        if batches.len() != regions.len() {
            return Err(Error::BatchCount {
                expected: regions.len(),
                got: batches.len(),
            });
        }
        let dataset = Dataset::from_batches(&batches)?;
        info!(rows = dataset.len(), "dataset assembled");
        Ok(dataset)
    }
}
