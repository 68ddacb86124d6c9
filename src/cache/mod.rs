// src/cache/mod.rs
//! Region cache: typed columns of one region persisted as a compressed
//! Parquet file next to the archives, plus an in-memory copy for the life of
//! the cache object.
//!
//! A cache file, once written, is used until someone deletes it; archives are
//! never consulted again for that region.

use arrow::{compute::concat_batches, record_batch::RecordBatch};
use parquet::{
    arrow::{arrow_reader::ParquetRecordBatchReaderBuilder, ArrowWriter},
    basic::{BrotliLevel, Compression},
    file::{metadata::KeyValue, properties::WriterProperties},
};
use rayon::prelude::*;
use std::{
    collections::HashMap,
    fs::File,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
    sync::{Arc, Mutex, PoisonError},
};
use tempfile::NamedTempFile;
use tokio::sync::OnceCell;
use tracing::{debug, info, instrument};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::fetch::ArchiveStore;
use crate::process;
use crate::region::Region;
use crate::schema::{arrow::VERSION_KEY, dataset_schema, table::SCHEMA_VERSION, COLUMN_COUNT};

pub struct RegionCache {
    config: Config,
    store: ArchiveStore,
    memory: Mutex<HashMap<Region, RecordBatch>>,
    archives_ready: OnceCell<()>,
}

impl RegionCache {
    pub fn new(config: Config) -> Result<Self> {
        let store = ArchiveStore::new(&config)?;
        Ok(Self::with_store(config, store))
    }

    pub fn with_store(config: Config, store: ArchiveStore) -> Self {
        Self {
            config,
            store,
            memory: Mutex::new(HashMap::new()),
            archives_ready: OnceCell::new(),
        }
    }

    pub fn store(&self) -> &ArchiveStore {
        &self.store
    }

    pub fn cache_path(&self, region: Region) -> PathBuf {
        self.config.cache_path(region.code())
    }

    /// Cached columns for `region`, from memory or disk, without touching
    /// the archives. A corrupt cache file is an error, not a miss.
    pub fn load(&self, region: Region) -> Result<Option<RecordBatch>> {
        if let Some(batch) = self.remembered(region) {
            return Ok(Some(batch));
        }
        let path = self.cache_path(region);
        if !path.is_file() {
            return Ok(None);
        }
        let batch = read_entry(&path)?;
        debug!(region = %region, rows = batch.num_rows(), "cache hit on disk");
        self.remember(region, batch.clone());
        Ok(Some(batch))
    }

    /// Typed columns for one region, parsing and persisting them on a miss.
    pub async fn get(self: &Arc<Self>, region: Region) -> Result<RecordBatch> {
        let mut batches = self.get_many(&[region]).await?;
        Ok(batches.remove(0))
    }

    /// Typed columns for each region, in the order given.
    ///
    /// Misses make sure the archives are present (once per cache object) and
    /// are then parsed in parallel, each persisting its own cache file.
    #[instrument(level = "info", skip(self))]
    pub async fn get_many(self: &Arc<Self>, regions: &[Region]) -> Result<Vec<RecordBatch>> {
        let mut found: HashMap<Region, RecordBatch> = HashMap::new();
        let mut misses = Vec::new();
        for &region in regions {
            if found.contains_key(&region) || misses.contains(&region) {
                continue;
            }
            match self.load(region)? {
                Some(batch) => {
                    found.insert(region, batch);
                }
                None => misses.push(region),
            }
        }

        if !misses.is_empty() {
            self.ensure_archives().await?;
            let this = Arc::clone(self);
            let to_parse = misses.clone();
            let parsed = tokio::task::spawn_blocking(move || {
                to_parse
                    .par_iter()
                    .map(|&region| this.build(region).map(|batch| (region, batch)))
                    .collect::<Result<Vec<_>>>()
            })
            .await??;
            found.extend(parsed);
        }

        Ok(regions
            .iter()
            .filter_map(|region| found.get(region).cloned())
            .collect())
    }

    async fn ensure_archives(&self) -> Result<()> {
        self.archives_ready
            .get_or_try_init(|| async {
                let report = self.store.ensure_available().await?;
                info!(
                    fetched = report.fetched.len(),
                    present = report.skipped.len(),
                    "archives ready"
                );
                Ok::<_, Error>(())
            })
            .await?;
        Ok(())
    }

    /// Parse `region` from the archives and write its cache file.
    fn build(&self, region: Region) -> Result<RecordBatch> {
        let batch = process::parse_region(self.store.dir(), region)?;
        let path = self.cache_path(region);
        write_entry(&path, &batch)?;
        info!(region = %region, rows = batch.num_rows(), path = %path.display(), "cached");
        self.remember(region, batch.clone());
        Ok(batch)
    }

    fn remembered(&self, region: Region) -> Option<RecordBatch> {
        self.memory
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&region)
            .cloned()
    }

    fn remember(&self, region: Region, batch: RecordBatch) {
        self.memory
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(region, batch);
    }
}

/// Write `batch` to `path` as Brotli-compressed Parquet, atomically.
pub fn write_entry(path: &Path, batch: &RecordBatch) -> Result<()> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(dir)?;

    let props = WriterProperties::builder()
        .set_compression(Compression::BROTLI(BrotliLevel::try_new(5)?))
        .set_dictionary_enabled(true)
        .set_key_value_metadata(Some(vec![KeyValue::new(
            VERSION_KEY.to_string(),
            SCHEMA_VERSION.to_string(),
        )]))
        .build();

    let mut tmp = NamedTempFile::new_in(dir)?;
    {
        let mut writer =
            ArrowWriter::try_new(BufWriter::new(tmp.as_file_mut()), batch.schema(), Some(props))?;
        writer.write(batch)?;
        let mut buf = writer.into_inner()?;
        buf.flush()?;
    }
    tmp.persist(path).map_err(|e| Error::Io(e.error))?;
    Ok(())
}

/// Read a file written by [`write_entry`] back into one batch with the
/// dataset schema. Any failure is reported as a corrupt cache file.
pub fn read_entry(path: &Path) -> Result<RecordBatch> {
    read_entry_inner(path).map_err(|e| Error::CacheCorrupt {
        path: path.to_path_buf(),
        source: Box::new(e),
    })
}

fn read_entry_inner(path: &Path) -> Result<RecordBatch> {
    let file = File::open(path)?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;

    let version = builder
        .metadata()
        .file_metadata()
        .key_value_metadata()
        .and_then(|kvs| kvs.iter().find(|kv| kv.key == VERSION_KEY))
        .and_then(|kv| kv.value.clone());
    if version.as_deref() != Some(SCHEMA_VERSION.to_string().as_str()) {
        return Err(Error::CacheLayout {
            message: format!(
                "schema version {:?}, expected {}",
                version, SCHEMA_VERSION
            ),
        });
    }
    if builder.schema().fields().len() != COLUMN_COUNT {
        return Err(Error::CacheLayout {
            message: format!(
                "{} columns, expected {}",
                builder.schema().fields().len(),
                COLUMN_COUNT
            ),
        });
    }

    let schema = dataset_schema();
    let batches = builder
        .build()?
        .map(|batch| {
            let batch = batch?;
            RecordBatch::try_new(Arc::clone(&schema), batch.columns().to_vec()).map_err(Error::from)
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(concat_batches(&schema, &batches)?)
}
