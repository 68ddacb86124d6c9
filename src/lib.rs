//! Download, parse and normalise the yearly traffic-accident archives into
//! one columnar dataset.
//!
//! ```no_run
//! # async fn run() -> crashscraper::Result<()> {
//! use crashscraper::{Config, DataDownloader};
//!
//! let downloader = DataDownloader::new(Config::default())?;
//! let dataset = downloader.get_dataset(&["JHM", "MSK"]).await?;
//! println!("{} accidents", dataset.len());
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod config;
pub mod dataset;
pub mod error;
pub mod fetch;
pub mod process;
pub mod region;
pub mod schema;

#[cfg(test)]
mod test_support;

pub use cache::RegionCache;
pub use config::Config;
pub use dataset::{DataDownloader, Dataset};
pub use error::{Error, Result};
pub use fetch::{ArchiveStore, EnsureReport};
pub use region::Region;
