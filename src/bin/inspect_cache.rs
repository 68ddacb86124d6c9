use anyhow::{Context, Result};
use arrow::array::Array;
use crashscraper::Dataset;
use parquet::file::reader::{FileReader, SerializedFileReader};
use serde_json::json;
use std::{env, fs::File, path::Path, process::exit};

fn main() {
    // Expect exactly one CLI argument: path to a region cache file or an export.
    let args: Vec<String> = env::args().collect();
    if args.len() != 2 {
        eprintln!("Usage: {} <CACHE_FILE>", args[0]);
        exit(1);
    }
    if let Err(e) = inspect(Path::new(&args[1])) {
        eprintln!("Error: {:#}", e);
        exit(1);
    }
}

/// Print file-level Parquet metadata plus a per-column summary as JSON.
fn inspect(path: &Path) -> Result<()> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let reader = SerializedFileReader::new(file)?;
    let meta = reader.metadata();
    let file_meta = meta.file_metadata();

    let dataset = Dataset::read_parquet(path)?;
    let columns: Vec<_> = dataset
        .header()
        .iter()
        .zip(dataset.columns())
        .map(|(name, col)| {
            json!({
                "name": name,
                "type": col.data_type().to_string(),
                "nulls": col.null_count(),
            })
        })
        .collect();
    let known_hours = dataset.hours().iter().filter(|h| h.is_some()).count();

    let summary = json!({
        "file": path.display().to_string(),
        "size_bytes": std::fs::metadata(path)?.len(),
        "created_by": file_meta.created_by(),
        "row_groups": meta.num_row_groups(),
        "rows": dataset.len(),
        "rows_with_known_hour": known_hours,
        "columns": columns,
    });
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
