// src/schema/arrow.rs

use arrow::datatypes::{DataType, Field as ArrowField, Schema as ArrowSchema, SchemaRef};
use once_cell::sync::Lazy;
use std::{collections::HashMap, sync::Arc};

use super::table::{COLUMNS, SCHEMA_VERSION};
use super::types::{Column, ColumnType};

/// Field metadata key holding the declared width of a text column.
pub const WIDTH_KEY: &str = "width";
/// Schema metadata key holding [`SCHEMA_VERSION`].
pub const VERSION_KEY: &str = "crashscraper.schema_version";

/// Map a column type into an Arrow DataType.
///
/// - Text    → Utf8
/// - Int8/16/32 → Int8/Int16/Int32
/// - Float32 → Float32
/// - Date    → Date32
/// - Time    → Int16 (`hhmm`)
pub fn map_to_arrow_type(ty: ColumnType) -> DataType {
    match ty {
        ColumnType::Text { .. } => DataType::Utf8,
        ColumnType::Int8 => DataType::Int8,
        ColumnType::Int16 | ColumnType::Time => DataType::Int16,
        ColumnType::Int32 => DataType::Int32,
        ColumnType::Float32 => DataType::Float32,
        ColumnType::Date => DataType::Date32,
    }
}

fn to_field(col: &Column) -> ArrowField {
    let field = ArrowField::new(col.name, map_to_arrow_type(col.ty), false);
    match col.ty {
        ColumnType::Text { width } => field.with_metadata(HashMap::from([(
            WIDTH_KEY.to_string(),
            width.to_string(),
        )])),
        _ => field,
    }
}

/// Build an ArrowSchema (inside an Arc) from a slice of `Column`s.
pub fn build_arrow_schema(cols: &[Column]) -> SchemaRef {
    let fields: Vec<ArrowField> = cols.iter().map(to_field).collect();
    let metadata = HashMap::from([(VERSION_KEY.to_string(), SCHEMA_VERSION.to_string())]);
    Arc::new(ArrowSchema::new_with_metadata(fields, metadata))
}

static DATASET_SCHEMA: Lazy<SchemaRef> = Lazy::new(|| build_arrow_schema(&COLUMNS));

/// The Arrow schema every region batch and dataset uses.
pub fn dataset_schema() -> SchemaRef {
    Arc::clone(&DATASET_SCHEMA)
}
