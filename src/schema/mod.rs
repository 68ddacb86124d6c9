pub mod arrow;
pub mod table;
pub mod types;

pub use self::arrow::{build_arrow_schema, dataset_schema, map_to_arrow_type};
pub use table::{column_index, header, COLUMNS, COLUMN_COUNT, RAW_FIELDS};
pub use types::{Column, ColumnType, Rule};
