// src/process/convert.rs
use arrow::{
    array::{
        ArrayRef, Date32Builder, Float32Builder, Int16Builder, Int32Builder, Int8Builder,
        StringBuilder,
    },
    record_batch::RecordBatch,
};
use std::sync::Arc;
use tracing::{debug, instrument};

use super::date_parser::{days_since_epoch, parse_date};
use super::extract::RawRecord;
use super::utils::{clean_str, parse_comma_float, strip_quotes, truncate_chars};
use crate::error::{Error, Result};
use crate::region::Region;
use crate::schema::{dataset_schema, Column, ColumnType, Rule, COLUMNS};

/// Value used for an empty integer field.
pub const MISSING_INT: i64 = -1;

/// A cleaned field, ready to be appended to its column.
#[derive(Debug, Clone, PartialEq)]
enum Cell<'a> {
    Text(&'a str),
    Int(i64),
    Float(f32),
    Date(i32),
}

/// Apply a column's cleaning rule to one raw field.
fn clean_cell(rule: Rule, raw: &str) -> std::result::Result<Cell<'_>, String> {
    match rule {
        Rule::Region | Rule::Verbatim => Ok(Cell::Text(raw)),
        Rule::StripQuotes => Ok(Cell::Text(strip_quotes(raw))),
        Rule::DefaultInt | Rule::Time => {
            let s = clean_str(raw);
            if s.is_empty() {
                Ok(Cell::Int(MISSING_INT))
            } else {
                s.parse().map(Cell::Int).map_err(|e| e.to_string())
            }
        }
        Rule::DefaultFloat => {
            let s = clean_str(raw);
            if s.is_empty() {
                Ok(Cell::Float(f32::NAN))
            } else {
                parse_comma_float(s).map(Cell::Float).map_err(|e| e.to_string())
            }
        }
        Rule::Date => parse_date(raw)
            .map(|d| Cell::Date(days_since_epoch(d)))
            .ok_or_else(|| "not a date".to_string()),
    }
}

/// Per-column Arrow builder, chosen from the column's declared type.
enum ColumnBuilder {
    Text { width: usize, b: StringBuilder },
    Int8(Int8Builder),
    Int16(Int16Builder),
    Int32(Int32Builder),
    Float32(Float32Builder),
    Date(Date32Builder),
}

impl ColumnBuilder {
    fn new(ty: ColumnType, rows: usize) -> Self {
        match ty {
            ColumnType::Text { width } => ColumnBuilder::Text {
                width,
                b: StringBuilder::with_capacity(rows, rows * width),
            },
            ColumnType::Int8 => ColumnBuilder::Int8(Int8Builder::with_capacity(rows)),
            ColumnType::Int16 | ColumnType::Time => {
                ColumnBuilder::Int16(Int16Builder::with_capacity(rows))
            }
            ColumnType::Int32 => ColumnBuilder::Int32(Int32Builder::with_capacity(rows)),
            ColumnType::Float32 => ColumnBuilder::Float32(Float32Builder::with_capacity(rows)),
            ColumnType::Date => ColumnBuilder::Date(Date32Builder::with_capacity(rows)),
        }
    }

    /// Append `cell`, rejecting integers the column width cannot hold.
    fn append(&mut self, cell: Cell<'_>) -> std::result::Result<(), String> {
        match (self, cell) {
            (ColumnBuilder::Text { width, b }, Cell::Text(s)) => {
                b.append_value(truncate_chars(s, *width))
            }
            (ColumnBuilder::Int8(b), Cell::Int(v)) => b.append_value(narrow(v, "Int8")?),
            (ColumnBuilder::Int16(b), Cell::Int(v)) => b.append_value(narrow(v, "Int16")?),
            (ColumnBuilder::Int32(b), Cell::Int(v)) => b.append_value(narrow(v, "Int32")?),
            (ColumnBuilder::Float32(b), Cell::Float(v)) => b.append_value(v),
            (ColumnBuilder::Date(b), Cell::Date(v)) => b.append_value(v),
            (_, cell) => return Err(format!("{:?} does not fit the column type", cell)),
        }
        Ok(())
    }

    fn finish(self) -> ArrayRef {
        match self {
            ColumnBuilder::Text { mut b, .. } => Arc::new(b.finish()),
            ColumnBuilder::Int8(mut b) => Arc::new(b.finish()),
            ColumnBuilder::Int16(mut b) => Arc::new(b.finish()),
            ColumnBuilder::Int32(mut b) => Arc::new(b.finish()),
            ColumnBuilder::Float32(mut b) => Arc::new(b.finish()),
            ColumnBuilder::Date(mut b) => Arc::new(b.finish()),
        }
    }
}

fn narrow<T: TryFrom<i64>>(v: i64, type_name: &str) -> std::result::Result<T, String> {
    T::try_from(v).map_err(|_| format!("{} is out of range for {}", v, type_name))
}

/// Convert deduplicated records of one region into the typed column set.
///
/// Single pass over the rows, appending each field to its column's builder.
#[instrument(level = "info", skip(region, records), fields(region = %region, rows = records.len()))]
pub fn type_columns(region: Region, records: &[RawRecord]) -> Result<RecordBatch> {
    let mut builders: Vec<ColumnBuilder> = COLUMNS
        .iter()
        .map(|c| ColumnBuilder::new(c.ty, records.len()))
        .collect();

    for (row, record) in records.iter().enumerate() {
        for (column, (spec, builder)) in COLUMNS.iter().zip(builders.iter_mut()).enumerate() {
            let raw = record.value(column);
            clean_cell(spec.rule, raw)
                .and_then(|cell| builder.append(cell))
                .map_err(|reason| parse_error(region, column, spec, row, raw, reason))?;
        }
    }

    let columns: Vec<ArrayRef> = builders.into_iter().map(ColumnBuilder::finish).collect();
    let batch = RecordBatch::try_new(dataset_schema(), columns)?;
    debug!(rows = batch.num_rows(), "typed columns");
    Ok(batch)
}

fn parse_error(
    region: Region,
    column: usize,
    spec: &Column,
    row: usize,
    raw: &str,
    reason: String,
) -> Error {
    Error::ColumnParse {
        region: region.code().to_string(),
        column,
        name: spec.name,
        row,
        value: raw.to_string(),
        reason,
    }
}
