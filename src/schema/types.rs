// src/schema/types.rs

/// Storage type of one dataset column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    /// Text kept to at most `width` characters.
    Text { width: usize },
    Int8,
    Int16,
    Int32,
    Float32,
    Date,
    /// Combined `hhmm` integer, decoded by [`crate::process::time::TimeOfDay`].
    Time,
}

/// How a raw field is cleaned before it is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    /// The region code prepended to every record.
    Region,
    /// Empty → `-1`, otherwise an integer of the column's width.
    DefaultInt,
    /// Strip surrounding quotes, keep as text.
    StripQuotes,
    /// Strip quotes; empty → NaN; comma decimal separator accepted.
    DefaultFloat,
    /// Copied as is.
    Verbatim,
    Date,
    Time,
}

/// A single column definition of the accident dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub name: &'static str,
    pub ty: ColumnType,
    pub rule: Rule,
}

impl Column {
    pub const fn new(name: &'static str, ty: ColumnType, rule: Rule) -> Self {
        Self { name, ty, rule }
    }
}
