//! Column/value extraction.
//!
//! Applies the inclusion policy of [`Persistence::is_insertable`] to a
//! schema's field list and maps the surviving fields to columns and to
//! literal values read off one record.
//!
//! [`Persistence::is_insertable`]: crate::schema::Persistence::is_insertable

use std::fmt;

use tracing::trace;

use crate::error::Result;
use crate::schema::{EntitySchema, FieldDescriptor};

/// Separator between joined columns and values.
pub const SEPARATOR: &str = ",";

/// A target table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    name: String,
}

impl Table {
    /// Creates a table with the given name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Returns the table a schema's records are inserted into.
    #[must_use]
    pub fn of<R>(schema: &EntitySchema<R>) -> Self {
        Self::new(schema.table_name())
    }

    /// The table name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// A target column. The default column has an empty name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Column {
    name: String,
}

impl Column {
    /// Creates a column with the given name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// The column name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl<R> From<&FieldDescriptor<R>> for Column {
    fn from(field: &FieldDescriptor<R>) -> Self {
        Self::new(field.column.as_ref())
    }
}

impl<R> From<Option<&FieldDescriptor<R>>> for Column {
    fn from(field: Option<&FieldDescriptor<R>>) -> Self {
        field.map(Self::from).unwrap_or_default()
    }
}

/// The rendered SQL literal of one field of one record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Value {
    text: String,
}

impl Value {
    /// Wraps already rendered literal text.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Reads `field` off `record` and renders it.
    ///
    /// # Errors
    ///
    /// Returns [`PersistError::FieldAccessDenied`] if the field cannot be
    /// read.
    ///
    /// [`PersistError::FieldAccessDenied`]: crate::PersistError::FieldAccessDenied
    pub fn read<R>(field: &FieldDescriptor<R>, record: &R) -> Result<Self> {
        Ok(Self::new(field.read(record)?.to_sql_inline()))
    }

    /// The literal text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Index-aligned columns and values of one record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InsertRow {
    /// Included columns, in declaration order.
    pub columns: Vec<Column>,
    /// Included values, aligned with `columns`.
    pub values: Vec<Value>,
}

fn insertable<R>(schema: &EntitySchema<R>) -> impl Iterator<Item = &FieldDescriptor<R>> {
    schema.fields().iter().filter(|field| {
        let included = field.persistence.is_insertable();
        if !included {
            trace!(
                entity = %schema.type_name(),
                field = %field.name,
                reason = field.persistence.exclusion_reason().unwrap_or_default(),
                "field excluded from insert"
            );
        }
        included
    })
}

/// Returns the columns an INSERT for `schema` writes, in declaration order.
#[must_use]
pub fn columns<R>(schema: &EntitySchema<R>) -> Vec<Column> {
    insertable(schema).map(Column::from).collect()
}

/// Reads the included values of `record`, in declaration order.
///
/// # Errors
///
/// Returns the first [`PersistError::FieldAccessDenied`] hit; no partial
/// result is returned.
///
/// [`PersistError::FieldAccessDenied`]: crate::PersistError::FieldAccessDenied
pub fn values<R>(schema: &EntitySchema<R>, record: &R) -> Result<Vec<Value>> {
    insertable(schema)
        .map(|field| Value::read(field, record))
        .collect()
}

/// Extracts columns and values in a single pass over the field list.
///
/// # Errors
///
/// Same as [`values`].
pub fn extract<R>(schema: &EntitySchema<R>, record: &R) -> Result<InsertRow> {
    let mut row = InsertRow::default();
    for field in insertable(schema) {
        row.values.push(Value::read(field, record)?);
        row.columns.push(Column::from(field));
    }
    Ok(row)
}

/// Joins rendered names with [`SEPARATOR`], skipping empty ones.
pub fn join_non_empty<'a, I>(parts: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    parts
        .into_iter()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(SEPARATOR)
}
