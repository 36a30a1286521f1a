//! INSERT statement builder.
//!
//! The builder binds to one record: table, columns and values are all
//! materialized when it is constructed, so [`InsertQueryBuilder::build`]
//! only formats and cannot fail.

use tracing::debug;

use crate::error::Result;
use crate::extract::{self, join_non_empty, Column, Table, Value};
use crate::schema::{Entity, EntitySchema};

/// Renders `INSERT INTO <table> (<columns>) VALUES (<values>);`.
///
/// No validation happens here: zero columns render as
/// `INSERT INTO t () VALUES ();`.
#[must_use]
pub fn assemble(table: &str, columns: &str, values: &str) -> String {
    format!("INSERT INTO {table} ({columns}) VALUES ({values});")
}

/// Builds the literal INSERT statement of one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertQueryBuilder {
    table: Table,
    columns: Vec<Column>,
    values: Vec<Value>,
}

impl InsertQueryBuilder {
    /// Creates the builder for a record with a compile-time schema.
    ///
    /// # Errors
    ///
    /// Returns [`PersistError::FieldAccessDenied`] if an included field
    /// cannot be read.
    ///
    /// [`PersistError::FieldAccessDenied`]: crate::PersistError::FieldAccessDenied
    pub fn new<E: Entity>(record: &E) -> Result<Self> {
        Self::with_schema(E::schema(), record)
    }

    /// Creates the builder for a record described by `schema`.
    ///
    /// # Errors
    ///
    /// Returns [`PersistError::FieldAccessDenied`] if an included field
    /// cannot be read.
    ///
    /// [`PersistError::FieldAccessDenied`]: crate::PersistError::FieldAccessDenied
    pub fn with_schema<R>(schema: &EntitySchema<R>, record: &R) -> Result<Self> {
        let row = extract::extract(schema, record)?;
        debug!(
            entity = %schema.type_name(),
            table = %schema.table_name(),
            columns = row.columns.len(),
            "prepared insert"
        );
        Ok(Self {
            table: Table::of(schema),
            columns: row.columns,
            values: row.values,
        })
    }

    /// The target table.
    #[must_use]
    pub const fn table(&self) -> &Table {
        &self.table
    }

    /// The included columns, in declaration order.
    #[must_use]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// The included values, aligned with [`Self::columns`].
    #[must_use]
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Renders the statement.
    #[must_use]
    pub fn build(&self) -> String {
        assemble(
            self.table.name(),
            &join_non_empty(self.columns.iter().map(Column::name)),
            &join_non_empty(self.values.iter().map(Value::text)),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::value::ToSqlValue;
    use crate::schema::{FieldDescriptor, GenerationType};

    struct Note {
        id: i64,
        body: String,
        draft: bool,
    }

    fn note_schema() -> EntitySchema<Note> {
        EntitySchema::builder("Note")
            .field(
                FieldDescriptor::new("id", "i64")
                    .generated(GenerationType::Sequence)
                    .reader(|n: &Note, _| Ok(n.id.to_sql_value())),
            )
            .field(
                FieldDescriptor::new("body", "String")
                    .reader(|n: &Note, _| Ok(n.body.to_sql_value())),
            )
            .field(
                FieldDescriptor::new("draft", "bool")
                    .transient()
                    .reader(|n: &Note, _| Ok(n.draft.to_sql_value())),
            )
            .build()
            .unwrap()
    }

    #[test]
    fn test_assemble_template() {
        assert_eq!(
            assemble("users", "id,name", "7,'Ann'"),
            "INSERT INTO users (id,name) VALUES (7,'Ann');"
        );
    }

    #[test]
    fn test_assemble_empty_lists() {
        assert_eq!(assemble("t", "", ""), "INSERT INTO t () VALUES ();");
    }

    #[test]
    fn test_build_with_schema() {
        let note = Note {
            id: 11,
            body: String::from("it's done"),
            draft: true,
        };
        let builder = InsertQueryBuilder::with_schema(&note_schema(), &note).unwrap();

        assert_eq!(builder.table().name(), "notes");
        assert_eq!(builder.columns().len(), builder.values().len());
        assert_eq!(
            builder.build(),
            "INSERT INTO notes (id,body) VALUES (11,'it''s done');"
        );
    }

    #[test]
    fn test_build_is_idempotent() {
        let note = Note {
            id: 1,
            body: String::from("x"),
            draft: false,
        };
        let builder = InsertQueryBuilder::with_schema(&note_schema(), &note).unwrap();
        assert_eq!(builder.build(), builder.build());
    }

    #[test]
    fn test_values_are_bound_at_construction() {
        let mut note = Note {
            id: 1,
            body: String::from("before"),
            draft: false,
        };
        let schema = note_schema();
        let first = InsertQueryBuilder::with_schema(&schema, &note).unwrap();
        note.body = String::from("after");
        let second = InsertQueryBuilder::with_schema(&schema, &note).unwrap();

        assert_eq!(first.build(), "INSERT INTO notes (id,body) VALUES (1,'before');");
        assert_eq!(second.build(), "INSERT INTO notes (id,body) VALUES (1,'after');");
    }

    #[test]
    fn test_empty_column_name_is_dropped_at_render_time() {
        let schema: EntitySchema<Note> = EntitySchema::new(
            "Note",
            "notes",
            vec![
                FieldDescriptor::new("body", "String")
                    .column("")
                    .reader(|n: &Note, _| Ok(n.body.to_sql_value())),
                FieldDescriptor::new("id", "i64").reader(|n: &Note, _| Ok(n.id.to_sql_value())),
            ],
        );
        let note = Note {
            id: 2,
            body: String::from("b"),
            draft: false,
        };
        let builder = InsertQueryBuilder::with_schema(&schema, &note).unwrap();

        assert_eq!(builder.columns().len(), 2);
        assert_eq!(builder.build(), "INSERT INTO notes (id) VALUES ('b',2);");
    }
}
