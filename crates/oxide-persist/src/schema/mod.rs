//! Entity schemas: the field list a record type exposes to the INSERT builder.
//!
//! A schema is an explicit, ordered list of [`FieldDescriptor`]s. It is
//! produced either at compile time by `#[derive(Entity)]` (and cached once
//! per type) or at registration time through [`EntitySchema::builder`] and
//! the [`SchemaRegistry`].

mod registry;

use std::borrow::Cow;
use std::collections::HashSet;

use strum::{AsRefStr, Display, EnumString};

use crate::builder::value::SqlValue;
use crate::error::{PersistError, Result};
use crate::naming::table_name_for;

pub use registry::{DynamicRecord, EntityDef, FieldDef, RegistryDef, SchemaRegistry};

/// How the database (or the caller) produces a generated value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, AsRefStr, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum GenerationType {
    /// Provider picks a strategy.
    #[default]
    Auto,
    /// Identity / autoincrement column.
    Identity,
    /// Database sequence. The caller supplies the value in the INSERT.
    Sequence,
    /// Key table.
    Table,
    /// Generated UUID.
    Uuid,
}

impl GenerationType {
    /// Parses a strategy name, case-insensitively.
    ///
    /// # Errors
    ///
    /// Returns [`PersistError::InvalidRecordType`] for an unknown strategy.
    pub fn parse_strategy(name: &str) -> Result<Self> {
        name.parse()
            .map_err(|_| PersistError::invalid_type(format!("unknown generation strategy '{name}'")))
    }
}

/// Persistence directives attached to a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Persistence {
    /// Field is never stored.
    pub transient: bool,
    /// Field carries a generated-value directive with this strategy.
    pub generated: Option<GenerationType>,
    /// Field is the primary key column.
    pub primary_key: bool,
}

impl Persistence {
    /// Directives of a plain stored field.
    #[must_use]
    pub const fn stored() -> Self {
        Self {
            transient: false,
            generated: None,
            primary_key: false,
        }
    }

    /// Directives of a transient field.
    #[must_use]
    pub const fn transient() -> Self {
        Self {
            transient: true,
            generated: None,
            primary_key: false,
        }
    }

    /// Directives of a generated field.
    #[must_use]
    pub const fn generated(strategy: GenerationType) -> Self {
        Self {
            transient: false,
            generated: Some(strategy),
            primary_key: false,
        }
    }

    /// Returns whether the field contributes a column and a value to an
    /// INSERT statement.
    ///
    /// Transient fields never do. Generated fields only do when their
    /// strategy is [`GenerationType::Sequence`].
    #[must_use]
    pub fn is_insertable(&self) -> bool {
        !self.transient && matches!(self.generated, None | Some(GenerationType::Sequence))
    }

    /// Describes why a field is left out of INSERT statements, if it is.
    #[must_use]
    pub fn exclusion_reason(&self) -> Option<&'static str> {
        if self.transient {
            Some("transient")
        } else if self.is_insertable() {
            None
        } else {
            Some("generated by the database")
        }
    }
}

/// Reads one field off a record instance.
///
/// The second argument is the field name, which lets a single reader serve
/// every field of a dynamic record.
pub type ReadFn<R> = fn(&R, &str) -> Result<SqlValue>;

/// One declared field of a record type.
pub struct FieldDescriptor<R> {
    /// Field name as declared on the type.
    pub name: Cow<'static, str>,
    /// Declared type, for display only.
    pub rust_type: Cow<'static, str>,
    /// Column name the field is stored in.
    pub column: Cow<'static, str>,
    /// Persistence directives.
    pub persistence: Persistence,
    /// Accessor for the field value, `None` when the field cannot be read.
    pub reader: Option<ReadFn<R>>,
}

impl<R> FieldDescriptor<R> {
    /// Creates a stored field whose column has the same name as the field.
    #[must_use]
    pub fn new(name: impl Into<Cow<'static, str>>, rust_type: impl Into<Cow<'static, str>>) -> Self {
        let name = name.into();
        Self {
            column: name.clone(),
            name,
            rust_type: rust_type.into(),
            persistence: Persistence::stored(),
            reader: None,
        }
    }

    /// Overrides the column name.
    #[must_use]
    pub fn column(mut self, column: impl Into<Cow<'static, str>>) -> Self {
        self.column = column.into();
        self
    }

    /// Sets the persistence directives.
    #[must_use]
    pub fn persistence(mut self, persistence: Persistence) -> Self {
        self.persistence = persistence;
        self
    }

    /// Marks the field transient.
    #[must_use]
    pub fn transient(mut self) -> Self {
        self.persistence.transient = true;
        self
    }

    /// Marks the field generated with the given strategy.
    #[must_use]
    pub fn generated(mut self, strategy: GenerationType) -> Self {
        self.persistence.generated = Some(strategy);
        self
    }

    /// Marks the field as the primary key.
    #[must_use]
    pub fn primary_key(mut self) -> Self {
        self.persistence.primary_key = true;
        self
    }

    /// Sets the accessor used to read the field off a record.
    #[must_use]
    pub fn reader(mut self, reader: ReadFn<R>) -> Self {
        self.reader = Some(reader);
        self
    }

    /// Reads this field's value off `record`.
    ///
    /// # Errors
    ///
    /// Returns [`PersistError::FieldAccessDenied`] if the field has no
    /// accessor or the accessor cannot read it.
    pub fn read(&self, record: &R) -> Result<SqlValue> {
        match self.reader {
            Some(read) => read(record, &self.name),
            None => Err(PersistError::access_denied(
                self.name.as_ref(),
                "field has no accessor",
            )),
        }
    }
}

impl<R> Clone for FieldDescriptor<R> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            rust_type: self.rust_type.clone(),
            column: self.column.clone(),
            persistence: self.persistence,
            reader: self.reader,
        }
    }
}

impl<R> std::fmt::Debug for FieldDescriptor<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("name", &self.name)
            .field("rust_type", &self.rust_type)
            .field("column", &self.column)
            .field("persistence", &self.persistence)
            .field("readable", &self.reader.is_some())
            .finish()
    }
}

/// The ordered field list of one record type, plus its table name.
pub struct EntitySchema<R> {
    type_name: Cow<'static, str>,
    table: Cow<'static, str>,
    fields: Vec<FieldDescriptor<R>>,
}

impl<R> EntitySchema<R> {
    /// Creates a schema without validating it.
    ///
    /// Used by `#[derive(Entity)]`, which already rejects malformed types at
    /// compile time. Registration-time callers go through
    /// [`EntitySchema::builder`].
    #[must_use]
    pub fn new(
        type_name: impl Into<Cow<'static, str>>,
        table: impl Into<Cow<'static, str>>,
        fields: Vec<FieldDescriptor<R>>,
    ) -> Self {
        Self {
            type_name: type_name.into(),
            table: table.into(),
            fields,
        }
    }

    /// Starts a validated schema for `type_name`.
    #[must_use]
    pub fn builder(type_name: impl Into<Cow<'static, str>>) -> EntitySchemaBuilder<R> {
        EntitySchemaBuilder {
            type_name: type_name.into(),
            table: None,
            fields: Vec::new(),
        }
    }

    /// The record type name.
    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// The table records of this type are inserted into.
    #[must_use]
    pub fn table_name(&self) -> &str {
        &self.table
    }

    /// Every declared field, in declaration order.
    #[must_use]
    pub fn fields(&self) -> &[FieldDescriptor<R>] {
        &self.fields
    }

    /// Looks up a field by name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor<R>> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// The primary key field, if one is declared.
    #[must_use]
    pub fn primary_key(&self) -> Option<&FieldDescriptor<R>> {
        self.fields.iter().find(|f| f.persistence.primary_key)
    }
}

impl<R> Clone for EntitySchema<R> {
    fn clone(&self) -> Self {
        Self {
            type_name: self.type_name.clone(),
            table: self.table.clone(),
            fields: self.fields.clone(),
        }
    }
}

impl<R> std::fmt::Debug for EntitySchema<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntitySchema")
            .field("type_name", &self.type_name)
            .field("table", &self.table)
            .field("fields", &self.fields)
            .finish()
    }
}

/// Builder for a validated [`EntitySchema`].
pub struct EntitySchemaBuilder<R> {
    type_name: Cow<'static, str>,
    table: Option<Cow<'static, str>>,
    fields: Vec<FieldDescriptor<R>>,
}

impl<R> EntitySchemaBuilder<R> {
    /// Overrides the table name derived from the type name.
    #[must_use]
    pub fn table(mut self, table: impl Into<Cow<'static, str>>) -> Self {
        self.table = Some(table.into());
        self
    }

    /// Appends a field. Declaration order is the order of these calls.
    #[must_use]
    pub fn field(mut self, field: FieldDescriptor<R>) -> Self {
        self.fields.push(field);
        self
    }

    /// Validates and builds the schema.
    ///
    /// # Errors
    ///
    /// Returns [`PersistError::InvalidRecordType`] if the type name is
    /// empty, a field name is empty or repeated, or more than one field is
    /// marked as primary key.
    pub fn build(self) -> Result<EntitySchema<R>> {
        if self.type_name.trim().is_empty() {
            return Err(PersistError::invalid_type("type name is empty"));
        }

        let mut seen = HashSet::new();
        for field in &self.fields {
            if field.name.is_empty() {
                return Err(PersistError::invalid_type(format!(
                    "{} declares a field without a name",
                    self.type_name
                )));
            }
            if !seen.insert(field.name.as_ref()) {
                return Err(PersistError::invalid_type(format!(
                    "{} declares field '{}' more than once",
                    self.type_name, field.name
                )));
            }
        }

        if self.fields.iter().filter(|f| f.persistence.primary_key).count() > 1 {
            return Err(PersistError::invalid_type(format!(
                "{} declares more than one primary key",
                self.type_name
            )));
        }

        let table = self
            .table
            .unwrap_or_else(|| Cow::Owned(table_name_for(&self.type_name)));

        Ok(EntitySchema {
            type_name: self.type_name,
            table,
            fields: self.fields,
        })
    }
}

/// A record type with a compile-time schema.
///
/// Implemented by `#[derive(Entity)]`:
///
/// ```
/// use oxide_persist::Entity;
///
/// #[derive(Entity)]
/// struct User {
///     #[generated_value(strategy = "identity")]
///     id: i64,
///     name: String,
///     #[transient]
///     temp_flag: bool,
/// }
///
/// let user = User { id: 7, name: "Ann".into(), temp_flag: true };
/// assert_eq!(user.insert_sql()?, "INSERT INTO users (name) VALUES ('Ann');");
/// # Ok::<(), oxide_persist::PersistError>(())
/// ```
pub trait Entity: Sized + 'static {
    /// Returns the schema of this type. Built once, then shared.
    fn schema() -> &'static EntitySchema<Self>;

    /// Renders the INSERT statement for this record.
    ///
    /// # Errors
    ///
    /// Returns [`PersistError::FieldAccessDenied`] if an included field
    /// cannot be read.
    fn insert_sql(&self) -> Result<String> {
        Ok(crate::builder::InsertQueryBuilder::new(self)?.build())
    }
}

/// Returns the declared fields of `E`, in declaration order.
#[must_use]
pub fn fields<E: Entity>() -> &'static [FieldDescriptor<E>] {
    E::schema().fields()
}
