//! Registration-time schemas for records that are only known at run time.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::{Map, Value as JsonValue};
use tracing::debug;

use super::{EntitySchema, FieldDescriptor, GenerationType, Persistence};
use crate::builder::value::SqlValue;
use crate::builder::InsertQueryBuilder;
use crate::error::{PersistError, Result};

/// A record whose type is resolved by name against a [`SchemaRegistry`].
///
/// ```json
/// { "type": "User", "fields": { "id": 7, "name": "Ann" } }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct DynamicRecord {
    /// Name of the registered record type.
    #[serde(rename = "type", default)]
    pub type_name: Option<String>,
    /// Field values keyed by field name.
    #[serde(default)]
    pub fields: Map<String, JsonValue>,
}

impl DynamicRecord {
    /// Creates an empty record of the given type.
    #[must_use]
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: Some(type_name.into()),
            fields: Map::new(),
        }
    }

    /// Sets a field value.
    #[must_use]
    pub fn with(mut self, field: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.fields.insert(field.into(), value.into());
        self
    }

    /// Parses a record from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`PersistError::Config`] if the JSON is malformed.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

fn read_dynamic(record: &DynamicRecord, field: &str) -> Result<SqlValue> {
    let value = record
        .fields
        .get(field)
        .ok_or_else(|| PersistError::access_denied(field, "field is missing from the record"))?;

    match value {
        JsonValue::Null => Ok(SqlValue::Null),
        JsonValue::Bool(b) => Ok(SqlValue::Bool(*b)),
        JsonValue::Number(n) => {
            let integer = n
                .as_i64()
                .map(i128::from)
                .or_else(|| n.as_u64().map(i128::from));
            match integer {
                Some(i) => Ok(SqlValue::Int(i)),
                None => n.as_f64().map(SqlValue::Float).ok_or_else(|| {
                    PersistError::access_denied(field, format!("number {n} does not fit a column"))
                }),
            }
        }
        JsonValue::String(s) => Ok(SqlValue::Text(s.clone())),
        JsonValue::Array(_) | JsonValue::Object(_) => Err(PersistError::access_denied(
            field,
            "nested values cannot be stored in a column",
        )),
    }
}

/// Serialized form of a registry.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegistryDef {
    /// Entity definitions.
    #[serde(default)]
    pub entities: Vec<EntityDef>,
}

/// Serialized form of one entity schema.
#[derive(Debug, Clone, Deserialize)]
pub struct EntityDef {
    /// Record type name.
    #[serde(rename = "type")]
    pub type_name: String,
    /// Table name override.
    #[serde(default)]
    pub table: Option<String>,
    /// Fields in declaration order.
    #[serde(default)]
    pub fields: Vec<FieldDef>,
}

/// Serialized form of one field.
#[derive(Debug, Clone, Deserialize)]
pub struct FieldDef {
    /// Field name.
    pub name: String,
    /// Declared type, for display.
    #[serde(rename = "type", default)]
    pub rust_type: Option<String>,
    /// Column name override.
    #[serde(default)]
    pub column: Option<String>,
    /// Transient marker.
    #[serde(default)]
    pub transient: bool,
    /// Generated-value marker with its strategy name.
    #[serde(default)]
    pub generated_value: Option<String>,
    /// Primary key marker.
    #[serde(default)]
    pub primary_key: bool,
}

impl FieldDef {
    fn into_descriptor(self) -> Result<FieldDescriptor<DynamicRecord>> {
        let generated = self
            .generated_value
            .as_deref()
            .map(GenerationType::parse_strategy)
            .transpose()?;
        let mut field = FieldDescriptor::new(self.name, self.rust_type.unwrap_or_default())
            .persistence(Persistence {
                transient: self.transient,
                generated,
                primary_key: self.primary_key,
            })
            .reader(read_dynamic);
        if let Some(column) = self.column {
            field = field.column(column);
        }
        Ok(field)
    }
}

impl EntityDef {
    /// Builds the validated schema described by this definition.
    ///
    /// # Errors
    ///
    /// Returns [`PersistError::InvalidRecordType`] if the definition is
    /// malformed.
    pub fn into_schema(self) -> Result<EntitySchema<DynamicRecord>> {
        let mut builder = EntitySchema::builder(self.type_name);
        if let Some(table) = self.table {
            builder = builder.table(table);
        }
        for field in self.fields {
            builder = builder.field(field.into_descriptor()?);
        }
        builder.build()
    }
}

/// Schemas of dynamic record types, keyed by type name.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    schemas: BTreeMap<String, EntitySchema<DynamicRecord>>,
}

impl SchemaRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a registry from its JSON form.
    ///
    /// # Errors
    ///
    /// Returns [`PersistError::Config`] for malformed JSON and
    /// [`PersistError::InvalidRecordType`] for an invalid entity.
    pub fn from_json(json: &str) -> Result<Self> {
        let def: RegistryDef = serde_json::from_str(json)?;
        let mut registry = Self::new();
        for entity in def.entities {
            registry.register(entity.into_schema()?)?;
        }
        Ok(registry)
    }

    /// Registers a schema.
    ///
    /// # Errors
    ///
    /// Returns [`PersistError::InvalidRecordType`] if a schema with the same
    /// type name is already registered.
    pub fn register(&mut self, schema: EntitySchema<DynamicRecord>) -> Result<()> {
        if self.schemas.contains_key(schema.type_name()) {
            return Err(PersistError::invalid_type(format!(
                "{} is already registered",
                schema.type_name()
            )));
        }
        debug!(
            entity = %schema.type_name(),
            table = %schema.table_name(),
            fields = schema.fields().len(),
            "registered entity schema"
        );
        self.schemas.insert(schema.type_name().to_owned(), schema);
        Ok(())
    }

    /// Resolves the schema of a type name.
    ///
    /// # Errors
    ///
    /// Returns [`PersistError::InvalidRecordType`] if no type name is given
    /// or the type is not registered.
    pub fn get(&self, type_name: Option<&str>) -> Result<&EntitySchema<DynamicRecord>> {
        let type_name =
            type_name.ok_or_else(|| PersistError::invalid_type("record has no type name"))?;
        self.schemas
            .get(type_name)
            .ok_or_else(|| PersistError::invalid_type(format!("{type_name} is not registered")))
    }

    /// Returns the declared fields of a registered type.
    ///
    /// # Errors
    ///
    /// See [`SchemaRegistry::get`].
    pub fn fields(&self, type_name: Option<&str>) -> Result<&[FieldDescriptor<DynamicRecord>]> {
        Ok(self.get(type_name)?.fields())
    }

    /// Iterates over registered schemas, ordered by type name.
    pub fn schemas(&self) -> impl Iterator<Item = &EntitySchema<DynamicRecord>> {
        self.schemas.values()
    }

    /// Constructs the INSERT builder for a dynamic record.
    ///
    /// # Errors
    ///
    /// Returns [`PersistError::InvalidRecordType`] if the record's type
    /// cannot be resolved and [`PersistError::FieldAccessDenied`] if an
    /// included field cannot be read.
    pub fn insert_builder(&self, record: &DynamicRecord) -> Result<InsertQueryBuilder> {
        let schema = self.get(record.type_name.as_deref())?;
        InsertQueryBuilder::with_schema(schema, record)
    }
}
