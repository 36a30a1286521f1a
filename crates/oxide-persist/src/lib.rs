//! # oxide-persist
//!
//! Derives literal SQL `INSERT` statements from domain records.
//!
//! A record type exposes an ordered list of field descriptors, either
//! generated by `#[derive(Entity)]` or registered at run time in a
//! [`SchemaRegistry`]. Building an INSERT runs three steps:
//!
//! - the schema lists every declared field with its persistence directives
//! - [`extract`] drops transient fields and database-generated fields (only
//!   the `sequence` strategy is kept) and reads the remaining values
//! - [`builder::assemble`] formats `INSERT INTO <table> (<cols>) VALUES (<vals>);`
//!
//! ## Derived entities
//!
//! ```rust
//! use oxide_persist::Entity;
//!
//! #[derive(Entity)]
//! pub struct User {
//!     #[generated_value(strategy = "identity")]
//!     pub id: i64,
//!     pub name: String,
//!     #[transient]
//!     pub temp_flag: bool,
//! }
//!
//! let user = User { id: 7, name: "Ann".into(), temp_flag: true };
//! assert_eq!(user.insert_sql()?, "INSERT INTO users (name) VALUES ('Ann');");
//! # Ok::<(), oxide_persist::PersistError>(())
//! ```
//!
//! ## Dynamic records
//!
//! ```rust
//! use oxide_persist::{DynamicRecord, SchemaRegistry};
//!
//! let registry = SchemaRegistry::from_json(r#"{
//!     "entities": [{
//!         "type": "User",
//!         "fields": [
//!             { "name": "id", "generated_value": "sequence" },
//!             { "name": "name" }
//!         ]
//!     }]
//! }"#).unwrap();
//!
//! let record = DynamicRecord::new("User").with("id", 7).with("name", "Ann");
//! let sql = registry.insert_builder(&record).unwrap().build();
//! assert_eq!(sql, "INSERT INTO users (id,name) VALUES (7,'Ann');");
//! ```

pub mod builder;
pub mod error;
pub mod extract;
pub mod naming;
pub mod schema;

pub use builder::{InsertQueryBuilder, SqlValue, ToSqlValue};
pub use error::{PersistError, Result};
pub use extract::{Column, InsertRow, Table, Value};
pub use schema::{
    DynamicRecord, Entity, EntitySchema, FieldDescriptor, GenerationType, Persistence,
    SchemaRegistry,
};

#[cfg(feature = "derive")]
pub use oxide_persist_derive::Entity;
