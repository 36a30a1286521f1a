//! INSERT statement building.
//!
//! # Example
//!
//! ```rust
//! use oxide_persist::builder::assemble;
//!
//! let sql = assemble("users", "id,name", "7,'Ann'");
//! assert_eq!(sql, "INSERT INTO users (id,name) VALUES (7,'Ann');");
//! ```

mod insert;
pub mod value;

pub use insert::{assemble, InsertQueryBuilder};
pub use value::{SqlValue, ToSqlValue};
