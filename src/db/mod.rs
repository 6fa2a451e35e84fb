//! Database module: the SQLite handle and the schema applied at startup.
//!
//! Layout:
//! - `database.rs`: lazily connected pool handle with a statement counter
//! - `schema.rs`: SQL DDL applied by `Database::create_all`

pub mod database;
pub mod schema;

pub use database::Database;
pub use schema::SCHEMA;
