//! SQL DDL for initializing the database schema.

/// Statements applied in order by `Database::create_all`.
///
/// The admin panel declares no tables of its own yet; every statement added
/// here must be idempotent (`CREATE ... IF NOT EXISTS`).
pub const SCHEMA: &[&str] = &[];
