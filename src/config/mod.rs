//! Configuration management for database settings.

pub mod database;

pub use database::{create_connection, create_tables, get_database_url};
