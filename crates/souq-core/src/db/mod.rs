//! Database layer for souq-core

mod connection;
mod migrations;
mod repository;

pub use connection::Database;
pub use repository::{ProductRepository, SqliteProductRepository};
