//! Database layer with `SeaORM` entities and repositories.
//!
//! This crate provides:
//! - `SeaORM` entity definitions
//! - Repositories, including the Postgres item category store
//! - Translation of list filters into queries
//! - Row-level security context
//! - Database migrations

pub mod entities;
pub mod filter;
pub mod migration;
pub mod repositories;
pub mod rls;

pub use repositories::{
    AccountRepository, ItemCategoryRepository, ItemRepository, JournalRepository,
    ReportRepository,
};
pub use rls::{RlsConnection, RlsExt};

use std::time::Duration;

use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use tally_shared::config::DatabaseConfig;

/// Establishes a pooled connection to the database.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(config: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(config.url.clone());
    options
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .connect_timeout(Duration::from_secs(10))
        .sqlx_logging(false);
    Database::connect(options).await
}
