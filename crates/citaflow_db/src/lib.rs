//! PostgreSQL persistence for Citaflow.
//!
//! Provides the pooled [`DbClient`], schema initialization, and
//! [`SqlSchedulingStore`], the SQL implementation of the scheduling store
//! trait used by the backend when a database is configured.

pub mod client;
pub mod error;
pub mod store_sql;

pub use client::DbClient;
pub use error::DbError;
pub use store_sql::SqlSchedulingStore;
