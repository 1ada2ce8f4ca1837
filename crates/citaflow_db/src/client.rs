//! PostgreSQL client for Citaflow.
//!
//! Wraps a connection pool and owns schema initialization. Queries live in
//! [`crate::store_sql`].

use crate::error::DbError;
use citaflow_config::{AppConfig, DatabaseConfig};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub struct DbClient {
    pool: PgPool,
}

impl DbClient {
    /// Connect using the application configuration. Fails when no database
    /// section is configured.
    pub async fn new(config: &Arc<AppConfig>) -> Result<Self, DbError> {
        let db_config = config
            .database
            .as_ref()
            .ok_or_else(|| DbError::ConfigError("Database configuration is missing".to_string()))?;
        Self::from_config(db_config).await
    }

    pub async fn from_config(db_config: &DatabaseConfig) -> Result<Self, DbError> {
        if db_config.url.is_empty() {
            return Err(DbError::ConfigError("Database URL is empty".to_string()));
        }
        Self::from_url(&db_config.url).await
    }

    pub async fn from_url(db_url: &str) -> Result<Self, DbError> {
        debug!("Creating database pool");
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .acquire_timeout(Duration::from_secs(3))
            .idle_timeout(Duration::from_secs(600))
            .connect(db_url)
            .await
            .map_err(|e| DbError::PoolError(e.to_string()))?;
        info!("Database pool created successfully");
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn is_healthy(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }

    /// Create the scheduling tables if they do not exist yet.
    pub async fn init_schema(&self) -> Result<(), DbError> {
        debug!("Initializing scheduling schema");
        let statements = [
            r#"
            CREATE TABLE IF NOT EXISTS offices (
                id UUID PRIMARY KEY,
                code TEXT NOT NULL UNIQUE,
                description TEXT NOT NULL DEFAULT '',
                capacity INTEGER NOT NULL,
                is_active BOOLEAN NOT NULL DEFAULT TRUE
            )
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS services (
                id UUID PRIMARY KEY,
                code TEXT NOT NULL UNIQUE,
                description TEXT NOT NULL DEFAULT '',
                duration_minutes INTEGER NOT NULL,
                open_time TIME,
                close_time TIME,
                weekdays CHAR(7) NOT NULL DEFAULT '1111100',
                document_limit INTEGER NOT NULL DEFAULT 0,
                is_active BOOLEAN NOT NULL DEFAULT TRUE
            )
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS office_services (
                id UUID PRIMARY KEY,
                office_id UUID NOT NULL REFERENCES offices(id),
                service_id UUID NOT NULL REFERENCES services(id),
                is_active BOOLEAN NOT NULL DEFAULT TRUE,
                UNIQUE(office_id, service_id)
            )
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS blocked_hours (
                id UUID PRIMARY KEY,
                office_id UUID NOT NULL REFERENCES offices(id),
                date DATE NOT NULL,
                start_time TIME NOT NULL,
                end_time TIME NOT NULL
            )
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS holidays (
                id UUID PRIMARY KEY,
                date DATE NOT NULL UNIQUE,
                is_active BOOLEAN NOT NULL DEFAULT TRUE
            )
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS clients (
                id UUID PRIMARY KEY,
                name TEXT NOT NULL,
                email TEXT NOT NULL UNIQUE,
                pending_limit INTEGER NOT NULL DEFAULT 0,
                is_active BOOLEAN NOT NULL DEFAULT TRUE
            )
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS appointments (
                id UUID PRIMARY KEY,
                client_id UUID NOT NULL REFERENCES clients(id),
                service_id UUID NOT NULL REFERENCES services(id),
                office_id UUID NOT NULL REFERENCES offices(id),
                starts_at TIMESTAMP NOT NULL,
                ends_at TIMESTAMP NOT NULL,
                notes TEXT NOT NULL DEFAULT '',
                status TEXT NOT NULL DEFAULT 'PENDING',
                attended BOOLEAN NOT NULL DEFAULT FALSE,
                attendance_code TEXT NOT NULL,
                cancel_before TIMESTAMP NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                is_active BOOLEAN NOT NULL DEFAULT TRUE
            )
            "#,
            r#"
            CREATE INDEX IF NOT EXISTS idx_appointments_office_window
                ON appointments (office_id, starts_at)
            "#,
            r#"
            CREATE INDEX IF NOT EXISTS idx_appointments_client_status
                ON appointments (client_id, status)
            "#,
        ];
        for statement in statements {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(|e| DbError::QueryError(e.to_string()))?;
        }
        info!("Scheduling schema initialized successfully");
        Ok(())
    }
}
