//! Relational database source.
//!
//! One connection is opened per load, used for a single
//! `SELECT * FROM <table>` and closed again before the result is returned,
//! whether the query succeeded or not.

use std::time::Instant;

use futures::TryStreamExt;
use log::{debug, warn};
use sqlx::mysql::{MySqlConnectOptions, MySqlConnection};
use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection};
use sqlx::{Column, Connection, Executor, Statement};

use super::TableSource;
use super::rows::rows_to_batch;
use crate::config::{ConnectionConfig, Driver, validate_identifier};
use crate::error::{DashboardError, Result};
use crate::models::HospitalTable;
use crate::schema::{missing_column_names, missing_columns_error};
use crate::utils::{log_operation_complete, log_operation_start};

/// Prepare the query, check the result columns, then stream every row
///
/// Expands to an async block so that the caller can close the connection
/// afterwards regardless of the outcome.
macro_rules! fetch_table {
    ($conn:ident, $sql:expr) => {
        async {
            let statement = (&mut $conn)
                .prepare($sql)
                .await
                .map_err(|e| DashboardError::query(format!("Failed to prepare '{}'", $sql), e))?;
            let columns: Vec<String> = statement
                .columns()
                .iter()
                .map(|column| column.name().to_string())
                .collect();

            let missing = missing_column_names(&columns);
            if !missing.is_empty() {
                return Err(missing_columns_error(&missing));
            }
            debug!("Query returns columns: {}", columns.join(", "));

            let rows: Vec<_> = (&mut $conn)
                .fetch($sql)
                .try_collect()
                .await
                .map_err(|e| DashboardError::query(format!("Failed to execute '{}'", $sql), e))?;

            let batch = rows_to_batch(&columns, &rows)?;
            HospitalTable::try_new(&batch)
        }
        .await
    };
}

/// Admission table stored in a MySQL or SQLite database
#[derive(Debug, Clone)]
pub struct SqlSource {
    config: ConnectionConfig,
}

impl SqlSource {
    /// Create a source for the given connection parameters
    pub fn new(config: ConnectionConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Connection parameters of this source
    #[must_use]
    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    /// The single query issued by [`TableSource::load`]
    pub fn query(&self) -> Result<String> {
        validate_identifier(&self.config.table)?;
        Ok(format!("SELECT * FROM {};", self.config.table))
    }

    async fn load_mysql(&self, sql: &str) -> Result<HospitalTable> {
        let mut options = MySqlConnectOptions::new()
            .host(&self.config.host)
            .username(&self.config.user)
            .database(&self.config.database);
        if !self.config.password.is_empty() {
            options = options.password(&self.config.password);
        }
        if let Some(port) = self.config.effective_port() {
            options = options.port(port);
        }

        let mut conn = MySqlConnection::connect_with(&options)
            .await
            .map_err(|e| DashboardError::connection(format!("Cannot connect to {}", self.config), e))?;

        let result = fetch_table!(conn, sql);
        close_connection(conn.close().await);
        result
    }

    async fn load_sqlite(&self, sql: &str) -> Result<HospitalTable> {
        let options = SqliteConnectOptions::new()
            .filename(&self.config.database)
            .create_if_missing(false)
            .read_only(true);

        let mut conn = SqliteConnection::connect_with(&options)
            .await
            .map_err(|e| DashboardError::connection(format!("Cannot open {}", self.config), e))?;

        let result = fetch_table!(conn, sql);
        close_connection(conn.close().await);
        result
    }
}

fn close_connection(result: std::result::Result<(), sqlx::Error>) {
    if let Err(e) = result {
        warn!("Failed to close database connection cleanly: {e}");
    }
}

impl TableSource for SqlSource {
    fn describe(&self) -> String {
        self.config.to_string()
    }

    async fn load(&self) -> Result<HospitalTable> {
        let sql = self.query()?;
        let start = Instant::now();
        let description = self.describe();
        log_operation_start("Loading admissions from", &description);

        let table = match self.config.driver {
            Driver::Mysql => self.load_mysql(&sql).await?,
            Driver::Sqlite => self.load_sqlite(&sql).await?,
        };

        log_operation_complete("loaded", &description, table.num_rows(), Some(start.elapsed()));
        Ok(table)
    }
}
