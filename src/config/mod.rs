//! Configuration for the dashboard pipeline.
//!
//! Values start from defaults matching the hospital's MySQL deployment, may be
//! overlaid by a JSON file named in `DASHBOARD_CONFIG`, and finally by
//! individual `DASHBOARD_*` environment variables.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{DashboardError, Result};

/// Environment variable naming an optional JSON configuration file
pub const CONFIG_FILE_ENV: &str = "DASHBOARD_CONFIG";

/// Default table holding admission records
pub const DEFAULT_TABLE: &str = "hospitaldata";

/// Default number of animated counter frames
pub const DEFAULT_COUNTER_STEPS: usize = 5;

/// Database driver used to reach the admissions table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Driver {
    /// MySQL / MariaDB server
    Mysql,
    /// SQLite database file; `database` is the file path
    Sqlite,
}

impl Driver {
    /// Default TCP port for the driver, if it uses one
    #[must_use]
    pub const fn default_port(self) -> Option<u16> {
        match self {
            Self::Mysql => Some(3306),
            Self::Sqlite => None,
        }
    }
}

impl FromStr for Driver {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mysql" | "mariadb" => Ok(Self::Mysql),
            "sqlite" | "sqlite3" => Ok(Self::Sqlite),
            other => Err(DashboardError::config(format!(
                "Unknown database driver '{other}' (expected 'mysql' or 'sqlite')"
            ))),
        }
    }
}

impl fmt::Display for Driver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mysql => write!(f, "mysql"),
            Self::Sqlite => write!(f, "sqlite"),
        }
    }
}

/// Connection parameters for the data source
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
    /// Database driver
    pub driver: Driver,
    /// Server host name (ignored for SQLite)
    pub host: String,
    /// User name (ignored for SQLite)
    pub user: String,
    /// Password (ignored for SQLite, never printed)
    pub password: String,
    /// Database name, or file path for SQLite
    pub database: String,
    /// Server port; `None` uses the driver default
    pub port: Option<u16>,
    /// Table holding admission records
    pub table: String,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            driver: Driver::Mysql,
            host: "localhost".to_string(),
            user: "root".to_string(),
            password: String::new(),
            database: "hari".to_string(),
            port: None,
            table: DEFAULT_TABLE.to_string(),
        }
    }
}

impl ConnectionConfig {
    /// Configuration for a SQLite database file
    #[must_use]
    pub fn sqlite(path: impl AsRef<Path>) -> Self {
        Self {
            driver: Driver::Sqlite,
            host: String::new(),
            user: String::new(),
            database: path.as_ref().display().to_string(),
            ..Default::default()
        }
    }

    /// Replace the table name
    #[must_use]
    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = table.into();
        self
    }

    /// Port to connect to, falling back to the driver default
    #[must_use]
    pub fn effective_port(&self) -> Option<u16> {
        self.port.or_else(|| self.driver.default_port())
    }

    /// Check that the configuration can be used to build a query
    pub fn validate(&self) -> Result<()> {
        validate_identifier(&self.table)?;
        if self.database.trim().is_empty() {
            return Err(DashboardError::config("Database name must not be empty"));
        }
        if self.driver == Driver::Mysql && self.host.trim().is_empty() {
            return Err(DashboardError::config("MySQL host must not be empty"));
        }
        Ok(())
    }

    /// Apply `DASHBOARD_DB_*` overrides from a variable lookup
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(driver) = lookup("DASHBOARD_DB_DRIVER") {
            self.driver = driver.parse()?;
        }
        if let Some(host) = lookup("DASHBOARD_DB_HOST") {
            self.host = host;
        }
        if let Some(user) = lookup("DASHBOARD_DB_USER") {
            self.user = user;
        }
        if let Some(password) = lookup("DASHBOARD_DB_PASSWORD") {
            self.password = password;
        }
        if let Some(database) = lookup("DASHBOARD_DB_NAME") {
            self.database = database;
        }
        if let Some(port) = lookup("DASHBOARD_DB_PORT") {
            let port = port.trim().parse::<u16>().map_err(|e| {
                DashboardError::config(format!("Invalid DASHBOARD_DB_PORT '{port}': {e}"))
            })?;
            self.port = Some(port);
        }
        if let Some(table) = lookup("DASHBOARD_DB_TABLE") {
            self.table = table;
        }
        Ok(())
    }
}

impl fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("driver", &self.driver)
            .field("host", &self.host)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("database", &self.database)
            .field("port", &self.port)
            .field("table", &self.table)
            .finish()
    }
}

impl fmt::Display for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.driver {
            Driver::Sqlite => write!(f, "sqlite://{} (table {})", self.database, self.table),
            Driver::Mysql => {
                write!(f, "mysql://{}@{}", self.user, self.host)?;
                if let Some(port) = self.effective_port() {
                    write!(f, ":{port}")?;
                }
                write!(f, "/{} (table {})", self.database, self.table)
            }
        }
    }
}

/// Output format of the dashboard binary
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable summary
    #[default]
    Text,
    /// Full dashboard frame as JSON
    Json,
}

impl FromStr for OutputFormat {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(DashboardError::config(format!(
                "Unknown output format '{other}' (expected 'text' or 'json')"
            ))),
        }
    }
}

/// Configuration for a dashboard session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Data source connection
    pub connection: ConnectionConfig,
    /// Number of frames in the animated metric counter
    pub counter_steps: usize,
    /// Output format for the binary
    pub output: OutputFormat,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            connection: ConnectionConfig::default(),
            counter_steps: DEFAULT_COUNTER_STEPS,
            output: OutputFormat::default(),
        }
    }
}

impl DashboardConfig {
    /// Load configuration from a JSON file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Parse configuration from JSON; missing fields take their defaults
    pub fn from_json(content: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(content)?;
        Ok(config)
    }

    /// Build configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match lookup(CONFIG_FILE_ENV) {
            Some(path) => Self::from_file(Path::new(&path))?,
            None => Self::default(),
        };
        config.apply_overrides(&lookup)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `DASHBOARD_*` overrides from a variable lookup
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        self.connection.apply_overrides(&lookup)?;
        if let Some(steps) = lookup("DASHBOARD_COUNTER_STEPS") {
            self.counter_steps = steps.trim().parse::<usize>().map_err(|e| {
                DashboardError::config(format!("Invalid DASHBOARD_COUNTER_STEPS '{steps}': {e}"))
            })?;
        }
        if let Some(output) = lookup("DASHBOARD_OUTPUT") {
            self.output = output.parse()?;
        }
        Ok(())
    }

    /// Check the configuration for unusable values
    pub fn validate(&self) -> Result<()> {
        if self.counter_steps == 0 {
            return Err(DashboardError::config("Counter steps must be at least 1"));
        }
        self.connection.validate()
    }
}

impl fmt::Display for DashboardConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Dashboard Configuration:")?;
        writeln!(f, "  Source: {}", self.connection)?;
        writeln!(f, "  Counter Steps: {}", self.counter_steps)?;
        writeln!(f, "  Output: {:?}", self.output)
    }
}

/// Check that a table name is a plain SQL identifier
pub fn validate_identifier(name: &str) -> Result<()> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    };
    if valid {
        Ok(())
    } else {
        Err(DashboardError::config(format!(
            "Invalid table name '{name}': only letters, digits and '_' are allowed"
        )))
    }
}
