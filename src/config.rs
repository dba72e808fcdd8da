//! Configuration Module
//! Layered settings: defaults, optional TOML file, then `SALESBOARD__*` environment variables.

use serde::Deserialize;
use std::net::{SocketAddr, ToSocketAddrs};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Prefix for environment overrides, e.g. `SALESBOARD__SERVER__PORT=9000`.
pub const ENV_PREFIX: &str = "SALESBOARD";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(#[from] config::ConfigError),
    #[error("Invalid server address {0}")]
    InvalidAddress(String),
    #[error("Configuration validation error: {0}")]
    ValidationError(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub data: DataSettings,
    pub dashboard: DashboardSettings,
    pub inventory: InventorySettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

/// Location of the three CSV inputs.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DataSettings {
    pub dir: PathBuf,
    pub sales_file: String,
    pub product_file: String,
    pub inventory_file: String,
}

impl Default for DataSettings {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("data"),
            sales_file: "sales_data.csv".to_string(),
            product_file: "product_data.csv".to_string(),
            inventory_file: "inventory_data.csv".to_string(),
        }
    }
}

impl DataSettings {
    pub fn sales_path(&self) -> PathBuf {
        self.dir.join(&self.sales_file)
    }

    pub fn product_path(&self) -> PathBuf {
        self.dir.join(&self.product_file)
    }

    pub fn inventory_path(&self) -> PathBuf {
        self.dir.join(&self.inventory_file)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DashboardSettings {
    pub title: String,
    /// Seconds between automatic page reloads.
    pub refresh_interval_secs: u64,
    /// Stock health percentage the gauge measures against.
    pub stock_health_target: f64,
    pub chart_width: u32,
    pub chart_height: u32,
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self {
            title: "Real-Time Sales & Operations Dashboard".to_string(),
            refresh_interval_secs: 30,
            stock_health_target: 90.0,
            chart_width: 900,
            chart_height: 400,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct InventorySettings {
    /// Jitter stock levels on every refresh tick (demo mode).
    pub simulate_drift: bool,
    /// Maximum absolute change per product and tick.
    pub drift: i64,
}

impl Default for InventorySettings {
    fn default() -> Self {
        Self {
            simulate_drift: false,
            drift: 2,
        }
    }
}

impl Settings {
    /// Load settings from `path` (optional) and the environment.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let builder = config::Config::builder()
            .add_source(config::File::from(path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let settings = builder.try_deserialize::<Settings>()?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::ValidationError(
                "server.port must be non-zero".to_string(),
            ));
        }
        if self.dashboard.refresh_interval_secs == 0 {
            return Err(ConfigError::ValidationError(
                "dashboard.refresh_interval_secs must be at least 1".to_string(),
            ));
        }
        if !(0.0..=100.0).contains(&self.dashboard.stock_health_target) {
            return Err(ConfigError::ValidationError(format!(
                "dashboard.stock_health_target must be within 0..=100, got {}",
                self.dashboard.stock_health_target
            )));
        }
        if self.dashboard.chart_width == 0 || self.dashboard.chart_height == 0 {
            return Err(ConfigError::ValidationError(
                "dashboard chart size must be non-zero".to_string(),
            ));
        }
        if self.inventory.drift < 0 {
            return Err(ConfigError::ValidationError(
                "inventory.drift must not be negative".to_string(),
            ));
        }
        Ok(())
    }

    /// Socket address the HTTP server binds to. `host` may be an IP literal or a hostname.
    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        let invalid = || {
            ConfigError::InvalidAddress(format!("{}:{}", self.server.host, self.server.port))
        };
        (self.server.host.as_str(), self.server.port)
            .to_socket_addrs()
            .map_err(|_| invalid())?
            .next()
            .ok_or_else(invalid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load(&dir.path().join("absent.toml")).unwrap();

        assert_eq!(settings.server.port, 8080);
        assert_eq!(settings.dashboard.refresh_interval_secs, 30);
        assert_eq!(settings.data.sales_path(), PathBuf::from("data/sales_data.csv"));
        assert!(!settings.inventory.simulate_drift);
    }

    #[test]
    fn toml_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dashboard.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            "[server]\nport = 9100\n\n[data]\ndir = \"fixtures\"\n\n[inventory]\nsimulate_drift = true"
        )
        .unwrap();

        let settings = Settings::load(&path).unwrap();
        assert_eq!(settings.server.port, 9100);
        assert_eq!(settings.server.host, "0.0.0.0");
        assert_eq!(
            settings.data.inventory_path(),
            PathBuf::from("fixtures/inventory_data.csv")
        );
        assert!(settings.inventory.simulate_drift);
        assert_eq!(settings.inventory.drift, 2);
    }

    #[test]
    fn rejects_out_of_range_target() {
        let mut settings = Settings::default();
        settings.dashboard.stock_health_target = 120.0;
        assert!(matches!(
            settings.validate(),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn bind_addr_parses_host_and_port() {
        let settings = Settings::default();
        assert_eq!(settings.bind_addr().unwrap().port(), 8080);

        let mut bad = Settings::default();
        bad.server.host = "not a host".to_string();
        assert!(matches!(bad.bind_addr(), Err(ConfigError::InvalidAddress(_))));
    }

    #[test]
    fn bind_addr_resolves_hostnames() {
        let mut settings = Settings::default();
        settings.server.host = "localhost".to_string();
        settings.server.port = 9100;

        let addr = settings.bind_addr().unwrap();
        assert!(addr.ip().is_loopback());
        assert_eq!(addr.port(), 9100);
    }
}
