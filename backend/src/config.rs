//! Configuration management for the inventory ledger server
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (config/development.toml, config/production.toml)
//! 3. Environment variable overrides with INV_ prefix and `__` separator

use chrono_tz::Tz;
use config::{ConfigError, Environment, File};
use rust_decimal::Decimal;
use serde::Deserialize;

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Server configuration
    pub server: ServerConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// Inventory accounting rules
    pub inventory: InventoryConfig,

    /// Product catalog settings
    pub catalog: CatalogConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server port
    pub port: u16,

    /// Server host
    pub host: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Minimum number of connections in the pool
    pub min_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct InventoryConfig {
    /// Markup applied to IN movements that carry neither a sale price nor a margin
    pub default_profit_margin_percent: Decimal,

    /// IANA zone that defines day boundaries for date filters
    pub timezone: Tz,

    /// Reactivate a depleted product when stock comes back in
    pub reactivate_on_restock: bool,

    /// Page size for ledger listings when none is requested
    pub default_list_limit: i64,

    /// Largest page size a ledger listing may request
    pub max_list_limit: i64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CatalogConfig {
    /// Store code placed in front of generated SKUs
    pub sku_prefix: String,
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment = std::env::var("INV_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = Self::defaults(config::Config::builder(), &environment)?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (INV_ prefix)
            .add_source(
                Environment::with_prefix("INV")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let loaded: Self = config.try_deserialize()?;
        loaded.validate()?;
        Ok(loaded)
    }

    fn defaults(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
        environment: &str,
    ) -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        builder
            .set_default("environment", environment)?
            .set_default("server.port", 3000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 2)?
            .set_default("inventory.default_profit_margin_percent", "100")?
            .set_default("inventory.timezone", shared::DEFAULT_TIMEZONE.name())?
            .set_default("inventory.reactivate_on_restock", false)?
            .set_default("inventory.default_list_limit", shared::DEFAULT_LIST_LIMIT)?
            .set_default("inventory.max_list_limit", shared::MAX_LIST_LIMIT)?
            .set_default("catalog.sku_prefix", "KND")
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.inventory.default_list_limit < 1
            || self.inventory.default_list_limit > self.inventory.max_list_limit
        {
            return Err(ConfigError::Message(
                "inventory.default_list_limit must be between 1 and inventory.max_list_limit"
                    .to_string(),
            ));
        }
        if self.inventory.default_profit_margin_percent < Decimal::ZERO {
            return Err(ConfigError::Message(
                "inventory.default_profit_margin_percent cannot be negative".to_string(),
            ));
        }
        if self.catalog.sku_prefix.trim().is_empty() || self.catalog.sku_prefix.contains('-') {
            return Err(ConfigError::Message(
                "catalog.sku_prefix must be non-empty and must not contain '-'".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            host: "0.0.0.0".to_string(),
        }
    }
}

impl Default for InventoryConfig {
    fn default() -> Self {
        Self {
            default_profit_margin_percent: Decimal::ONE_HUNDRED,
            timezone: shared::DEFAULT_TIMEZONE,
            reactivate_on_restock: false,
            default_list_limit: shared::DEFAULT_LIST_LIMIT,
            max_list_limit: shared::MAX_LIST_LIMIT,
        }
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            sku_prefix: "KND".to_string(),
        }
    }
}
