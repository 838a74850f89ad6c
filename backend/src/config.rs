//! Configuration management for the Harvest Control platform
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (development.toml, production.toml)
//! 3. Environment variable overrides with HC__ prefix (e.g. HC__DATABASE__URL)

use config::{ConfigError, Environment, File};
use rust_decimal::Decimal;
use serde::Deserialize;
use shared::{validate_bag_weight, BagWeights};

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Server configuration
    pub server: ServerConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// Harvest computation defaults
    pub harvest: HarvestConfig,
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
pub struct HarvestConfig {
    /// Industrial bag weight used when a crop has no override
    pub industrial_bag_kg: Decimal,

    /// Seed bag weight used when a crop has no override
    pub seed_bag_kg: Decimal,

    /// Page size for load listings when none is requested
    pub default_page_size: u32,

    /// Upper bound on requested page sizes
    pub max_page_size: u32,
}

impl HarvestConfig {
    pub fn bag_weights(&self) -> BagWeights {
        BagWeights::new(self.industrial_bag_kg, self.seed_bag_kg)
    }

    /// Reject default bag weights that crop overrides could not use either
    fn validate(&self) -> Result<(), ConfigError> {
        for (key, kg) in [
            ("harvest.industrial_bag_kg", self.industrial_bag_kg),
            ("harvest.seed_bag_kg", self.seed_bag_kg),
        ] {
            validate_bag_weight(kg)
                .map_err(|msg| ConfigError::Message(format!("{}: {}", key, msg)))?;
        }
        Ok(())
    }
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment = std::env::var("HC_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("server.port", 3000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 2)?
            .set_default("harvest.industrial_bag_kg", shared::DEFAULT_INDUSTRIAL_BAG_KG)?
            .set_default("harvest.seed_bag_kg", shared::DEFAULT_SEED_BAG_KG)?
            .set_default("harvest.default_page_size", 50)?
            .set_default("harvest.max_page_size", 500)?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (HC prefix)
            .add_source(
                Environment::with_prefix("HC")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Config = config.try_deserialize()?;
        config.harvest.validate()?;
        Ok(config)
    }
}
