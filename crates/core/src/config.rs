use crate::tables::{CombineWeights, WeightTables};
use config::{Config, ConfigError, Environment};
use serde::{Deserialize, Serialize};

fn default_half_life_floor_days() -> f64 {
    14.0
}

fn default_half_life_cycle_fraction() -> f64 {
    0.3
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Top-level configuration for the attribution engine, loaded the way the
/// reference platform's `AppConfig::load()` does: environment variables
/// under a fixed prefix, `__` as the nesting separator, with `serde`
/// defaults backstopping anything unset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default = "default_half_life_floor_days")]
    pub half_life_floor_days: f64,

    #[serde(default = "default_half_life_cycle_fraction")]
    pub half_life_cycle_fraction: f64,

    #[serde(default)]
    pub weight_tables: WeightTables,

    #[serde(default)]
    pub default_combine_weights: CombineWeights,

    #[serde(default)]
    pub api: ApiConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            half_life_floor_days: default_half_life_floor_days(),
            half_life_cycle_fraction: default_half_life_cycle_fraction(),
            weight_tables: WeightTables::default(),
            default_combine_weights: CombineWeights::default(),
            api: ApiConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Loads configuration from `ATTRIBUTION__*` environment variables
    /// layered over built-in defaults, e.g. `ATTRIBUTION__API__PORT=9090`.
    pub fn load() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let builder = Config::builder()
            .set_default("half_life_floor_days", defaults.half_life_floor_days)?
            .set_default(
                "half_life_cycle_fraction",
                defaults.half_life_cycle_fraction,
            )?
            .set_default("api.host", defaults.api.host)?
            .set_default("api.port", defaults.api.port as i64)?
            .add_source(
                Environment::with_prefix("ATTRIBUTION")
                    .separator("__")
                    .try_parsing(true),
            );

        let cfg = builder.build()?;

        let half_life_floor_days = cfg
            .get("half_life_floor_days")
            .unwrap_or(defaults.half_life_floor_days);
        let half_life_cycle_fraction = cfg
            .get("half_life_cycle_fraction")
            .unwrap_or(defaults.half_life_cycle_fraction);
        let api = ApiConfig {
            host: cfg.get("api.host").unwrap_or(defaults.api.host.clone()),
            port: cfg.get("api.port").unwrap_or(defaults.api.port),
        };

        Ok(Self {
            half_life_floor_days,
            half_life_cycle_fraction,
            weight_tables: defaults.weight_tables,
            default_combine_weights: defaults.default_combine_weights,
            api,
        })
    }

    /// The half-life (in days) used by the time-decay kernel for a deal
    /// with the given sales-cycle length: `max(cycle_days * fraction, floor)`.
    pub fn half_life_days(&self, sales_cycle_days: u32) -> f64 {
        (sales_cycle_days as f64 * self.half_life_cycle_fraction)
            .max(self.half_life_floor_days)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn half_life_respects_floor() {
        let cfg = EngineConfig::default();
        assert_eq!(cfg.half_life_days(10), 14.0);
    }

    #[test]
    fn half_life_scales_with_cycle() {
        let cfg = EngineConfig::default();
        assert_eq!(cfg.half_life_days(100), 30.0);
    }

    #[test]
    fn defaults_load_without_environment() {
        let cfg = EngineConfig::default();
        assert_eq!(cfg.api.port, 8080);
    }
}
