use anyhow::{Context, Result};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use validator::Validate;

use crate::controller::{PidThermostatConfig, PolicyKind, ProportionalThermostatConfig};
use crate::simulation::{EnvironmentConfig, EnvironmentError, Mode, TemperatureRange};

pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";
pub const ENV_PREFIX: &str = "COOLING__";

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct Config {
    #[validate(nested)]
    pub environment: EnvironmentSettings,
    #[validate(nested)]
    pub rollout: RolloutSettings,
    #[serde(default)]
    pub controller: ControllerSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct EnvironmentSettings {
    pub optimal_temperature_min: f64,
    pub optimal_temperature_max: f64,
    #[validate(range(max = 11))]
    pub initial_month: u8,
    #[validate(range(min = 10, max = 100))]
    pub initial_number_users: u32,
    #[validate(range(min = 20, max = 300))]
    pub initial_rate_data: u32,
    pub random_seed: Option<u64>,
    #[serde(default)]
    pub mode: Mode,
}

impl Default for EnvironmentSettings {
    fn default() -> Self {
        Self {
            optimal_temperature_min: 18.0,
            optimal_temperature_max: 24.0,
            initial_month: 0,
            initial_number_users: 20,
            initial_rate_data: 80,
            random_seed: None,
            mode: Mode::Training,
        }
    }
}

impl TryFrom<&EnvironmentSettings> for EnvironmentConfig {
    type Error = EnvironmentError;

    fn try_from(settings: &EnvironmentSettings) -> Result<Self, Self::Error> {
        settings
            .validate()
            .map_err(|e| EnvironmentError::InvalidConfiguration(e.to_string()))?;

        let config = EnvironmentConfig {
            optimal_temperature_range: TemperatureRange::new(
                settings.optimal_temperature_min,
                settings.optimal_temperature_max,
            ),
            initial_month: settings.initial_month,
            initial_number_users: settings.initial_number_users,
            initial_rate_data: settings.initial_rate_data,
            random_seed: settings.random_seed,
            mode: settings.mode,
        };
        config.validate()?;
        Ok(config)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RolloutSettings {
    #[validate(range(min = 1))]
    pub steps: usize,
    pub policy: PolicyKind,
    /// Months compared by the fixed-action comparison run
    pub comparison_months: Vec<u8>,
    #[validate(range(min = 0.0))]
    pub comparison_energy: f64,
}

impl Default for RolloutSettings {
    fn default() -> Self {
        Self {
            steps: 50,
            policy: PolicyKind::Proportional,
            comparison_months: vec![0, 3, 6, 9],
            comparison_energy: 2.0,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ControllerSettings {
    #[serde(default)]
    pub proportional: ProportionalThermostatConfig,
    #[serde(default)]
    pub pid: PidThermostatConfig,
}

impl Config {
    /// Built-in defaults, then the TOML file, then `COOLING__*` environment variables
    pub fn figment(path: impl AsRef<Path>) -> Figment {
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    pub fn load() -> Result<Self> {
        Self::load_from(DEFAULT_CONFIG_PATH)
    }

    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        Self::from_figment(Self::figment(path))
            .with_context(|| format!("loading settings from {}", path.display()))
    }

    pub fn from_figment(figment: Figment) -> Result<Self> {
        let cfg: Config = figment.extract().context("invalid settings")?;
        cfg.validate().context("settings out of range")?;
        Ok(cfg)
    }

    pub fn environment_config(&self) -> Result<EnvironmentConfig> {
        EnvironmentConfig::try_from(&self.environment).context("invalid environment settings")
    }
}
