//! Scripted thermostats that drive the cooling environment without learning.

use serde::{Deserialize, Serialize};

use super::pid::PidController;
use super::CoolingPolicy;
use crate::simulation::{
    atmospheric_temperature, Action, Direction, EnvironmentState, TemperatureRange,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProportionalThermostatConfig {
    /// Lower edge of the comfort band, °C
    pub band_low_c: f64,
    /// Upper edge of the comfort band, °C
    pub band_high_c: f64,
    /// Energy per °C outside the band
    pub gain: f64,
    /// Largest energy spent in one step
    pub max_energy: f64,
    /// Energy spent nudging toward the band center while inside it
    pub maintenance_energy: f64,
}

impl Default for ProportionalThermostatConfig {
    fn default() -> Self {
        Self {
            band_low_c: 20.0,
            band_high_c: 22.0,
            gain: 2.0,
            max_energy: 3.0,
            maintenance_energy: 0.1,
        }
    }
}

/// Bang-bang thermostat with proportional energy outside its band
#[derive(Debug, Clone, Default)]
pub struct ProportionalThermostat {
    config: ProportionalThermostatConfig,
}

impl ProportionalThermostat {
    pub fn new(config: ProportionalThermostatConfig) -> Self {
        Self { config }
    }
}

impl CoolingPolicy for ProportionalThermostat {
    fn decide(&mut self, state: &EnvironmentState, month: u8) -> Action {
        let cfg = &self.config;
        let temperature = state.temperature_ai;

        if temperature > cfg.band_high_c {
            let energy = ((temperature - cfg.band_high_c) * cfg.gain).min(cfg.max_energy);
            Action::cool(energy, month)
        } else if temperature < cfg.band_low_c {
            let energy = ((cfg.band_low_c - temperature) * cfg.gain).min(cfg.max_energy);
            Action::heat(energy, month)
        } else {
            let center = (cfg.band_low_c + cfg.band_high_c) / 2.0;
            let direction = if temperature > center {
                Direction::Cooling
            } else {
                Direction::Heating
            };
            Action::new(direction, cfg.maintenance_energy, month)
        }
    }

    fn name(&self) -> &str {
        "proportional thermostat"
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PidThermostatConfig {
    pub kp: f64,
    pub ki: f64,
    pub kd: f64,
    /// Largest energy spent in one step
    pub max_energy: f64,
}

impl Default for PidThermostatConfig {
    fn default() -> Self {
        Self {
            kp: 1.0,
            ki: 0.0,
            kd: 0.0,
            max_energy: 200.0,
        }
    }
}

/// PID loop on the server temperature, targeting the middle of the optimal range.
///
/// The controller acts on the temperature expected after the seasonal change of the
/// coming month, so only the load random walk is left as disturbance.
#[derive(Debug, Clone)]
pub struct PidThermostat {
    pid: PidController,
}

impl PidThermostat {
    pub fn new(config: &PidThermostatConfig, range: &TemperatureRange) -> Self {
        let mut pid = PidController::with_limits(
            config.kp,
            config.ki,
            config.kd,
            -config.max_energy,
            config.max_energy,
            -config.max_energy,
            config.max_energy,
        );
        pid.set_setpoint(range.midpoint());
        Self { pid }
    }

    /// Pure proportional tracking with unit gain
    pub fn tracking(range: &TemperatureRange) -> Self {
        Self::new(&PidThermostatConfig::default(), range)
    }

    pub fn setpoint(&self) -> f64 {
        self.pid.setpoint()
    }
}

impl CoolingPolicy for PidThermostat {
    fn decide(&mut self, state: &EnvironmentState, month: u8) -> Action {
        let seasonal_drift = atmospheric_temperature(month)
            .map_or(0.0, |next| next - state.atmospheric_temperature);
        let expected = state.temperature_ai + seasonal_drift;

        let output = self.pid.update(expected, 1.0);
        let direction = if output < 0.0 {
            Direction::Cooling
        } else {
            Direction::Heating
        };
        Action::new(direction, output.abs(), month)
    }

    fn reset(&mut self) {
        self.pid.reset();
    }

    fn name(&self) -> &str {
        "pid thermostat"
    }
}
