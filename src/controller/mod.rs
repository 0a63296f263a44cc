pub mod pid;
pub mod thermostat;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::simulation::{Action, EnvironmentState};

pub use pid::PidController;
pub use thermostat::{
    PidThermostat, PidThermostatConfig, ProportionalThermostat, ProportionalThermostatConfig,
};

/// Chooses the next action from the environment state.
///
/// Implementations are fixed scripts; learning agents live outside this crate.
pub trait CoolingPolicy {
    fn decide(&mut self, state: &EnvironmentState, month: u8) -> Action;

    /// Clear any per-episode memory
    fn reset(&mut self) {}

    fn name(&self) -> &str;
}

/// Policy selector used by configuration and the CLI
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PolicyKind {
    #[default]
    Proportional,
    Pid,
}
