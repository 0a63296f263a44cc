//! Normalized observations handed to the learning agent.

use serde::{Deserialize, Serialize};

use super::load::{MAX_NUMBER_USERS, MAX_RATE_DATA, MIN_NUMBER_USERS, MIN_RATE_DATA};

/// Lowest server temperature before the episode ends, °C
pub const MIN_TEMPERATURE: f64 = -20.0;
/// Highest server temperature before the episode ends, °C
pub const MAX_TEMPERATURE: f64 = 80.0;

/// Linear rescale of `value` from `[min, max]` onto `[0, 1]`.
///
/// Values outside the bounds map outside `[0, 1]`; they are not clamped.
pub fn normalize(value: f64, min: f64, max: f64) -> f64 {
    (value - min) / (max - min)
}

/// Normalized `[temperature, users, data rate]` vector
pub fn normalized_state(temperature_ai: f64, number_users: u32, rate_data: u32) -> [f64; 3] {
    [
        normalize(temperature_ai, MIN_TEMPERATURE, MAX_TEMPERATURE),
        normalize(
            number_users as f64,
            MIN_NUMBER_USERS as f64,
            MAX_NUMBER_USERS as f64,
        ),
        normalize(rate_data as f64, MIN_RATE_DATA as f64, MAX_RATE_DATA as f64),
    ]
}

/// What the agent sees after `observe` or `step`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub state: [f64; 3],
    pub reward: f64,
    pub done: bool,
}

impl Observation {
    pub fn scaled_temperature(&self) -> f64 {
        self.state[0]
    }

    pub fn scaled_users(&self) -> f64 {
        self.state[1]
    }

    pub fn scaled_rate_data(&self) -> f64 {
        self.state[2]
    }
}
