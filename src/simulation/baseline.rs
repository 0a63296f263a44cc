//! Non-agent cooling controller used as the energy baseline for the reward.
//!
//! The baseline follows the intrinsic temperature and, whenever that drift takes it
//! out of the optimal range, spends exactly the energy needed to pin it back onto
//! the nearest bound.

use serde::{Deserialize, Serialize};

/// Optimal server temperature band in °C
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TemperatureRange {
    pub min: f64,
    pub max: f64,
}

impl TemperatureRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, temperature: f64) -> bool {
        temperature >= self.min && temperature <= self.max
    }

    pub fn midpoint(&self) -> f64 {
        (self.min + self.max) / 2.0
    }

    /// Nearest point of the range and the distance to it
    pub fn pin(&self, temperature: f64) -> (f64, f64) {
        if temperature < self.min {
            (self.min, self.min - temperature)
        } else if temperature > self.max {
            (self.max, temperature - self.max)
        } else {
            (temperature, 0.0)
        }
    }
}

impl Default for TemperatureRange {
    fn default() -> Self {
        Self::new(18.0, 24.0)
    }
}

impl From<[f64; 2]> for TemperatureRange {
    fn from(range: [f64; 2]) -> Self {
        Self::new(range[0], range[1])
    }
}

/// Deterministic baseline controller state
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BaselineController {
    temperature: f64,
}

impl BaselineController {
    pub fn new(initial_temperature: f64) -> Self {
        Self {
            temperature: initial_temperature,
        }
    }

    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    /// Follow the intrinsic drift, then correct back into `range`.
    ///
    /// Returns the energy spent on the correction.
    pub fn step(&mut self, delta_intrinsic: f64, range: &TemperatureRange) -> f64 {
        let (pinned, energy) = range.pin(self.temperature + delta_intrinsic);
        self.temperature = pinned;
        energy
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pin_inside_range_is_free() {
        let range = TemperatureRange::default();
        assert_eq!(range.pin(21.0), (21.0, 0.0));
        assert_eq!(range.pin(18.0), (18.0, 0.0));
    }

    #[test]
    fn test_pin_outside_range() {
        let range = TemperatureRange::default();
        assert_eq!(range.pin(30.0), (24.0, 6.0));
        assert_eq!(range.pin(15.5), (18.0, 2.5));
    }

    #[test]
    fn test_baseline_cools_hot_servers() {
        let range = TemperatureRange::default();
        let mut baseline = BaselineController::new(126.0);

        let energy = baseline.step(0.0, &range);
        assert!((energy - 102.0).abs() < 1e-9);
        assert_eq!(baseline.temperature(), 24.0);

        // Already pinned and no drift: nothing to spend
        assert_eq!(baseline.step(0.0, &range), 0.0);
    }

    #[test]
    fn test_baseline_heats_cold_servers() {
        let range = TemperatureRange::default();
        let mut baseline = BaselineController::new(20.0);

        let energy = baseline.step(-5.0, &range);
        assert!((energy - 3.0).abs() < 1e-9);
        assert_eq!(baseline.temperature(), 18.0);
    }

    #[test]
    fn test_midpoint() {
        assert_eq!(TemperatureRange::default().midpoint(), 21.0);
    }
}
