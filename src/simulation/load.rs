//! # Server Load Random Walk
//!
//! Number of connected users and data-processing rate drift by a bounded uniform
//! random step every simulation step, clamped to their operating ranges.

use rand::Rng;
use serde::{Deserialize, Serialize};

pub const MIN_NUMBER_USERS: u32 = 10;
pub const MAX_NUMBER_USERS: u32 = 100;
/// Largest per-step change in connected users
pub const MAX_UPDATE_USERS: i64 = 5;

pub const MIN_RATE_DATA: u32 = 20;
pub const MAX_RATE_DATA: u32 = 300;
/// Largest per-step change in data rate
pub const MAX_UPDATE_DATA: i64 = 10;

/// Heat contributed per user and per unit of data rate, in °C
pub const HEAT_PER_USER: f64 = 1.25;
pub const HEAT_PER_DATA_UNIT: f64 = 1.25;

/// Load placed on the servers at a given step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerLoad {
    /// Connected users, within [10, 100]
    pub number_users: u32,
    /// Data-processing rate, within [20, 300]
    pub rate_data: u32,
}

impl ServerLoad {
    pub fn new(number_users: u32, rate_data: u32) -> Self {
        Self {
            number_users,
            rate_data,
        }
    }

    pub fn users_in_range(number_users: u32) -> bool {
        (MIN_NUMBER_USERS..=MAX_NUMBER_USERS).contains(&number_users)
    }

    pub fn rate_in_range(rate_data: u32) -> bool {
        (MIN_RATE_DATA..=MAX_RATE_DATA).contains(&rate_data)
    }

    /// Apply one random-walk step to both quantities
    pub fn perturb<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let users_delta = rng.gen_range(-MAX_UPDATE_USERS..=MAX_UPDATE_USERS);
        let data_delta = rng.gen_range(-MAX_UPDATE_DATA..=MAX_UPDATE_DATA);

        self.number_users = walk(
            self.number_users,
            users_delta,
            MIN_NUMBER_USERS,
            MAX_NUMBER_USERS,
        );
        self.rate_data = walk(self.rate_data, data_delta, MIN_RATE_DATA, MAX_RATE_DATA);
    }

    /// Temperature the servers would reach from ambient air and load alone
    pub fn intrinsic_temperature(&self, atmospheric_temperature: f64) -> f64 {
        atmospheric_temperature
            + HEAT_PER_USER * self.number_users as f64
            + HEAT_PER_DATA_UNIT * self.rate_data as f64
    }
}

fn walk(value: u32, delta: i64, min: u32, max: u32) -> u32 {
    let moved = (value as i64 + delta).clamp(min as i64, max as i64);
    moved as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_intrinsic_temperature() {
        let load = ServerLoad::new(20, 80);
        assert!((load.intrinsic_temperature(1.0) - 126.0).abs() < 1e-9);
    }

    #[test]
    fn test_walk_clamps() {
        assert_eq!(walk(10, -5, MIN_NUMBER_USERS, MAX_NUMBER_USERS), 10);
        assert_eq!(walk(98, 5, MIN_NUMBER_USERS, MAX_NUMBER_USERS), 100);
        assert_eq!(walk(295, 10, MIN_RATE_DATA, MAX_RATE_DATA), 300);
        assert_eq!(walk(50, -3, MIN_NUMBER_USERS, MAX_NUMBER_USERS), 47);
    }

    #[test]
    fn test_perturb_stays_bounded() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut load = ServerLoad::new(MIN_NUMBER_USERS, MAX_RATE_DATA);

        for _ in 0..10_000 {
            let before = load;
            load.perturb(&mut rng);

            assert!(ServerLoad::users_in_range(load.number_users));
            assert!(ServerLoad::rate_in_range(load.rate_data));
            assert!((load.number_users as i64 - before.number_users as i64).abs() <= MAX_UPDATE_USERS);
            assert!((load.rate_data as i64 - before.rate_data as i64).abs() <= MAX_UPDATE_DATA);
        }
    }

    #[test]
    fn test_perturb_is_reproducible() {
        let mut a = ServerLoad::new(50, 150);
        let mut b = a;
        let mut rng_a = StdRng::seed_from_u64(7);
        let mut rng_b = StdRng::seed_from_u64(7);

        for _ in 0..100 {
            a.perturb(&mut rng_a);
            b.perturb(&mut rng_b);
        }
        assert_eq!(a, b);
    }
}
