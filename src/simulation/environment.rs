//! # Cooling Environment
//!
//! The state machine an external agent drives one action at a time. Each step takes
//! the month, perturbs server load, moves the agent-controlled and baseline
//! temperatures with the intrinsic drift, charges both controllers for their energy
//! and scores the agent against the baseline.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use tracing::{debug, info, warn};

use super::baseline::{BaselineController, TemperatureRange};
use super::climate::{self, atmospheric_temperature, is_valid_month};
use super::error::{EnvResult, EnvironmentError};
use super::load::{ServerLoad, MAX_NUMBER_USERS, MAX_RATE_DATA, MIN_NUMBER_USERS, MIN_RATE_DATA};
use super::observation::{normalized_state, Observation, MAX_TEMPERATURE, MIN_TEMPERATURE};

/// Energy units are scaled down by this factor to form the reward
pub const REWARD_SCALE: f64 = 1e-3;

/// Direction of the agent's thermal action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Lower the server temperature (-1)
    Cooling,
    /// Raise the server temperature (+1)
    Heating,
}

impl Direction {
    pub fn sign(self) -> f64 {
        match self {
            Direction::Cooling => -1.0,
            Direction::Heating => 1.0,
        }
    }
}

impl TryFrom<i32> for Direction {
    type Error = EnvironmentError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            -1 => Ok(Direction::Cooling),
            1 => Ok(Direction::Heating),
            other => Err(EnvironmentError::InvalidAction(format!(
                "direction must be -1 or 1, got {other}"
            ))),
        }
    }
}

/// How the environment reacts when the server temperature leaves the safe band
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Leaving [-20, 80] °C ends the episode
    #[default]
    Training,
    /// Leaving [-20, 80] °C triggers an emergency correction back into the
    /// optimal range; the episode never ends
    Inference,
}

/// One agent decision
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Action {
    pub direction: Direction,
    /// Energy spent on the action, must be finite and >= 0
    pub energy_ai: f64,
    /// Zero-based month the step happens in
    pub month: u8,
}

impl Action {
    pub fn new(direction: Direction, energy_ai: f64, month: u8) -> Self {
        Self {
            direction,
            energy_ai,
            month,
        }
    }

    pub fn cool(energy_ai: f64, month: u8) -> Self {
        Self::new(Direction::Cooling, energy_ai, month)
    }

    pub fn heat(energy_ai: f64, month: u8) -> Self {
        Self::new(Direction::Heating, energy_ai, month)
    }

    /// Build an action from the raw `{-1, 1}` direction encoding used by agents
    pub fn from_raw(direction: i32, energy_ai: f64, month: u8) -> EnvResult<Self> {
        let action = Self::new(Direction::try_from(direction)?, energy_ai, month);
        action.validate()?;
        Ok(action)
    }

    pub fn validate(&self) -> EnvResult<()> {
        if !self.energy_ai.is_finite() || self.energy_ai < 0.0 {
            return Err(EnvironmentError::InvalidAction(format!(
                "energy_ai must be finite and >= 0, got {}",
                self.energy_ai
            )));
        }
        if !is_valid_month(self.month) {
            return Err(EnvironmentError::InvalidAction(format!(
                "month must be in 0..=11, got {}",
                self.month
            )));
        }
        Ok(())
    }
}

/// Environment configuration, fixed at construction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentConfig {
    /// Band the servers should be kept in, °C
    pub optimal_temperature_range: TemperatureRange,
    /// Zero-based starting month
    pub initial_month: u8,
    /// Users connected at the start of every episode
    pub initial_number_users: u32,
    /// Data rate at the start of every episode
    pub initial_rate_data: u32,
    /// Seed for the load random walk (None = entropy)
    pub random_seed: Option<u64>,
    pub mode: Mode,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            optimal_temperature_range: TemperatureRange::default(),
            initial_month: 0,
            initial_number_users: 10,
            initial_rate_data: 60,
            random_seed: None,
            mode: Mode::Training,
        }
    }
}

impl EnvironmentConfig {
    pub fn new(
        optimal_temperature_range: impl Into<TemperatureRange>,
        initial_month: u8,
        initial_number_users: u32,
        initial_rate_data: u32,
    ) -> Self {
        Self {
            optimal_temperature_range: optimal_temperature_range.into(),
            initial_month,
            initial_number_users,
            initial_rate_data,
            ..Default::default()
        }
    }

    /// Set random seed for the load random walk
    pub fn with_random_seed(mut self, seed: u64) -> Self {
        self.random_seed = Some(seed);
        self
    }

    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    pub fn validate(&self) -> EnvResult<()> {
        let range = &self.optimal_temperature_range;
        if !range.min.is_finite() || !range.max.is_finite() || range.min >= range.max {
            return Err(EnvironmentError::InvalidConfiguration(format!(
                "optimal temperature range must be ascending, got [{}, {}]",
                range.min, range.max
            )));
        }
        if !is_valid_month(self.initial_month) {
            return Err(EnvironmentError::InvalidConfiguration(format!(
                "initial month must be in 0..=11, got {}",
                self.initial_month
            )));
        }
        if !ServerLoad::users_in_range(self.initial_number_users) {
            return Err(EnvironmentError::InvalidConfiguration(format!(
                "initial number of users must be in {MIN_NUMBER_USERS}..={MAX_NUMBER_USERS}, got {}",
                self.initial_number_users
            )));
        }
        if !ServerLoad::rate_in_range(self.initial_rate_data) {
            return Err(EnvironmentError::InvalidConfiguration(format!(
                "initial data rate must be in {MIN_RATE_DATA}..={MAX_RATE_DATA}, got {}",
                self.initial_rate_data
            )));
        }
        Ok(())
    }
}

/// Episode lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
pub enum EpisodeStatus {
    Running,
    Terminated,
}

/// Complete environment state snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentState {
    pub month: u8,
    pub atmospheric_temperature: f64,
    pub number_users: u32,
    pub rate_data: u32,
    pub intrinsic_temperature: f64,
    pub temperature_ai: f64,
    pub temperature_noai: f64,
    pub total_energy_ai: f64,
    pub total_energy_noai: f64,
    pub last_reward: f64,
    pub game_over: bool,
}

/// Data-center cooling environment
///
/// Owns all simulation state and its random source. Not meant to be shared between
/// threads without external locking; vectorized training uses one instance per worker.
pub struct CoolingEnvironment<R = StdRng> {
    config: EnvironmentConfig,
    mode: Mode,
    rng: R,
    month: u8,
    atmospheric_temperature: f64,
    load: ServerLoad,
    intrinsic_temperature: f64,
    temperature_ai: f64,
    baseline: BaselineController,
    total_energy_ai: f64,
    total_energy_noai: f64,
    last_reward: f64,
    game_over: bool,
}

impl CoolingEnvironment<StdRng> {
    /// Create an environment seeded from `config.random_seed`
    pub fn new(config: EnvironmentConfig) -> EnvResult<Self> {
        let rng = match config.random_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::with_rng(config, rng)
    }
}

impl<R: Rng> CoolingEnvironment<R> {
    /// Create an environment driven by an explicit random source
    pub fn with_rng(config: EnvironmentConfig, rng: R) -> EnvResult<Self> {
        config.validate()?;
        let month = config.initial_month;

        let mut env = Self {
            mode: config.mode,
            month: config.initial_month,
            atmospheric_temperature: 0.0,
            load: ServerLoad::new(config.initial_number_users, config.initial_rate_data),
            intrinsic_temperature: 0.0,
            temperature_ai: 0.0,
            baseline: BaselineController::new(0.0),
            total_energy_ai: 0.0,
            total_energy_noai: 0.0,
            last_reward: 0.0,
            game_over: false,
            config,
            rng,
        };
        env.start_episode(month);
        Ok(env)
    }

    /// Current normalized state, last reward and termination flag
    pub fn observe(&self) -> Observation {
        Observation {
            state: normalized_state(
                self.temperature_ai,
                self.load.number_users,
                self.load.rate_data,
            ),
            reward: self.last_reward,
            done: self.game_over,
        }
    }

    /// Advance the simulation by one step.
    ///
    /// Fails without touching any state if the episode has ended or the action is invalid.
    pub fn step(&mut self, action: Action) -> EnvResult<Observation> {
        if self.game_over {
            return Err(EnvironmentError::EpisodeEnded);
        }
        action.validate()?;
        let atmospheric = atmospheric_temperature(action.month).ok_or_else(|| {
            EnvironmentError::InvalidAction(format!("no climate data for month {}", action.month))
        })?;

        self.month = action.month;
        self.atmospheric_temperature = atmospheric;
        self.load.perturb(&mut self.rng);

        let intrinsic = self.load.intrinsic_temperature(atmospheric);
        let delta_intrinsic = intrinsic - self.intrinsic_temperature;
        self.intrinsic_temperature = intrinsic;

        // The agent's correction offset from the intrinsic temperature persists between steps
        self.temperature_ai += delta_intrinsic + action.direction.sign() * action.energy_ai;

        let energy_noai = self
            .baseline
            .step(delta_intrinsic, &self.config.optimal_temperature_range);

        let reward = (energy_noai - action.energy_ai) * REWARD_SCALE;
        self.last_reward = reward;
        self.total_energy_ai += action.energy_ai;
        self.total_energy_noai += energy_noai;

        self.enforce_safe_band();

        debug!(
            month = self.month,
            direction = %action.direction,
            energy_ai = action.energy_ai,
            energy_noai,
            temperature_ai = self.temperature_ai,
            intrinsic_temperature = intrinsic,
            reward,
            "environment step"
        );

        Ok(self.observe())
    }

    /// Start a new episode in `month` with the configured initial load.
    ///
    /// The random source is not re-seeded.
    pub fn reset(&mut self, month: u8) -> EnvResult<()> {
        if !is_valid_month(month) {
            return Err(EnvironmentError::InvalidAction(format!(
                "month must be in 0..=11, got {month}"
            )));
        }
        self.start_episode(month);
        info!(
            month,
            month_name = climate::month_name(month),
            temperature_ai = self.temperature_ai,
            "environment reset"
        );
        Ok(())
    }

    pub fn set_mode(&mut self, mode: Mode) {
        self.mode = mode;
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn config(&self) -> &EnvironmentConfig {
        &self.config
    }

    pub fn optimal_temperature_range(&self) -> TemperatureRange {
        self.config.optimal_temperature_range
    }

    pub fn month(&self) -> u8 {
        self.month
    }

    pub fn atmospheric_temperature(&self) -> f64 {
        self.atmospheric_temperature
    }

    pub fn number_users(&self) -> u32 {
        self.load.number_users
    }

    pub fn rate_data(&self) -> u32 {
        self.load.rate_data
    }

    pub fn intrinsic_temperature(&self) -> f64 {
        self.intrinsic_temperature
    }

    pub fn temperature_ai(&self) -> f64 {
        self.temperature_ai
    }

    pub fn temperature_noai(&self) -> f64 {
        self.baseline.temperature()
    }

    pub fn total_energy_ai(&self) -> f64 {
        self.total_energy_ai
    }

    pub fn total_energy_noai(&self) -> f64 {
        self.total_energy_noai
    }

    /// Energy the agent saved relative to the baseline so far this episode
    pub fn energy_saved(&self) -> f64 {
        self.total_energy_noai - self.total_energy_ai
    }

    pub fn last_reward(&self) -> f64 {
        self.last_reward
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    pub fn status(&self) -> EpisodeStatus {
        if self.game_over {
            EpisodeStatus::Terminated
        } else {
            EpisodeStatus::Running
        }
    }

    /// Get current complete environment state
    pub fn state(&self) -> EnvironmentState {
        EnvironmentState {
            month: self.month,
            atmospheric_temperature: self.atmospheric_temperature,
            number_users: self.load.number_users,
            rate_data: self.load.rate_data,
            intrinsic_temperature: self.intrinsic_temperature,
            temperature_ai: self.temperature_ai,
            temperature_noai: self.baseline.temperature(),
            total_energy_ai: self.total_energy_ai,
            total_energy_noai: self.total_energy_noai,
            last_reward: self.last_reward,
            game_over: self.game_over,
        }
    }

    fn start_episode(&mut self, month: u8) {
        // Callers validate the month first
        let atmospheric = atmospheric_temperature(month).unwrap_or_default();
        let load = ServerLoad::new(
            self.config.initial_number_users,
            self.config.initial_rate_data,
        );
        let intrinsic = load.intrinsic_temperature(atmospheric);

        self.month = month;
        self.atmospheric_temperature = atmospheric;
        self.load = load;
        self.intrinsic_temperature = intrinsic;
        self.temperature_ai = intrinsic;
        self.baseline = BaselineController::new(intrinsic);
        self.total_energy_ai = 0.0;
        self.total_energy_noai = 0.0;
        self.last_reward = 0.0;
        self.game_over = false;
    }

    fn enforce_safe_band(&mut self) {
        if (MIN_TEMPERATURE..=MAX_TEMPERATURE).contains(&self.temperature_ai) {
            return;
        }

        match self.mode {
            Mode::Training => {
                self.game_over = true;
                info!(
                    temperature_ai = self.temperature_ai,
                    total_energy_ai = self.total_energy_ai,
                    total_energy_noai = self.total_energy_noai,
                    "server temperature left the safe band, episode over"
                );
            }
            Mode::Inference => {
                let (pinned, correction) = self
                    .config
                    .optimal_temperature_range
                    .pin(self.temperature_ai);
                warn!(
                    temperature_ai = self.temperature_ai,
                    corrected_to = pinned,
                    correction_energy = correction,
                    "emergency correction of server temperature"
                );
                self.temperature_ai = pinned;
                self.total_energy_ai += correction;
            }
        }
    }
}

impl<R> std::fmt::Debug for CoolingEnvironment<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoolingEnvironment")
            .field("mode", &self.mode)
            .field("month", &self.month)
            .field("load", &self.load)
            .field("temperature_ai", &self.temperature_ai)
            .field("temperature_noai", &self.baseline.temperature())
            .field("total_energy_ai", &self.total_energy_ai)
            .field("total_energy_noai", &self.total_energy_noai)
            .field("game_over", &self.game_over)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::mock::StepRng;
    use rstest::rstest;

    fn reference_config() -> EnvironmentConfig {
        EnvironmentConfig::new([18.0, 24.0], 0, 20, 80).with_random_seed(42)
    }

    fn reference_env() -> CoolingEnvironment {
        CoolingEnvironment::new(reference_config()).unwrap()
    }

    #[test]
    fn test_initial_state() {
        let env = reference_env();

        assert_eq!(env.atmospheric_temperature(), 1.0);
        assert!((env.intrinsic_temperature() - 126.0).abs() < 1e-9);
        assert!((env.temperature_ai() - 126.0).abs() < 1e-9);
        assert_eq!(env.temperature_ai(), env.temperature_noai());
        assert_eq!(env.total_energy_ai(), 0.0);
        assert_eq!(env.total_energy_noai(), 0.0);
        assert!(!env.is_game_over());
        assert_eq!(env.status(), EpisodeStatus::Running);
    }

    #[test]
    fn test_initial_observation() {
        let env = reference_env();
        let obs = env.observe();

        assert_eq!(obs.reward, 0.0);
        assert!(!obs.done);
        assert!((obs.state[0] - 1.46).abs() < 1e-9);
        assert!((obs.state[1] - 10.0 / 90.0).abs() < 1e-9);
        assert!((obs.state[2] - 60.0 / 280.0).abs() < 1e-9);
    }

    #[rstest]
    #[case(EnvironmentConfig::new([24.0, 18.0], 0, 20, 80))]
    #[case(EnvironmentConfig::new([18.0, 18.0], 0, 20, 80))]
    #[case(EnvironmentConfig::new([f64::NAN, 24.0], 0, 20, 80))]
    #[case(EnvironmentConfig::new([18.0, 24.0], 12, 20, 80))]
    #[case(EnvironmentConfig::new([18.0, 24.0], 0, 9, 80))]
    #[case(EnvironmentConfig::new([18.0, 24.0], 0, 101, 80))]
    #[case(EnvironmentConfig::new([18.0, 24.0], 0, 20, 19))]
    #[case(EnvironmentConfig::new([18.0, 24.0], 0, 20, 301))]
    fn test_invalid_configuration(#[case] config: EnvironmentConfig) {
        let err = CoolingEnvironment::new(config).unwrap_err();
        assert!(matches!(err, EnvironmentError::InvalidConfiguration(_)));
    }

    #[test]
    fn test_step_reward_matches_baseline_energy() {
        let mut env = reference_env();
        let obs = env.step(Action::cool(2.0, 0)).unwrap();

        // The baseline started at the intrinsic temperature, far above 24 °C,
        // so it paid to pin itself to the upper bound.
        let energy_noai = env.total_energy_noai();
        assert!(energy_noai > 2.0);
        assert_eq!(env.temperature_noai(), 24.0);
        assert!((obs.reward - (energy_noai - 2.0) * REWARD_SCALE).abs() < 1e-12);
        assert!(obs.reward > 0.0);
        assert_eq!(env.total_energy_ai(), 2.0);
    }

    #[test]
    fn test_agent_offset_follows_action() {
        let mut env = reference_env();
        env.step(Action::cool(100.0, 0)).unwrap();
        let offset = env.temperature_ai() - env.intrinsic_temperature();
        assert!((offset + 100.0).abs() < 1e-9);

        // Zero energy keeps the offset and costs nothing
        let before = env.total_energy_ai();
        env.step(Action::heat(0.0, 0)).unwrap();
        let offset = env.temperature_ai() - env.intrinsic_temperature();
        assert!((offset + 100.0).abs() < 1e-9);
        assert_eq!(env.total_energy_ai(), before);
    }

    #[test]
    fn test_hot_start_terminates_without_enough_cooling() {
        let mut env = reference_env();
        let obs = env.step(Action::cool(2.0, 0)).unwrap();

        assert!(env.temperature_ai() > MAX_TEMPERATURE);
        assert!(obs.done);
        assert_eq!(env.status(), EpisodeStatus::Terminated);
    }

    #[test]
    fn test_step_after_termination_is_rejected() {
        let mut env = reference_env();
        env.step(Action::cool(2.0, 0)).unwrap();
        assert!(env.is_game_over());

        let before = env.state();
        let err = env.step(Action::cool(100.0, 0)).unwrap_err();
        assert_eq!(err, EnvironmentError::EpisodeEnded);
        assert_eq!(env.state(), before);

        // observe still works while terminated
        assert!(env.observe().done);
    }

    #[rstest]
    #[case(Action::cool(-1.0, 0))]
    #[case(Action::cool(f64::NAN, 0))]
    #[case(Action::heat(f64::INFINITY, 0))]
    #[case(Action::cool(1.0, 12))]
    fn test_invalid_action_leaves_state_untouched(#[case] action: Action) {
        let mut env = reference_env();
        let before = env.state();

        let err = env.step(action).unwrap_err();
        assert!(matches!(err, EnvironmentError::InvalidAction(_)));
        assert_eq!(env.state(), before);
    }

    #[rstest]
    #[case(0)]
    #[case(2)]
    #[case(-2)]
    fn test_invalid_raw_direction(#[case] direction: i32) {
        let err = Action::from_raw(direction, 1.0, 0).unwrap_err();
        assert!(matches!(err, EnvironmentError::InvalidAction(_)));
    }

    #[test]
    fn test_raw_direction_encoding() {
        assert_eq!(
            Action::from_raw(-1, 1.0, 3).unwrap().direction,
            Direction::Cooling
        );
        assert_eq!(
            Action::from_raw(1, 1.0, 3).unwrap().direction,
            Direction::Heating
        );
    }

    #[test]
    fn test_reset_clears_episode() {
        let mut env = reference_env();
        env.step(Action::cool(2.0, 0)).unwrap();
        assert!(env.is_game_over());

        env.reset(6).unwrap();
        assert!(!env.is_game_over());
        assert_eq!(env.total_energy_ai(), 0.0);
        assert_eq!(env.total_energy_noai(), 0.0);
        assert_eq!(env.last_reward(), 0.0);
        assert_eq!(env.month(), 6);
        assert_eq!(env.atmospheric_temperature(), 23.0);
        assert_eq!(env.number_users(), 20);
        assert_eq!(env.rate_data(), 80);
        assert!((env.temperature_ai() - 148.0).abs() < 1e-9);
    }

    #[test]
    fn test_reset_rejects_invalid_month() {
        let mut env = reference_env();
        assert!(matches!(
            env.reset(12),
            Err(EnvironmentError::InvalidAction(_))
        ));
    }

    #[test]
    fn test_consecutive_resets_identical() {
        let mut env = reference_env();
        env.step(Action::cool(110.0, 0)).unwrap();

        env.reset(5).unwrap();
        let first = env.observe();
        env.reset(5).unwrap();
        let second = env.observe();
        assert_eq!(first, second);
    }

    #[test]
    fn test_observe_is_idempotent() {
        let mut env = reference_env();
        env.step(Action::cool(105.0, 1)).unwrap();
        assert_eq!(env.observe(), env.observe());
    }

    #[test]
    fn test_injected_rng_walk() {
        // StepRng(0, 0) always yields the lowest value of each range
        let config = EnvironmentConfig::new([18.0, 24.0], 0, 20, 80);
        let mut env = CoolingEnvironment::with_rng(config, StepRng::new(0, 0)).unwrap();

        env.step(Action::cool(110.0, 0)).unwrap();
        assert_eq!(env.number_users(), 15);
        assert_eq!(env.rate_data(), 70);
        // 1 + 1.25 * 15 + 1.25 * 70
        assert!((env.intrinsic_temperature() - 107.25).abs() < 1e-9);
        assert!((env.temperature_ai() - (107.25 - 110.0)).abs() < 1e-9);
    }

    #[test]
    fn test_inference_mode_corrects_instead_of_terminating() {
        let config = reference_config().with_mode(Mode::Inference);
        let mut env = CoolingEnvironment::new(config).unwrap();

        let obs = env.step(Action::cool(2.0, 0)).unwrap();
        assert!(!obs.done);
        assert_eq!(env.temperature_ai(), 24.0);
        // Action energy plus the emergency correction
        assert!(env.total_energy_ai() > 2.0);
    }

    #[test]
    fn test_mode_switch() {
        let mut env = reference_env();
        assert_eq!(env.mode(), Mode::Training);
        env.set_mode(Mode::Inference);
        assert_eq!(env.mode(), Mode::Inference);
        env.step(Action::cool(0.0, 0)).unwrap();
        assert!(!env.is_game_over());
    }

    #[test]
    fn test_same_seed_same_trajectory() {
        let mut a = reference_env();
        let mut b = reference_env();

        for month in 0..12 {
            let action = Action::cool(if month == 0 { 105.0 } else { 0.0 }, month);
            if a.is_game_over() {
                break;
            }
            assert_eq!(a.step(action).unwrap(), b.step(action).unwrap());
        }
        assert_eq!(a.state(), b.state());
    }

    #[test]
    fn test_direction_strings() {
        assert_eq!(Direction::Cooling.to_string(), "cooling");
        assert_eq!("heating".parse::<Direction>().unwrap(), Direction::Heating);
        assert_eq!("inference".parse::<Mode>().unwrap(), Mode::Inference);
    }
}
