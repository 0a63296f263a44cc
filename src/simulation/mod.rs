//! # Server Cooling Simulation
//!
//! Single-step simulation of a data-center cooling process that a reinforcement
//! learning agent drives one action at a time.
//!
//! ## Components
//!
//! - **Climate**: fixed monthly atmospheric temperature profile
//! - **Load**: bounded random walk of connected users and data rate
//! - **Baseline**: deterministic non-agent controller the reward compares against
//! - **Observation**: normalized state vector handed to the agent
//! - **Environment**: the state machine tying the above together
//!
//! ## Usage
//!
//! ```rust
//! use server_cooling_env::simulation::{Action, CoolingEnvironment, EnvironmentConfig};
//!
//! let config = EnvironmentConfig::new([18.0, 24.0], 0, 20, 80).with_random_seed(42);
//! let mut env = CoolingEnvironment::new(config)?;
//!
//! let initial = env.observe();
//! assert!(!initial.done);
//!
//! // Cool hard enough to bring the servers into the safe band
//! let obs = env.step(Action::cool(105.0, 0))?;
//! assert!(!obs.done);
//!
//! env.reset(6)?;
//! # Ok::<(), server_cooling_env::simulation::EnvironmentError>(())
//! ```

pub mod baseline;
pub mod climate;
pub mod environment;
pub mod error;
pub mod load;
pub mod observation;

pub use baseline::{BaselineController, TemperatureRange};
pub use climate::{atmospheric_temperature, month_name, MONTHLY_ATMOSPHERIC_TEMPERATURES};
pub use environment::{
    Action, CoolingEnvironment, Direction, EnvironmentConfig, EnvironmentState, EpisodeStatus,
    Mode, REWARD_SCALE,
};
pub use error::{EnvResult, EnvironmentError};
pub use load::ServerLoad;
pub use observation::{normalize, normalized_state, Observation, MAX_TEMPERATURE, MIN_TEMPERATURE};
