//! Episode runner for scripted controllers, with per-episode statistics.

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::controller::CoolingPolicy;
use crate::simulation::{climate, Action, CoolingEnvironment, EnvResult};

/// Statistics of one episode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpisodeSummary {
    pub policy: String,
    pub start_month: u8,
    pub steps: usize,
    /// Whether the episode ended by leaving the safe band
    pub terminated: bool,
    /// Mean server temperature seen before each action, °C
    pub mean_temperature: f64,
    pub temperature_std_dev: f64,
    pub mean_reward: f64,
    pub total_energy_ai: f64,
    pub total_energy_noai: f64,
    pub energy_saved: f64,
    /// Share of steps that started inside the optimal range
    pub in_optimal_range: f64,
}

/// Reset `env` to `start_month` and let `policy` drive it for up to `max_steps`.
///
/// Months advance cyclically from `start_month`. The run stops early when the
/// episode terminates.
pub fn run_episode<R, P>(
    env: &mut CoolingEnvironment<R>,
    policy: &mut P,
    max_steps: usize,
    start_month: u8,
) -> EnvResult<EpisodeSummary>
where
    R: Rng,
    P: CoolingPolicy + ?Sized,
{
    env.reset(start_month)?;
    policy.reset();

    let range = env.optimal_temperature_range();
    let mut temperatures = Vec::with_capacity(max_steps);
    let mut rewards = Vec::with_capacity(max_steps);
    let mut terminated = false;

    for step in 0..max_steps {
        let month = ((start_month as usize + step) % climate::MONTHS_PER_YEAR as usize) as u8;
        let state = env.state();
        temperatures.push(state.temperature_ai);

        let action = policy.decide(&state, month);
        let obs = env.step(action)?;
        rewards.push(obs.reward);

        debug!(
            step,
            month,
            temperature_ai = env.temperature_ai(),
            reward = obs.reward,
            "rollout step"
        );

        if obs.done {
            terminated = true;
            break;
        }
    }

    let in_range = temperatures.iter().filter(|t| range.contains(**t)).count();
    let summary = EpisodeSummary {
        policy: policy.name().to_string(),
        start_month,
        steps: rewards.len(),
        terminated,
        mean_temperature: mean(&temperatures),
        temperature_std_dev: std_dev(&temperatures),
        mean_reward: mean(&rewards),
        total_energy_ai: env.total_energy_ai(),
        total_energy_noai: env.total_energy_noai(),
        energy_saved: env.energy_saved(),
        in_optimal_range: if temperatures.is_empty() {
            0.0
        } else {
            in_range as f64 / temperatures.len() as f64
        },
    };

    info!(
        policy = %summary.policy,
        steps = summary.steps,
        terminated = summary.terminated,
        energy_saved = summary.energy_saved,
        "episode finished"
    );

    Ok(summary)
}

/// Outcome of the same cooling action taken at the start of a given month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthComparison {
    pub month: u8,
    pub month_name: String,
    pub atmospheric_temperature: f64,
    pub initial_temperature: f64,
    pub temperature_after_action: f64,
    pub reward: f64,
}

/// Reset into each month and apply `action_energy` of cooling once.
pub fn compare_starting_months<R: Rng>(
    env: &mut CoolingEnvironment<R>,
    months: &[u8],
    action_energy: f64,
) -> EnvResult<Vec<MonthComparison>> {
    months
        .iter()
        .map(|&month| -> EnvResult<MonthComparison> {
            env.reset(month)?;
            let atmospheric_temperature = env.atmospheric_temperature();
            let initial_temperature = env.temperature_ai();

            let obs = env.step(Action::cool(action_energy, month))?;

            Ok(MonthComparison {
                month,
                month_name: climate::month_name(month).to_string(),
                atmospheric_temperature,
                initial_temperature,
                temperature_after_action: env.temperature_ai(),
                reward: obs.reward,
            })
        })
        .collect()
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation
fn std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}
