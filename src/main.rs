use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use tracing::{info, warn};

use server_cooling_env::{
    config::{Config, DEFAULT_CONFIG_PATH},
    controller::{CoolingPolicy, PidThermostat, PolicyKind, ProportionalThermostat},
    rollout::{compare_starting_months, run_episode, EpisodeSummary, MonthComparison},
    simulation::{month_name, Action, CoolingEnvironment, Direction, Observation},
    telemetry::init_tracing,
};

#[derive(Debug, Parser)]
#[command(author, version, about = "Server cooling environment demo runner")]
struct Cli {
    /// Path to the settings TOML file
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Override the random seed of the load random walk
    #[arg(long)]
    seed: Option<u64>,

    /// Override the number of steps of the controller episode
    #[arg(long)]
    steps: Option<usize>,

    /// Override the scripted controller (proportional | pid)
    #[arg(long)]
    policy: Option<PolicyKind>,

    /// Print the report as JSON and log as JSON lines
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Serialize)]
struct DemoStep {
    direction: Direction,
    energy: f64,
    month: u8,
    temperature_before: f64,
    temperature_after: f64,
    observation: Observation,
}

#[derive(Debug, Serialize)]
struct Report {
    initial_observation: Observation,
    demo_steps: Vec<DemoStep>,
    episode: EpisodeSummary,
    comparison: Vec<MonthComparison>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.json);

    let mut cfg = Config::load_from(&cli.config)?;
    if let Some(seed) = cli.seed {
        cfg.environment.random_seed = Some(seed);
    }
    if let Some(steps) = cli.steps {
        cfg.rollout.steps = steps;
    }
    if let Some(policy) = cli.policy {
        cfg.rollout.policy = policy;
    }

    let env_config = cfg.environment_config()?;
    let range = env_config.optimal_temperature_range;
    let mut env = CoolingEnvironment::new(env_config).context("building environment")?;
    info!(
        month = env.month(),
        temperature_ai = env.temperature_ai(),
        mode = %env.mode(),
        "environment ready"
    );

    let initial_observation = env.observe();
    let demo_steps = basic_interaction(&mut env)?;

    let mut policy: Box<dyn CoolingPolicy> = match cfg.rollout.policy {
        PolicyKind::Proportional => {
            Box::new(ProportionalThermostat::new(cfg.controller.proportional.clone()))
        }
        PolicyKind::Pid => Box::new(PidThermostat::new(&cfg.controller.pid, &range)),
    };
    let start_month = cfg.environment.initial_month;
    let episode = run_episode(&mut env, policy.as_mut(), cfg.rollout.steps, start_month)?;

    let comparison = compare_starting_months(
        &mut env,
        &cfg.rollout.comparison_months,
        cfg.rollout.comparison_energy,
    )?;

    let report = Report {
        initial_observation,
        demo_steps,
        episode,
        comparison,
    };

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }
    Ok(())
}

/// A few hand-picked actions from the configured start
fn basic_interaction(env: &mut CoolingEnvironment) -> Result<Vec<DemoStep>> {
    let actions = [
        (Direction::Cooling, 2.0),
        (Direction::Cooling, 1.0),
        (Direction::Heating, 0.5),
        (Direction::Cooling, 1.5),
    ];

    let mut steps = Vec::with_capacity(actions.len());
    for (i, (direction, energy)) in actions.into_iter().enumerate() {
        let month = ((i + 1) % 12) as u8;
        let temperature_before = env.temperature_ai();
        let observation = env.step(Action::new(direction, energy, month))?;

        steps.push(DemoStep {
            direction,
            energy,
            month,
            temperature_before,
            temperature_after: env.temperature_ai(),
            observation,
        });

        if observation.done {
            warn!(step = i + 1, "episode ended, temperature out of bounds");
            break;
        }
    }
    Ok(steps)
}

fn print_report(report: &Report) {
    let obs = &report.initial_observation;
    println!("=== BASIC ENVIRONMENT INTERACTION ===");
    println!(
        "Initial observation: state = [{:.4}, {:.4}, {:.4}], reward = {}, done = {}",
        obs.state[0], obs.state[1], obs.state[2], obs.reward, obs.done
    );
    for (i, step) in report.demo_steps.iter().enumerate() {
        println!(
            "Action {}: {} {:.1} in {} | temp {:.2} -> {:.2} °C | reward {:.6} | done {}",
            i + 1,
            step.direction,
            step.energy,
            month_name(step.month),
            step.temperature_before,
            step.temperature_after,
            step.observation.reward,
            step.observation.done
        );
    }

    let ep = &report.episode;
    println!();
    println!("=== {} ===", ep.policy.to_uppercase());
    println!("Steps: {} (terminated: {})", ep.steps, ep.terminated);
    println!(
        "Average temperature: {:.2} °C (std dev {:.2})",
        ep.mean_temperature, ep.temperature_std_dev
    );
    println!("Average reward: {:.6}", ep.mean_reward);
    println!(
        "Energy: AI {:.2}, non-AI {:.2}, saved {:.2}",
        ep.total_energy_ai, ep.total_energy_noai, ep.energy_saved
    );
    println!("In optimal range: {:.1}%", ep.in_optimal_range * 100.0);

    println!();
    println!("=== RESET AND COMPARISON ===");
    for row in &report.comparison {
        println!(
            "{} ({}): atmospheric {:5.1} °C, initial {:6.2} °C, after cooling {:6.2} °C, reward {:8.6}",
            row.month_name,
            row.month,
            row.atmospheric_temperature,
            row.initial_temperature,
            row.temperature_after_action,
            row.reward
        );
    }
}
