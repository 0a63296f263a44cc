pub mod config;
pub mod controller;
pub mod rollout;
pub mod simulation;
pub mod telemetry;
