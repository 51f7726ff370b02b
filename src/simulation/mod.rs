pub mod simulation;
pub mod simulation_config;
pub mod simulation_error;
