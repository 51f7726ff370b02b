pub mod dispatcher;
pub mod drones;
pub mod fire_incident;
pub mod monitoring;
pub mod simulation;
pub mod simulation_clock;
pub mod utils;
