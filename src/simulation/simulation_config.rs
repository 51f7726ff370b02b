use std::{fs::File, io::BufReader};

use chrono::{NaiveTime, Timelike};
use serde::Deserialize;

use crate::drones::drone_config::DroneConfig;

use super::simulation_error::SimulationError;

/// Configuracion de una corrida, levantada de un JSON.
/// Los campos que faltan toman su valor por defecto.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct SimulationConfig {
    pub fleet_size: usize,
    pub speed_multiplier: f64,

    /// Hora simulada de arranque, como HH:MM:SS.
    pub start_time: String,

    /// Cada cuanto (tiempo real) el monitor loguea el estado del Dispatcher.
    pub status_interval_ms: u64,

    pub drone: DroneConfig,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            fleet_size: 2,
            speed_multiplier: 60.0,
            start_time: "00:00:00".to_string(),
            status_interval_ms: 1000,
            drone: DroneConfig::default(),
        }
    }
}

impl SimulationConfig {
    pub fn new(config_file_path: &str) -> Result<SimulationConfig, SimulationError> {
        let config_file = File::open(config_file_path).map_err(|err| {
            SimulationError::ReadingConfigFile(format!("{}: {}", config_file_path, err))
        })?;

        let reader = BufReader::new(config_file);
        let config: SimulationConfig = serde_json::from_reader(reader).map_err(|err| {
            SimulationError::ReadingConfigFile(format!("{}: {}", config_file_path, err))
        })?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), SimulationError> {
        if self.fleet_size == 0 {
            return Err(SimulationError::InvalidConfig(
                "la flota necesita al menos un drone".to_string(),
            ));
        }
        if !(self.speed_multiplier.is_finite() && self.speed_multiplier >= 1.0) {
            return Err(SimulationError::InvalidConfig(format!(
                "el multiplicador de velocidad {} tiene que ser mayor o igual a 1",
                self.speed_multiplier
            )));
        }
        self.start_time_hms()?;
        self.drone.validate()?;
        Ok(())
    }

    /// Descompone `start_time` en horas, minutos y segundos.
    pub fn start_time_hms(&self) -> Result<(u32, u32, u32), SimulationError> {
        let time = NaiveTime::parse_from_str(self.start_time.trim(), "%H:%M:%S").map_err(|_| {
            SimulationError::InvalidConfig(format!(
                "la hora de inicio '{}' no tiene formato HH:MM:SS",
                self.start_time
            ))
        })?;
        Ok((time.hour(), time.minute(), time.second()))
    }
}
