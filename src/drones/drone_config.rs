use std::{fs::File, io::BufReader};

use serde::Deserialize;

use crate::utils::{grid_position::GridPosition, zone_map::REFILL_STATION};

use super::drone_error::DroneError;

/// Sirve para levantar la configuracion de los Drones a partir del JSON.
///
/// Todos los tiempos estan en segundos simulados. Un campo que falta en el
/// archivo toma su valor por defecto.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct DroneConfig {
    /// Capacidad del tanque, en litros.
    pub capacity: u32,

    /// Litros por segundo que salen por la boquilla.
    pub flow_rate: f64,

    pub nozzle_open_secs: f64,
    pub nozzle_close_secs: f64,

    /// Tiempo que tarda en llenarse el tanque una vez en la estacion.
    pub refill_secs: f64,

    /// Tiempo que tarda el Drone en moverse una celda de la grilla.
    pub seconds_per_cell: f64,

    /// Cuanto espera un Drone en Faulted antes de volver a Idle.
    pub fault_recovery_secs: f64,

    /// Probabilidad de que un Drone falle despues de completar una mision.
    pub fault_probability: f64,

    pub refill_station: GridPosition,
}

impl Default for DroneConfig {
    fn default() -> Self {
        DroneConfig {
            capacity: 15,
            flow_rate: 3.77,
            nozzle_open_secs: 0.75,
            nozzle_close_secs: 0.75,
            refill_secs: 5.0,
            seconds_per_cell: 1.0,
            fault_recovery_secs: 1.0,
            fault_probability: 0.0,
            refill_station: REFILL_STATION,
        }
    }
}

impl DroneConfig {
    /// Leo la configuracion a partir de un archivo json.
    pub fn new(config_file_path: &str) -> Result<DroneConfig, DroneError> {
        let config = DroneConfig::read_drone_config(config_file_path)?;
        config.validate()?;
        Ok(config)
    }

    /// Toma un path a un archivo de configuracion y levanta el DroneConfig.
    fn read_drone_config(file_path: &str) -> Result<DroneConfig, DroneError> {
        let config_file = File::open(file_path)
            .map_err(|err| DroneError::ReadingConfigFile(format!("{}: {}", file_path, err)))?;

        let reader = BufReader::new(config_file);
        serde_json::from_reader(reader)
            .map_err(|err| DroneError::ReadingConfigFile(format!("{}: {}", file_path, err)))
    }

    pub fn validate(&self) -> Result<(), DroneError> {
        if self.capacity == 0 {
            return Err(DroneError::InvalidConfig(
                "la capacidad del tanque tiene que ser mayor a cero".to_string(),
            ));
        }
        if !(self.flow_rate.is_finite() && self.flow_rate > 0.0) {
            return Err(DroneError::InvalidConfig(format!(
                "el caudal {} no es valido",
                self.flow_rate
            )));
        }
        let durations = [
            self.nozzle_open_secs,
            self.nozzle_close_secs,
            self.refill_secs,
            self.seconds_per_cell,
            self.fault_recovery_secs,
        ];
        if durations.iter().any(|secs| !secs.is_finite() || *secs < 0.0) {
            return Err(DroneError::InvalidConfig(
                "los tiempos no pueden ser negativos".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.fault_probability) {
            return Err(DroneError::InvalidConfig(format!(
                "la probabilidad de falla {} esta fuera de [0, 1]",
                self.fault_probability
            )));
        }
        Ok(())
    }

    /// Segundos simulados que tarda en soltar `liters` litros, contando la
    /// apertura y el cierre de la boquilla.
    pub fn extinguish_duration(&self, liters: u32) -> f64 {
        self.nozzle_open_secs + liters as f64 / self.flow_rate + self.nozzle_close_secs
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_01_config_creation_cases() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "capacity": 20, "refill_secs": 2.5 }}"#).unwrap();

        let config_ok = DroneConfig::new(file.path().to_str().unwrap());
        let config_err = DroneConfig::new("este/es/un/path/feo");

        let config = config_ok.unwrap();
        assert_eq!(config.capacity, 20);
        assert_eq!(config.refill_secs, 2.5);
        assert_eq!(config.flow_rate, 3.77);
        assert!(config_err.is_err());
    }

    #[test]
    fn test_02_bad_config_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "esto no es json").unwrap();

        assert!(matches!(
            DroneConfig::new(file.path().to_str().unwrap()),
            Err(DroneError::ReadingConfigFile(_))
        ));
    }

    #[test]
    fn test_03_validation() {
        let config = DroneConfig {
            capacity: 0,
            ..DroneConfig::default()
        };
        assert!(config.validate().is_err());

        let config = DroneConfig {
            fault_probability: 1.5,
            ..DroneConfig::default()
        };
        assert!(config.validate().is_err());

        assert!(DroneConfig::default().validate().is_ok());
    }

    #[test]
    fn test_04_extinguish_duration() {
        let config = DroneConfig::default();
        let expected = 0.75 + 15.0 / 3.77 + 0.75;
        assert!((config.extinguish_duration(15) - expected).abs() < 1e-9);
    }
}
