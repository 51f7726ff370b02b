use thiserror::Error;

use crate::{dispatcher::dispatcher_error::DispatchError, simulation_clock::clock_error::ClockError};

/// Errores que se pueden lanzar desde el software de control de Drones.
#[derive(Debug, Error, PartialEq)]
pub enum DroneError {
    #[error("Error: no se ha podido leer el archivo de configuracion de drones: {0}")]
    ReadingConfigFile(String),

    #[error("Error: configuracion de drones invalida: {0}")]
    InvalidConfig(String),

    #[error("Error: la flota ya tiene {0} drones y no quedan hilos libres.")]
    FleetFull(usize),

    #[error("Error del dispatcher: {0}")]
    Dispatch(#[from] DispatchError),

    #[error("Error del reloj: {0}")]
    Clock(#[from] ClockError),
}

impl DroneError {
    /// Indica si el error es una cancelacion pedida desde afuera y no una falla.
    pub fn is_cancellation(&self) -> bool {
        matches!(
            self,
            DroneError::Clock(ClockError::Interrupted) | DroneError::Dispatch(DispatchError::Cancelled)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drone_error_display() {
        let error = DroneError::ReadingConfigFile("no existe".to_string());
        assert_eq!(
            format!("{}", error),
            "Error: no se ha podido leer el archivo de configuracion de drones: no existe"
        );

        let error = DroneError::from(DispatchError::UnknownDrone(3));
        assert_eq!(
            format!("{}", error),
            "Error del dispatcher: Error: el drone 3 no esta registrado en el dispatcher."
        );

        let error = DroneError::FleetFull(4);
        assert_eq!(
            format!("{}", error),
            "Error: la flota ya tiene 4 drones y no quedan hilos libres."
        );
    }

    #[test]
    fn test_cancellation_errors() {
        assert!(DroneError::from(ClockError::Interrupted).is_cancellation());
        assert!(DroneError::from(DispatchError::Cancelled).is_cancellation());
        assert!(!DroneError::from(DispatchError::NoActiveMission(1)).is_cancellation());
    }
}
