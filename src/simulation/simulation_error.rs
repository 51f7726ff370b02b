use thiserror::Error;

use crate::{
    dispatcher::dispatcher_error::DispatchError, drones::drone_error::DroneError,
    fire_incident::incident_error::IncidentError, simulation_clock::clock_error::ClockError,
};

/// Errores que pueden cortar una corrida completa de la simulacion.
#[derive(Debug, Error, PartialEq)]
pub enum SimulationError {
    #[error("Error: no se ha podido leer el archivo de configuracion de la simulacion: {0}")]
    ReadingConfigFile(String),

    #[error("Error: configuracion de la simulacion invalida: {0}")]
    InvalidConfig(String),

    #[error("Error del reloj: {0}")]
    Clock(#[from] ClockError),

    #[error("Error del dispatcher: {0}")]
    Dispatch(#[from] DispatchError),

    #[error("Error de drone: {0}")]
    Drone(#[from] DroneError),

    #[error("Error de incidentes: {0}")]
    Incident(#[from] IncidentError),

    #[error("Error: el hilo {0} termino con panic.")]
    ThreadPanicked(String),
}
