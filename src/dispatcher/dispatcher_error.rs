use thiserror::Error;

use crate::{drones::drone_handle::DroneId, fire_incident::fire_event::ZoneId};

/// Errores que puede devolver el Dispatcher.
#[derive(Debug, Error, PartialEq)]
pub enum DispatchError {
    #[error("Error: el drone {0} no esta registrado en el dispatcher.")]
    UnknownDrone(DroneId),

    #[error("Error: ya existe un drone registrado con id {0}.")]
    DuplicateDrone(DroneId),

    #[error("Error: el drone {0} ya tiene una mision en curso.")]
    MissionInProgress(DroneId),

    #[error("Error: el drone {0} no tiene ninguna mision activa para completar.")]
    NoActiveMission(DroneId),

    #[error("Error: el drone {drone_id} reporto la zona {reported}, pero su mision es en la zona {expected}.")]
    ZoneMismatch {
        drone_id: DroneId,
        expected: ZoneId,
        reported: ZoneId,
    },

    #[error("Error: el dispatcher se esta apagando.")]
    Cancelled,

    #[error("Error: el lock del dispatcher quedo envenenado.")]
    LockPoisoned,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_01_dispatch_error_display() {
        assert_eq!(
            format!("{}", DispatchError::NoActiveMission(2)),
            "Error: el drone 2 no tiene ninguna mision activa para completar."
        );
        assert_eq!(
            format!(
                "{}",
                DispatchError::ZoneMismatch {
                    drone_id: 1,
                    expected: 3,
                    reported: 4
                }
            ),
            "Error: el drone 1 reporto la zona 4, pero su mision es en la zona 3."
        );
    }
}
