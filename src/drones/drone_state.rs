use std::fmt;

use serde::Serialize;

///  El Drone puede tener distintos estados:
/// - Idle: esta libre, esperando que el Dispatcher le asigne una mision.
/// - OnRoute: va camino a la zona del incendio que le asignaron.
/// - Extinguishing: esta soltando agua sobre el incendio.
/// - Refilling: se quedo sin agua, vuelve a la estacion de recarga y no acepta
///              misiones hasta tener el tanque lleno.
/// - Faulted: tuvo una falla; espera un rato y vuelve a Idle.
/// - Decommissioned: fue dado de baja. Es terminal: el loop del Drone termina.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DroneState {
    Idle,
    OnRoute,
    Extinguishing,
    Refilling,
    Faulted,
    Decommissioned,
}

impl DroneState {
    pub fn is_terminal(&self) -> bool {
        *self == DroneState::Decommissioned
    }
}

impl fmt::Display for DroneState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let label = match self {
            DroneState::Idle => "IDLE",
            DroneState::OnRoute => "ON_ROUTE",
            DroneState::Extinguishing => "EXTINGUISHING",
            DroneState::Refilling => "REFILLING",
            DroneState::Faulted => "FAULTED",
            DroneState::Decommissioned => "DECOMMISSIONED",
        };
        write!(f, "{}", label)
    }
}
