use std::fmt;

use serde::Serialize;

/// Vista agregada del Dispatcher. No manda sobre el estado de cada Drone.
///
/// - Idle: no hay incendios en cola, ni misiones activas, ni drones recargando.
/// - Dispatching: hay incendios en cola esperando drones.
/// - Monitoring: las colas estan vacias pero hay drones en mision.
/// - Refilling: al menos un drone esta recargando agua.
/// - FaultHandling: reservado para escalar fallas de drones; hoy nada entra en el.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum OperationalState {
    Idle,
    Dispatching,
    Monitoring,
    Refilling,
    FaultHandling,
}

impl OperationalState {
    /// Deriva el estado a partir de los contadores del Dispatcher.
    /// Refilling tiene precedencia sobre el estado de las colas.
    pub fn derive(queued_events: usize, active_missions: usize, refilling_drones: usize) -> Self {
        if refilling_drones > 0 {
            OperationalState::Refilling
        } else if queued_events > 0 {
            OperationalState::Dispatching
        } else if active_missions > 0 {
            OperationalState::Monitoring
        } else {
            OperationalState::Idle
        }
    }
}

impl fmt::Display for OperationalState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let label = match self {
            OperationalState::Idle => "IDLE",
            OperationalState::Dispatching => "DISPATCHING",
            OperationalState::Monitoring => "MONITORING",
            OperationalState::Refilling => "REFILLING",
            OperationalState::FaultHandling => "FAULT_HANDLING",
        };
        write!(f, "{}", label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_01_derive_follows_precedence() {
        assert_eq!(OperationalState::derive(0, 0, 0), OperationalState::Idle);
        assert_eq!(OperationalState::derive(2, 1, 0), OperationalState::Dispatching);
        assert_eq!(OperationalState::derive(0, 3, 0), OperationalState::Monitoring);
        assert_eq!(OperationalState::derive(4, 3, 1), OperationalState::Refilling);
    }
}
