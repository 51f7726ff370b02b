use std::sync::{
    atomic::{AtomicBool, Ordering},
    Mutex, MutexGuard, PoisonError,
};

use serde::Serialize;

use crate::utils::grid_position::GridPosition;

use super::drone_state::DroneState;

pub type DroneId = u32;

/// Lo que se sabe de un Drone desde afuera: su estado, su agua y su posicion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DroneTelemetry {
    pub state: DroneState,
    pub water_level: u32,
    pub position: GridPosition,
}

/// Punto de contacto compartido entre un Drone y el Dispatcher.
///
/// El tanque y la posicion los escribe unicamente el hilo del propio Drone. El
/// Dispatcher los lee, y lo unico que escribe es la etiqueta de estado.
#[derive(Debug)]
pub struct DroneHandle {
    id: DroneId,
    telemetry: Mutex<DroneTelemetry>,
    fault_requested: AtomicBool,
    decommission_requested: AtomicBool,
}

impl DroneHandle {
    pub fn new(id: DroneId, water_level: u32, position: GridPosition) -> DroneHandle {
        DroneHandle {
            id,
            telemetry: Mutex::new(DroneTelemetry {
                state: DroneState::Idle,
                water_level,
                position,
            }),
            fault_requested: AtomicBool::new(false),
            decommission_requested: AtomicBool::new(false),
        }
    }

    fn lock(&self) -> MutexGuard<'_, DroneTelemetry> {
        self.telemetry.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn id(&self) -> DroneId {
        self.id
    }

    pub fn telemetry(&self) -> DroneTelemetry {
        *self.lock()
    }

    pub fn state(&self) -> DroneState {
        self.lock().state
    }

    pub fn water_level(&self) -> u32 {
        self.lock().water_level
    }

    pub fn position(&self) -> GridPosition {
        self.lock().position
    }

    pub fn set_state(&self, state: DroneState) {
        self.lock().state = state;
    }

    /// Solo la llama el hilo del Drone dueño del tanque.
    pub fn set_water_level(&self, water_level: u32) {
        self.lock().water_level = water_level;
    }

    /// Solo la llama el hilo del Drone dueño de la posicion.
    pub fn set_position(&self, position: GridPosition) {
        self.lock().position = position;
    }

    /// Pide que el Drone pase a Faulted la proxima vez que este libre.
    pub fn request_fault(&self) {
        self.fault_requested.store(true, Ordering::SeqCst);
    }

    /// Consume el pedido de falla, si habia uno.
    pub fn take_fault_request(&self) -> bool {
        self.fault_requested.swap(false, Ordering::SeqCst)
    }

    pub fn request_decommission(&self) {
        self.decommission_requested.store(true, Ordering::SeqCst);
    }

    pub fn is_decommission_requested(&self) -> bool {
        self.decommission_requested.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_01_new_handle_starts_idle() {
        let handle = DroneHandle::new(3, 15, GridPosition::default());

        assert_eq!(handle.id(), 3);
        assert_eq!(
            handle.telemetry(),
            DroneTelemetry {
                state: DroneState::Idle,
                water_level: 15,
                position: GridPosition::new(0, 0),
            }
        );
    }

    #[test]
    fn test_02_fault_request_is_consumed_once() {
        let handle = DroneHandle::new(0, 15, GridPosition::default());

        assert!(!handle.take_fault_request());
        handle.request_fault();
        assert!(handle.take_fault_request());
        assert!(!handle.take_fault_request());
    }
}
