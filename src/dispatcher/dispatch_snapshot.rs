use std::collections::BTreeMap;

use serde::Serialize;

use crate::{
    drones::drone_handle::{DroneId, DroneTelemetry},
    fire_incident::fire_event::ZoneId,
};

use super::operational_state::OperationalState;

pub type DroneSnapshot = DroneTelemetry;

/// Foto del Dispatcher tomada en una sola seccion critica.
///
/// `fire_counts` y `queued_fire_counts` vienen como `[high, moderate, low]`:
/// el primero suma los eventos en cola y los drones en mision de esa severidad,
/// el segundo cuenta solo la cola.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DispatchSnapshot {
    pub state: OperationalState,
    pub drones: BTreeMap<DroneId, DroneSnapshot>,
    pub fire_counts: [usize; 3],
    pub queued_fire_counts: [usize; 3],
    pub active_water_per_zone: BTreeMap<ZoneId, u32>,
    pub sim_time_secs: f64,
}

impl DispatchSnapshot {
    pub fn outstanding_water(&self) -> u32 {
        self.active_water_per_zone.values().sum()
    }

    pub fn is_quiet(&self) -> bool {
        self.state == OperationalState::Idle && self.active_water_per_zone.is_empty()
    }
}
