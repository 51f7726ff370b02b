use serde::Serialize;

use crate::fire_incident::{
    fire_event::{FireEvent, FireEventId, ZoneId},
    fire_severity::FireSeverity,
};

/// Asignacion que el Dispatcher le entrega a un Drone: ir a una zona y tirar
/// `water_assigned` litros. Una vez entregada, le pertenece al Drone.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Mission {
    pub event_id: FireEventId,
    pub zone_id: ZoneId,
    pub event_type: String,
    pub severity: FireSeverity,
    pub water_assigned: u32,
}

impl Mission {
    pub fn from_event(event: &FireEvent, water_assigned: u32) -> Mission {
        Mission {
            event_id: event.id(),
            zone_id: event.zone_id(),
            event_type: event.event_type().to_string(),
            severity: event.severity(),
            water_assigned,
        }
    }
}

/// Respuesta de `Dispatcher::request_mission`.
#[derive(Debug, Clone, PartialEq)]
pub enum MissionResponse {
    /// Hay trabajo para el Drone.
    Assigned(Mission),
    /// El tanque esta vacio: el Drone tiene que ir a recargar.
    Refill,
    /// El Drone fue dado de baja mientras esperaba.
    Decommissioned,
}
