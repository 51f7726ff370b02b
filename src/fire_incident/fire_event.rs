use std::fmt;

use super::fire_severity::FireSeverity;

pub type ZoneId = u32;
pub type FireEventId = u64;

/// Demanda pendiente de agua en una zona.
///
/// Un mismo evento puede repartirse entre varias misiones de drones: cada asignacion
/// parcial descuenta de `remaining_water`, que nunca sube y nunca supera a
/// `initial_water`. Cuando llega a cero el evento se descarta.
#[derive(Debug, Clone, PartialEq)]
pub struct FireEvent {
    id: FireEventId,
    zone_id: ZoneId,
    event_type: String,
    severity: FireSeverity,
    initial_water: u32,
    remaining_water: u32,
    created_at: f64,
}

impl FireEvent {
    /// Crea un evento con el agua que corresponde a su severidad.
    ///
    /// `created_at` es el tiempo simulado de llegada, en segundos.
    pub fn new(
        zone_id: ZoneId,
        event_type: impl Into<String>,
        severity: FireSeverity,
        created_at: f64,
    ) -> FireEvent {
        let initial_water = severity.initial_water();
        FireEvent {
            id: 0,
            zone_id,
            event_type: event_type.into(),
            severity,
            initial_water,
            remaining_water: initial_water,
            created_at,
        }
    }

    /// Crea el resto de un evento que quedo sin cubrir: misma zona, tipo y severidad,
    /// pero con solo `remaining_water` litros pendientes.
    pub(crate) fn remainder_of(&self, remaining_water: u32) -> FireEvent {
        FireEvent {
            id: 0,
            zone_id: self.zone_id,
            event_type: self.event_type.clone(),
            severity: self.severity,
            initial_water: self.initial_water,
            remaining_water: remaining_water.min(self.initial_water),
            created_at: self.created_at,
        }
    }

    pub fn id(&self) -> FireEventId {
        self.id
    }

    pub(crate) fn assign_id(&mut self, id: FireEventId) {
        self.id = id;
    }

    pub fn zone_id(&self) -> ZoneId {
        self.zone_id
    }

    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    pub fn severity(&self) -> FireSeverity {
        self.severity
    }

    pub fn initial_water(&self) -> u32 {
        self.initial_water
    }

    pub fn remaining_water(&self) -> u32 {
        self.remaining_water
    }

    pub fn created_at(&self) -> f64 {
        self.created_at
    }

    pub fn is_extinguished(&self) -> bool {
        self.remaining_water == 0
    }

    /// Descuenta agua del evento y devuelve cuanto se desconto realmente.
    pub fn consume(&mut self, liters: u32) -> u32 {
        let consumed = liters.min(self.remaining_water);
        self.remaining_water -= consumed;
        consumed
    }
}

impl fmt::Display for FireEvent {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "Time: {}s | Zone: {} | Type: {} | Severity: {} | Water: {}/{}L",
            self.created_at,
            self.zone_id,
            self.event_type,
            self.severity,
            self.remaining_water,
            self.initial_water
        )
    }
}
