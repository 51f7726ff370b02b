use crate::fire_incident::fire_event::ZoneId;

use super::grid_position::GridPosition;

/// Estacion de recarga de agua, en el origen de la grilla.
pub const REFILL_STATION: GridPosition = GridPosition { x: 0, y: 0 };

/// Celda central de cada zona. La grilla es de 30x30 dividida en cuatro zonas de 15x15:
///
/// ```text
///  +----+----+
///  | 1  | 2  |
///  +----+----+
///  | 3  | 4  |
///  +----+----+
/// ```
///
/// Las zonas desconocidas caen en el centro de la zona 1.
pub fn zone_center(zone_id: ZoneId) -> GridPosition {
    match zone_id {
        2 => GridPosition::new(22, 7),
        3 => GridPosition::new(7, 22),
        4 => GridPosition::new(22, 22),
        _ => GridPosition::new(7, 7),
    }
}
