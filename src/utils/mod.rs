pub mod grid_position;
pub mod logger;
pub mod zone_map;
