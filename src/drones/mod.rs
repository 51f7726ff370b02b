pub mod drone;
pub mod drone_config;
pub mod drone_error;
pub mod drone_fleet;
pub mod drone_handle;
pub mod drone_state;
