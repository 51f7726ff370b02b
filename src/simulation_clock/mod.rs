pub mod clock_error;
pub mod simulation_clock;
pub mod stop_signal;
