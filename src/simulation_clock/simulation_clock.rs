use std::{
    sync::{Mutex, PoisonError},
    time::{Duration, Instant},
};

use chrono::{NaiveTime, Timelike};

use super::{clock_error::ClockError, stop_signal::StopSignal};

/// Tope en segundos reales de cada tramo de espera.
const MAX_WAIT_CHUNK_SECS: f64 = 1.0;

#[derive(Debug, Clone, Copy)]
struct ClockSettings {
    start_offset_secs: f64,
    speed_multiplier: f64,
    started_at: Option<Instant>,
}

/// Reloj de simulacion compartido por el Dispatcher, los drones y el feeder.
///
/// Tiene dos fases:
///     - Configuracion: se puede fijar la hora de inicio y el multiplicador de velocidad.
///     - Corrida: arranca con `start()` o con la primer lectura de `now()`. A partir de
///       ahi la configuracion queda congelada y cualquier intento de cambiarla devuelve
///       `ClockError::AlreadyRunning`.
///
/// El tiempo simulado es `offset + tiempo_real_transcurrido * multiplicador`.
#[derive(Debug)]
pub struct SimulationClock {
    settings: Mutex<ClockSettings>,
}

impl Default for SimulationClock {
    fn default() -> Self {
        SimulationClock::new()
    }
}

impl SimulationClock {
    pub fn new() -> SimulationClock {
        SimulationClock {
            settings: Mutex::new(ClockSettings {
                start_offset_secs: 0.0,
                speed_multiplier: 1.0,
                started_at: None,
            }),
        }
    }

    fn settings(&self) -> std::sync::MutexGuard<'_, ClockSettings> {
        self.settings.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Fija la hora simulada en la que arranca la corrida.
    pub fn set_start(&self, hours: u32, minutes: u32, seconds: u32) -> Result<(), ClockError> {
        let start = NaiveTime::from_hms_opt(hours, minutes, seconds).ok_or(
            ClockError::InvalidStartTime {
                hours,
                minutes,
                seconds,
            },
        )?;

        let mut settings = self.settings();
        if settings.started_at.is_some() {
            return Err(ClockError::AlreadyRunning);
        }
        settings.start_offset_secs = start.num_seconds_from_midnight() as f64;
        Ok(())
    }

    /// Cuantos segundos simulados pasan por cada segundo real.
    /// Por ej: con 60, un segundo real equivale a un minuto simulado.
    pub fn set_speed_multiplier(&self, multiplier: f64) -> Result<(), ClockError> {
        if !multiplier.is_finite() || multiplier < 1.0 {
            return Err(ClockError::InvalidSpeedMultiplier(multiplier));
        }

        let mut settings = self.settings();
        if settings.started_at.is_some() {
            return Err(ClockError::AlreadyRunning);
        }
        settings.speed_multiplier = multiplier;
        Ok(())
    }

    /// Pasa el reloj a la fase de corrida. Llamarlo de nuevo no tiene efecto.
    pub fn start(&self) {
        let mut settings = self.settings();
        if settings.started_at.is_none() {
            settings.started_at = Some(Instant::now());
        }
    }

    pub fn is_running(&self) -> bool {
        self.settings().started_at.is_some()
    }

    pub fn speed_multiplier(&self) -> f64 {
        self.settings().speed_multiplier
    }

    /// Tiempo simulado actual, en segundos.
    pub fn now(&self) -> f64 {
        let mut settings = self.settings();
        let started_at = *settings.started_at.get_or_insert_with(Instant::now);

        settings.start_offset_secs
            + started_at.elapsed().as_secs_f64() * settings.speed_multiplier
    }

    /// Duerme hasta que pasen `seconds` segundos simulados.
    pub fn sleep_for_simulated(&self, seconds: f64, stop: &StopSignal) -> Result<(), ClockError> {
        let target = self.now() + seconds.max(0.0);
        self.sleep_until_simulated(target, stop)
    }

    /// Duerme hasta que `now() >= target`. Si ya paso, vuelve en el acto.
    ///
    /// La espera se hace sobre la señal de parada, asi que un `stop()` la corta
    /// devolviendo `ClockError::Interrupted`.
    pub fn sleep_until_simulated(&self, target: f64, stop: &StopSignal) -> Result<(), ClockError> {
        loop {
            if stop.is_stopped() {
                return Err(ClockError::Interrupted);
            }

            let now = self.now();
            if now >= target {
                return Ok(());
            }

            let real_secs = ((target - now) / self.speed_multiplier()).min(MAX_WAIT_CHUNK_SECS);
            if stop.wait_timeout(Duration::from_secs_f64(real_secs)) {
                return Err(ClockError::Interrupted);
            }
        }
    }

    /// Devuelve la hora simulada actual como HH:MM:SS.
    pub fn formatted_time(&self) -> String {
        format_sim_time(self.now())
    }
}

/// Formatea segundos simulados como HH:MM:SS. Las horas pueden pasar de 24.
pub fn format_sim_time(seconds: f64) -> String {
    let total = seconds.max(0.0) as u64;
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;
    format!("{:02}:{:02}:{:02}", hours, minutes, secs)
}
