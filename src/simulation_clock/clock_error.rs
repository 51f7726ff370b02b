use thiserror::Error;

/// Errores que puede lanzar el reloj de simulacion.
#[derive(Debug, Error, PartialEq)]
pub enum ClockError {
    #[error("Error: el multiplicador de velocidad {0} es invalido, debe ser finito y mayor o igual a 1.")]
    InvalidSpeedMultiplier(f64),

    #[error("Error: la hora de inicio {hours:02}:{minutes:02}:{seconds:02} es invalida.")]
    InvalidStartTime {
        hours: u32,
        minutes: u32,
        seconds: u32,
    },

    #[error("Error: el reloj ya esta corriendo, no se puede reconfigurar.")]
    AlreadyRunning,

    #[error("Error: la espera fue interrumpida por una señal de parada.")]
    Interrupted,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_01_clock_error_display() {
        let error = ClockError::InvalidStartTime {
            hours: 25,
            minutes: 0,
            seconds: 7,
        };
        assert_eq!(
            format!("{}", error),
            "Error: la hora de inicio 25:00:07 es invalida."
        );

        let error = ClockError::AlreadyRunning;
        assert_eq!(
            format!("{}", error),
            "Error: el reloj ya esta corriendo, no se puede reconfigurar."
        );
    }
}
