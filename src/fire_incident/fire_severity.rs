use std::{fmt, str::FromStr};

use serde::Serialize;

use super::incident_error::IncidentError;

/// Severidad de un incendio. Define la prioridad de despacho y el agua necesaria.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum FireSeverity {
    Low,
    Moderate,
    High,
}

impl FireSeverity {
    /// Litros que hacen falta para apagar un incendio de esta severidad.
    pub fn initial_water(&self) -> u32 {
        match self {
            FireSeverity::Low => 10,
            FireSeverity::Moderate => 20,
            FireSeverity::High => 30,
        }
    }

    /// Posicion en los arrays `[high, moderate, low]` de la API de consultas.
    pub fn count_index(&self) -> usize {
        match self {
            FireSeverity::High => 0,
            FireSeverity::Moderate => 1,
            FireSeverity::Low => 2,
        }
    }
}

impl FromStr for FireSeverity {
    type Err = IncidentError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        match token.trim().to_ascii_uppercase().as_str() {
            "LOW" => Ok(FireSeverity::Low),
            "MODERATE" => Ok(FireSeverity::Moderate),
            "HIGH" => Ok(FireSeverity::High),
            _ => Err(IncidentError::UnknownSeverity(token.trim().to_string())),
        }
    }
}

impl fmt::Display for FireSeverity {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            FireSeverity::Low => write!(f, "LOW"),
            FireSeverity::Moderate => write!(f, "MODERATE"),
            FireSeverity::High => write!(f, "HIGH"),
        }
    }
}
