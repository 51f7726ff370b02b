use thiserror::Error;

/// Errores del lado de los incidentes: severidades desconocidas y lineas mal formadas
/// del archivo de entrada.
///
/// Ninguno de estos frena al feeder: la linea se descarta y se sigue con la proxima.
#[derive(Debug, Error, PartialEq)]
pub enum IncidentError {
    #[error("Error: severidad desconocida '{0}', se esperaba LOW, MODERATE o HIGH.")]
    UnknownSeverity(String),

    #[error("Error: linea {line_number} mal formada: {reason}")]
    MalformedLine { line_number: usize, reason: String },

    #[error("Error: marca de tiempo invalida '{0}'.")]
    InvalidTimestamp(String),

    #[error("Error: zona invalida '{0}'.")]
    InvalidZone(String),

    #[error("Error: no se ha podido leer el archivo de incidentes: {0}")]
    ReadingFile(String),

    #[error("Error: el feeder fue interrumpido antes de terminar.")]
    Interrupted,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_01_incident_error_display() {
        let error = IncidentError::UnknownSeverity("EXTREME".to_string());
        assert_eq!(
            format!("{}", error),
            "Error: severidad desconocida 'EXTREME', se esperaba LOW, MODERATE o HIGH."
        );

        let error = IncidentError::MalformedLine {
            line_number: 4,
            reason: "faltan campos".to_string(),
        };
        assert_eq!(
            format!("{}", error),
            "Error: linea 4 mal formada: faltan campos"
        );
    }
}
