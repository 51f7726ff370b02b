use std::{
    fs::File,
    io::{BufRead, BufReader},
};

use chrono::{NaiveTime, Timelike};
use tracing::{error, warn};

use super::{
    fire_event::{FireEvent, ZoneId},
    fire_severity::FireSeverity,
    incident_error::IncidentError,
};

/// Una linea valida del archivo de incidentes.
#[derive(Debug, Clone, PartialEq)]
pub struct IncidentRecord {
    pub event_time_secs: f64,
    pub zone_id: ZoneId,
    pub event_type: String,
    pub severity: FireSeverity,
}

impl IncidentRecord {
    pub fn to_fire_event(&self) -> FireEvent {
        FireEvent::new(
            self.zone_id,
            self.event_type.clone(),
            self.severity,
            self.event_time_secs,
        )
    }
}

/// Resultado de leer un archivo de incidentes: los registros validos, en el orden
/// del archivo, y cuantas lineas se descartaron.
#[derive(Debug, Default)]
pub struct FeedPlan {
    pub records: Vec<IncidentRecord>,
    pub rejected: usize,
}

/// Acepta segundos enteros (`125`) o una hora `HH:MM:SS`.
pub fn parse_timestamp(token: &str) -> Result<f64, IncidentError> {
    if let Ok(seconds) = token.parse::<u64>() {
        return Ok(seconds as f64);
    }

    match NaiveTime::parse_from_str(token, "%H:%M:%S") {
        Ok(time) => Ok(time.num_seconds_from_midnight() as f64),
        Err(_) => Err(IncidentError::InvalidTimestamp(token.to_string())),
    }
}

fn split_fields(line: &str) -> Vec<&str> {
    line.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|field| !field.is_empty())
        .collect()
}

fn is_content(line: &str) -> bool {
    let trimmed = line.trim();
    !trimmed.is_empty() && !trimmed.starts_with('#')
}

/// Un encabezado es una primera linea cuyo primer campo no tiene digitos.
fn is_header(line: &str) -> bool {
    split_fields(line)
        .first()
        .map(|first| !first.chars().any(|c| c.is_ascii_digit()))
        .unwrap_or(false)
}

/// Parsea una linea del archivo.
///
/// Devuelve `Ok(None)` para lineas vacias y comentarios (`#`).
pub fn parse_line(line_number: usize, line: &str) -> Result<Option<IncidentRecord>, IncidentError> {
    if !is_content(line) {
        return Ok(None);
    }

    let fields = split_fields(line.trim());

    if fields.len() < 4 {
        return Err(IncidentError::MalformedLine {
            line_number,
            reason: format!("se esperaban 4 campos y hay {}", fields.len()),
        });
    }

    let event_time_secs = parse_timestamp(fields[0])?;
    let zone_id = fields[1]
        .parse::<ZoneId>()
        .map_err(|_| IncidentError::InvalidZone(fields[1].to_string()))?;
    let event_type = fields[2].to_string();
    let severity = fields[3].parse::<FireSeverity>()?;

    Ok(Some(IncidentRecord {
        event_time_secs,
        zone_id,
        event_type,
        severity,
    }))
}

/// Lee todas las lineas de `reader`. Las lineas invalidas se loguean y se saltean.
///
/// Si la primer linea con contenido es un encabezado, tambien se saltea.
pub fn parse_incidents(reader: impl BufRead) -> FeedPlan {
    let mut plan = FeedPlan::default();
    let mut header_allowed = true;

    for (index, line) in reader.lines().enumerate() {
        let line_number = index + 1;
        let line = match line {
            Ok(line) => line,
            Err(err) => {
                error!(line_number, error = %err, "Failed to read incident line");
                plan.rejected += 1;
                continue;
            }
        };

        if !is_content(&line) {
            continue;
        }
        if std::mem::take(&mut header_allowed) && is_header(&line) {
            continue;
        }

        match parse_line(line_number, &line) {
            Ok(Some(record)) => plan.records.push(record),
            Ok(None) => {}
            Err(err) => {
                error!(line_number, line = %line, error = %err, "Skipping malformed incident line");
                plan.rejected += 1;
            }
        }
    }

    if plan.records.is_empty() {
        warn!("Incident feed has no valid records");
    }

    plan
}

/// Toma un path al archivo de incidentes y lo parsea.
pub fn load_incident_file(path: &str) -> Result<FeedPlan, IncidentError> {
    let file = File::open(path).map_err(|err| IncidentError::ReadingFile(format!("{}: {}", path, err)))?;
    Ok(parse_incidents(BufReader::new(file)))
}
