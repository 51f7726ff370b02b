use std::io::Write;

use rustic_drone_swarm::{
    fire_incident::incident_error::IncidentError,
    simulation::{
        simulation::Simulation, simulation_config::SimulationConfig,
        simulation_error::SimulationError,
    },
};

fn fast_config(fleet_size: usize) -> SimulationConfig {
    SimulationConfig {
        fleet_size,
        speed_multiplier: 2_000.0,
        status_interval_ms: 20,
        ..SimulationConfig::default()
    }
}

#[test]
fn test_01_end_to_end_run_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "Time,Zone,EventType,Severity").unwrap();
    writeln!(file, "0,1,FIRE_DETECTED,LOW").unwrap();
    writeln!(file, "# comentario").unwrap();
    writeln!(file, "3,2,FIRE_DETECTED,HIGH").unwrap();
    writeln!(file, "00:00:05,3,DRONE_REQUEST,moderate").unwrap();
    writeln!(file, "7,4,FIRE_DETECTED,EXTREME").unwrap();
    writeln!(file, "esto no es una linea").unwrap();

    let simulation = Simulation::new(fast_config(2)).unwrap();
    let report = simulation
        .run_file(file.path().to_str().unwrap())
        .unwrap();

    assert!(report.drained);
    assert_eq!(report.feed.submitted, 3);
    assert_eq!(report.rejected_lines, 2);
    assert_eq!(report.final_snapshot.outstanding_water(), 0);
    assert_eq!(report.final_snapshot.fire_counts, [0, 0, 0]);
    assert_eq!(report.drone_outcomes.len(), 2);
    assert!(report
        .drone_outcomes
        .iter()
        .all(|(_, outcome)| outcome.is_ok()));
}

#[test]
fn test_02_missing_incident_file() {
    let simulation = Simulation::new(fast_config(1)).unwrap();

    assert!(matches!(
        simulation.run_file("no/existe/incidentes.txt"),
        Err(SimulationError::Incident(IncidentError::ReadingFile(_)))
    ));
}

#[test]
fn test_03_config_file_drives_the_run() {
    let mut config_file = tempfile::NamedTempFile::new().unwrap();
    write!(
        config_file,
        r#"{{ "fleet_size": 1, "speed_multiplier": 2000.0, "start_time": "00:00:10",
             "status_interval_ms": 20, "drone": {{ "capacity": 30 }} }}"#
    )
    .unwrap();
    let mut incidents = tempfile::NamedTempFile::new().unwrap();
    writeln!(incidents, "0 2 FIRE_DETECTED HIGH").unwrap();

    let config = SimulationConfig::new(config_file.path().to_str().unwrap()).unwrap();
    assert_eq!(config.drone.capacity, 30);

    let report = Simulation::new(config)
        .unwrap()
        .run_file(incidents.path().to_str().unwrap())
        .unwrap();

    assert!(report.drained);
    assert_eq!(report.feed.submitted, 1);
    assert!(report.final_snapshot.sim_time_secs >= 10.0);
}
