use std::{fmt::Write, sync::Arc, time::Duration};

use tracing::{debug, info, warn};

use crate::{
    dispatcher::{dispatch_snapshot::DispatchSnapshot, dispatcher::Dispatcher},
    simulation_clock::{simulation_clock::format_sim_time, stop_signal::StopSignal},
};

/// Observador de solo lectura: cada `interval` toma una foto del Dispatcher y la loguea.
///
/// Nunca espera en el Dispatcher, solo toma el lock el tiempo de armar la foto.
#[derive(Debug)]
pub struct StatusMonitor {
    dispatcher: Arc<Dispatcher>,
    interval: Duration,
    stop: StopSignal,
}

impl StatusMonitor {
    pub fn new(dispatcher: Arc<Dispatcher>, interval: Duration, stop: StopSignal) -> StatusMonitor {
        StatusMonitor {
            dispatcher,
            interval,
            stop,
        }
    }

    /// Corre hasta la señal de parada. Devuelve cuantas fotos se tomaron.
    pub fn run(&self) -> usize {
        let mut polls = 0;

        loop {
            match self.dispatcher.snapshot() {
                Ok(snapshot) => {
                    polls += 1;
                    info!("{}", render_status(&snapshot));
                    match serde_json::to_string(&snapshot) {
                        Ok(json) => debug!(snapshot = %json, "Dispatcher snapshot"),
                        Err(err) => warn!(error = %err, "Could not serialize snapshot"),
                    }
                }
                Err(err) => {
                    warn!(error = %err, "Monitor could not read the dispatcher");
                    return polls;
                }
            }

            if self.stop.wait_timeout(self.interval) {
                return polls;
            }
        }
    }
}

/// Resumen de una linea: hora, estado, incendios por severidad, agua por zona y
/// el estado de cada Drone.
pub fn render_status(snapshot: &DispatchSnapshot) -> String {
    let [high, moderate, low] = snapshot.fire_counts;
    let mut line = format!(
        "[{}] {} fires H={} M={} L={}",
        format_sim_time(snapshot.sim_time_secs),
        snapshot.state,
        high,
        moderate,
        low
    );

    if !snapshot.active_water_per_zone.is_empty() {
        line.push_str(" water");
        for (zone_id, liters) in &snapshot.active_water_per_zone {
            let _ = write!(line, " z{}={}L", zone_id, liters);
        }
    }

    for (drone_id, drone) in &snapshot.drones {
        let _ = write!(
            line,
            " | drone {} {} {}L ({},{})",
            drone_id, drone.state, drone.water_level, drone.position.x, drone.position.y
        );
    }
    line
}

#[cfg(test)]
mod tests {
    use std::{collections::BTreeMap, thread};

    use crate::{
        dispatcher::operational_state::OperationalState,
        drones::{drone_handle::DroneTelemetry, drone_state::DroneState},
        simulation_clock::simulation_clock::SimulationClock,
        utils::grid_position::GridPosition,
    };

    use super::*;

    #[test]
    fn test_01_render_status_line() {
        let mut drones = BTreeMap::new();
        drones.insert(
            0,
            DroneTelemetry {
                state: DroneState::OnRoute,
                water_level: 15,
                position: GridPosition::new(3, 3),
            },
        );
        let mut water = BTreeMap::new();
        water.insert(2, 30);

        let snapshot = DispatchSnapshot {
            state: OperationalState::Monitoring,
            drones,
            fire_counts: [1, 0, 0],
            queued_fire_counts: [0, 0, 0],
            active_water_per_zone: water,
            sim_time_secs: 3725.0,
        };

        assert_eq!(
            render_status(&snapshot),
            "[01:02:05] MONITORING fires H=1 M=0 L=0 water z2=30L | drone 0 ON_ROUTE 15L (3,3)"
        );
    }

    #[test]
    fn test_02_monitor_stops_on_signal() {
        let dispatcher = Arc::new(Dispatcher::new(Arc::new(SimulationClock::new())));
        let stop = StopSignal::new();
        let monitor = StatusMonitor::new(dispatcher, Duration::from_millis(5), stop.clone());

        let handle = thread::spawn(move || monitor.run());
        thread::sleep(Duration::from_millis(30));
        stop.stop();

        assert!(handle.join().unwrap() >= 1);
    }
}
