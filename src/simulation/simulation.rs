use std::{
    sync::Arc,
    thread::{self, JoinHandle},
    time::Duration,
};

use tracing::{info, warn};

use crate::{
    dispatcher::{
        dispatch_snapshot::DispatchSnapshot, dispatcher::Dispatcher,
        dispatcher_error::DispatchError,
    },
    drones::drone_fleet::{DroneFleet, DroneOutcome},
    fire_incident::{
        fire_incident_feeder::{FeedSummary, FireIncidentFeeder},
        incident_error::IncidentError,
        incident_record::{load_incident_file, FeedPlan, IncidentRecord},
    },
    monitoring::status_monitor::{render_status, StatusMonitor},
    simulation_clock::{simulation_clock::SimulationClock, stop_signal::StopSignal},
};

use super::{simulation_config::SimulationConfig, simulation_error::SimulationError};

/// Lo que queda al final de una corrida.
#[derive(Debug)]
pub struct SimulationReport {
    pub feed: FeedSummary,
    /// Lineas del archivo de incidentes que no se pudieron leer.
    pub rejected_lines: usize,
    /// `true` si se llego a un estado sin incendios en cola, misiones ni recargas
    /// antes de que alguien cortara la corrida.
    pub drained: bool,
    pub final_snapshot: DispatchSnapshot,
    pub drone_outcomes: Vec<DroneOutcome>,
}

/// Arma todas las piezas de una corrida: reloj, Dispatcher, flota, feeder y monitor.
///
/// La corrida termina cuando el feeder mando todos los incidentes y el Dispatcher
/// queda en reposo, o cuando se dispara la señal de parada.
#[derive(Debug)]
pub struct Simulation {
    config: SimulationConfig,
    clock: Arc<SimulationClock>,
    dispatcher: Arc<Dispatcher>,
    stop: StopSignal,
}

impl Simulation {
    pub fn new(config: SimulationConfig) -> Result<Simulation, SimulationError> {
        config.validate()?;

        let clock = Arc::new(SimulationClock::new());
        let (hours, minutes, seconds) = config.start_time_hms()?;
        clock.set_start(hours, minutes, seconds)?;
        clock.set_speed_multiplier(config.speed_multiplier)?;

        let dispatcher = Arc::new(Dispatcher::new(Arc::clone(&clock)));

        Ok(Simulation {
            config,
            clock,
            dispatcher,
            stop: StopSignal::new(),
        })
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn clock(&self) -> Arc<SimulationClock> {
        Arc::clone(&self.clock)
    }

    pub fn dispatcher(&self) -> Arc<Dispatcher> {
        Arc::clone(&self.dispatcher)
    }

    /// Señal para cortar la corrida desde afuera.
    pub fn stop_signal(&self) -> StopSignal {
        self.stop.clone()
    }

    pub fn run_file(self, incident_file_path: &str) -> Result<SimulationReport, SimulationError> {
        let plan = load_incident_file(incident_file_path)?;
        info!(
            file = incident_file_path,
            records = plan.records.len(),
            rejected = plan.rejected,
            "Incident file loaded"
        );
        self.run(plan)
    }

    pub fn run(self, plan: FeedPlan) -> Result<SimulationReport, SimulationError> {
        self.clock.start();
        info!(
            sim_time = %self.clock.formatted_time(),
            drones = self.config.fleet_size,
            speed = self.config.speed_multiplier,
            "Simulation starting"
        );

        let mut fleet = DroneFleet::new(
            self.config.fleet_size,
            self.config.drone.clone(),
            Arc::clone(&self.dispatcher),
            Arc::clone(&self.clock),
            self.stop.clone(),
        );
        if let Err(err) = fleet.launch(self.config.fleet_size) {
            self.halt();
            fleet.join();
            return Err(err.into());
        }

        let monitor = self.spawn_monitor();
        let feeder = self.spawn_feeder(plan.records);

        let feed = match feeder.join() {
            Ok(Ok(summary)) => summary,
            Ok(Err(IncidentError::Interrupted)) => {
                warn!("Incident feed interrupted");
                FeedSummary::default()
            }
            Ok(Err(err)) => return Err(self.abort(fleet, monitor, err.into())),
            Err(_) => {
                let err = SimulationError::ThreadPanicked("feeder".to_string());
                return Err(self.abort(fleet, monitor, err));
            }
        };

        let drained = match self.dispatcher.wait_until_idle(&self.stop) {
            Ok(()) => true,
            Err(DispatchError::Cancelled) => false,
            Err(err) => return Err(self.abort(fleet, monitor, err.into())),
        };

        let final_snapshot = self.dispatcher.snapshot()?;
        info!("{}", render_status(&final_snapshot));

        self.halt();
        let drone_outcomes = fleet.join();
        if monitor.join().is_err() {
            return Err(SimulationError::ThreadPanicked("monitor".to_string()));
        }

        info!(
            submitted = feed.submitted,
            skipped = feed.skipped,
            drained,
            "Simulation finished"
        );

        Ok(SimulationReport {
            feed,
            rejected_lines: plan.rejected,
            drained,
            final_snapshot,
            drone_outcomes,
        })
    }

    /// Corta todo y espera a los hilos antes de devolver el error.
    fn abort(
        &self,
        fleet: DroneFleet,
        monitor: JoinHandle<usize>,
        err: SimulationError,
    ) -> SimulationError {
        self.halt();
        fleet.join();
        let _ = monitor.join();
        err
    }

    fn halt(&self) {
        self.stop.stop();
        self.dispatcher.shutdown();
    }

    fn spawn_monitor(&self) -> JoinHandle<usize> {
        let monitor = StatusMonitor::new(
            Arc::clone(&self.dispatcher),
            Duration::from_millis(self.config.status_interval_ms),
            self.stop.clone(),
        );
        thread::spawn(move || monitor.run())
    }

    fn spawn_feeder(
        &self,
        records: Vec<IncidentRecord>,
    ) -> JoinHandle<Result<FeedSummary, IncidentError>> {
        let feeder = FireIncidentFeeder::new(
            Arc::clone(&self.dispatcher),
            Arc::clone(&self.clock),
            self.stop.clone(),
        );
        thread::spawn(move || feeder.run(&records))
    }
}
