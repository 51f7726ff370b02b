use std::sync::Arc;

use rand::Rng;
use tracing::{debug, info, warn};

use super::{
    drone_config::DroneConfig,
    drone_error::DroneError,
    drone_handle::{DroneHandle, DroneId},
    drone_state::DroneState,
};
use crate::{
    dispatcher::{
        dispatcher::Dispatcher,
        mission::{Mission, MissionResponse},
    },
    simulation_clock::{simulation_clock::SimulationClock, stop_signal::StopSignal},
    utils::{grid_position::GridPosition, zone_map::zone_center},
};

/// Un Drone bombero. Corre en su propio hilo el ciclo
/// "pedir trabajo -> viajar -> apagar -> (recargar) -> repetir".
///
/// El tanque y la posicion son del Drone: se modifican solo desde aca y se
/// publican en su `DroneHandle` para que el Dispatcher y los observadores los lean.
#[derive(Debug)]
pub struct Drone {
    id: DroneId,
    state: DroneState,
    position: GridPosition,
    water_level: u32,
    current_mission: Option<Mission>,

    handle: Arc<DroneHandle>,
    dispatcher: Arc<Dispatcher>,
    clock: Arc<SimulationClock>,
    drone_config: DroneConfig,
    stop: StopSignal,
}

impl Drone {
    /// El Drone arranca en la estacion de recarga, con el tanque lleno.
    ///
    /// Hay que registrar su `handle()` en el Dispatcher antes de ponerlo a correr.
    pub fn new(
        id: DroneId,
        drone_config: DroneConfig,
        dispatcher: Arc<Dispatcher>,
        clock: Arc<SimulationClock>,
        stop: StopSignal,
    ) -> Result<Drone, DroneError> {
        drone_config.validate()?;

        let position = drone_config.refill_station;
        let water_level = drone_config.capacity;
        let handle = Arc::new(DroneHandle::new(id, water_level, position));

        Ok(Drone {
            id,
            state: DroneState::Idle,
            position,
            water_level,
            current_mission: None,
            handle,
            dispatcher,
            clock,
            drone_config,
            stop,
        })
    }

    pub fn id(&self) -> DroneId {
        self.id
    }

    pub fn state(&self) -> DroneState {
        self.state
    }

    pub fn position(&self) -> GridPosition {
        self.position
    }

    pub fn water_level(&self) -> u32 {
        self.water_level
    }

    pub fn current_mission(&self) -> Option<&Mission> {
        self.current_mission.as_ref()
    }

    pub fn handle(&self) -> Arc<DroneHandle> {
        Arc::clone(&self.handle)
    }

    fn transition(&mut self, next: DroneState) {
        if self.state != next {
            debug!(drone_id = self.id, from = %self.state, to = %next, "Drone state transition");
        }
        self.state = next;
        self.handle.set_state(next);
    }

    fn set_water_level(&mut self, water_level: u32) {
        self.water_level = water_level.min(self.drone_config.capacity);
        self.handle.set_water_level(self.water_level);
    }

    fn set_position(&mut self, position: GridPosition) {
        self.position = position;
        self.handle.set_position(position);
    }

    /// Corre el Drone hasta que quede dado de baja, llegue la señal de parada
    /// o falle algo.
    ///
    /// Una cancelacion no es un error: se deja la transicion en curso a medias y se
    /// devuelve el estado en el que estaba.
    pub fn run(&mut self) -> Result<DroneState, DroneError> {
        info!(drone_id = self.id, "Drone starting operations");

        loop {
            if self.stop.is_stopped() {
                info!(drone_id = self.id, state = %self.state, "Drone stopped");
                return Ok(self.state);
            }

            match self.step() {
                Ok(DroneState::Decommissioned) => {
                    info!(drone_id = self.id, "Drone is decommissioned");
                    return Ok(DroneState::Decommissioned);
                }
                Ok(_) => {}
                Err(err) if err.is_cancellation() => {
                    info!(drone_id = self.id, state = %self.state, "Drone stopped");
                    return Ok(self.state);
                }
                Err(err) => {
                    warn!(drone_id = self.id, error = %err, "Drone loop failed");
                    return Err(err);
                }
            }
        }
    }

    /// Ejecuta la accion del estado actual y devuelve el estado siguiente.
    ///
    /// Un Drone que tiene que recargar termina la recarga antes de darse de baja, asi
    /// no queda contado como recargando en el Dispatcher.
    pub fn step(&mut self) -> Result<DroneState, DroneError> {
        if self.handle.is_decommission_requested() && self.state != DroneState::Refilling {
            self.transition(DroneState::Decommissioned);
            return Ok(self.state);
        }

        if self.state == DroneState::Idle
            && self.current_mission.is_none()
            && self.handle.take_fault_request()
        {
            warn!(drone_id = self.id, "Drone faulted");
            self.transition(DroneState::Faulted);
            return Ok(self.state);
        }

        match self.state {
            DroneState::Idle => self.request_work()?,
            DroneState::OnRoute => self.fly_to_mission()?,
            DroneState::Extinguishing => self.extinguish_fire()?,
            DroneState::Refilling => self.go_for_refill()?,
            DroneState::Faulted => self.recover_from_fault()?,
            DroneState::Decommissioned => {}
        }

        Ok(self.state)
    }

    fn request_work(&mut self) -> Result<(), DroneError> {
        match self.dispatcher.request_mission(self.id, &self.stop)? {
            MissionResponse::Assigned(mission) => {
                self.current_mission = Some(mission);
                self.transition(DroneState::OnRoute);
            }
            MissionResponse::Refill => self.transition(DroneState::Refilling),
            MissionResponse::Decommissioned => self.transition(DroneState::Decommissioned),
        }
        Ok(())
    }

    fn fly_to_mission(&mut self) -> Result<(), DroneError> {
        let zone_id = match &self.current_mission {
            Some(mission) => mission.zone_id,
            None => {
                warn!(drone_id = self.id, "Drone on route without a mission");
                self.transition(DroneState::Idle);
                return Ok(());
            }
        };

        let target = zone_center(zone_id);
        info!(
            drone_id = self.id,
            zone_id,
            x = target.x,
            y = target.y,
            "Drone moving to zone"
        );
        self.move_to(target)?;
        self.transition(DroneState::Extinguishing);
        Ok(())
    }

    /// Mueve al Drone de a una celda por vez, durmiendo `seconds_per_cell`
    /// segundos simulados por cada paso.
    pub fn move_to(&mut self, target: GridPosition) -> Result<(), DroneError> {
        while self.position != target {
            let next = self.position.step_towards(&target);
            self.clock
                .sleep_for_simulated(self.drone_config.seconds_per_cell, &self.stop)?;
            self.set_position(next);
        }

        debug!(
            drone_id = self.id,
            x = target.x,
            y = target.y,
            sim_time = %self.clock.formatted_time(),
            "Drone arrived at destination"
        );
        Ok(())
    }

    /// Secuencia de apagado: abre la boquilla, suelta el agua asignada y la cierra.
    /// Devuelve los litros soltados.
    pub fn drop_water(&mut self, liters: u32) -> Result<u32, DroneError> {
        let liters = liters.min(self.water_level);

        info!(
            drone_id = self.id,
            liters,
            sim_time = %self.clock.formatted_time(),
            "Drone starting extinguishing"
        );

        self.clock
            .sleep_for_simulated(self.drone_config.nozzle_open_secs, &self.stop)?;
        self.clock.sleep_for_simulated(
            liters as f64 / self.drone_config.flow_rate,
            &self.stop,
        )?;
        self.clock
            .sleep_for_simulated(self.drone_config.nozzle_close_secs, &self.stop)?;

        self.set_water_level(self.water_level - liters);
        Ok(liters)
    }

    fn extinguish_fire(&mut self) -> Result<(), DroneError> {
        let mission = match self.current_mission.clone() {
            Some(mission) => mission,
            None => {
                warn!(drone_id = self.id, "Drone extinguishing without a mission");
                self.transition(DroneState::Idle);
                return Ok(());
            }
        };

        let dropped = self.drop_water(mission.water_assigned)?;
        self.dispatcher
            .mission_completed(self.id, mission.zone_id, dropped)?;
        self.current_mission = None;

        self.maybe_inject_fault();

        if self.water_level == 0 {
            self.transition(DroneState::Refilling);
        } else {
            self.transition(DroneState::Idle);
        }
        Ok(())
    }

    fn maybe_inject_fault(&self) {
        let probability = self.drone_config.fault_probability;
        if probability > 0.0 && rand::thread_rng().gen_bool(probability) {
            self.handle.request_fault();
        }
    }

    /// Vuelve a la estacion, llena el tanque y avisa al Dispatcher.
    fn go_for_refill(&mut self) -> Result<(), DroneError> {
        self.dispatcher.drone_refilling(self.id)?;

        let station = self.drone_config.refill_station;
        self.move_to(station)?;
        self.refill_water()?;

        self.dispatcher.drone_refill_complete(self.id)?;
        self.transition(DroneState::Idle);
        Ok(())
    }

    /// Llena el tanque hasta su capacidad. Tarda `refill_secs` segundos simulados.
    pub fn refill_water(&mut self) -> Result<(), DroneError> {
        info!(
            drone_id = self.id,
            sim_time = %self.clock.formatted_time(),
            "Drone refilling water tank"
        );
        self.clock
            .sleep_for_simulated(self.drone_config.refill_secs, &self.stop)?;
        self.set_water_level(self.drone_config.capacity);
        Ok(())
    }

    fn recover_from_fault(&mut self) -> Result<(), DroneError> {
        info!(drone_id = self.id, "Drone is faulted, waiting for recovery");
        self.clock
            .sleep_for_simulated(self.drone_config.fault_recovery_secs, &self.stop)?;
        self.transition(DroneState::Idle);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::{sync::mpsc, thread, time::Duration};

    use crate::{
        dispatcher::operational_state::OperationalState,
        fire_incident::{fire_event::FireEvent, fire_severity::FireSeverity},
    };

    use super::*;

    // Helper function to setup a test drone
    fn setup_test_drone(id: DroneId) -> (Drone, Arc<Dispatcher>, StopSignal) {
        let clock = Arc::new(SimulationClock::new());
        clock.set_speed_multiplier(10_000.0).unwrap();
        let dispatcher = Arc::new(Dispatcher::new(Arc::clone(&clock)));
        let stop = StopSignal::new();

        let drone = Drone::new(
            id,
            DroneConfig::default(),
            Arc::clone(&dispatcher),
            clock,
            stop.clone(),
        )
        .unwrap();
        dispatcher.register_drone(drone.handle()).unwrap();

        (drone, dispatcher, stop)
    }

    #[test]
    fn test_01_drone_arranca_en_idle_con_tanque_lleno() {
        let (drone, _, _) = setup_test_drone(1);

        assert_eq!(drone.id(), 1);
        assert_eq!(drone.state(), DroneState::Idle);
        assert_eq!(drone.water_level(), 15);
        assert_eq!(drone.position(), GridPosition::new(0, 0));
        assert!(drone.current_mission().is_none());
    }

    #[test]
    fn test_02_drone_movement_reaches_target() {
        let (mut drone, dispatcher, _) = setup_test_drone(1);

        drone.move_to(GridPosition::new(3, 5)).unwrap();

        assert_eq!(drone.position(), GridPosition::new(3, 5));
        let snapshot = dispatcher.snapshot_drone_states().unwrap();
        assert_eq!(snapshot[&1].position, GridPosition::new(3, 5));
    }

    #[test]
    fn test_03_drop_water_never_exceeds_tank() {
        let (mut drone, _, _) = setup_test_drone(1);

        assert_eq!(drone.drop_water(10).unwrap(), 10);
        assert_eq!(drone.water_level(), 5);
        assert_eq!(drone.drop_water(10).unwrap(), 5);
        assert_eq!(drone.water_level(), 0);
    }

    #[test]
    fn test_04_full_mission_cycle() {
        let (mut drone, dispatcher, _) = setup_test_drone(1);
        dispatcher
            .submit(FireEvent::new(2, "FIRE_DETECTED", FireSeverity::Low, 0.0))
            .unwrap();

        assert_eq!(drone.step().unwrap(), DroneState::OnRoute);
        assert_eq!(drone.current_mission().unwrap().water_assigned, 10);
        assert_eq!(drone.step().unwrap(), DroneState::Extinguishing);
        assert_eq!(drone.position(), zone_center(2));
        assert_eq!(drone.step().unwrap(), DroneState::Idle);

        assert_eq!(drone.water_level(), 5);
        assert!(drone.current_mission().is_none());
        assert!(dispatcher.active_water_per_zone().unwrap().is_empty());
    }

    #[test]
    fn test_05_drone_sin_agua_va_a_recargarse() {
        let (mut drone, dispatcher, _) = setup_test_drone(1);
        dispatcher
            .submit(FireEvent::new(3, "FIRE_DETECTED", FireSeverity::High, 0.0))
            .unwrap();

        drone.step().unwrap();
        drone.step().unwrap();
        assert_eq!(drone.step().unwrap(), DroneState::Refilling);
        assert_eq!(drone.water_level(), 0);

        assert_eq!(drone.step().unwrap(), DroneState::Idle);
        assert_eq!(drone.water_level(), 15);
        assert_eq!(drone.position(), GridPosition::new(0, 0));

        assert_eq!(drone.step().unwrap(), DroneState::OnRoute);
        assert_eq!(drone.current_mission().unwrap().water_assigned, 15);
    }

    #[test]
    fn test_06_fault_request_goes_through_faulted() {
        let (mut drone, _, _) = setup_test_drone(1);
        drone.handle().request_fault();

        assert_eq!(drone.step().unwrap(), DroneState::Faulted);
        assert_eq!(drone.step().unwrap(), DroneState::Idle);
        assert_eq!(drone.water_level(), 15);
    }

    #[test]
    fn test_07_decommission_is_terminal() {
        let (mut drone, dispatcher, _) = setup_test_drone(4);
        dispatcher.decommission_drone(4).unwrap();

        assert_eq!(drone.run().unwrap(), DroneState::Decommissioned);
        assert_eq!(drone.handle().state(), DroneState::Decommissioned);
    }

    #[test]
    fn test_08_stop_signal_ends_run() {
        let (mut drone, dispatcher, stop) = setup_test_drone(1);
        stop.stop();
        dispatcher.shutdown();

        assert_eq!(drone.run().unwrap(), DroneState::Idle);
    }

    #[test]
    fn test_09_stop_alone_wakes_drone_waiting_for_work() {
        let (mut drone, _, stop) = setup_test_drone(1);
        let (sender, receiver) = mpsc::channel();

        thread::spawn(move || {
            let _ = sender.send(drone.run());
        });
        thread::sleep(Duration::from_millis(30));
        stop.stop();

        let outcome = receiver.recv_timeout(Duration::from_secs(2)).unwrap();
        assert_eq!(outcome, Ok(DroneState::Idle));
    }

    #[test]
    fn test_10_decommission_waits_for_pending_refill() {
        let (mut drone, dispatcher, _) = setup_test_drone(2);
        dispatcher
            .submit(FireEvent::new(1, "FIRE_DETECTED", FireSeverity::Moderate, 0.0))
            .unwrap();

        drone.step().unwrap();
        drone.step().unwrap();
        assert_eq!(drone.step().unwrap(), DroneState::Refilling);
        dispatcher.decommission_drone(2).unwrap();

        assert_eq!(drone.step().unwrap(), DroneState::Idle);
        assert_eq!(drone.water_level(), 15);
        assert_eq!(drone.step().unwrap(), DroneState::Decommissioned);
        assert_eq!(
            dispatcher.current_state().unwrap(),
            OperationalState::Dispatching
        );
    }
}

