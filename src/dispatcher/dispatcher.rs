use std::{
    collections::{BTreeMap, HashMap, HashSet},
    sync::{Arc, Condvar, Mutex, MutexGuard},
    time::Duration,
};

use tracing::{debug, info, warn};

use crate::{
    drones::{
        drone_handle::{DroneHandle, DroneId},
        drone_state::DroneState,
    },
    fire_incident::fire_event::{FireEvent, FireEventId, ZoneId},
    simulation_clock::{simulation_clock::SimulationClock, stop_signal::StopSignal},
};

use super::{
    dispatch_snapshot::{DispatchSnapshot, DroneSnapshot},
    dispatcher_error::DispatchError,
    mission::{Mission, MissionResponse},
    operational_state::OperationalState,
    severity_queues::SeverityQueues,
};

/// Cada cuanto se despiertan las esperas para mirar la señal de parada.
const STOP_POLL_INTERVAL: Duration = Duration::from_millis(50);

#[derive(Debug, Default)]
struct DispatchState {
    queues: SeverityQueues,
    drones: HashMap<DroneId, Arc<DroneHandle>>,
    active_missions: HashMap<DroneId, Mission>,
    assigned_water_per_zone: HashMap<ZoneId, u32>,
    refilling: HashSet<DroneId>,
    next_event_id: FireEventId,
    shutting_down: bool,
}

impl DispatchState {
    fn drone(&self, drone_id: DroneId) -> Result<Arc<DroneHandle>, DispatchError> {
        self.drones
            .get(&drone_id)
            .cloned()
            .ok_or(DispatchError::UnknownDrone(drone_id))
    }

    fn operational_state(&self) -> OperationalState {
        OperationalState::derive(
            self.queues.len(),
            self.active_missions.len(),
            self.refilling.len(),
        )
    }

    fn is_quiescent(&self) -> bool {
        self.queues.is_empty() && self.active_missions.is_empty() && self.refilling.is_empty()
    }

    fn fire_counts(&self) -> [usize; 3] {
        let mut counts = self.queues.counts();
        for mission in self.active_missions.values() {
            counts[mission.severity.count_index()] += 1;
        }
        counts
    }

    fn active_water_per_zone(&self) -> BTreeMap<ZoneId, u32> {
        let mut total: BTreeMap<ZoneId, u32> = BTreeMap::new();
        for event in self.queues.iter() {
            *total.entry(event.zone_id()).or_insert(0) += event.remaining_water();
        }
        for (zone_id, liters) in &self.assigned_water_per_zone {
            *total.entry(*zone_id).or_insert(0) += liters;
        }
        total.retain(|_, liters| *liters > 0);
        total
    }

    fn drone_snapshots(&self) -> BTreeMap<DroneId, DroneSnapshot> {
        self.drones
            .iter()
            .map(|(id, handle)| (*id, handle.telemetry()))
            .collect()
    }

    fn enqueue(&mut self, mut event: FireEvent) -> FireEventId {
        let id = self.next_event_id;
        self.next_event_id += 1;
        event.assign_id(id);
        self.queues.push_back(event);
        id
    }

    /// Libera agua asignada a una zona; la entrada desaparece al llegar a cero.
    fn release_zone_water(&mut self, zone_id: ZoneId, liters: u32) {
        if let Some(assigned) = self.assigned_water_per_zone.get_mut(&zone_id) {
            if *assigned <= liters {
                self.assigned_water_per_zone.remove(&zone_id);
            } else {
                *assigned -= liters;
            }
        }
    }
}

/// Monitor central del sistema: recibe incendios, los ordena por severidad y se los
/// reparte a los drones que piden trabajo.
///
/// Todo el estado vive detras de un unico Mutex. `request_mission` es la unica
/// operacion que espera (sobre `work_available`) cuando no hay incendios en cola.
#[derive(Debug)]
pub struct Dispatcher {
    state: Mutex<DispatchState>,
    work_available: Condvar,
    quiescent: Condvar,
    clock: Arc<SimulationClock>,
}

impl Dispatcher {
    pub fn new(clock: Arc<SimulationClock>) -> Dispatcher {
        Dispatcher {
            state: Mutex::new(DispatchState::default()),
            work_available: Condvar::new(),
            quiescent: Condvar::new(),
            clock,
        }
    }

    fn lock_state(&self) -> Result<MutexGuard<'_, DispatchState>, DispatchError> {
        self.state.lock().map_err(|_| DispatchError::LockPoisoned)
    }

    /// Recalcula el estado operativo despues de una mutacion y avisa a quien
    /// espere que el sistema quede en reposo.
    fn state_changed(&self, state: &DispatchState, before: OperationalState) {
        let after = state.operational_state();
        if after != before {
            debug!(from = %before, to = %after, "Dispatcher state transition");
        }
        if state.is_quiescent() {
            self.quiescent.notify_all();
        }
    }

    pub fn clock(&self) -> &Arc<SimulationClock> {
        &self.clock
    }

    /// Registra un Drone. Tiene que hacerse antes de que el Drone pida misiones.
    pub fn register_drone(&self, drone: Arc<DroneHandle>) -> Result<(), DispatchError> {
        let mut state = self.lock_state()?;
        let drone_id = drone.id();
        if state.drones.contains_key(&drone_id) {
            return Err(DispatchError::DuplicateDrone(drone_id));
        }

        state.drones.insert(drone_id, drone);
        info!(drone_id, "Drone registered");
        Ok(())
    }

    /// Recibe un incendio nuevo y lo encola segun su severidad.
    ///
    /// Devuelve el id asignado al evento.
    pub fn submit(&self, event: FireEvent) -> Result<FireEventId, DispatchError> {
        let mut state = self.lock_state()?;
        let before = state.operational_state();

        let zone_id = event.zone_id();
        let severity = event.severity();
        let water = event.remaining_water();
        let event_id = state.enqueue(event);

        info!(
            sim_time = %self.clock.formatted_time(),
            event_id,
            zone_id,
            severity = %severity,
            water,
            "Fire reported"
        );

        self.state_changed(&state, before);
        self.work_available.notify_all();
        Ok(event_id)
    }

    /// Un Drone libre pide trabajo.
    ///
    /// Si el Drone no tiene agua, queda en Refilling y vuelve `MissionResponse::Refill`.
    /// Si no hay incendios en cola, bloquea hasta que llegue uno (o un reencolado).
    /// Durante la espera se atienden la señal de parada, el apagado del Dispatcher y
    /// la baja del Drone.
    pub fn request_mission(
        &self,
        drone_id: DroneId,
        stop: &StopSignal,
    ) -> Result<MissionResponse, DispatchError> {
        let mut state = self.lock_state()?;
        let drone = state.drone(drone_id)?;

        if state.active_missions.contains_key(&drone_id) {
            return Err(DispatchError::MissionInProgress(drone_id));
        }

        let drone_water = drone.water_level();
        if drone_water == 0 {
            let before = state.operational_state();
            drone.set_state(DroneState::Refilling);
            state.refilling.insert(drone_id);
            info!(drone_id, "Drone has an empty tank, sending it to refill");
            self.state_changed(&state, before);
            return Ok(MissionResponse::Refill);
        }

        let mut event = loop {
            if state.shutting_down || stop.is_stopped() {
                return Err(DispatchError::Cancelled);
            }
            if drone.is_decommission_requested() {
                return Ok(MissionResponse::Decommissioned);
            }
            if let Some(event) = state.queues.pop_highest() {
                break event;
            }
            let (guard, _) = self
                .work_available
                .wait_timeout(state, STOP_POLL_INTERVAL)
                .map_err(|_| DispatchError::LockPoisoned)?;
            state = guard;
        };

        let before = state.operational_state();
        let needed = event.remaining_water();
        let water_to_assign = drone_water.min(needed);
        event.consume(water_to_assign);
        let mission = Mission::from_event(&event, water_to_assign);

        *state
            .assigned_water_per_zone
            .entry(mission.zone_id)
            .or_insert(0) += water_to_assign;

        if event.is_extinguished() {
            info!(
                sim_time = %self.clock.formatted_time(),
                drone_id,
                zone_id = mission.zone_id,
                severity = %mission.severity,
                water = water_to_assign,
                "Drone assigned FULL mission"
            );
        } else {
            info!(
                sim_time = %self.clock.formatted_time(),
                drone_id,
                zone_id = mission.zone_id,
                severity = %mission.severity,
                water = water_to_assign,
                remaining = event.remaining_water(),
                "Drone assigned PARTIAL mission"
            );
            state.queues.push_front(event);
            self.work_available.notify_all();
        }

        state.active_missions.insert(drone_id, mission.clone());
        self.state_changed(&state, before);
        Ok(MissionResponse::Assigned(mission))
    }

    /// El Drone avisa que termino un viaje.
    ///
    /// El Drone tiene que actualizar su tanque antes de avisar: si quedo vacio, ya
    /// cuenta como recargando aunque su etiqueta sea Idle.
    ///
    /// Solo se acepta una vez por mision: un segundo aviso devuelve
    /// `DispatchError::NoActiveMission` y no toca ningun contador.
    pub fn mission_completed(
        &self,
        drone_id: DroneId,
        zone_id: ZoneId,
        water_used: u32,
    ) -> Result<(), DispatchError> {
        let mut state = self.lock_state()?;
        let drone = state.drone(drone_id)?;

        let mission = match state.active_missions.get(&drone_id) {
            Some(mission) if mission.zone_id != zone_id => {
                return Err(DispatchError::ZoneMismatch {
                    drone_id,
                    expected: mission.zone_id,
                    reported: zone_id,
                })
            }
            Some(mission) => mission.clone(),
            None => {
                warn!(drone_id, zone_id, "Completion reported without an active mission");
                return Err(DispatchError::NoActiveMission(drone_id));
            }
        };

        let before = state.operational_state();
        state.active_missions.remove(&drone_id);
        drone.set_state(DroneState::Idle);
        if drone.water_level() == 0 {
            // El Drone va a salir a recargar: se cuenta desde ahora para que el
            // sistema no parezca en reposo antes de su `drone_refilling`.
            state.refilling.insert(drone_id);
        }

        if water_used > mission.water_assigned {
            warn!(
                drone_id,
                zone_id,
                water_used,
                water_assigned = mission.water_assigned,
                "Drone reported more water than assigned, clamping"
            );
        }
        let released = water_used.min(mission.water_assigned);
        state.release_zone_water(zone_id, mission.water_assigned);

        let shortfall = mission.water_assigned - released;
        if shortfall > 0 {
            // Lo que no se tiro vuelve al frente de su severidad.
            let mut remainder =
                FireEvent::new(zone_id, mission.event_type.clone(), mission.severity, self.clock.now())
                    .remainder_of(shortfall);
            remainder.assign_id(mission.event_id);
            warn!(drone_id, zone_id, shortfall, "Requeueing water the drone did not drop");
            state.queues.push_front(remainder);
        }

        info!(
            sim_time = %self.clock.formatted_time(),
            drone_id,
            zone_id,
            water_used = released,
            "Drone completed mission"
        );

        self.state_changed(&state, before);
        self.work_available.notify_all();
        Ok(())
    }

    /// El Drone avisa que sale a recargar agua. Avisar dos veces no cuenta doble.
    pub fn drone_refilling(&self, drone_id: DroneId) -> Result<(), DispatchError> {
        let mut state = self.lock_state()?;
        let drone = state.drone(drone_id)?;
        let before = state.operational_state();

        drone.set_state(DroneState::Refilling);
        if state.refilling.insert(drone_id) {
            info!(drone_id, "Drone going for water refill");
        }

        self.state_changed(&state, before);
        Ok(())
    }

    /// El Drone avisa que termino de recargar y esta listo para misiones.
    pub fn drone_refill_complete(&self, drone_id: DroneId) -> Result<(), DispatchError> {
        let mut state = self.lock_state()?;
        let drone = state.drone(drone_id)?;
        let before = state.operational_state();

        state.refilling.remove(&drone_id);
        drone.set_state(DroneState::Idle);
        info!(drone_id, "Drone refill complete, ready for missions");

        self.state_changed(&state, before);
        self.work_available.notify_all();
        Ok(())
    }

    /// Da de baja un Drone. Si estaba esperando una mision, se despierta y sale.
    pub fn decommission_drone(&self, drone_id: DroneId) -> Result<(), DispatchError> {
        let state = self.lock_state()?;
        let drone = state.drone(drone_id)?;

        drone.request_decommission();
        info!(drone_id, "Drone decommission requested");

        self.work_available.notify_all();
        Ok(())
    }

    /// Apaga el Dispatcher: todo `request_mission` pendiente vuelve con `Cancelled`.
    pub fn shutdown(&self) {
        let mut state = match self.state.lock() {
            Ok(state) => state,
            Err(poisoned) => poisoned.into_inner(),
        };
        state.shutting_down = true;
        self.work_available.notify_all();
        self.quiescent.notify_all();
    }

    /// Bloquea hasta que no queden incendios en cola, misiones activas ni drones
    /// recargando. Una señal de parada o el apagado cortan la espera.
    pub fn wait_until_idle(&self, stop: &StopSignal) -> Result<(), DispatchError> {
        let mut state = self.lock_state()?;
        while !state.is_quiescent() {
            if state.shutting_down || stop.is_stopped() {
                return Err(DispatchError::Cancelled);
            }
            // El timeout solo sirve para mirar la señal de parada, el predicado se
            // vuelve a chequear en cada vuelta.
            let (guard, _) = self
                .quiescent
                .wait_timeout(state, STOP_POLL_INTERVAL)
                .map_err(|_| DispatchError::LockPoisoned)?;
            state = guard;
        }
        Ok(())
    }

    pub fn snapshot_drone_states(&self) -> Result<BTreeMap<DroneId, DroneSnapshot>, DispatchError> {
        Ok(self.lock_state()?.drone_snapshots())
    }

    /// Incendios activos como `[high, moderate, low]`: en cola mas drones en mision.
    pub fn fire_counts_by_severity(&self) -> Result<[usize; 3], DispatchError> {
        Ok(self.lock_state()?.fire_counts())
    }

    /// Incendios en cola como `[high, moderate, low]`.
    pub fn queued_fire_counts(&self) -> Result<[usize; 3], DispatchError> {
        Ok(self.lock_state()?.queues.counts())
    }

    /// Litros pendientes por zona: lo que esta en cola mas lo asignado a drones.
    pub fn active_water_per_zone(&self) -> Result<BTreeMap<ZoneId, u32>, DispatchError> {
        Ok(self.lock_state()?.active_water_per_zone())
    }

    pub fn current_state(&self) -> Result<OperationalState, DispatchError> {
        Ok(self.lock_state()?.operational_state())
    }

    /// Todas las consultas juntas, leidas bajo el mismo lock.
    pub fn snapshot(&self) -> Result<DispatchSnapshot, DispatchError> {
        let state = self.lock_state()?;
        Ok(DispatchSnapshot {
            state: state.operational_state(),
            drones: state.drone_snapshots(),
            fire_counts: state.fire_counts(),
            queued_fire_counts: state.queues.counts(),
            active_water_per_zone: state.active_water_per_zone(),
            sim_time_secs: self.clock.now(),
        })
    }
}
