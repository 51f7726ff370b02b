use std::{
    collections::BTreeMap,
    sync::{
        mpsc::{self, Receiver, Sender},
        Arc,
    },
};

use threadpool::ThreadPool;
use tracing::{info, warn};

use crate::{
    dispatcher::dispatcher::Dispatcher,
    simulation_clock::{simulation_clock::SimulationClock, stop_signal::StopSignal},
};

use super::{
    drone::Drone,
    drone_config::DroneConfig,
    drone_error::DroneError,
    drone_handle::{DroneHandle, DroneId},
    drone_state::DroneState,
};

/// Resultado de un Drone cuando su hilo termina.
pub type DroneOutcome = (DroneId, Result<DroneState, DroneError>);

/// La flota esta compuesta por sus Drones, cada uno corriendo en un hilo del pool.
///
/// Los ids son secuenciales empezando en cero. Cada Drone se registra en el
/// Dispatcher antes de arrancar, asi nunca pide una mision sin estar registrado.
#[derive(Debug)]
pub struct DroneFleet {
    handles: BTreeMap<DroneId, Arc<DroneHandle>>,
    pool: ThreadPool,
    dispatcher: Arc<Dispatcher>,
    clock: Arc<SimulationClock>,
    drone_config: DroneConfig,
    stop: StopSignal,

    outcome_sender: Sender<DroneOutcome>,
    outcome_receiver: Receiver<DroneOutcome>,
}

impl DroneFleet {
    pub fn new(
        size: usize,
        drone_config: DroneConfig,
        dispatcher: Arc<Dispatcher>,
        clock: Arc<SimulationClock>,
        stop: StopSignal,
    ) -> DroneFleet {
        let (outcome_sender, outcome_receiver) = mpsc::channel();

        DroneFleet {
            handles: BTreeMap::new(),
            pool: ThreadPool::with_name("drone".to_string(), size.max(1)),
            dispatcher,
            clock,
            drone_config,
            stop,
            outcome_sender,
            outcome_receiver,
        }
    }

    /// Crea un Drone con el primer id libre, lo registra y lo pone a correr.
    ///
    /// Cada Drone ocupa un hilo del pool durante toda la simulacion, asi que la flota
    /// no acepta mas Drones que hilos. Retorna el id del Drone creado o DroneError
    /// en caso de error.
    pub fn add_drone(&mut self) -> Result<DroneId, DroneError> {
        let capacity = self.pool.max_count();
        if self.handles.len() >= capacity {
            warn!(capacity, "Drone fleet is full");
            return Err(DroneError::FleetFull(capacity));
        }

        let mut id = 0;
        while self.handles.contains_key(&id) {
            id += 1;
        }

        let mut drone = Drone::new(
            id,
            self.drone_config.clone(),
            Arc::clone(&self.dispatcher),
            Arc::clone(&self.clock),
            self.stop.clone(),
        )?;
        let handle = drone.handle();
        self.dispatcher.register_drone(Arc::clone(&handle))?;
        self.handles.insert(id, handle);

        let sender = self.outcome_sender.clone();
        self.pool.execute(move || {
            let outcome = drone.run();
            if let Err(err) = &outcome {
                warn!(drone_id = id, error = %err, "Drone finished with an error");
            }
            let _ = sender.send((id, outcome));
        });

        Ok(id)
    }

    /// Lanza `count` Drones nuevos y devuelve sus ids.
    pub fn launch(&mut self, count: usize) -> Result<Vec<DroneId>, DroneError> {
        let mut ids = Vec::with_capacity(count);
        for _ in 0..count {
            ids.push(self.add_drone()?);
        }
        info!(drones = ids.len(), "Drone fleet launched");
        Ok(ids)
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    pub fn get_drone(&self, id: DroneId) -> Option<&Arc<DroneHandle>> {
        self.handles.get(&id)
    }

    pub fn handles(&self) -> &BTreeMap<DroneId, Arc<DroneHandle>> {
        &self.handles
    }

    pub fn decommission_all(&self) -> Result<(), DroneError> {
        for id in self.handles.keys() {
            self.dispatcher.decommission_drone(*id)?;
        }
        Ok(())
    }

    /// Espera a que terminen todos los hilos y devuelve el resultado de cada Drone,
    /// ordenado por id.
    ///
    /// Antes hay que cortar la simulacion (señal de parada, apagado del Dispatcher
    /// o baja de los Drones): si no, los Drones siguen esperando misiones.
    pub fn join(self) -> Vec<DroneOutcome> {
        let DroneFleet {
            pool,
            outcome_sender,
            outcome_receiver,
            ..
        } = self;

        drop(outcome_sender);
        pool.join();

        let mut outcomes: Vec<DroneOutcome> = outcome_receiver.try_iter().collect();
        outcomes.sort_by_key(|(id, _)| *id);
        outcomes
    }
}
