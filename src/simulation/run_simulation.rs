use clap::Parser;
use tracing::{error, info};

use rustic_drone_swarm::{
    simulation::{
        simulation::Simulation, simulation_config::SimulationConfig,
        simulation_error::SimulationError,
    },
    utils::logger::init_logger,
};

/// Simulacion de una flota de drones bomberos despachados por severidad.
#[derive(Parser, Debug)]
#[command(name = "drone_swarm")]
struct Args {
    /// Archivo de incidentes: <tiempo> <zona> <tipo> <severidad> por linea
    #[arg(value_name = "INPUT")]
    input: String,

    /// Configuracion JSON de la simulacion
    #[arg(long)]
    config: Option<String>,

    /// Cantidad de drones
    #[arg(long)]
    drones: Option<usize>,

    /// Segundos simulados por cada segundo real
    #[arg(long)]
    speed: Option<f64>,

    /// Hora simulada de arranque, HH:MM:SS
    #[arg(long)]
    start: Option<String>,
}

impl Args {
    fn simulation_config(&self) -> Result<SimulationConfig, SimulationError> {
        let mut config = match &self.config {
            Some(path) => SimulationConfig::new(path)?,
            None => SimulationConfig::default(),
        };

        if let Some(drones) = self.drones {
            config.fleet_size = drones;
        }
        if let Some(speed) = self.speed {
            config.speed_multiplier = speed;
        }
        if let Some(start) = &self.start {
            config.start_time = start.clone();
        }
        Ok(config)
    }
}

fn main() -> Result<(), SimulationError> {
    init_logger();
    let args = Args::parse();

    let config = args.simulation_config()?;
    let simulation = Simulation::new(config)?;

    match simulation.run_file(&args.input) {
        Ok(report) => {
            info!(
                submitted = report.feed.submitted,
                rejected_lines = report.rejected_lines,
                drained = report.drained,
                outstanding_water = report.final_snapshot.outstanding_water(),
                "Run complete"
            );
            Ok(())
        }
        Err(err) => {
            error!(error = %err, "Simulation failed");
            Err(err)
        }
    }
}
