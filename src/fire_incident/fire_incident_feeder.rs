use std::sync::Arc;

use tracing::{error, info};

use crate::{
    dispatcher::{dispatcher::Dispatcher, dispatcher_error::DispatchError},
    simulation_clock::{
        clock_error::ClockError, simulation_clock::SimulationClock, stop_signal::StopSignal,
    },
};

use super::{incident_error::IncidentError, incident_record::IncidentRecord};

/// Cuantos registros llegaron al Dispatcher y cuantos rechazo.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct FeedSummary {
    pub submitted: usize,
    pub skipped: usize,
}

/// Reproduce un archivo de incidentes contra el reloj simulado: espera la hora de
/// cada registro y lo manda al Dispatcher.
///
/// Las horas de los registros son absolutas, asi que un reloj que arranca a las
/// 08:00:00 manda enseguida todo lo anterior a esa hora.
#[derive(Debug)]
pub struct FireIncidentFeeder {
    dispatcher: Arc<Dispatcher>,
    clock: Arc<SimulationClock>,
    stop: StopSignal,
}

impl FireIncidentFeeder {
    pub fn new(
        dispatcher: Arc<Dispatcher>,
        clock: Arc<SimulationClock>,
        stop: StopSignal,
    ) -> FireIncidentFeeder {
        FireIncidentFeeder {
            dispatcher,
            clock,
            stop,
        }
    }

    pub fn run(&self, records: &[IncidentRecord]) -> Result<FeedSummary, IncidentError> {
        let mut summary = FeedSummary::default();

        for record in records {
            match self
                .clock
                .sleep_until_simulated(record.event_time_secs, &self.stop)
            {
                Ok(()) => {}
                Err(ClockError::Interrupted) => return Err(IncidentError::Interrupted),
                Err(err) => {
                    error!(error = %err, "Feeder clock failure");
                    return Err(IncidentError::Interrupted);
                }
            }

            match self.dispatcher.submit(record.to_fire_event()) {
                Ok(_) => summary.submitted += 1,
                Err(DispatchError::Cancelled) => return Err(IncidentError::Interrupted),
                Err(err) => {
                    error!(
                        zone_id = record.zone_id,
                        severity = %record.severity,
                        error = %err,
                        "Dispatcher rejected incident"
                    );
                    summary.skipped += 1;
                }
            }
        }

        info!(
            submitted = summary.submitted,
            skipped = summary.skipped,
            "Incident feed finished"
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use std::{thread, time::Duration};

    use crate::fire_incident::fire_severity::FireSeverity;

    use super::*;

    fn record(event_time_secs: f64, zone_id: u32, severity: FireSeverity) -> IncidentRecord {
        IncidentRecord {
            event_time_secs,
            zone_id,
            event_type: "FIRE_DETECTED".to_string(),
            severity,
        }
    }

    fn setup_feeder(speed: f64) -> (FireIncidentFeeder, Arc<Dispatcher>, StopSignal) {
        let clock = Arc::new(SimulationClock::new());
        clock.set_speed_multiplier(speed).unwrap();
        let dispatcher = Arc::new(Dispatcher::new(Arc::clone(&clock)));
        let stop = StopSignal::new();
        let feeder = FireIncidentFeeder::new(Arc::clone(&dispatcher), clock, stop.clone());
        (feeder, dispatcher, stop)
    }

    #[test]
    fn test_01_feeder_submits_every_record() {
        let (feeder, dispatcher, _) = setup_feeder(10_000.0);
        let records = vec![
            record(0.0, 1, FireSeverity::Low),
            record(2.0, 2, FireSeverity::High),
            record(3.0, 3, FireSeverity::Moderate),
        ];

        let summary = feeder.run(&records).unwrap();

        assert_eq!(
            summary,
            FeedSummary {
                submitted: 3,
                skipped: 0
            }
        );
        assert_eq!(dispatcher.queued_fire_counts().unwrap(), [1, 1, 1]);
    }

    #[test]
    fn test_02_feeder_waits_for_record_time() {
        let (feeder, dispatcher, _) = setup_feeder(10_000.0);
        let records = vec![record(20.0, 4, FireSeverity::Low)];

        feeder.run(&records).unwrap();

        assert!(dispatcher.clock().now() >= 20.0);
        assert_eq!(dispatcher.active_water_per_zone().unwrap().get(&4), Some(&10));
    }

    #[test]
    fn test_03_stop_interrupts_feed() {
        let (feeder, dispatcher, stop) = setup_feeder(1.0);
        let records = vec![
            record(0.0, 1, FireSeverity::Low),
            record(3600.0, 2, FireSeverity::High),
        ];

        let stopper = thread::spawn(move || {
            thread::sleep(Duration::from_millis(30));
            stop.stop();
        });

        assert_eq!(feeder.run(&records), Err(IncidentError::Interrupted));
        stopper.join().unwrap();
        assert_eq!(dispatcher.queued_fire_counts().unwrap(), [0, 0, 1]);
    }

    #[test]
    fn test_04_empty_feed() {
        let (feeder, _, _) = setup_feeder(1.0);
        assert_eq!(feeder.run(&[]).unwrap(), FeedSummary::default());
    }
}
