pub mod fire_event;
pub mod fire_incident_feeder;
pub mod fire_severity;
pub mod incident_error;
pub mod incident_record;
