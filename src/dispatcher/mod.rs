pub mod dispatch_snapshot;
pub mod dispatcher;
pub mod dispatcher_error;
pub mod mission;
pub mod operational_state;
pub mod severity_queues;
