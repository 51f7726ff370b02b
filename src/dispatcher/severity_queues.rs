use std::collections::VecDeque;

use crate::fire_incident::{fire_event::FireEvent, fire_severity::FireSeverity};

/// Las tres colas FIFO de incendios, una por severidad.
#[derive(Debug, Default)]
pub struct SeverityQueues {
    high: VecDeque<FireEvent>,
    moderate: VecDeque<FireEvent>,
    low: VecDeque<FireEvent>,
}

impl SeverityQueues {
    pub fn new() -> SeverityQueues {
        SeverityQueues::default()
    }

    fn queue_mut(&mut self, severity: FireSeverity) -> &mut VecDeque<FireEvent> {
        match severity {
            FireSeverity::High => &mut self.high,
            FireSeverity::Moderate => &mut self.moderate,
            FireSeverity::Low => &mut self.low,
        }
    }

    /// Encola un evento nuevo al final de su severidad.
    pub fn push_back(&mut self, event: FireEvent) {
        self.queue_mut(event.severity()).push_back(event);
    }

    /// Reencola un evento parcialmente atendido al frente de su severidad, para que
    /// el resto se atienda antes que los eventos que llegaron despues.
    pub fn push_front(&mut self, event: FireEvent) {
        self.queue_mut(event.severity()).push_front(event);
    }

    /// Saca el evento mas viejo de la severidad mas alta que no este vacia.
    pub fn pop_highest(&mut self) -> Option<FireEvent> {
        self.high
            .pop_front()
            .or_else(|| self.moderate.pop_front())
            .or_else(|| self.low.pop_front())
    }

    pub fn is_empty(&self) -> bool {
        self.high.is_empty() && self.moderate.is_empty() && self.low.is_empty()
    }

    pub fn len(&self) -> usize {
        self.high.len() + self.moderate.len() + self.low.len()
    }

    /// Cantidad de eventos en cola como `[high, moderate, low]`.
    pub fn counts(&self) -> [usize; 3] {
        [self.high.len(), self.moderate.len(), self.low.len()]
    }

    pub fn iter(&self) -> impl Iterator<Item = &FireEvent> {
        self.high
            .iter()
            .chain(self.moderate.iter())
            .chain(self.low.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(zone_id: u32, severity: FireSeverity) -> FireEvent {
        FireEvent::new(zone_id, "FIRE_DETECTED", severity, 0.0)
    }

    #[test]
    fn test_01_pop_respects_severity_then_arrival() {
        let mut queues = SeverityQueues::new();
        queues.push_back(event(1, FireSeverity::Low));
        queues.push_back(event(2, FireSeverity::High));
        queues.push_back(event(3, FireSeverity::Moderate));
        queues.push_back(event(4, FireSeverity::High));

        let order: Vec<u32> = std::iter::from_fn(|| queues.pop_highest())
            .map(|e| e.zone_id())
            .collect();
        assert_eq!(order, vec![2, 4, 3, 1]);
        assert!(queues.is_empty());
    }

    #[test]
    fn test_02_push_front_jumps_ahead_of_same_tier() {
        let mut queues = SeverityQueues::new();
        queues.push_back(event(1, FireSeverity::Moderate));
        queues.push_front(event(2, FireSeverity::Moderate));
        queues.push_back(event(3, FireSeverity::Low));

        assert_eq!(queues.counts(), [0, 2, 1]);
        assert_eq!(queues.len(), 3);
        assert_eq!(queues.pop_highest().map(|e| e.zone_id()), Some(2));
    }
}
