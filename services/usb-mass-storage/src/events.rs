use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};

use crate::api::{Event, EVENT_QUEUE_DEPTH};

/// Events from interrupt context (and the owner) to the worker, in order
pub(crate) struct EventQueue {
    tx: Sender<Event>,
    rx: Receiver<Event>,
}

impl EventQueue {
    pub(crate) fn new() -> EventQueue {
        let (tx, rx) = bounded(EVENT_QUEUE_DEPTH);
        EventQueue { tx, rx }
    }

    /// Never blocks; safe from interrupt context
    pub(crate) fn post(&self, event: Event) {
        match self.tx.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(event)) => log::warn!("event queue full, dropping {:?}", event),
            Err(TrySendError::Disconnected(event)) => log::debug!("no worker for {:?}", event),
        }
    }

    /// Waits for room. Thread context only
    pub(crate) fn post_blocking(&self, event: Event) {
        if self.tx.send(event).is_err() {
            log::debug!("no worker for {:?}", event);
        }
    }

    /// Blocks until the next event
    pub(crate) fn next(&self) -> Option<Event> {
        self.rx.recv().ok()
    }

    #[cfg(test)]
    pub(crate) fn is_empty(&self) -> bool { self.rx.is_empty() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overflow_drops_newest() {
        let queue = EventQueue::new();
        queue.post(Event::Configured);
        for _ in 1..EVENT_QUEUE_DEPTH {
            queue.post(Event::DataReady);
        }
        queue.post(Event::BotReset);
        assert_eq!(queue.next(), Some(Event::Configured));
        for _ in 1..EVENT_QUEUE_DEPTH {
            assert_eq!(queue.next(), Some(Event::DataReady));
        }
        assert!(queue.is_empty());
    }
}
