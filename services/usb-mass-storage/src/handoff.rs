use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};

/// How the transfer the worker was waiting on ended
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub(crate) enum Completion {
    Done(usize),
    /// A reset cancelled it
    Aborted,
}

/// Binary semaphore that hands one transfer completion from interrupt context to the
/// worker. Releasing never blocks. An abort wins over a pending completion and stays
/// in force until [`reset`](Handoff::reset).
pub(crate) struct Handoff {
    signal_tx: Sender<()>,
    signal_rx: Receiver<()>,
    len: AtomicUsize,
    aborted: AtomicBool,
}

impl Handoff {
    pub(crate) fn new() -> Handoff {
        let (signal_tx, signal_rx) = bounded(1);
        Handoff { signal_tx, signal_rx, len: AtomicUsize::new(0), aborted: AtomicBool::new(false) }
    }

    pub(crate) fn release(&self, len: usize) {
        self.len.store(len, Ordering::SeqCst);
        if let Err(TrySendError::Full(_)) = self.signal_tx.try_send(()) {
            log::warn!("transfer completion of {} bytes with one already pending", len);
        }
    }

    pub(crate) fn abort(&self) {
        self.aborted.store(true, Ordering::SeqCst);
        let _ = self.signal_tx.try_send(());
    }

    pub(crate) fn is_aborted(&self) -> bool { self.aborted.load(Ordering::SeqCst) }

    /// Blocks until the transfer completes or is aborted
    pub(crate) fn acquire(&self) -> Completion {
        if self.is_aborted() {
            return Completion::Aborted;
        }
        if self.signal_rx.recv().is_err() || self.is_aborted() {
            return Completion::Aborted;
        }
        Completion::Done(self.len.load(Ordering::SeqCst))
    }

    /// Drops any stale completion and clears the abort. Worker only, between commands
    pub(crate) fn reset(&self) {
        while self.signal_rx.try_recv().is_ok() {}
        self.aborted.store(false, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    use super::*;

    #[test]
    fn test_release_then_acquire() {
        let handoff = Handoff::new();
        handoff.release(31);
        assert_eq!(handoff.acquire(), Completion::Done(31));
    }

    #[test]
    fn test_abort_wins() {
        let handoff = Handoff::new();
        handoff.release(64);
        handoff.abort();
        assert_eq!(handoff.acquire(), Completion::Aborted);
        // and keeps winning until reset
        assert_eq!(handoff.acquire(), Completion::Aborted);

        handoff.reset();
        assert!(!handoff.is_aborted());
        handoff.release(13);
        assert_eq!(handoff.acquire(), Completion::Done(13));
    }

    #[test]
    fn test_reset_drops_stale_completion() {
        let handoff = Handoff::new();
        handoff.release(512);
        handoff.reset();
        handoff.release(7);
        assert_eq!(handoff.acquire(), Completion::Done(7));
    }

    #[test]
    fn test_abort_wakes_blocked_worker() {
        let handoff = Arc::new(Handoff::new());
        let waiter = {
            let handoff = handoff.clone();
            thread::spawn(move || handoff.acquire())
        };
        thread::sleep(Duration::from_millis(20));
        handoff.abort();
        assert_eq!(waiter.join().unwrap(), Completion::Aborted);
    }
}
