use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;

use usb_device::control::Request;
use usbd_mass_storage::ClassRequest;

use crate::api::{Event, RequestOutcome};
use crate::events::EventQueue;
use crate::handoff::Handoff;

const RESET_BULK_ONLY: u8 = 0b01;
const RESET_BUS: u8 = 0b10;

/// A reset raised in interrupt context that the worker hasn't run yet
#[derive(Clone, Copy, Eq, PartialEq, Debug)]
pub(crate) enum PendingReset {
    /// Bulk-Only Mass Storage Reset: forget the command and listen for the next CBW
    BulkOnly,
    /// Bus reset: forget the command and wait for the host to configure us again
    Bus,
}

/// State shared by interrupt context and the worker. Everything in here is safe to
/// touch from an interrupt handler: nothing blocks and nothing allocates.
pub(crate) struct Shared {
    pub(crate) events: EventQueue,
    pub(crate) handoff: Handoff,
    /// Set while the armed receive on bulk OUT is for a command block wrapper
    pub(crate) waiting_for_command: AtomicBool,
    /// Resets not yet run by the worker. Kept apart from the event queue, which drops
    /// events when full
    pending_reset: AtomicU8,
    pub(crate) max_lun: u8,
    pub(crate) interface_number: u8,
}

impl Shared {
    pub(crate) fn new(max_lun: u8, interface_number: u8) -> Shared {
        Shared {
            events: EventQueue::new(),
            handoff: Handoff::new(),
            waiting_for_command: AtomicBool::new(false),
            pending_reset: AtomicU8::new(0),
            max_lun,
            interface_number,
        }
    }

    fn request_reset(&self, reset: PendingReset) {
        let bit = match reset {
            PendingReset::BulkOnly => RESET_BULK_ONLY,
            PendingReset::Bus => RESET_BUS,
        };
        self.pending_reset.fetch_or(bit, Ordering::SeqCst);
    }

    /// Claims the pending reset, if any. A bus reset covers a bulk-only one raised
    /// alongside it.
    pub(crate) fn take_reset(&self) -> Option<PendingReset> {
        let bits = self.pending_reset.swap(0, Ordering::SeqCst);
        if bits & RESET_BUS != 0 {
            Some(PendingReset::Bus)
        } else if bits & RESET_BULK_ONLY != 0 {
            Some(PendingReset::BulkOnly)
        } else {
            None
        }
    }
}

/// What the USB interrupt handler (or the USB stack's callbacks) calls into.
/// Cheap to clone; every method returns immediately.
#[derive(Clone)]
pub struct IrqHandle {
    shared: Arc<Shared>,
}

impl IrqHandle {
    pub(crate) fn new(shared: Arc<Shared>) -> IrqHandle { IrqHandle { shared } }

    /// A transfer on either bulk endpoint completed with `len` bytes
    pub fn transfer_complete(&self, len: usize) {
        if self.shared.waiting_for_command.swap(false, Ordering::SeqCst) {
            self.shared.events.post(Event::DataReady);
        } else {
            self.shared.handoff.release(len);
        }
    }

    /// Bus reset. The endpoint adapter has already cancelled its transfers
    pub fn usb_reset(&self) {
        log::info!("USB reset");
        self.shared.waiting_for_command.store(false, Ordering::SeqCst);
        self.shared.handoff.abort();
        // after the abort, so the reset that clears it always comes later
        self.shared.request_reset(PendingReset::Bus);
        self.shared.events.post(Event::UsbReset);
    }

    /// Bulk-Only Mass Storage Reset, also reachable through [`request_hook`](Self::request_hook).
    /// The endpoint adapter has already cancelled its transfers
    pub fn bot_reset(&self) {
        log::info!("bulk-only mass storage reset");
        self.shared.waiting_for_command.store(false, Ordering::SeqCst);
        self.shared.handoff.abort();
        // after the abort, so the reset that clears it always comes later
        self.shared.request_reset(PendingReset::BulkOnly);
        self.shared.events.post(Event::BotReset);
    }

    pub fn configured(&self) {
        self.shared.events.post(Event::Configured);
    }

    pub fn media_ejected(&self) {
        self.shared.events.post(Event::EjectRequested);
    }

    pub fn media_inserted(&self) {
        self.shared.events.post(Event::MediaInserted);
    }

    /// Services the mass storage class requests addressed to our interface. `data` is
    /// the control data stage buffer; for Get Max LUN its first byte is filled in.
    pub fn request_hook(&self, req: &Request, data: &mut [u8]) -> RequestOutcome {
        match ClassRequest::decode(req, self.shared.interface_number as u16) {
            Some(ClassRequest::BulkOnlyReset) => {
                self.bot_reset();
                RequestOutcome::Handled { data_len: 0 }
            }
            Some(ClassRequest::GetMaxLun) => match data.first_mut() {
                Some(byte) => {
                    *byte = self.shared.max_lun;
                    RequestOutcome::Handled { data_len: 1 }
                }
                None => RequestOutcome::NotHandled,
            },
            None => RequestOutcome::NotHandled,
        }
    }
}
