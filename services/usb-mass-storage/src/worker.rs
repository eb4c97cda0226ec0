use std::sync::Arc;

use crossbeam_channel::Sender;
use usbd_scsi::{BlockDevice, Scsi};

use crate::api::{Event, Notification};
use crate::endpoint::{EndpointAdapter, HandoffEndpoints};
use crate::irq::{PendingReset, Shared};

/// Owns the command set and everything it touches. Handles one event at a time until
/// told to stop, then gives the block device back.
pub(crate) struct Worker<A: EndpointAdapter, BD: BlockDevice> {
    scsi: Scsi<HandoffEndpoints<A>, BD>,
    shared: Arc<Shared>,
    notifications: Sender<Notification>,
}

impl<A: EndpointAdapter, BD: BlockDevice> Worker<A, BD> {
    pub(crate) fn new(
        scsi: Scsi<HandoffEndpoints<A>, BD>,
        shared: Arc<Shared>,
        notifications: Sender<Notification>,
    ) -> Worker<A, BD> {
        Worker { scsi, shared, notifications }
    }

    fn notify(&self, notification: Notification) {
        // nobody listening is fine
        let _ = self.notifications.send(notification);
    }

    fn arm(&mut self) {
        self.scsi.transport_mut().endpoints_mut().arm_command();
    }

    fn run_command(&mut self) {
        let medium_was_present = self.scsi.medium_present();
        self.scsi.transport_mut().endpoints_mut().mark_command_ready();
        match self.scsi.process_command() {
            Ok(csw) => log::trace!("CSW {:X?}", csw),
            Err(e) => log::warn!("command dropped without status: {:?}", e),
        }
        if medium_was_present && !self.scsi.medium_present() {
            self.notify(Notification::Ejected);
        }
    }

    fn reset(&mut self) {
        self.shared.handoff.reset();
        self.scsi.reset();
    }

    /// Runs whatever reset interrupt context flagged. Checked after every event, so a
    /// reset whose event was dropped still runs once the worker is free.
    fn service_reset(&mut self) {
        match self.shared.take_reset() {
            Some(PendingReset::BulkOnly) => {
                self.reset();
                self.arm();
            }
            // the host reconfigures before it talks to us again
            Some(PendingReset::Bus) => self.reset(),
            None => {}
        }
    }

    pub(crate) fn run(mut self) -> BD {
        log::info!("mass storage worker started");
        while let Some(event) = self.shared.events.next() {
            log::debug!("{:?}", event);
            match event {
                Event::Configured => {
                    log::info!("configured, waiting for commands");
                    self.notify(Notification::Connected);
                    self.arm();
                }
                Event::DataReady => {
                    self.run_command();
                    // after an abort the reset re-arms
                    if !self.shared.handoff.is_aborted() {
                        self.arm();
                    }
                }
                // carried by the pending reset flag, which is serviced below
                Event::BotReset | Event::UsbReset => {}
                Event::EjectRequested => {
                    if self.scsi.medium_present() {
                        self.scsi.medium_ejected();
                        self.notify(Notification::Ejected);
                    }
                }
                Event::MediaInserted => self.scsi.medium_inserted(),
                Event::Stop => break,
            }
            self.service_reset();
        }
        log::info!("mass storage worker exiting");
        self.scsi.into_block_device()
    }
}
