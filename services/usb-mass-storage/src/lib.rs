//! USB mass storage driver.
//!
//! Exposes a [`BlockDevice`](usbd_scsi::BlockDevice) to a USB host as a bulk-only mass
//! storage interface. The protocol runs on a worker thread; the USB interrupt handler
//! only talks to the driver through an [`IrqHandle`], which never blocks.
//!
//! ```ignore
//! let config = MassStorageConfig::new(1, RamDisk::new(512, 1024))?.product("Precursor")?;
//! let mut ums = MassStorageDriver::new(config);
//! let irq = ums.irq_handle(); // moved into the USB interrupt handler
//! ums.start(bulk_endpoints)?;
//! ...
//! let disk = ums.stop()?;
//! ```

pub mod api;
pub use api::*;
mod block_device;
pub use block_device::RamDisk;
mod config;
pub use config::{ConfigError, MassStorageConfig};
mod endpoint;
pub use endpoint::EndpointAdapter;
mod events;
mod handoff;
mod irq;
pub use irq::IrqHandle;
mod worker;

use std::sync::Arc;
use std::thread::JoinHandle;

use crossbeam_channel::{unbounded, Receiver, Sender};
use usbd_mass_storage::{MscInterface, MSC_DESCRIPTOR_BYTES};
use usbd_scsi::{BlockDevice, Scsi};

use crate::endpoint::HandoffEndpoints;
use crate::irq::Shared;
use crate::worker::Worker;

/// One mass storage interface over one block device
pub struct MassStorageDriver<BD: BlockDevice + Send + 'static> {
    /// Handed to the worker on start
    config: Option<MassStorageConfig<BD>>,
    interface: MscInterface,
    shared: Arc<Shared>,
    notifications_tx: Sender<Notification>,
    notifications_rx: Receiver<Notification>,
    worker: Option<JoinHandle<BD>>,
}

impl<BD: BlockDevice + Send + 'static> MassStorageDriver<BD> {
    pub fn new(config: MassStorageConfig<BD>) -> Self {
        let shared = Arc::new(Shared::new(config.max_lun, config.interface_number));
        let interface = MscInterface::new(config.interface_number, config.bulk_endpoint, 0);
        let (notifications_tx, notifications_rx) = unbounded();
        MassStorageDriver {
            config: Some(config),
            interface,
            shared,
            notifications_tx,
            notifications_rx,
            worker: None,
        }
    }

    pub fn irq_handle(&self) -> IrqHandle { IrqHandle::new(self.shared.clone()) }

    pub fn notifications(&self) -> Receiver<Notification> { self.notifications_rx.clone() }

    /// Interface and endpoint descriptors for the USB stack's configuration descriptor
    pub fn interface_descriptor(&self, max_packet_size: u16) -> [u8; MSC_DESCRIPTOR_BYTES] {
        MscInterface { max_packet_size, ..self.interface }.descriptor()
    }

    pub fn is_running(&self) -> bool { self.worker.is_some() }

    /// Spawns the worker. It idles until the interrupt side reports `configured`.
    pub fn start<A: EndpointAdapter + Send + 'static>(&mut self, adapter: A) -> Result<(), DriverError> {
        let config = self.config.take().ok_or(DriverError::AlreadyStarted)?;
        log::info!(
            "starting mass storage on interface {} endpoint {}, max LUN {}",
            config.interface_number,
            config.bulk_endpoint,
            config.max_lun,
        );
        let endpoints = HandoffEndpoints::new(adapter, self.shared.clone());
        let mut scsi = Scsi::new(
            endpoints,
            config.max_lun,
            config.block_device,
            config.vendor.as_bytes(),
            config.product.as_bytes(),
            config.revision.as_bytes(),
        );
        scsi.set_activity_callback(config.activity);

        let worker = Worker::new(scsi, self.shared.clone(), self.notifications_tx.clone());
        self.worker = Some(std::thread::spawn(move || worker.run()));
        Ok(())
    }

    /// Stops the worker once any command in flight is done and hands back the block
    /// device. There is no timeout: a command stuck on the bus waits for a reset.
    pub fn stop(&mut self) -> Result<BD, DriverError> {
        let worker = self.worker.take().ok_or(DriverError::NotStarted)?;
        self.shared.events.post_blocking(Event::Stop);
        worker.join().map_err(|_| DriverError::WorkerPanicked)
    }
}

impl<BD: BlockDevice + Send + 'static> Drop for MassStorageDriver<BD> {
    fn drop(&mut self) {
        if self.worker.is_some() {
            if let Err(e) = self.stop() {
                log::error!("mass storage worker did not stop cleanly: {:?}", e);
            }
        }
    }
}
