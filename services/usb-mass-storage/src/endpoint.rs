use std::sync::atomic::Ordering;
use std::sync::Arc;

use usb_device::UsbDirection;
use usbd_bulk_only_transport::{BulkEndpoints, Direction, TransferError};

use crate::handoff::Completion;
use crate::irq::Shared;

/// The bulk IN/OUT pair of the USB peripheral driver.
///
/// Transfers are started here and complete asynchronously: the driver reports each
/// completion through [`IrqHandle::transfer_complete`](crate::IrqHandle::transfer_complete).
/// A new receive replaces one still pending, and a reset cancels whatever is in flight
/// before it is reported to the [`IrqHandle`](crate::IrqHandle).
pub trait EndpointAdapter {
    fn max_packet_size(&self) -> usize;

    /// Queue a receive of up to `len` bytes on bulk OUT
    fn start_receive(&mut self, len: usize);

    /// Copy out the data of the last completed receive, returns the length copied
    fn read_received(&mut self, buf: &mut [u8]) -> usize;

    /// Queue `data` on bulk IN. An empty slice is a zero length packet
    fn start_transmit(&mut self, data: &[u8]);

    fn stall(&mut self, direction: UsbDirection);
}

/// Turns the adapter's start/complete pairs into the blocking packet calls the
/// transport makes. Runs on the worker only.
pub(crate) struct HandoffEndpoints<A: EndpointAdapter> {
    adapter: A,
    shared: Arc<Shared>,
    /// The armed receive completed with a command block wrapper that hasn't been read
    command_ready: bool,
}

impl<A: EndpointAdapter> HandoffEndpoints<A> {
    pub(crate) fn new(adapter: A, shared: Arc<Shared>) -> HandoffEndpoints<A> {
        HandoffEndpoints { adapter, shared, command_ready: false }
    }

    /// Starts listening for the next command block wrapper. Its completion comes back
    /// as a `DataReady` event instead of through the handoff
    pub(crate) fn arm_command(&mut self) {
        self.command_ready = false;
        self.shared.waiting_for_command.store(true, Ordering::SeqCst);
        let len = self.adapter.max_packet_size();
        self.adapter.start_receive(len);
    }

    pub(crate) fn mark_command_ready(&mut self) {
        self.command_ready = true;
    }

    fn wait(&self) -> Result<usize, TransferError> {
        match self.shared.handoff.acquire() {
            Completion::Done(len) => Ok(len),
            Completion::Aborted => Err(TransferError::Aborted),
        }
    }
}

impl<A: EndpointAdapter> BulkEndpoints for HandoffEndpoints<A> {
    fn max_packet_size(&self) -> usize { self.adapter.max_packet_size() }

    fn read_packet(&mut self, buf: &mut [u8]) -> Result<usize, TransferError> {
        if self.command_ready {
            self.command_ready = false;
            return Ok(self.adapter.read_received(buf));
        }
        // nothing new starts once a reset is on its way
        if self.shared.handoff.is_aborted() {
            return Err(TransferError::Aborted);
        }
        self.adapter.start_receive(buf.len());
        let len = self.wait()?.min(buf.len());
        Ok(self.adapter.read_received(&mut buf[..len]))
    }

    fn write_packet(&mut self, buf: &[u8]) -> Result<usize, TransferError> {
        if self.shared.handoff.is_aborted() {
            return Err(TransferError::Aborted);
        }
        self.adapter.start_transmit(buf);
        self.wait()?;
        Ok(buf.len())
    }

    fn stall(&mut self, direction: Direction) {
        let direction = match direction {
            Direction::DeviceToHost => UsbDirection::In,
            Direction::HostToDevice => UsbDirection::Out,
        };
        self.adapter.stall(direction);
    }
}
