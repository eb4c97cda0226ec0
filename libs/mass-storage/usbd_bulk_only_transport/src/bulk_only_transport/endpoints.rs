use log::warn;
use usb_device::UsbError;

use super::Direction;

/// Why a [`BulkEndpoints`] transfer did not complete
#[derive(Clone, Copy, Eq, PartialEq, Debug)]
pub enum TransferError {
    /// Cancelled because the host reset the transport. The command in flight is
    /// dropped without a CSW and the endpoints are left alone.
    Aborted,
    /// The endpoint failed the transfer
    Failed,
}

/// Endpoint drivers built on `usb-device` report through `UsbError`. An invalid
/// state there means the endpoint was torn down under the transfer, anything
/// else is a plain failure.
impl From<UsbError> for TransferError {
    fn from(e: UsbError) -> TransferError {
        if matches!(e, UsbError::InvalidState) {
            TransferError::Aborted
        } else {
            warn!("bulk endpoint error: {:?}", e);
            TransferError::Failed
        }
    }
}

/// The pair of bulk endpoints the transport runs over.
///
/// Calls block until the packet has been moved, or fail with
/// [`TransferError::Aborted`] when a reset cuts the transfer short.
pub trait BulkEndpoints {
    fn max_packet_size(&self) -> usize;

    /// Receives one packet on bulk OUT, returns the number of bytes written to `buf`
    fn read_packet(&mut self, buf: &mut [u8]) -> Result<usize, TransferError>;

    /// Sends one packet on bulk IN. An empty `buf` sends a zero length packet
    fn write_packet(&mut self, buf: &[u8]) -> Result<usize, TransferError>;

    /// Halts the endpoint for `direction` until the host clears it
    fn stall(&mut self, direction: Direction);
}
