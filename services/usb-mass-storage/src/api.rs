/// Depth of the event queue between interrupt context and the worker. Posting to a
/// full queue drops the event.
pub(crate) const EVENT_QUEUE_DEPTH: usize = 16;

/// Everything that wakes the worker
#[derive(num_derive::FromPrimitive, num_derive::ToPrimitive, Debug, Copy, Clone, Eq, PartialEq)]
pub enum Event {
    /// Bus reset, the device is unconfigured until the next `Configured`
    UsbReset = 0,
    /// Bulk-Only Mass Storage Reset class request
    BotReset = 1,
    /// Host selected a configuration, the bulk endpoints are live
    Configured = 2,
    /// A command block wrapper arrived on bulk OUT
    DataReady = 3,
    /// The medium was removed, or the owner wants it gone
    EjectRequested = 4,
    MediaInserted = 5,
    /// Exits the worker, only ever seen between commands
    Stop = 6,
}

/// What the driver tells its owner
#[derive(num_derive::FromPrimitive, num_derive::ToPrimitive, Debug, Copy, Clone, Eq, PartialEq)]
pub enum Notification {
    /// Host configured the device
    Connected = 0,
    /// The medium went away, by host command or by event
    Ejected = 1,
}

/// Result of offering a control request to [`IrqHandle::request_hook`](crate::IrqHandle::request_hook)
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum RequestOutcome {
    /// Not a mass storage class request for this interface, the USB stack answers it
    NotHandled,
    /// Accept the request; `data_len` bytes of the buffer form the data stage
    Handled { data_len: usize },
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum DriverError {
    AlreadyStarted,
    NotStarted,
    /// The worker thread panicked, the block device is lost
    WorkerPanicked,
}
