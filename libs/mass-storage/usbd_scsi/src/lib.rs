mod scsi;
pub use scsi::*;

mod block_device;
pub use block_device::*;

mod logging {
    pub use log::debug as trace_scsi_fs;
    pub use log::debug as trace_scsi_command;
}
