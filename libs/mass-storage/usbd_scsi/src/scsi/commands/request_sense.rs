use crate::scsi::{commands::check_length, Error};

/// REQUEST SENSE. Accepted in its 6 byte form and padded out to 10 or 12 bytes
#[derive(Clone, Copy, Eq, PartialEq, Debug, Default)]
pub struct RequestSenseCommand {
    /// Descriptor format sense data, not supported
    pub descriptor_format: bool,
    pub allocation_length: u8,
}

impl RequestSenseCommand {
    pub const BYTES: usize = 6;

    pub fn parse(cdb: &[u8]) -> Result<Self, Error> {
        check_length(cdb, Self::BYTES)?;
        Ok(Self {
            descriptor_format: cdb[1] & 0x01 != 0,
            allocation_length: cdb[4],
        })
    }
}
