use crate::scsi::{commands::{be_u16, be_u32, check_length}, Error};

#[derive(Clone, Copy, Eq, PartialEq, Debug, Default)]
pub struct Verify10Command {
    pub lba: u32,
    pub verification_length: u16,
    /// Compare against data sent by the host. Not supported
    pub byte_check: bool,
}

impl Verify10Command {
    pub const BYTES: usize = 10;

    pub fn parse(cdb: &[u8]) -> Result<Self, Error> {
        check_length(cdb, Self::BYTES)?;
        Ok(Self {
            lba: be_u32(cdb, 2),
            verification_length: be_u16(cdb, 7),
            byte_check: cdb[1] & 0x02 != 0,
        })
    }
}
