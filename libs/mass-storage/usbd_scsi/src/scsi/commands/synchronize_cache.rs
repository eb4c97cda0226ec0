use crate::scsi::{commands::{be_u16, be_u32, check_length}, Error};

#[derive(Clone, Copy, Eq, PartialEq, Debug, Default)]
pub struct SynchronizeCache10Command {
    pub lba: u32,
    pub number_of_blocks: u16,
}

impl SynchronizeCache10Command {
    pub const BYTES: usize = 10;

    pub fn parse(cdb: &[u8]) -> Result<Self, Error> {
        check_length(cdb, Self::BYTES)?;
        Ok(Self {
            lba: be_u32(cdb, 2),
            number_of_blocks: be_u16(cdb, 7),
        })
    }
}
