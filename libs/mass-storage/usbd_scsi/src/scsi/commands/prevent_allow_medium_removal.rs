use crate::scsi::{commands::check_length, Error};

#[derive(Clone, Copy, Eq, PartialEq, Debug, Default)]
pub struct PreventAllowMediumRemovalCommand {
    pub prevent: u8,
}

impl PreventAllowMediumRemovalCommand {
    pub const BYTES: usize = 6;

    pub fn parse(cdb: &[u8]) -> Result<Self, Error> {
        check_length(cdb, Self::BYTES)?;
        Ok(Self { prevent: cdb[4] & 0x03 })
    }
}
