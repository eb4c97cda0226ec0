use crate::scsi::{commands::check_length, Error};

/// READ CAPACITY (10). The LBA/PMI fields are obsolete in SBC-3 and ignored
#[derive(Clone, Copy, Eq, PartialEq, Debug, Default)]
pub struct ReadCapacity10Command;

impl ReadCapacity10Command {
    pub const BYTES: usize = 10;

    pub fn parse(cdb: &[u8]) -> Result<Self, Error> {
        check_length(cdb, Self::BYTES)?;
        Ok(ReadCapacity10Command)
    }
}
