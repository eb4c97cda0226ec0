use crate::scsi::{commands::{be_u16, check_length}, Error};

/// READ FORMAT CAPACITIES, from MMC/UFI. Windows asks for it before anything else
#[derive(Clone, Copy, Eq, PartialEq, Debug, Default)]
pub struct ReadFormatCapacitiesCommand {
    pub allocation_length: u16,
}

impl ReadFormatCapacitiesCommand {
    pub const BYTES: usize = 10;

    pub fn parse(cdb: &[u8]) -> Result<Self, Error> {
        check_length(cdb, Self::BYTES)?;
        Ok(Self { allocation_length: be_u16(cdb, 7) })
    }
}
