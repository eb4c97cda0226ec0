use crate::scsi::{commands::check_length, Error};

#[derive(Clone, Copy, Eq, PartialEq, Debug, Default)]
pub struct TestUnitReadyCommand;

impl TestUnitReadyCommand {
    pub const BYTES: usize = 6;

    pub fn parse(cdb: &[u8]) -> Result<Self, Error> {
        check_length(cdb, Self::BYTES)?;
        Ok(TestUnitReadyCommand)
    }
}
