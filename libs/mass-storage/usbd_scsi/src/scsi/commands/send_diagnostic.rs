use crate::scsi::{commands::{be_u16, check_length}, Error};

#[derive(Clone, Copy, Eq, PartialEq, Debug, Default)]
pub struct SendDiagnosticCommand {
    pub self_test: bool,
    pub parameter_list_length: u16,
}

impl SendDiagnosticCommand {
    pub const BYTES: usize = 6;

    pub fn parse(cdb: &[u8]) -> Result<Self, Error> {
        check_length(cdb, Self::BYTES)?;
        Ok(Self {
            self_test: cdb[1] & 0x04 != 0,
            parameter_list_length: be_u16(cdb, 3),
        })
    }
}
