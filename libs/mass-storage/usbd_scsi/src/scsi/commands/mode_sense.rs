use crate::scsi::{commands::{be_u16, check_length}, Error};

#[derive(Clone, Copy, Eq, PartialEq, Debug)]
pub enum CommandLength {
    C6,
    C10,
}

/// MODE SENSE (6) and (10). Only the parameter header is ever returned, so
/// the page code is parsed for logging and otherwise ignored
#[derive(Clone, Copy, Eq, PartialEq, Debug)]
pub struct ModeSenseXCommand {
    pub command_length: CommandLength,
    pub page_code: u8,
    pub allocation_length: u16,
}

impl ModeSenseXCommand {
    pub const BYTES_6: usize = 6;
    pub const BYTES_10: usize = 10;

    pub fn parse6(cdb: &[u8]) -> Result<Self, Error> {
        check_length(cdb, Self::BYTES_6)?;
        Ok(Self {
            command_length: CommandLength::C6,
            page_code: cdb[2] & 0x3F,
            allocation_length: cdb[4] as u16,
        })
    }

    pub fn parse10(cdb: &[u8]) -> Result<Self, Error> {
        check_length(cdb, Self::BYTES_10)?;
        Ok(Self {
            command_length: CommandLength::C10,
            page_code: cdb[2] & 0x3F,
            allocation_length: be_u16(cdb, 7),
        })
    }
}

#[test]
fn test_mode_sense_parse() {
    let six = ModeSenseXCommand::parse6(&[0x1A, 0, 0x3F, 0, 0xC0, 0]).unwrap();
    assert_eq!(six.page_code, 0x3F);
    assert_eq!(six.allocation_length, 0xC0);

    let ten = ModeSenseXCommand::parse10(&[0x5A, 0, 0x1C, 0, 0, 0, 0, 0x01, 0x00, 0]).unwrap();
    assert_eq!(ten.command_length, CommandLength::C10);
    assert_eq!(ten.allocation_length, 256);
}
