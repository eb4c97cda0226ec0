use crate::scsi::{commands::{be_u16, be_u32, check_length}, Error};

#[derive(Clone, Copy, Eq, PartialEq, Debug, Default)]
pub struct Read10Command {
    pub lba: u32,
    /// In blocks. Zero means no data
    pub transfer_length: u16,
}

impl Read10Command {
    pub const BYTES: usize = 10;

    pub fn parse(cdb: &[u8]) -> Result<Self, Error> {
        check_length(cdb, Self::BYTES)?;
        Ok(Self {
            lba: be_u32(cdb, 2),
            transfer_length: be_u16(cdb, 7),
        })
    }
}

#[test]
fn test_read10_parse() {
    let data = [0x28, 0, 0, 0, 0x1E, 0x80, 0, 0, 0x8, 0, 0, 0, 0, 0, 0, 0];
    let cmd = Read10Command::parse(&data).unwrap();
    assert_eq!(cmd.lba, 0x1E80);
    assert_eq!(cmd.transfer_length, 8);
}
