use crate::scsi::{commands::{be_u16, be_u32, check_length}, Error};

#[derive(Clone, Copy, Eq, PartialEq, Debug, Default)]
pub struct Write10Command {
    pub lba: u32,
    /// In blocks. Zero means no data
    pub transfer_length: u16,
    /// Force unit access: write through any cache. Every write goes straight to the device anyway
    pub fua: bool,
}

impl Write10Command {
    pub const BYTES: usize = 10;

    pub fn parse(cdb: &[u8]) -> Result<Self, Error> {
        check_length(cdb, Self::BYTES)?;
        Ok(Self {
            lba: be_u32(cdb, 2),
            transfer_length: be_u16(cdb, 7),
            fua: cdb[1] & 0x08 != 0,
        })
    }
}

#[test]
fn test_write10_parse() {
    let data = [0x2A, 0x08, 0x00, 0x01, 0x00, 0x00, 0, 0x01, 0x00, 0];
    let cmd = Write10Command::parse(&data).unwrap();
    assert_eq!(cmd.lba, 0x10000);
    assert_eq!(cmd.transfer_length, 256);
    assert!(cmd.fua);
}
