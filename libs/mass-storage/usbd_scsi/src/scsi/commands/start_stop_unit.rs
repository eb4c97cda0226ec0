use crate::scsi::{commands::check_length, Error};

#[derive(Clone, Copy, Eq, PartialEq, Debug, Default)]
pub struct StartStopUnitCommand {
    pub power_condition: u8,
    /// Load or eject the medium, depending on `start`
    pub load_eject: bool,
    pub start: bool,
}

impl StartStopUnitCommand {
    pub const BYTES: usize = 6;

    pub fn parse(cdb: &[u8]) -> Result<Self, Error> {
        check_length(cdb, Self::BYTES)?;
        Ok(Self {
            power_condition: cdb[4] >> 4,
            load_eject: cdb[4] & 0x02 != 0,
            start: cdb[4] & 0x01 != 0,
        })
    }

    pub fn is_eject(&self) -> bool {
        self.power_condition == 0 && self.load_eject && !self.start
    }
}

#[test]
fn test_eject_request() {
    assert!(StartStopUnitCommand::parse(&[0x1B, 0, 0, 0, 0x02, 0]).unwrap().is_eject());
    assert!(!StartStopUnitCommand::parse(&[0x1B, 0, 0, 0, 0x03, 0]).unwrap().is_eject());
    assert!(!StartStopUnitCommand::parse(&[0x1B, 0, 0, 0, 0x00, 0]).unwrap().is_eject());
}
