/// Mode parameter header with no block descriptors and no pages
#[derive(Clone, Copy, Eq, PartialEq, Debug, Default)]
pub struct ModeParameterHeader {
    /// WP bit of the device specific parameter
    pub write_protect: bool,
}

impl ModeParameterHeader {
    pub const BYTES_6: usize = 4;
    pub const BYTES_10: usize = 8;

    fn device_specific_parameter(&self) -> u8 {
        if self.write_protect { 0x80 } else { 0x00 }
    }

    /// MODE SENSE (6) header, the mode data length excludes itself
    pub fn encode6(&self) -> [u8; Self::BYTES_6] {
        [(Self::BYTES_6 - 1) as u8, 0, self.device_specific_parameter(), 0]
    }

    /// MODE SENSE (10) header, the mode data length excludes its own two bytes
    pub fn encode10(&self) -> [u8; Self::BYTES_10] {
        let mut buf = [0u8; Self::BYTES_10];
        buf[0..2].copy_from_slice(&((Self::BYTES_10 - 2) as u16).to_be_bytes());
        buf[3] = self.device_specific_parameter();
        buf
    }
}

#[test]
fn test_write_protect_bit() {
    assert_eq!(ModeParameterHeader { write_protect: true }.encode6(), [3, 0, 0x80, 0]);
    assert_eq!(ModeParameterHeader::default().encode10(), [0, 6, 0, 0, 0, 0, 0, 0]);
}
