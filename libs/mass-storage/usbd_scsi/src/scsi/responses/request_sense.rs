use crate::scsi::enums::{AdditionalSenseCode, SenseKey};

/// Current error, fixed format
const RESPONSE_CODE_CURRENT_FIXED: u8 = 0x70;

/// Fixed format sense data, the 18 byte form every host understands.
///
/// Kept by the command set until the next failure overwrites it or a
/// REQUEST SENSE reports it.
#[derive(Clone, Copy, Eq, PartialEq, Debug, Default)]
pub struct SenseData {
    pub sense_key: SenseKey,
    pub additional_sense_code: AdditionalSenseCode,
}

impl SenseData {
    pub const BYTES: usize = 18;

    pub fn new(sense_key: SenseKey, additional_sense_code: AdditionalSenseCode) -> Self {
        Self { sense_key, additional_sense_code }
    }

    pub fn reset_status(&mut self) {
        *self = Default::default()
    }

    pub fn is_clear(&self) -> bool {
        self.sense_key == SenseKey::NoSense
    }

    pub fn encode(&self) -> [u8; Self::BYTES] {
        let mut buf = [0u8; Self::BYTES];
        buf[0] = RESPONSE_CODE_CURRENT_FIXED;
        buf[2] = self.sense_key as u8 & 0x0F;
        // n-7
        buf[7] = (Self::BYTES - 8) as u8;
        buf[12] = self.additional_sense_code.asc();
        buf[13] = self.additional_sense_code.ascq();
        buf
    }
}

#[test]
fn test_sense_layout() {
    let sense = SenseData::new(SenseKey::MediumError, AdditionalSenseCode::UnrecoveredReadError);
    let bytes = sense.encode();
    assert_eq!(bytes[0], 0x70);
    assert_eq!(bytes[2], 0x03);
    assert_eq!(bytes[7], 10);
    assert_eq!(bytes[12], 0x11);
    assert_eq!(bytes[13], 0x00);

    assert_eq!(SenseData::default().encode()[2], 0);
}
