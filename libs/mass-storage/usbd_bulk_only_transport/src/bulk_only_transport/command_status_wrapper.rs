use num_traits::FromPrimitive;

use super::{CommandStatus, Error, Malformed};

/// Signature that identifies this packet as CSW, "USBS" on the wire
pub const CSW_SIGNATURE: u32 = 0x53425355;

const SIGNATURE_OFFSET: usize = 0;
const TAG_OFFSET: usize = 4;
const DATA_RESIDUE_OFFSET: usize = 8;
const STATUS_OFFSET: usize = 12;

/// A wrapper that contains the status of a command, sent from the device
/// to the host on the IN endpoint. Little Endian
#[derive(Clone, Copy, Eq, PartialEq, Debug)]
pub struct CommandStatusWrapper {
    /// The tag of the CBW this status closes
    pub tag: u32,
    /// Difference between the amount of data declared in the CBW and the
    /// amount actually moved
    pub data_residue: u32,
    /// Status of the command
    pub status: CommandStatus,
}

impl CommandStatusWrapper {
    pub const BYTES: usize = 13;

    pub fn encode(&self) -> [u8; Self::BYTES] {
        let mut buf = [0u8; Self::BYTES];
        buf[SIGNATURE_OFFSET..TAG_OFFSET].copy_from_slice(&CSW_SIGNATURE.to_le_bytes());
        buf[TAG_OFFSET..DATA_RESIDUE_OFFSET].copy_from_slice(&self.tag.to_le_bytes());
        buf[DATA_RESIDUE_OFFSET..STATUS_OFFSET].copy_from_slice(&self.data_residue.to_le_bytes());
        buf[STATUS_OFFSET] = self.status as u8;
        buf
    }

    /// Host side decoding, used to check what the device sent
    pub fn decode(buf: &[u8]) -> Result<CommandStatusWrapper, Error> {
        if buf.len() != Self::BYTES {
            return Err(Error::MalformedEnvelope(Malformed::Length(buf.len())));
        }
        let word = |o: usize| u32::from_le_bytes([buf[o], buf[o + 1], buf[o + 2], buf[o + 3]]);
        let signature = word(SIGNATURE_OFFSET);
        if signature != CSW_SIGNATURE {
            return Err(Error::MalformedEnvelope(Malformed::Signature(signature)));
        }
        let status = CommandStatus::from_u8(buf[STATUS_OFFSET])
            .ok_or(Error::MalformedEnvelope(Malformed::Status(buf[STATUS_OFFSET])))?;
        Ok(CommandStatusWrapper { tag: word(TAG_OFFSET), data_residue: word(DATA_RESIDUE_OFFSET), status })
    }
}

#[test]
fn test_csw_layout() {
    let csw = CommandStatusWrapper { tag: 0xDEADBEEF, data_residue: 0x200, status: CommandStatus::CommandError };
    assert_eq!(
        csw.encode(),
        [0x55, 0x53, 0x42, 0x53, 0xEF, 0xBE, 0xAD, 0xDE, 0x00, 0x02, 0x00, 0x00, 0x01]
    );
    assert_eq!(CommandStatusWrapper::decode(&csw.encode()), Ok(csw));
}

#[test]
fn test_csw_decode_rejects_bad_status() {
    let mut buf = CommandStatusWrapper { tag: 7, data_residue: 0, status: CommandStatus::CommandOk }.encode();
    buf[12] = 3;
    assert_eq!(CommandStatusWrapper::decode(&buf), Err(Error::MalformedEnvelope(Malformed::Status(3))));
    assert_eq!(
        CommandStatusWrapper::decode(&buf[..12]),
        Err(Error::MalformedEnvelope(Malformed::Length(12)))
    );
}
