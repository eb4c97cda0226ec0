use super::{DataPlan, Direction, Error, Malformed};

/// Signature that identifies this packet as CBW, "USBC" on the wire
pub const CBW_SIGNATURE: u32 = 0x43425355;

const SIGNATURE_OFFSET: usize = 0;
const TAG_OFFSET: usize = 4;
const DATA_TRANSFER_LENGTH_OFFSET: usize = 8;
const FLAGS_OFFSET: usize = 12;
const LUN_OFFSET: usize = 13;
const COMMAND_LENGTH_OFFSET: usize = 14;
const COMMAND_OFFSET: usize = 15;

const LUN_MASK: u8 = 0x0F;
const COMMAND_LENGTH_MASK: u8 = 0x1F;

/// A wrapper that identifies a command sent from the host to the
/// device on the OUT endpoint. Describes the data transfer IN or OUT
/// that should happen immediately after this wrapper is received.
/// Little Endian on the wire, see [`CommandBlockWrapper::decode`].
#[derive(Clone, Copy, Eq, PartialEq, Debug)]
pub struct CommandBlockWrapper {
    /// Tag sent by the host. Must be echoed back to host in tag
    /// field of the command status wrapper sent after the command
    /// has been executed/rejected. Host uses it to positively
    /// associate a CSW with the corresponding CBW
    pub tag: u32,
    /// Number of bytes of data that the host expects to receive on
    /// the IN or OUT endpoint (as indicated by the direction field)
    /// during the execution of this command. If this field is zero,
    /// must respond directly with CSW
    pub data_transfer_length: u32,
    /// Direction of transfer initiated by this command, bit 7 of the flags byte.
    /// Meaningless when `data_transfer_length` is zero
    pub direction: Direction,
    /// The device Logical Unit Number (LUN) to which the command is
    /// for. For devices that don't support multiple LUNs the host will
    /// set this field to zero.
    pub lun: u8,
    /// The number of valid bytes in `command`
    pub command_length: u8,
    /// The command set specific data for this command
    pub command: [u8; 16],
}

fn read_u32_le(buf: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([buf[offset], buf[offset + 1], buf[offset + 2], buf[offset + 3]])
}

impl CommandBlockWrapper {
    pub const BYTES: usize = 31;

    /// Decodes a CBW. Only the length and signature are checked here,
    /// [`validate`](Self::validate) covers the rest.
    pub fn decode(buf: &[u8]) -> Result<CommandBlockWrapper, Error> {
        if buf.len() != Self::BYTES {
            return Err(Error::MalformedEnvelope(Malformed::Length(buf.len())));
        }
        let signature = read_u32_le(buf, SIGNATURE_OFFSET);
        if signature != CBW_SIGNATURE {
            return Err(Error::MalformedEnvelope(Malformed::Signature(signature)));
        }
        let mut command = [0u8; 16];
        command.copy_from_slice(&buf[COMMAND_OFFSET..Self::BYTES]);
        Ok(CommandBlockWrapper {
            tag: read_u32_le(buf, TAG_OFFSET),
            data_transfer_length: read_u32_le(buf, DATA_TRANSFER_LENGTH_OFFSET),
            direction: Direction::from_flags(buf[FLAGS_OFFSET]),
            lun: buf[LUN_OFFSET] & LUN_MASK,
            command_length: buf[COMMAND_LENGTH_OFFSET] & COMMAND_LENGTH_MASK,
            command,
        })
    }

    pub fn encode(&self) -> [u8; Self::BYTES] {
        let mut buf = [0u8; Self::BYTES];
        buf[SIGNATURE_OFFSET..TAG_OFFSET].copy_from_slice(&CBW_SIGNATURE.to_le_bytes());
        buf[TAG_OFFSET..DATA_TRANSFER_LENGTH_OFFSET].copy_from_slice(&self.tag.to_le_bytes());
        buf[DATA_TRANSFER_LENGTH_OFFSET..FLAGS_OFFSET].copy_from_slice(&self.data_transfer_length.to_le_bytes());
        buf[FLAGS_OFFSET] = self.direction.flags();
        buf[LUN_OFFSET] = self.lun & LUN_MASK;
        buf[COMMAND_LENGTH_OFFSET] = self.command_length & COMMAND_LENGTH_MASK;
        buf[COMMAND_OFFSET..].copy_from_slice(&self.command);
        buf
    }

    /// Checks the fields a well formed CBW may still get wrong
    pub fn validate(&self, max_lun: u8) -> Result<(), Error> {
        if self.command_length == 0 || self.command_length as usize > self.command.len() {
            return Err(Error::MalformedEnvelope(Malformed::CommandLength(self.command_length)));
        }
        if self.lun > max_lun {
            return Err(Error::MalformedEnvelope(Malformed::Lun(self.lun)));
        }
        Ok(())
    }

    /// The valid bytes of the command block
    pub fn command_block(&self) -> &[u8] {
        let len = (self.command_length as usize).min(self.command.len());
        &self.command[..len]
    }

    /// Compares what the device wants to do with what the host declared.
    ///
    /// Any disagreement the device can't resolve by reporting residue is a phase error:
    /// data in the other direction, device data when the host expects none, or more
    /// device data than the host expects.
    pub fn check_plan(&self, plan: DataPlan) -> Result<(), Error> {
        let declared = self.data_transfer_length;
        match plan.direction() {
            None => Ok(()),
            Some(_) if plan.len() == 0 => Ok(()),
            Some(_) if declared == 0 => Err(Error::PhaseError),
            Some(direction) if direction != self.direction => Err(Error::PhaseError),
            Some(_) if plan.len() > declared => Err(Error::PhaseError),
            Some(_) => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inquiry_cbw() -> [u8; 31] {
        let mut buf = [0u8; 31];
        buf[..4].copy_from_slice(&[0x55, 0x53, 0x42, 0x43]);
        buf[4..8].copy_from_slice(&1u32.to_le_bytes());
        buf[8..12].copy_from_slice(&36u32.to_le_bytes());
        buf[12] = 0x80;
        buf[14] = 6;
        buf[15] = 0x12;
        buf[19] = 36;
        buf
    }

    #[test]
    fn test_decode_inquiry() {
        let cbw = CommandBlockWrapper::decode(&inquiry_cbw()).unwrap();
        assert_eq!(cbw.tag, 1);
        assert_eq!(cbw.data_transfer_length, 36);
        assert_eq!(cbw.direction, Direction::DeviceToHost);
        assert_eq!(cbw.lun, 0);
        assert_eq!(cbw.command_block(), &[0x12, 0, 0, 0, 36, 0]);
        assert_eq!(cbw.encode(), inquiry_cbw());
    }

    #[test]
    fn test_decode_rejects_length_and_signature() {
        let buf = inquiry_cbw();
        assert_eq!(
            CommandBlockWrapper::decode(&buf[..30]),
            Err(Error::MalformedEnvelope(Malformed::Length(30)))
        );
        let mut long = [0u8; 32];
        long[..31].copy_from_slice(&buf);
        assert_eq!(
            CommandBlockWrapper::decode(&long),
            Err(Error::MalformedEnvelope(Malformed::Length(32)))
        );
        let mut bad = buf;
        bad[3] = 0x44;
        assert_eq!(
            CommandBlockWrapper::decode(&bad),
            Err(Error::MalformedEnvelope(Malformed::Signature(0x44425355)))
        );
    }

    #[test]
    fn test_reserved_bits_masked() {
        let mut buf = inquiry_cbw();
        buf[13] = 0xF1;
        buf[14] = 0xE6;
        let cbw = CommandBlockWrapper::decode(&buf).unwrap();
        assert_eq!(cbw.lun, 1);
        assert_eq!(cbw.command_length, 6);
    }

    #[test]
    fn test_validate() {
        let mut cbw = CommandBlockWrapper::decode(&inquiry_cbw()).unwrap();
        assert_eq!(cbw.validate(0), Ok(()));
        cbw.lun = 2;
        assert_eq!(cbw.validate(1), Err(Error::MalformedEnvelope(Malformed::Lun(2))));
        assert_eq!(cbw.validate(2), Ok(()));
        cbw.command_length = 0;
        assert_eq!(cbw.validate(2), Err(Error::MalformedEnvelope(Malformed::CommandLength(0))));
        cbw.command_length = 17;
        assert_eq!(cbw.validate(2), Err(Error::MalformedEnvelope(Malformed::CommandLength(17))));
    }

    #[test]
    fn test_check_plan() {
        let mut cbw = CommandBlockWrapper::decode(&inquiry_cbw()).unwrap();
        assert_eq!(cbw.check_plan(DataPlan::DeviceToHost(36)), Ok(()));
        assert_eq!(cbw.check_plan(DataPlan::DeviceToHost(18)), Ok(()));
        assert_eq!(cbw.check_plan(DataPlan::NoData), Ok(()));
        assert_eq!(cbw.check_plan(DataPlan::DeviceToHost(37)), Err(Error::PhaseError));
        assert_eq!(cbw.check_plan(DataPlan::HostToDevice(36)), Err(Error::PhaseError));

        cbw.data_transfer_length = 0;
        assert_eq!(cbw.check_plan(DataPlan::NoData), Ok(()));
        assert_eq!(cbw.check_plan(DataPlan::DeviceToHost(1)), Err(Error::PhaseError));

        cbw.direction = Direction::HostToDevice;
        cbw.data_transfer_length = 1024;
        assert_eq!(cbw.check_plan(DataPlan::HostToDevice(512)), Ok(()));
        assert_eq!(cbw.check_plan(DataPlan::HostToDevice(2048)), Err(Error::PhaseError));
    }
}
