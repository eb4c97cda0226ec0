use crate::block_device::BlockDeviceInfo;

const CAPACITY_LIST_LENGTH: u8 = 8;
/// Descriptor type: formatted media, current capacity
const FORMATTED_MEDIA: u8 = 0x02;

/// Capacity list header plus a single current/maximum capacity descriptor
#[derive(Clone, Copy, Eq, PartialEq, Debug)]
pub struct ReadFormatCapacitiesResponse {
    pub number_of_blocks: u32,
    /// 24 bits on the wire
    pub block_length: u32,
}

impl ReadFormatCapacitiesResponse {
    pub const BYTES: usize = 12;

    pub fn new(info: &BlockDeviceInfo) -> Self {
        Self {
            number_of_blocks: info.block_count,
            block_length: info.block_size,
        }
    }

    pub fn encode(&self) -> [u8; Self::BYTES] {
        let mut buf = [0u8; Self::BYTES];
        buf[3] = CAPACITY_LIST_LENGTH;
        buf[4..8].copy_from_slice(&self.number_of_blocks.to_be_bytes());
        buf[8] = FORMATTED_MEDIA;
        buf[9..12].copy_from_slice(&self.block_length.to_be_bytes()[1..]);
        buf
    }
}

#[test]
fn test_format_capacities_layout() {
    let info = BlockDeviceInfo { block_size: 512, block_count: 0x10000 };
    assert_eq!(
        ReadFormatCapacitiesResponse::new(&info).encode(),
        [0, 0, 0, 8, 0, 0x01, 0, 0, 0x02, 0, 0x02, 0]
    );
}
