// Vendored from https://github.com/stm32-rs/stm32-usbd tag v0.6.0
// Original copyright (c) 2021 Matti Virkkunen <mvirkkunen@gmail.com>, Vadim Kaushan <admin@disasm.info>,
// Nicolas Stalder <n@stalder.io>", Jonas Martin <lichtfeind@gmail.com>
// SPDX-License-Identifier: MIT
// SPDX-LIcense-Identifier: Apache 2.0

use crate::block_device::BlockDeviceInfo;

#[derive(Clone, Copy, Eq, PartialEq, Debug)]
pub struct ReadCapacity10Response {
    /// Address of the last block, not the block count
    pub max_lba: u32,
    pub block_size: u32,
}

impl ReadCapacity10Response {
    pub const BYTES: usize = 8;

    pub fn new(info: &BlockDeviceInfo) -> Self {
        Self { max_lba: info.max_lba(), block_size: info.block_size }
    }

    pub fn encode(&self) -> [u8; Self::BYTES] {
        let mut buf = [0u8; Self::BYTES];
        buf[0..4].copy_from_slice(&self.max_lba.to_be_bytes());
        buf[4..8].copy_from_slice(&self.block_size.to_be_bytes());
        buf
    }
}

#[test]
fn test_read_capacity_is_last_lba() {
    let info = BlockDeviceInfo { block_size: 512, block_count: 1024 };
    assert_eq!(ReadCapacity10Response::new(&info).encode(), [0, 0, 0x03, 0xFF, 0, 0, 0x02, 0]);
}
