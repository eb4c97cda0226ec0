// Vendored from https://github.com/stm32-rs/stm32-usbd tag v0.6.0
// Original copyright (c) 2021 Matti Virkkunen <mvirkkunen@gmail.com>, Vadim Kaushan <admin@disasm.info>,
// Nicolas Stalder <n@stalder.io>", Jonas Martin <lichtfeind@gmail.com>
// SPDX-License-Identifier: MIT
// SPDX-LIcense-Identifier: Apache 2.0

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockDeviceError {
    /// Hardware didn't behave as expected, unrecoverable
    HardwareError,

    /// Error during reading; the data could not be recovered
    ReadError,

    /// Error during writing; most likely value read back after write was wrong
    WriteError,

    /// Address is invalid or out of range
    InvalidAddress,

    /// There is no medium to read or write
    NotPresent,
}

impl BlockDeviceError {
    /// Whether trying the same operation again could succeed
    pub fn is_transient(&self) -> bool {
        match self {
            BlockDeviceError::HardwareError | BlockDeviceError::ReadError | BlockDeviceError::WriteError => true,
            BlockDeviceError::InvalidAddress | BlockDeviceError::NotPresent => false,
        }
    }
}

/// Geometry of a block device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockDeviceInfo {
    /// Bytes per block, also the size of the buffer handed to read/write
    pub block_size: u32,
    /// Number of addressable blocks, LBAs run from 0 to `block_count - 1`
    pub block_count: u32,
}

impl BlockDeviceInfo {
    /// The highest valid lba (logical block address)
    pub fn max_lba(&self) -> u32 { self.block_count.saturating_sub(1) }
}

pub trait BlockDevice {
    fn info(&self) -> BlockDeviceInfo;

    /// Read `count` blocks starting at `lba` into `buf`, which holds exactly
    /// `count * block_size` bytes
    fn read_blocks(&mut self, lba: u32, count: u32, buf: &mut [u8]) -> Result<(), BlockDeviceError>;

    /// Write `count` blocks from `buf` starting at `lba`
    fn write_blocks(&mut self, lba: u32, count: u32, buf: &[u8]) -> Result<(), BlockDeviceError>;

    fn read_only(&self) -> bool { false }
}

impl<T: BlockDevice + ?Sized> BlockDevice for Box<T> {
    fn info(&self) -> BlockDeviceInfo { (**self).info() }

    fn read_blocks(&mut self, lba: u32, count: u32, buf: &mut [u8]) -> Result<(), BlockDeviceError> {
        (**self).read_blocks(lba, count, buf)
    }

    fn write_blocks(&mut self, lba: u32, count: u32, buf: &[u8]) -> Result<(), BlockDeviceError> {
        (**self).write_blocks(lba, count, buf)
    }

    fn read_only(&self) -> bool { (**self).read_only() }
}
