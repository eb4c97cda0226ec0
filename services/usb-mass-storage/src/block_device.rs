use usbd_scsi::{BlockDevice, BlockDeviceError, BlockDeviceInfo};

/// Block device backed by memory. Starts out with every 32-bit word holding its own
/// index, so reads of untouched blocks are recognizable.
pub struct RamDisk {
    backing: Vec<u8>,
    block_size: u32,
    block_count: u32,
    read_only: bool,
    /// Reads and writes touching these blocks fail, every time
    bad_blocks: Vec<u32>,
}

impl RamDisk {
    pub fn new(block_size: u32, block_count: u32) -> Self {
        let mut backing = vec![0u8; block_size as usize * block_count as usize];
        for (index, word) in backing.chunks_exact_mut(4).enumerate() {
            word.copy_from_slice(&(index as u32).to_le_bytes());
        }
        RamDisk { backing, block_size, block_count, read_only: false, bad_blocks: Vec::new() }
    }

    pub fn write_protected(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    pub fn with_bad_block(mut self, lba: u32) -> Self {
        self.bad_blocks.push(lba);
        self
    }

    pub fn data(&self) -> &[u8] { &self.backing }

    fn range(&self, lba: u32, count: u32, buf_len: usize) -> Result<core::ops::Range<usize>, BlockDeviceError> {
        let end = lba as u64 + count as u64;
        if end > self.block_count as u64 || buf_len != count as usize * self.block_size as usize {
            return Err(BlockDeviceError::InvalidAddress);
        }
        let start = lba as usize * self.block_size as usize;
        Ok(start..start + buf_len)
    }

    fn touches_bad_block(&self, lba: u32, count: u32) -> bool {
        self.bad_blocks.iter().any(|&bad| bad >= lba && bad - lba < count)
    }
}

impl BlockDevice for RamDisk {
    fn info(&self) -> BlockDeviceInfo {
        BlockDeviceInfo { block_size: self.block_size, block_count: self.block_count }
    }

    fn read_blocks(&mut self, lba: u32, count: u32, block: &mut [u8]) -> Result<(), BlockDeviceError> {
        let range = self.range(lba, count, block.len())?;
        if self.touches_bad_block(lba, count) {
            return Err(BlockDeviceError::ReadError);
        }
        block.copy_from_slice(&self.backing[range]);
        Ok(())
    }

    fn write_blocks(&mut self, lba: u32, count: u32, block: &[u8]) -> Result<(), BlockDeviceError> {
        let range = self.range(lba, count, block.len())?;
        if self.touches_bad_block(lba, count) {
            return Err(BlockDeviceError::WriteError);
        }
        self.backing[range].copy_from_slice(block);
        Ok(())
    }

    fn read_only(&self) -> bool { self.read_only }
}
