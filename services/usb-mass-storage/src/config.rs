use usbd_scsi::{ActivityCallback, BlockDevice};

const VENDOR_BYTES: usize = 8;
const PRODUCT_BYTES: usize = 16;
const REVISION_BYTES: usize = 4;
const MAX_LUN_LIMIT: u8 = 15;
const MAX_ENDPOINT: u8 = 15;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ConfigError {
    /// Endpoint 0 is the control endpoint, bulk endpoints are 1 to 15
    InvalidEndpoint(u8),
    InvalidMaxLun(u8),
    /// Vendor identification is not ASCII or longer than 8 bytes
    InvalidVendor,
    /// Product identification is not ASCII or longer than 16 bytes
    InvalidProduct,
    /// Revision is not ASCII or longer than 4 bytes
    InvalidRevision,
}

/// Everything a driver instance needs, fixed once the driver starts.
///
/// ```ignore
/// let config = MassStorageConfig::new(1, ram_disk)?
///     .vendor("Kosagi")?
///     .product("Precursor")?
///     .revision("1")?
///     .activity(|busy| led.set(busy));
/// ```
pub struct MassStorageConfig<BD: BlockDevice> {
    pub(crate) bulk_endpoint: u8,
    pub(crate) interface_number: u8,
    pub(crate) max_lun: u8,
    pub(crate) block_device: BD,
    pub(crate) activity: Option<ActivityCallback>,
    pub(crate) vendor: String,
    pub(crate) product: String,
    pub(crate) revision: String,
}

fn check_ascii(s: &str, max: usize, err: ConfigError) -> Result<String, ConfigError> {
    if s.is_ascii() && s.len() <= max {
        Ok(s.to_string())
    } else {
        Err(err)
    }
}

impl<BD: BlockDevice> MassStorageConfig<BD> {
    pub fn new(bulk_endpoint: u8, block_device: BD) -> Result<Self, ConfigError> {
        if bulk_endpoint == 0 || bulk_endpoint > MAX_ENDPOINT {
            return Err(ConfigError::InvalidEndpoint(bulk_endpoint));
        }
        Ok(MassStorageConfig {
            bulk_endpoint,
            interface_number: 0,
            max_lun: 0,
            block_device,
            activity: None,
            vendor: "Kosagi".to_string(),
            product: "Mass Storage".to_string(),
            revision: "1".to_string(),
        })
    }

    pub fn interface_number(mut self, interface_number: u8) -> Self {
        self.interface_number = interface_number;
        self
    }

    /// Highest LUN a command may address, answered to Get Max LUN. All LUNs share the
    /// one block device
    pub fn max_lun(mut self, max_lun: u8) -> Result<Self, ConfigError> {
        if max_lun > MAX_LUN_LIMIT {
            return Err(ConfigError::InvalidMaxLun(max_lun));
        }
        self.max_lun = max_lun;
        Ok(self)
    }

    pub fn vendor(mut self, vendor: &str) -> Result<Self, ConfigError> {
        self.vendor = check_ascii(vendor, VENDOR_BYTES, ConfigError::InvalidVendor)?;
        Ok(self)
    }

    pub fn product(mut self, product: &str) -> Result<Self, ConfigError> {
        self.product = check_ascii(product, PRODUCT_BYTES, ConfigError::InvalidProduct)?;
        Ok(self)
    }

    pub fn revision(mut self, revision: &str) -> Result<Self, ConfigError> {
        self.revision = check_ascii(revision, REVISION_BYTES, ConfigError::InvalidRevision)?;
        Ok(self)
    }

    /// Called with `true` when a READ/WRITE data phase starts and `false` when it ends.
    /// Runs on the worker and must not block
    pub fn activity<F: Fn(bool) + Send + 'static>(mut self, callback: F) -> Self {
        self.activity = Some(Box::new(callback));
        self
    }
}
