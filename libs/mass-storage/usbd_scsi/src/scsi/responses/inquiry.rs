// ASCII space is used to pad shorter string identifiers as per SPC
const ASCII_SPACE: u8 = 0x20;

/// Direct access block device
const PERIPHERAL_DEVICE_TYPE_DIRECT_ACCESS: u8 = 0x00;
const REMOVABLE_MEDIUM: u8 = 0x80;
/// SPC-2
const VERSION_SPC2: u8 = 0x04;
const RESPONSE_DATA_FORMAT: u8 = 0x02;

/// Standard INQUIRY data
#[derive(Clone, Copy, Eq, PartialEq, Debug)]
pub struct InquiryResponse {
    pub removable_medium: bool,
    vendor_identification: [u8; 8],
    product_identification: [u8; 16],
    product_revision_level: [u8; 4],
}

impl Default for InquiryResponse {
    fn default() -> Self {
        Self {
            removable_medium: true,
            vendor_identification: [ASCII_SPACE; 8],
            product_identification: [ASCII_SPACE; 16],
            product_revision_level: [ASCII_SPACE; 4],
        }
    }
}

/// Copies `src` into `dest`, padding with spaces. Trailing NULs count as padding;
/// anything past the end of `dest` is dropped
fn set_ascii_str(dest: &mut [u8], src: &[u8]) {
    let end = src.iter().rposition(|&b| b != 0).map(|i| i + 1).unwrap_or(0);
    let src = &src[..end.min(dest.len())];
    dest[..src.len()].copy_from_slice(src);
    for b in dest[src.len()..].iter_mut() {
        *b = ASCII_SPACE;
    }
}

impl InquiryResponse {
    pub const BYTES: usize = 36;

    pub fn new(vendor: &[u8], product: &[u8], revision: &[u8]) -> Self {
        let mut response = Self::default();
        response.set_vendor_identification(vendor);
        response.set_product_identification(product);
        response.set_product_revision_level(revision);
        response
    }

    /// Up to 8 bytes, from [t10](https://www.t10.org/lists/2vid.htm) ideally
    pub fn set_vendor_identification<S: AsRef<[u8]>>(&mut self, s: S) {
        set_ascii_str(&mut self.vendor_identification, s.as_ref())
    }

    /// Up to 16 bytes
    pub fn set_product_identification<S: AsRef<[u8]>>(&mut self, s: S) {
        set_ascii_str(&mut self.product_identification, s.as_ref())
    }

    /// Up to 4 bytes, typically a version number
    pub fn set_product_revision_level<S: AsRef<[u8]>>(&mut self, s: S) {
        set_ascii_str(&mut self.product_revision_level, s.as_ref())
    }

    pub fn encode(&self) -> [u8; Self::BYTES] {
        let mut buf = [0u8; Self::BYTES];
        buf[0] = PERIPHERAL_DEVICE_TYPE_DIRECT_ACCESS;
        buf[1] = if self.removable_medium { REMOVABLE_MEDIUM } else { 0 };
        buf[2] = VERSION_SPC2;
        buf[3] = RESPONSE_DATA_FORMAT;
        // n-4
        buf[4] = (Self::BYTES - 5) as u8;
        buf[8..16].copy_from_slice(&self.vendor_identification);
        buf[16..32].copy_from_slice(&self.product_identification);
        buf[32..36].copy_from_slice(&self.product_revision_level);
        buf
    }
}

#[test]
fn test_inquiry_padding() {
    let response = InquiryResponse::new(b"Xous\0\0\0\0", b"Mass Storage", b"1.0");
    let bytes = response.encode();
    assert_eq!(bytes[1], 0x80);
    assert_eq!(bytes[4], 31);
    assert_eq!(&bytes[8..16], b"Xous    ");
    assert_eq!(&bytes[16..32], b"Mass Storage    ");
    assert_eq!(&bytes[32..36], b"1.0 ");
}

#[test]
fn test_inquiry_truncates_long_strings() {
    let response = InquiryResponse::new(b"LongVendorName", b"", b"12345");
    let bytes = response.encode();
    assert_eq!(&bytes[8..16], b"LongVend");
    assert_eq!(&bytes[16..32], &[ASCII_SPACE; 16]);
    assert_eq!(&bytes[32..36], b"1234");
}
