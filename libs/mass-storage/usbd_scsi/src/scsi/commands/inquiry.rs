use crate::scsi::{commands::{be_u16, check_length}, Error};

#[derive(Clone, Copy, Eq, PartialEq, Debug, Default)]
pub struct InquiryCommand {
    /// If set, return vital data related to the page_code field
    pub enable_vital_product_data: bool,
    /// What kind of vital data to return
    pub page_code: u8,
    pub allocation_length: u16,
}

impl InquiryCommand {
    pub const BYTES: usize = 6;

    pub fn parse(cdb: &[u8]) -> Result<Self, Error> {
        check_length(cdb, Self::BYTES)?;
        Ok(Self {
            enable_vital_product_data: cdb[1] & 0x01 != 0,
            page_code: cdb[2],
            allocation_length: be_u16(cdb, 3),
        })
    }
}

#[test]
fn test_inquiry() {
    let mut bytes = [0x12, 0, 0, 0, 0, 0];
    let mut cmd = InquiryCommand::default();
    assert_eq!(cmd, InquiryCommand::parse(&bytes).unwrap());

    bytes[1] |= 0b00000001;
    cmd.enable_vital_product_data = true;
    assert_eq!(cmd, InquiryCommand::parse(&bytes).unwrap());

    bytes[2] = 0x99;
    cmd.page_code = 0x99;
    assert_eq!(cmd, InquiryCommand::parse(&bytes).unwrap());

    let al: u16 = 9999;
    bytes[3..5].copy_from_slice(&al.to_be_bytes());
    cmd.allocation_length = al;
    assert_eq!(cmd, InquiryCommand::parse(&bytes).unwrap());
}
