// Vendored from https://github.com/stm32-rs/stm32-usbd tag v0.6.0
// Original copyright (c) 2021 Matti Virkkunen <mvirkkunen@gmail.com>, Vadim Kaushan <admin@disasm.info>,
// Nicolas Stalder <n@stalder.io>", Jonas Martin <lichtfeind@gmail.com>
// SPDX-License-Identifier: MIT
// SPDX-LIcense-Identifier: Apache 2.0

// There are many more variants (see asc-num.txt) but these are the ones the scsi code
// currently uses
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum AdditionalSenseCode {
    /// ASC 0x0, ASCQ: 0x0 - NO ADDITIONAL SENSE INFORMATION
    #[default]
    NoAdditionalSenseInformation,
    /// ASC 0x20, ASCQ: 0x0 - INVALID COMMAND OPERATION CODE
    InvalidCommandOperationCode,
    /// ASC 0x64, ASCQ: 0x1 - INVALID PACKET SIZE
    InvalidPacketSize,
    /// ASC 0x24, ASCQ: 0x0 - INVALID FIELD IN CDB
    InvalidFieldInCdb,
    /// ASC 0x21, ASCQ: 0x0 - LOGICAL BLOCK ADDRESS OUT OF RANGE
    LogicalBlockAddressOutOfRange,
    /// ASC 0xC, ASCQ: 0x0 - WRITE ERROR
    WriteError,
    /// ASC 0x11, ASCQ: 0x0 - UNRECOVERED READ ERROR
    UnrecoveredReadError,
    /// ASC 0x27, ASCQ: 0x0 - WRITE PROTECTED
    WriteProtected,
    /// ASC 0x3A, ASCQ: 0x0 - MEDIUM NOT PRESENT
    MediumNotPresent,
}

impl AdditionalSenseCode {
    /// Returns the ASC code for this variant
    pub fn asc(&self) -> u8 {
        match self {
            AdditionalSenseCode::NoAdditionalSenseInformation => 0x00,
            AdditionalSenseCode::InvalidCommandOperationCode => 0x20,
            AdditionalSenseCode::InvalidPacketSize => 0x64,
            AdditionalSenseCode::InvalidFieldInCdb => 0x24,
            AdditionalSenseCode::LogicalBlockAddressOutOfRange => 0x21,
            AdditionalSenseCode::WriteError => 0x0C,
            AdditionalSenseCode::UnrecoveredReadError => 0x11,
            AdditionalSenseCode::WriteProtected => 0x27,
            AdditionalSenseCode::MediumNotPresent => 0x3A,
        }
    }
    /// Returns the ASCQ code for this variant
    pub fn ascq(&self) -> u8 {
        match self {
            AdditionalSenseCode::InvalidPacketSize => 0x01,
            _ => 0x00,
        }
    }
    pub fn from(asc: u8, ascq: u8) -> Option<Self> {
        match (asc, ascq) {
            (0x00, 0) => Some(AdditionalSenseCode::NoAdditionalSenseInformation),
            (0x20, 0) => Some(AdditionalSenseCode::InvalidCommandOperationCode),
            (0x64, 1) => Some(AdditionalSenseCode::InvalidPacketSize),
            (0x24, 0) => Some(AdditionalSenseCode::InvalidFieldInCdb),
            (0x21, 0) => Some(AdditionalSenseCode::LogicalBlockAddressOutOfRange),
            (0x0C, 0) => Some(AdditionalSenseCode::WriteError),
            (0x11, 0) => Some(AdditionalSenseCode::UnrecoveredReadError),
            (0x27, 0) => Some(AdditionalSenseCode::WriteProtected),
            (0x3A, 0) => Some(AdditionalSenseCode::MediumNotPresent),
            _ => None,
        }
    }
}

#[test]
fn test_asc_codes() {
    assert_eq!(AdditionalSenseCode::MediumNotPresent.asc(), 0x3A);
    assert_eq!(AdditionalSenseCode::UnrecoveredReadError.asc(), 0x11);
    assert_eq!(AdditionalSenseCode::from(0x64, 1), Some(AdditionalSenseCode::InvalidPacketSize));
    assert_eq!(AdditionalSenseCode::from(0x3A, 1), None);
}
