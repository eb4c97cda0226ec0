// Vendored from https://github.com/stm32-rs/stm32-usbd tag v0.6.0
// Original copyright (c) 2021 Matti Virkkunen <mvirkkunen@gmail.com>, Vadim Kaushan <admin@disasm.info>,
// Nicolas Stalder <n@stalder.io>", Jonas Martin <lichtfeind@gmail.com>
// SPDX-License-Identifier: MIT
// SPDX-LIcense-Identifier: Apache 2.0

use usbd_bulk_only_transport::Error as BulkOnlyTransportError;

use crate::block_device::BlockDeviceError;
use crate::scsi::enums::{AdditionalSenseCode, SenseKey};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Op code not recognized, or recognized but not implemented
    UnhandledOpCode(u8),
    /// The identified opcode requires more data than was sent
    InsufficientDataForCommand,
    InvalidFieldInCdb,
    LbaOutOfRange,
    MediumNotPresent,
    WriteProtected,
    /// The block device failed a read, even after a retry
    BlockRead(BlockDeviceError),
    /// The block device failed a write, even after a retry
    BlockWrite(BlockDeviceError),
    BulkOnlyTransportError(BulkOnlyTransportError),
}

impl From<BulkOnlyTransportError> for Error {
    fn from(e: BulkOnlyTransportError) -> Error {
        Error::BulkOnlyTransportError(e)
    }
}

impl Error {
    /// Sense data describing this failure to the host
    pub fn sense(&self) -> (SenseKey, AdditionalSenseCode) {
        match self {
            Error::UnhandledOpCode(_) => (SenseKey::IllegalRequest, AdditionalSenseCode::InvalidCommandOperationCode),
            Error::InsufficientDataForCommand => (
                SenseKey::IllegalRequest,
                // Closest thing there is. Hosts do very little with ASC/ASCQ so unique is good enough
                AdditionalSenseCode::InvalidPacketSize,
            ),
            Error::InvalidFieldInCdb => (SenseKey::IllegalRequest, AdditionalSenseCode::InvalidFieldInCdb),
            Error::LbaOutOfRange
            | Error::BlockRead(BlockDeviceError::InvalidAddress)
            | Error::BlockWrite(BlockDeviceError::InvalidAddress) => {
                (SenseKey::IllegalRequest, AdditionalSenseCode::LogicalBlockAddressOutOfRange)
            }
            Error::MediumNotPresent
            | Error::BlockRead(BlockDeviceError::NotPresent)
            | Error::BlockWrite(BlockDeviceError::NotPresent) => {
                (SenseKey::NotReady, AdditionalSenseCode::MediumNotPresent)
            }
            Error::WriteProtected => (SenseKey::DataProtect, AdditionalSenseCode::WriteProtected),
            Error::BlockRead(_) => (SenseKey::MediumError, AdditionalSenseCode::UnrecoveredReadError),
            Error::BlockWrite(_) => (SenseKey::MediumError, AdditionalSenseCode::WriteError),
            // These end in a reset, it's unlikely a request sense will ever be issued
            // for them but just-in-case
            Error::BulkOnlyTransportError(_) => (SenseKey::HardwareError, AdditionalSenseCode::NoAdditionalSenseInformation),
        }
    }
}

#[test]
fn test_device_errors_map_to_medium_error() {
    assert_eq!(
        Error::BlockRead(BlockDeviceError::ReadError).sense(),
        (SenseKey::MediumError, AdditionalSenseCode::UnrecoveredReadError)
    );
    assert_eq!(
        Error::BlockRead(BlockDeviceError::HardwareError).sense(),
        (SenseKey::MediumError, AdditionalSenseCode::UnrecoveredReadError)
    );
    assert_eq!(
        Error::BlockWrite(BlockDeviceError::WriteError).sense(),
        (SenseKey::MediumError, AdditionalSenseCode::WriteError)
    );
    assert_eq!(
        Error::BlockWrite(BlockDeviceError::NotPresent).sense(),
        (SenseKey::NotReady, AdditionalSenseCode::MediumNotPresent)
    );
}
