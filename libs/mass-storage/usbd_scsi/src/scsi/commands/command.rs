// Vendored from https://github.com/stm32-rs/stm32-usbd tag v0.6.0
// Original copyright (c) 2021 Matti Virkkunen <mvirkkunen@gmail.com>, Vadim Kaushan <admin@disasm.info>,
// Nicolas Stalder <n@stalder.io>", Jonas Martin <lichtfeind@gmail.com>
// SPDX-License-Identifier: MIT
// SPDX-LIcense-Identifier: Apache 2.0

use num_traits::FromPrimitive;
use usbd_bulk_only_transport::CommandBlockWrapper;

use crate::scsi::{
    commands::*,
    enums::*,
    Error,
};

/// A fully parsed and validated SCSI command
#[derive(Clone, Copy, Eq, PartialEq, Debug)]
pub enum Command {
    Inquiry(InquiryCommand),
    TestUnitReady(TestUnitReadyCommand),
    ReadCapacity(ReadCapacity10Command),
    ReadFormatCapacities(ReadFormatCapacitiesCommand),
    ModeSense(ModeSenseXCommand),
    PreventAllowMediumRemoval(PreventAllowMediumRemovalCommand),
    RequestSense(RequestSenseCommand),
    Read(Read10Command),
    Write(Write10Command),
    Verify(Verify10Command),
    SendDiagnostic(SendDiagnosticCommand),
    StartStopUnit(StartStopUnitCommand),
    SynchronizeCache(SynchronizeCache10Command),
}

impl Command {
    pub fn extract_from_cbw(cbw: &CommandBlockWrapper) -> Result<Command, Error> {
        Self::parse(cbw.command_block())
    }

    pub fn parse(cdb: &[u8]) -> Result<Command, Error> {
        let raw = *cdb.first().ok_or(Error::InsufficientDataForCommand)?;
        let op_code = OpCode::from_u8(raw).ok_or(Error::UnhandledOpCode(raw))?;
        match op_code {
            OpCode::Inquiry => Ok(Command::Inquiry(InquiryCommand::parse(cdb)?)),
            OpCode::TestUnitReady => Ok(Command::TestUnitReady(TestUnitReadyCommand::parse(cdb)?)),
            OpCode::ReadCapacity10 => Ok(Command::ReadCapacity(ReadCapacity10Command::parse(cdb)?)),
            OpCode::ReadFormatCapacities => Ok(Command::ReadFormatCapacities(ReadFormatCapacitiesCommand::parse(cdb)?)),
            OpCode::ModeSense6 => Ok(Command::ModeSense(ModeSenseXCommand::parse6(cdb)?)),
            OpCode::ModeSense10 => Ok(Command::ModeSense(ModeSenseXCommand::parse10(cdb)?)),
            OpCode::PreventAllowMediumRemoval => {
                Ok(Command::PreventAllowMediumRemoval(PreventAllowMediumRemovalCommand::parse(cdb)?))
            }
            OpCode::RequestSense => Ok(Command::RequestSense(RequestSenseCommand::parse(cdb)?)),
            OpCode::Read10 => Ok(Command::Read(Read10Command::parse(cdb)?)),
            OpCode::Write10 => Ok(Command::Write(Write10Command::parse(cdb)?)),
            OpCode::Verify10 => Ok(Command::Verify(Verify10Command::parse(cdb)?)),
            OpCode::SendDiagnostic => Ok(Command::SendDiagnostic(SendDiagnosticCommand::parse(cdb)?)),
            OpCode::StartStopUnit => Ok(Command::StartStopUnit(StartStopUnitCommand::parse(cdb)?)),
            OpCode::SynchronizeCache10 => Ok(Command::SynchronizeCache(SynchronizeCache10Command::parse(cdb)?)),
            _ => Err(Error::UnhandledOpCode(raw)),
        }
    }

    /// Only these two work without a medium: the host needs them to find out why
    /// everything else fails
    pub fn needs_medium(&self) -> bool {
        !matches!(self, Command::Inquiry(_) | Command::RequestSense(_))
    }
}

#[test]
fn test_unhandled_op_codes() {
    assert_eq!(Command::parse(&[0xFF, 0, 0, 0, 0, 0]), Err(Error::UnhandledOpCode(0xFF)));
    // recognized, not implemented
    assert_eq!(Command::parse(&[0x04, 0, 0, 0, 0, 0]), Err(Error::UnhandledOpCode(0x04)));
    assert_eq!(Command::parse(&[]), Err(Error::InsufficientDataForCommand));
}

#[test]
fn test_short_cdb_rejected() {
    assert_eq!(Command::parse(&[0x28, 0, 0, 0, 0, 0]), Err(Error::InsufficientDataForCommand));
}

#[test]
fn test_padded_request_sense() {
    // Some hosts pad every CDB to 12 bytes
    let cdb = [0x03, 0, 0, 0, 18, 0, 0, 0, 0, 0, 0, 0];
    assert_eq!(
        Command::parse(&cdb),
        Ok(Command::RequestSense(RequestSenseCommand { descriptor_format: false, allocation_length: 18 }))
    );
}
