// Vendored from https://github.com/stm32-rs/stm32-usbd tag v0.6.0
// Original copyright (c) 2021 Matti Virkkunen <mvirkkunen@gmail.com>, Vadim Kaushan <admin@disasm.info>,
// Nicolas Stalder <n@stalder.io>", Jonas Martin <lichtfeind@gmail.com>
// SPDX-License-Identifier: MIT
// SPDX-LIcense-Identifier: Apache 2.0

/// SCSI op codes as defined by SPC-3 and SBC-2.
///
/// Recognizing an op code doesn't mean it is handled, see `Command::extract_from_cbw`
#[derive(Clone, Copy, Eq, PartialEq, Debug, num_derive::FromPrimitive, num_derive::ToPrimitive)]
pub enum OpCode {
    TestUnitReady = 0x00,
    RequestSense = 0x03,
    Format = 0x04,
    Read6 = 0x08,
    Write6 = 0x0A,
    Inquiry = 0x12,
    ModeSelect6 = 0x15,
    ModeSense6 = 0x1A,
    StartStopUnit = 0x1B,
    SendDiagnostic = 0x1D,
    PreventAllowMediumRemoval = 0x1E,
    ReadFormatCapacities = 0x23,
    ReadCapacity10 = 0x25,
    Read10 = 0x28,
    Write10 = 0x2A,
    Verify10 = 0x2F,
    SynchronizeCache10 = 0x35,
    ModeSelect10 = 0x55,
    ModeSense10 = 0x5A,
    ReportLuns = 0xA0,
    Read12 = 0xA8,
    Write12 = 0xAA,
}
