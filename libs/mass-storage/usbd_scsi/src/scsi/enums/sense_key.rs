/// Sense key, the coarse category of the last failure (SPC-3 table 27)
#[derive(Clone, Copy, Eq, PartialEq, Debug, Default, num_derive::FromPrimitive, num_derive::ToPrimitive)]
pub enum SenseKey {
    /// Nothing to report
    #[default]
    NoSense = 0x0,
    RecoveredError = 0x1,
    /// The logical unit is not accessible, e.g. the medium is gone
    NotReady = 0x2,
    /// Non-recovered error probably caused by a flaw in the medium or the recorded data
    MediumError = 0x3,
    /// Non-recoverable failure of the device itself
    HardwareError = 0x4,
    /// Something in the CDB or the command itself is not acceptable
    IllegalRequest = 0x5,
    UnitAttention = 0x6,
    /// The block is write protected, nothing was written
    DataProtect = 0x7,
    AbortedCommand = 0xB,
    Miscompare = 0xE,
}
