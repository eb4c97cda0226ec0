/// The status of a command, as reported in the CSW
#[derive(Clone, Copy, Eq, PartialEq, Debug, num_derive::FromPrimitive, num_derive::ToPrimitive)]
pub enum CommandStatus {
    /// Ok, command completed successfully
    CommandOk = 0x00,
    /// Error, command failed. Host follows up with REQUEST SENSE
    CommandError = 0x01,
    /// Declared and actual data phase disagree, host performs reset recovery
    PhaseError = 0x02,
}
