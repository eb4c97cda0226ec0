/// Where the transport is in its command cycle
#[derive(Clone, Copy, Eq, PartialEq, Debug, Default)]
pub enum BotState {
    /// Waiting for the next CBW
    #[default]
    Idle,
    /// A CBW was accepted and its command is running, CSW not sent yet
    ReadingCommandBlock,
    /// Medium is gone. Commands still run but only INQUIRY and REQUEST SENSE succeed
    Ejected,
    /// Host reset or protocol violation. The next valid CBW resumes normal operation
    BotReset,
}

/// Inputs that move the transport between [`BotState`]s
#[derive(Clone, Copy, Eq, PartialEq, Debug)]
pub enum Transition {
    /// A CBW passed every check
    CommandAccepted,
    /// A CBW was malformed or invalid, both endpoints are stalled
    EnvelopeRejected,
    /// The CSW for the current command went out
    CommandClosed { medium_present: bool },
    /// The current command was dropped without a CSW after a transfer failed
    CommandAbandoned,
    /// Bulk-Only Mass Storage Reset from the host
    HostReset,
    MediumEjected,
    MediumInserted,
}

impl BotState {
    pub fn next(self, transition: Transition) -> BotState {
        use BotState::*;
        match (self, transition) {
            (Ejected, Transition::CommandAccepted) => Ejected,
            (Idle, Transition::CommandAccepted)
            | (ReadingCommandBlock, Transition::CommandAccepted)
            | (BotReset, Transition::CommandAccepted) => ReadingCommandBlock,

            (_, Transition::EnvelopeRejected) => BotReset,

            (_, Transition::CommandClosed { medium_present: true }) => Idle,
            (_, Transition::CommandClosed { medium_present: false }) => Ejected,

            (_, Transition::CommandAbandoned) => BotReset,
            (_, Transition::HostReset) => BotReset,

            (Idle, Transition::MediumEjected) => Ejected,
            // a running command closes into Ejected, a reset stays a reset
            (state, Transition::MediumEjected) => state,

            (Ejected, Transition::MediumInserted) => Idle,
            (state, Transition::MediumInserted) => state,
        }
    }
}
