// Vendored from https://github.com/stm32-rs/stm32-usbd tag v0.6.0
// Original copyright (c) 2021 Matti Virkkunen <mvirkkunen@gmail.com>, Vadim Kaushan <admin@disasm.info>,
// Nicolas Stalder <n@stalder.io>", Jonas Martin <lichtfeind@gmail.com>
// SPDX-License-Identifier: MIT
// SPDX-LIcense-Identifier: Apache 2.0

use log::warn;

use super::{
    BotState,
    BulkEndpoints,
    CommandBlockWrapper,
    CommandStatus,
    CommandStatusWrapper,
    DataPlan,
    Direction,
    Transition,
    TransferError,
};
use crate::logging::*;

/// Big enough for a CBW arriving in a full high speed packet
const COMMAND_BUFFER_BYTES: usize = 512;

/// Why a received envelope was thrown away
#[derive(Clone, Copy, Eq, PartialEq, Debug)]
pub enum Malformed {
    Length(usize),
    Signature(u32),
    CommandLength(u8),
    Lun(u8),
    Status(u8),
}

#[derive(Clone, Copy, Eq, PartialEq, Debug)]
pub enum Error {
    Transfer(TransferError),
    MalformedEnvelope(Malformed),
    PhaseError,
    /// Data phase or status requested with no command in flight
    NoCommand,
    /// A CBW was requested before the previous command was closed
    CommandInFlight,
}

impl From<TransferError> for Error {
    fn from(e: TransferError) -> Error {
        Error::Transfer(e)
    }
}

#[derive(Clone, Copy, Debug)]
struct ActiveCommand {
    cbw: CommandBlockWrapper,
    /// Set once the command set has committed to a data phase
    plan: Option<DataPlan>,
    bytes_moved: u32,
    /// Tracks if the last write was a full packet or not
    /// Used to determine if a ZLP is required or not
    last_packet_full: bool,
}

/// # USB Bulk Only Transport protocol
///
/// Runs one command cycle at a time over a pair of [`BulkEndpoints`]. The command set
/// drives it:
///
/// 1. [`read_command`](Self::read_command) receives and checks a CBW. A bad one stalls
///    both endpoints, sends no CSW and leaves the transport in [`BotState::BotReset`]
/// 1. [`begin_data_phase`](Self::begin_data_phase) checks the command's intended
///    [`DataPlan`] against what the host declared
/// 1. [`write_data`](Self::write_data) / [`read_data`](Self::read_data) move the data in
///    packets, never past the plan
/// 1. [`finish`](Self::finish) terminates the data phase (ZLP or stall as needed) and
///    sends the CSW with the correct data residue
///
/// [`reset`](Self::reset) handles a Bulk-Only Mass Storage Reset from the host.
///
/// [Glossary](index.html#glossary)
pub struct BulkOnlyTransport<E: BulkEndpoints> {
    endpoints: E,

    /// This is the response to the Get Max LUN request and the highest LUN a CBW
    /// may address. Must be between 0 and 15, which is checked in the new function
    max_lun: u8,

    state: BotState,

    /// The command between CBW and CSW, if any
    command: Option<ActiveCommand>,
}

impl<E: BulkEndpoints> BulkOnlyTransport<E> {
    pub fn new(endpoints: E, max_lun: u8) -> BulkOnlyTransport<E> {
        assert!(max_lun < 16);
        BulkOnlyTransport { endpoints, max_lun, state: BotState::Idle, command: None }
    }

    pub fn state(&self) -> BotState { self.state }

    pub fn max_lun(&self) -> u8 { self.max_lun }

    pub fn endpoints(&self) -> &E { &self.endpoints }

    pub fn endpoints_mut(&mut self) -> &mut E { &mut self.endpoints }

    pub fn into_endpoints(self) -> E { self.endpoints }

    pub fn current_command(&self) -> Option<&CommandBlockWrapper> { self.command.as_ref().map(|c| &c.cbw) }

    /// Bytes moved in the data phase of the current command
    pub fn bytes_moved(&self) -> u32 { self.command.map(|c| c.bytes_moved).unwrap_or(0) }

    fn change_state(&mut self, transition: Transition) {
        let new_state = self.state.next(transition);
        trace_bot_states!("STATE> {:?} -> {:?} on {:?}", self.state, new_state, transition);
        self.state = new_state;
    }

    fn stall_both(&mut self) {
        self.endpoints.stall(Direction::DeviceToHost);
        self.endpoints.stall(Direction::HostToDevice);
    }

    /// Drops the current command without a CSW after a failed transfer. Transfers
    /// aborted by a host reset leave the endpoints alone, anything else stalls both
    /// so the host runs reset recovery.
    fn abandon(&mut self, e: TransferError) -> Error {
        if let Some(command) = self.command.take() {
            trace_bot_headers!("HEADER> abandoning tag {:08X}", command.cbw.tag);
        }
        if e != TransferError::Aborted {
            warn!("BOT transfer failed: {:?}", e);
            self.stall_both();
        }
        self.change_state(Transition::CommandAbandoned);
        Error::Transfer(e)
    }

    /// Receives the next CBW and checks it.
    pub fn read_command(&mut self) -> Result<CommandBlockWrapper, Error> {
        if self.command.is_some() {
            return Err(Error::CommandInFlight);
        }
        let mut buf = [0u8; COMMAND_BUFFER_BYTES];
        let len = match self.endpoints.read_packet(&mut buf) {
            Ok(len) => len,
            Err(e) => return Err(self.abandon(e)),
        };
        trace_bot_bytes!("BYTES> Read {} bytes for command", len);

        let checked = CommandBlockWrapper::decode(&buf[..len]).and_then(|cbw| {
            cbw.validate(self.max_lun)?;
            Ok(cbw)
        });
        match checked {
            Ok(cbw) => {
                trace_bot_headers!("HEADER> CommandBlockWrapper: {:X?}", cbw);
                self.command = Some(ActiveCommand { cbw, plan: None, bytes_moved: 0, last_packet_full: false });
                self.change_state(Transition::CommandAccepted);
                Ok(cbw)
            }
            Err(e) => {
                warn!("CBW rejected: {:?}", e);
                self.stall_both();
                self.change_state(Transition::EnvelopeRejected);
                Err(e)
            }
        }
    }

    /// Commits the current command to `plan`, or reports a phase error if the host
    /// declared something incompatible. No data moves on a phase error.
    pub fn begin_data_phase(&mut self, plan: DataPlan) -> Result<(), Error> {
        let command = self.command.as_mut().ok_or(Error::NoCommand)?;
        if let Err(e) = command.cbw.check_plan(plan) {
            warn!("phase error: host declared {:?} {} bytes, device planned {:?}",
                command.cbw.direction,
                command.cbw.data_transfer_length,
                plan,
            );
            return Err(e);
        }
        command.plan = Some(plan);
        Ok(())
    }

    fn remaining(&self, direction: Direction) -> Result<u32, Error> {
        let command = self.command.as_ref().ok_or(Error::NoCommand)?;
        match command.plan {
            Some(plan) if plan.direction() == Some(direction) => Ok(plan.len() - command.bytes_moved),
            _ => Err(Error::PhaseError),
        }
    }

    /// Sends `data` to the host in packets. Anything past the planned length is
    /// dropped, the return value is what was actually sent.
    pub fn write_data(&mut self, data: &[u8]) -> Result<usize, Error> {
        let remaining = self.remaining(Direction::DeviceToHost)? as usize;
        let packet_size = self.endpoints.max_packet_size().max(1);
        let len = data.len().min(remaining);

        let mut sent = 0;
        let mut failure = None;
        for chunk in data[..len].chunks(packet_size) {
            match self.endpoints.write_packet(chunk) {
                Ok(bytes) => {
                    sent += bytes;
                    if let Some(command) = self.command.as_mut() {
                        command.bytes_moved += bytes as u32;
                        command.last_packet_full = bytes == packet_size;
                    }
                }
                Err(e) => {
                    failure = Some(e);
                    break;
                }
            }
        }
        trace_bot_bytes!("BYTES> Sent {} bytes, {} planned bytes left", sent, remaining - sent);
        match failure {
            Some(e) => Err(self.abandon(e)),
            None => Ok(sent),
        }
    }

    /// Receives host data into `buf`, up to the planned length. Stops early on a short
    /// packet, which is how the host ends a transfer.
    pub fn read_data(&mut self, buf: &mut [u8]) -> Result<usize, Error> {
        let remaining = self.remaining(Direction::HostToDevice)? as usize;
        let packet_size = self.endpoints.max_packet_size().max(1);
        let len = buf.len().min(remaining);

        let mut filled = 0;
        let mut failure = None;
        while filled < len {
            let end = (filled + packet_size).min(len);
            match self.endpoints.read_packet(&mut buf[filled..end]) {
                Ok(bytes) => {
                    filled += bytes;
                    if let Some(command) = self.command.as_mut() {
                        command.bytes_moved += bytes as u32;
                    }
                    if bytes < packet_size {
                        break;
                    }
                }
                Err(e) => {
                    failure = Some(e);
                    break;
                }
            }
        }
        trace_bot_bytes!("BYTES> Received {} bytes, {} planned bytes left", filled, remaining - filled);
        match failure {
            Some(e) => Err(self.abandon(e)),
            None => Ok(filled),
        }
    }

    /// Ends the current command: terminates the data phase and sends the CSW.
    ///
    /// `medium_present` decides whether the transport goes back to
    /// [`BotState::Idle`] or into [`BotState::Ejected`].
    pub fn finish(&mut self, status: CommandStatus, medium_present: bool) -> Result<CommandStatusWrapper, Error> {
        let command = self.command.ok_or(Error::NoCommand)?;
        let cbw = command.cbw;

        let data_residue = if status == CommandStatus::PhaseError {
            if cbw.data_transfer_length > 0 {
                self.endpoints.stall(cbw.direction);
            }
            cbw.data_transfer_length
        } else {
            let residue = cbw.data_transfer_length.saturating_sub(command.bytes_moved);
            if residue > 0 {
                self.end_data_transfer(&command, status)?;
            }
            residue
        };

        let csw = CommandStatusWrapper { tag: cbw.tag, data_residue, status };
        trace_bot_headers!("HEADER> CommandStatusWrapper: {:X?}", csw);
        if let Err(e) = self.endpoints.write_packet(&csw.encode()) {
            return Err(self.abandon(e));
        }
        self.command = None;
        self.change_state(Transition::CommandClosed { medium_present });
        Ok(csw)
    }

    /// Reports a phase error for the current command: status 2, the whole declared
    /// length as residue, and the declared endpoint stalled.
    pub fn fail_phase(&mut self, medium_present: bool) -> Result<CommandStatusWrapper, Error> {
        self.finish(CommandStatus::PhaseError, medium_present)
    }

    // The host still expects data. On IN a short packet already told it the transfer is
    // over; a full last packet needs a ZLP; nothing sent or a failure gets a stall.
    // On OUT the device won't take the rest, so stall.
    fn end_data_transfer(&mut self, command: &ActiveCommand, status: CommandStatus) -> Result<(), Error> {
        match command.cbw.direction {
            Direction::DeviceToHost => {
                if status == CommandStatus::CommandOk && command.bytes_moved > 0 {
                    if command.last_packet_full {
                        trace_bot_zlp!("ZLP> sending");
                        if let Err(e) = self.endpoints.write_packet(&[]) {
                            return Err(self.abandon(e));
                        }
                    }
                } else {
                    self.endpoints.stall(Direction::DeviceToHost);
                }
            }
            Direction::HostToDevice => self.endpoints.stall(Direction::HostToDevice),
        }
        Ok(())
    }

    /// Bulk-Only Mass Storage Reset. Whatever was in flight is forgotten without a CSW.
    pub fn reset(&mut self) {
        if let Some(command) = self.command.take() {
            trace_bot_headers!("HEADER> reset drops tag {:08X}", command.cbw.tag);
        }
        self.change_state(Transition::HostReset);
    }

    pub fn medium_ejected(&mut self) { self.change_state(Transition::MediumEjected); }

    pub fn medium_inserted(&mut self) { self.change_state(Transition::MediumInserted); }
}
