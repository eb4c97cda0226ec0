use log::{error, info};
use usbd_bulk_only_transport::{
    BotState,
    BulkEndpoints,
    BulkOnlyTransport,
    CommandBlockWrapper,
    CommandStatus,
    CommandStatusWrapper,
    DataPlan,
    Error as BulkOnlyTransportError,
};

use crate::{
    logging::*,
    block_device::{
        BlockDevice,
        BlockDeviceError,
        BlockDeviceInfo,
    },
    scsi::{
        commands::*,
        responses::*,
        enums::*,
        Error,
    },
};

/// Called with `true` when a READ or WRITE data phase starts and `false` when it
/// ends. Runs on the worker, so it must return quickly (e.g. toggle an LED)
pub type ActivityCallback = Box<dyn Fn(bool) + Send>;

/// # Scsi Transparent Command Set implementation
///
/// Built on top of [BulkOnlyTransport](usbd_bulk_only_transport::BulkOnlyTransport). Each call
/// to [`process_command`](Scsi::process_command) runs exactly one CBW to CSW cycle against
/// `block_device`. Every LUN up to the transport's maximum is served by that one device.
pub struct Scsi<E: BulkEndpoints, BD: BlockDevice> {
    inner: BulkOnlyTransport<E>,
    inquiry_response: InquiryResponse,
    sense: SenseData,
    block_device: BD,
    /// Survives resets; only eject/insert events and the block device change it
    medium_present: bool,
    activity: Option<ActivityCallback>,
    /// One block, sized from the block device on each transfer
    block_buffer: Vec<u8>,
}

impl<E: BulkEndpoints, BD: BlockDevice> Scsi<E, BD> {
    /// Creates a new Scsi block device
    ///
    /// `block_device` provides reading and writing of blocks to the underlying storage
    ///
    /// `vendor_identification` is an ASCII string that forms part of the SCSI inquiry response.
    ///      Should come from [t10](https://www.t10.org/lists/2vid.htm). Any semi-unique non-blank
    ///      string should work fine for local development. Truncated past 8 characters.
    ///
    /// `product_identification` is an ASCII string that forms part of the SCSI inquiry response.
    ///      Truncated past 16 characters.
    ///
    /// `product_revision_level` is an ASCII string that forms part of the SCSI inquiry response.
    ///      Typically a version number. Truncated past 4 characters.
    pub fn new<V: AsRef<[u8]>, P: AsRef<[u8]>, R: AsRef<[u8]>>(
        endpoints: E,
        max_lun: u8,
        block_device: BD,
        vendor_identification: V,
        product_identification: P,
        product_revision_level: R,
    ) -> Scsi<E, BD> {
        let inquiry_response = InquiryResponse::new(
            vendor_identification.as_ref(),
            product_identification.as_ref(),
            product_revision_level.as_ref(),
        );
        Scsi {
            inner: BulkOnlyTransport::new(endpoints, max_lun),
            inquiry_response,
            sense: Default::default(),
            block_device,
            medium_present: true,
            activity: None,
            block_buffer: Vec::new(),
        }
    }

    pub fn set_activity_callback(&mut self, callback: Option<ActivityCallback>) {
        self.activity = callback;
    }

    pub fn transport(&self) -> &BulkOnlyTransport<E> { &self.inner }

    pub fn transport_mut(&mut self) -> &mut BulkOnlyTransport<E> { &mut self.inner }

    pub fn state(&self) -> BotState { self.inner.state() }

    /// Grants access to the block device for the purposes of housekeeping etc.
    pub fn block_device_mut(&mut self) -> &mut BD { &mut self.block_device }

    pub fn block_device(&self) -> &BD { &self.block_device }

    pub fn into_block_device(self) -> BD { self.block_device }

    pub fn medium_present(&self) -> bool { self.medium_present }

    /// What the next REQUEST SENSE would report
    pub fn sense(&self) -> SenseData { self.sense }

    /// Bulk-Only Mass Storage Reset. Sense data and the medium state are kept
    pub fn reset(&mut self) {
        self.inner.reset();
    }

    pub fn medium_ejected(&mut self) {
        info!("medium ejected");
        self.medium_present = false;
        self.inner.medium_ejected();
    }

    pub fn medium_inserted(&mut self) {
        if !self.medium_present {
            info!("medium inserted");
            // sense from before the eject no longer applies
            self.sense.reset_status();
        }
        self.medium_present = true;
        self.inner.medium_inserted();
    }

    /// Runs one command: receives the CBW, executes it and sends the CSW.
    ///
    /// Failures the host should hear about end up in the CSW (and the sense data), so
    /// `Err` means there was no CSW: the CBW was rejected or a transfer failed and the
    /// transport is waiting for the host to reset it.
    pub fn process_command(&mut self) -> Result<CommandStatusWrapper, Error> {
        let cbw = self.inner.read_command()?;

        let status = match self.execute(&cbw) {
            Ok(()) => CommandStatus::CommandOk,
            Err(Error::BulkOnlyTransportError(BulkOnlyTransportError::PhaseError)) => CommandStatus::PhaseError,
            // already abandoned, no CSW
            Err(e @ Error::BulkOnlyTransportError(_)) => return Err(e),
            Err(e) => {
                self.map_error_to_sense_data(&e);
                CommandStatus::CommandError
            }
        };
        Ok(self.inner.finish(status, self.medium_present)?)
    }

    fn execute(&mut self, cbw: &CommandBlockWrapper) -> Result<(), Error> {
        let command = Command::extract_from_cbw(cbw)?;
        trace_scsi_command!("COMMAND> {:?} tag {:08X} lun {}", command, cbw.tag, cbw.lun);

        if command.needs_medium() && !self.medium_present {
            return Err(Error::MediumNotPresent);
        }

        match command {
            Command::TestUnitReady(_)
            | Command::SendDiagnostic(_)
            | Command::PreventAllowMediumRemoval(_)
            | Command::SynchronizeCache(_) => {
                self.inner.begin_data_phase(DataPlan::NoData)?;
            }

            // Inquiry, send back the standard response. Vital product data pages aren't
            // implemented
            Command::Inquiry(c) => {
                if c.enable_vital_product_data || c.page_code != 0 {
                    return Err(Error::InvalidFieldInCdb);
                }
                let response = self.inquiry_response.encode();
                self.send_response(&response, c.allocation_length as usize)?;
            }

            // Request sense is how more info about the state of the device is returned
            // after a command fails. Reporting it clears it
            Command::RequestSense(c) => {
                if c.descriptor_format {
                    return Err(Error::InvalidFieldInCdb);
                }
                let sense = if self.sense.is_clear() && !self.medium_present {
                    SenseData::new(SenseKey::NotReady, AdditionalSenseCode::MediumNotPresent)
                } else {
                    self.sense
                };
                self.send_response(&sense.encode(), c.allocation_length as usize)?;
                self.sense.reset_status();
            }

            Command::ReadCapacity(_) => {
                let response = ReadCapacity10Response::new(&self.block_device.info()).encode();
                self.send_response(&response, ReadCapacity10Response::BYTES)?;
            }

            Command::ReadFormatCapacities(c) => {
                let response = ReadFormatCapacitiesResponse::new(&self.block_device.info()).encode();
                self.send_response(&response, c.allocation_length as usize)?;
            }

            Command::ModeSense(c) => {
                let header = ModeParameterHeader { write_protect: self.block_device.read_only() };
                trace_scsi_command!("COMMAND> mode page {:02X} reported as header only", c.page_code);
                match c.command_length {
                    CommandLength::C6 => self.send_response(&header.encode6(), c.allocation_length as usize)?,
                    CommandLength::C10 => self.send_response(&header.encode10(), c.allocation_length as usize)?,
                }
            }

            Command::StartStopUnit(c) => {
                self.inner.begin_data_phase(DataPlan::NoData)?;
                if c.is_eject() {
                    self.medium_ejected();
                }
            }

            Command::Verify(c) => {
                if c.byte_check {
                    return Err(Error::InvalidFieldInCdb);
                }
                check_range(&self.block_device.info(), c.lba, c.verification_length as u32)?;
                self.inner.begin_data_phase(DataPlan::NoData)?;
            }

            Command::Read(c) => self.read_blocks(c.lba, c.transfer_length as u32)?,
            Command::Write(c) => self.write_blocks(c.lba, c.transfer_length as u32)?,
        }
        Ok(())
    }

    /// Sends a response, cut down to what the host allocated
    fn send_response(&mut self, data: &[u8], allocation_length: usize) -> Result<(), Error> {
        let len = data.len().min(allocation_length);
        if len == 0 {
            self.inner.begin_data_phase(DataPlan::NoData)?;
            return Ok(());
        }
        self.inner.begin_data_phase(DataPlan::DeviceToHost(len as u32))?;
        self.inner.write_data(&data[..len])?;
        Ok(())
    }

    fn set_activity(&self, active: bool) {
        if let Some(callback) = self.activity.as_ref() {
            callback(active);
        }
    }

    fn read_blocks(&mut self, lba: u32, count: u32) -> Result<(), Error> {
        let info = self.block_device.info();
        let bytes = check_range(&info, lba, count)?;
        if count == 0 {
            self.inner.begin_data_phase(DataPlan::NoData)?;
            return Ok(());
        }
        self.inner.begin_data_phase(DataPlan::DeviceToHost(bytes))?;
        self.block_buffer.resize(info.block_size as usize, 0);

        self.set_activity(true);
        let result = self.stream_to_host(lba, count);
        self.set_activity(false);
        result
    }

    fn stream_to_host(&mut self, lba: u32, count: u32) -> Result<(), Error> {
        for block in lba..lba + count {
            read_block_retrying(&mut self.block_device, block, &mut self.block_buffer).map_err(|e| {
                error!("read of block {} failed: {:?}", block, e);
                Error::BlockRead(e)
            })?;
            self.inner.write_data(&self.block_buffer)?;
        }
        trace_scsi_fs!("FS> read {} blocks from {}", count, lba);
        Ok(())
    }

    fn write_blocks(&mut self, lba: u32, count: u32) -> Result<(), Error> {
        let info = self.block_device.info();
        let bytes = check_range(&info, lba, count)?;
        if self.block_device.read_only() {
            return Err(Error::WriteProtected);
        }
        if count == 0 {
            self.inner.begin_data_phase(DataPlan::NoData)?;
            return Ok(());
        }
        self.inner.begin_data_phase(DataPlan::HostToDevice(bytes))?;
        self.block_buffer.resize(info.block_size as usize, 0);

        self.set_activity(true);
        let result = self.stream_from_host(lba, count);
        self.set_activity(false);
        result
    }

    fn stream_from_host(&mut self, lba: u32, count: u32) -> Result<(), Error> {
        for block in lba..lba + count {
            let received = self.inner.read_data(&mut self.block_buffer)?;
            if received < self.block_buffer.len() {
                // host ended the transfer before sending what it declared
                return Err(BulkOnlyTransportError::PhaseError.into());
            }
            write_block_retrying(&mut self.block_device, block, &self.block_buffer).map_err(|e| {
                error!("write of block {} failed: {:?}", block, e);
                Error::BlockWrite(e)
            })?;
        }
        trace_scsi_fs!("FS> wrote {} blocks from {}", count, lba);
        Ok(())
    }

    fn map_error_to_sense_data(&mut self, err: &Error) {
        let (sense_key, additional_sense_code) = err.sense();
        if additional_sense_code == AdditionalSenseCode::MediumNotPresent && self.medium_present {
            // the block device noticed before anyone told us
            self.medium_present = false;
        }
        info!("SENSE: {:?}, ASC: {} {} ({:?})",
            sense_key,
            additional_sense_code.asc(),
            additional_sense_code.ascq(),
            err,
        );
        self.sense = SenseData::new(sense_key, additional_sense_code);
    }
}

/// Checks that `count` blocks from `lba` fit on the device, returns their size in bytes
fn check_range(info: &BlockDeviceInfo, lba: u32, count: u32) -> Result<u32, Error> {
    if lba as u64 + count as u64 > info.block_count as u64 {
        return Err(Error::LbaOutOfRange);
    }
    count.checked_mul(info.block_size).ok_or(Error::InvalidFieldInCdb)
}

fn read_block_retrying<BD: BlockDevice>(bd: &mut BD, lba: u32, buf: &mut [u8]) -> Result<(), BlockDeviceError> {
    match bd.read_blocks(lba, 1, buf) {
        Err(e) if e.is_transient() => {
            trace_scsi_fs!("FS> read of block {} failed with {:?}, retrying", lba, e);
            bd.read_blocks(lba, 1, buf)
        }
        r => r,
    }
}

fn write_block_retrying<BD: BlockDevice>(bd: &mut BD, lba: u32, buf: &[u8]) -> Result<(), BlockDeviceError> {
    match bd.write_blocks(lba, 1, buf) {
        Err(e) if e.is_transient() => {
            trace_scsi_fs!("FS> write of block {} failed with {:?}, retrying", lba, e);
            bd.write_blocks(lba, 1, buf)
        }
        r => r,
    }
}
