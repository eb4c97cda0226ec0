use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use usbd_bulk_only_transport::{
    BotState,
    BulkEndpoints,
    CommandBlockWrapper,
    CommandStatus,
    CommandStatusWrapper,
    Direction,
    Error as BulkOnlyTransportError,
    Malformed,
    TransferError,
};

use crate::block_device::{BlockDevice, BlockDeviceError, BlockDeviceInfo};
use crate::scsi::{enums::*, Error, Scsi};

const PACKET_SIZE: usize = 64;
const BLOCK_SIZE: usize = 512;
const BLOCK_COUNT: u32 = 16;

#[derive(Default)]
struct MockEndpoints {
    rx: VecDeque<Vec<u8>>,
    tx: Vec<Vec<u8>>,
    stalled_in: bool,
    stalled_out: bool,
}

impl BulkEndpoints for MockEndpoints {
    fn max_packet_size(&self) -> usize { PACKET_SIZE }

    fn read_packet(&mut self, buf: &mut [u8]) -> Result<usize, TransferError> {
        let packet = self.rx.pop_front().ok_or(TransferError::Failed)?;
        let n = packet.len().min(buf.len());
        buf[..n].copy_from_slice(&packet[..n]);
        Ok(n)
    }

    fn write_packet(&mut self, buf: &[u8]) -> Result<usize, TransferError> {
        self.tx.push(buf.to_vec());
        Ok(buf.len())
    }

    fn stall(&mut self, direction: Direction) {
        match direction {
            Direction::DeviceToHost => self.stalled_in = true,
            Direction::HostToDevice => self.stalled_out = true,
        }
    }
}

struct MemoryDisk {
    data: Vec<u8>,
    read_only: bool,
    /// The next this many reads fail
    failing_reads: usize,
    read_calls: usize,
    /// The next this many writes fail
    failing_writes: usize,
    write_calls: usize,
}

impl MemoryDisk {
    fn new() -> MemoryDisk {
        let data = (0..BLOCK_SIZE * BLOCK_COUNT as usize).map(|i| (i / BLOCK_SIZE) as u8 ^ i as u8).collect();
        MemoryDisk { data, read_only: false, failing_reads: 0, read_calls: 0, failing_writes: 0, write_calls: 0 }
    }

    fn range(&self, lba: u32, count: u32) -> Result<std::ops::Range<usize>, BlockDeviceError> {
        if lba + count > BLOCK_COUNT {
            return Err(BlockDeviceError::InvalidAddress);
        }
        Ok(lba as usize * BLOCK_SIZE..(lba + count) as usize * BLOCK_SIZE)
    }
}

impl BlockDevice for MemoryDisk {
    fn info(&self) -> BlockDeviceInfo {
        BlockDeviceInfo { block_size: BLOCK_SIZE as u32, block_count: BLOCK_COUNT }
    }

    fn read_blocks(&mut self, lba: u32, count: u32, buf: &mut [u8]) -> Result<(), BlockDeviceError> {
        self.read_calls += 1;
        if self.failing_reads > 0 {
            self.failing_reads -= 1;
            return Err(BlockDeviceError::ReadError);
        }
        let range = self.range(lba, count)?;
        buf.copy_from_slice(&self.data[range]);
        Ok(())
    }

    fn write_blocks(&mut self, lba: u32, count: u32, buf: &[u8]) -> Result<(), BlockDeviceError> {
        self.write_calls += 1;
        if self.failing_writes > 0 {
            self.failing_writes -= 1;
            return Err(BlockDeviceError::WriteError);
        }
        let range = self.range(lba, count)?;
        self.data[range].copy_from_slice(buf);
        Ok(())
    }

    fn read_only(&self) -> bool { self.read_only }
}

type TestScsi = Scsi<MockEndpoints, MemoryDisk>;

fn scsi() -> TestScsi {
    let _ = env_logger::builder().is_test(true).try_init();
    Scsi::new(MockEndpoints::default(), 0, MemoryDisk::new(), b"Acme", b"Flash Drive", b"0.1")
}

fn cbw(tag: u32, data_transfer_length: u32, direction: Direction, cdb: &[u8]) -> Vec<u8> {
    let mut command = [0u8; 16];
    command[..cdb.len()].copy_from_slice(cdb);
    CommandBlockWrapper {
        tag,
        data_transfer_length,
        direction,
        lun: 0,
        command_length: cdb.len() as u8,
        command,
    }
    .encode()
    .to_vec()
}

fn read10(lba: u32, count: u16) -> [u8; 10] {
    let l = lba.to_be_bytes();
    let c = count.to_be_bytes();
    [0x28, 0, l[0], l[1], l[2], l[3], 0, c[0], c[1], 0]
}

fn write10(lba: u32, count: u16) -> [u8; 10] {
    let mut cdb = read10(lba, count);
    cdb[0] = 0x2A;
    cdb
}

/// Queues `packets` for the device, runs one command and returns the data sent
/// before the CSW along with the CSW
fn run(scsi: &mut TestScsi, packets: Vec<Vec<u8>>) -> (Vec<u8>, CommandStatusWrapper) {
    let endpoints = scsi.transport_mut().endpoints_mut();
    endpoints.tx.clear();
    endpoints.rx.extend(packets);

    let csw = scsi.process_command().unwrap();
    let tx = &scsi.transport().endpoints().tx;
    let (last, data) = tx.split_last().unwrap();
    assert_eq!(CommandStatusWrapper::decode(last).unwrap(), csw);
    (data.concat(), csw)
}

fn request_sense(scsi: &mut TestScsi, tag: u32) -> (SenseKey, u8, u8) {
    let (data, csw) = run(scsi, vec![cbw(tag, 18, Direction::DeviceToHost, &[0x03, 0, 0, 0, 18, 0])]);
    assert_eq!(csw.status, CommandStatus::CommandOk);
    assert_eq!(data.len(), 18);
    let key = match data[2] {
        0x00 => SenseKey::NoSense,
        0x02 => SenseKey::NotReady,
        0x03 => SenseKey::MediumError,
        0x05 => SenseKey::IllegalRequest,
        0x07 => SenseKey::DataProtect,
        other => panic!("unexpected sense key {:02X}", other),
    };
    (key, data[12], data[13])
}

#[test]
fn test_inquiry() {
    let mut scsi = scsi();
    let (data, csw) = run(&mut scsi, vec![cbw(1, 36, Direction::DeviceToHost, &[0x12, 0, 0, 0, 36, 0])]);

    assert_eq!(data.len(), 36);
    assert_eq!(data[0], 0x00);
    assert_eq!(data[1], 0x80);
    assert_eq!(data[4], 31);
    assert_eq!(&data[8..16], b"Acme    ");
    assert_eq!(&data[16..32], b"Flash Drive     ");
    assert_eq!(&data[32..36], b"0.1 ");
    assert_eq!(csw, CommandStatusWrapper { tag: 1, data_residue: 0, status: CommandStatus::CommandOk });
    assert_eq!(scsi.state(), BotState::Idle);
}

#[test]
fn test_inquiry_cut_to_allocation_length() {
    let mut scsi = scsi();
    let (data, csw) = run(&mut scsi, vec![cbw(2, 36, Direction::DeviceToHost, &[0x12, 0, 0, 0, 5, 0])]);
    assert_eq!(data.len(), 5);
    assert_eq!(csw.data_residue, 31);
    assert_eq!(csw.status, CommandStatus::CommandOk);
    // the short packet ends the transfer
    assert!(!scsi.transport().endpoints().stalled_in);
}

#[test]
fn test_vital_product_data_rejected() {
    let mut scsi = scsi();
    let (data, csw) = run(&mut scsi, vec![cbw(3, 36, Direction::DeviceToHost, &[0x12, 1, 0x80, 0, 36, 0])]);
    assert!(data.is_empty());
    assert_eq!(csw.status, CommandStatus::CommandError);
    assert_eq!(csw.data_residue, 36);
    assert!(scsi.transport().endpoints().stalled_in);
    assert_eq!(request_sense(&mut scsi, 4), (SenseKey::IllegalRequest, 0x24, 0));
}

#[test]
fn test_unknown_op_codes() {
    let mut scsi = scsi();
    for (tag, op_code) in [(10, 0xFFu8), (11, 0x04)] {
        let (data, csw) = run(&mut scsi, vec![cbw(tag, 0, Direction::HostToDevice, &[op_code, 0, 0, 0, 0, 0])]);
        assert!(data.is_empty());
        assert_eq!(csw, CommandStatusWrapper { tag, data_residue: 0, status: CommandStatus::CommandError });
        assert!(!scsi.transport().endpoints().stalled_in && !scsi.transport().endpoints().stalled_out);
        assert_eq!(request_sense(&mut scsi, tag + 100), (SenseKey::IllegalRequest, 0x20, 0));
    }
    // reporting sense clears it
    assert_eq!(request_sense(&mut scsi, 200), (SenseKey::NoSense, 0, 0));
}

#[test]
fn test_read_capacity() {
    let mut scsi = scsi();
    let (data, csw) = run(&mut scsi, vec![cbw(5, 8, Direction::DeviceToHost, &[0x25, 0, 0, 0, 0, 0, 0, 0, 0, 0])]);
    assert_eq!(data, vec![0, 0, 0, 15, 0, 0, 2, 0]);
    assert_eq!(csw.status, CommandStatus::CommandOk);

    let (data, csw) = run(&mut scsi, vec![cbw(6, 252, Direction::DeviceToHost, &[0x23, 0, 0, 0, 0, 0, 0, 0, 252, 0])]);
    assert_eq!(data, vec![0, 0, 0, 8, 0, 0, 0, 16, 0x02, 0, 2, 0]);
    assert_eq!(csw.data_residue, 240);
}

#[test]
fn test_read_blocks() {
    let mut scsi = scsi();
    let (data, csw) = run(&mut scsi, vec![cbw(7, 1024, Direction::DeviceToHost, &read10(2, 2))]);
    assert_eq!(data, scsi.block_device().data[2 * BLOCK_SIZE..4 * BLOCK_SIZE].to_vec());
    assert_eq!(csw, CommandStatusWrapper { tag: 7, data_residue: 0, status: CommandStatus::CommandOk });
    // exactly the declared length in full packets, no ZLP
    assert_eq!(scsi.transport().endpoints().tx.len(), 1024 / PACKET_SIZE + 1);
}

#[test]
fn test_read_failure_reported_in_sense() {
    let mut scsi = scsi();
    scsi.block_device_mut().failing_reads = 2;
    let (data, csw) = run(&mut scsi, vec![cbw(8, 512, Direction::DeviceToHost, &read10(0, 1))]);

    assert!(data.is_empty());
    assert_eq!(csw, CommandStatusWrapper { tag: 8, data_residue: 512, status: CommandStatus::CommandError });
    assert!(scsi.transport().endpoints().stalled_in);
    // one retry
    assert_eq!(scsi.block_device().read_calls, 2);
    assert_eq!(
        scsi.sense(),
        crate::scsi::responses::SenseData::new(SenseKey::MediumError, AdditionalSenseCode::UnrecoveredReadError)
    );
    assert_eq!(request_sense(&mut scsi, 9), (SenseKey::MediumError, 0x11, 0));
}

#[test]
fn test_transient_read_failure_retried() {
    let mut scsi = scsi();
    scsi.block_device_mut().failing_reads = 1;
    let (data, csw) = run(&mut scsi, vec![cbw(12, 512, Direction::DeviceToHost, &read10(5, 1))]);
    assert_eq!(data, scsi.block_device().data[5 * BLOCK_SIZE..6 * BLOCK_SIZE].to_vec());
    assert_eq!(csw.status, CommandStatus::CommandOk);
    assert_eq!(scsi.block_device().read_calls, 2);
}

#[test]
fn test_write_then_read_back() {
    let mut scsi = scsi();
    let mut rng = ChaCha8Rng::seed_from_u64(0x5C51);
    let mut payload = vec![0u8; 2 * BLOCK_SIZE];
    rng.fill_bytes(&mut payload);

    let mut packets = vec![cbw(20, 1024, Direction::HostToDevice, &write10(3, 2))];
    packets.extend(payload.chunks(PACKET_SIZE).map(|c| c.to_vec()));
    let (data, csw) = run(&mut scsi, packets);
    assert!(data.is_empty());
    assert_eq!(csw, CommandStatusWrapper { tag: 20, data_residue: 0, status: CommandStatus::CommandOk });
    assert_eq!(&scsi.block_device().data[3 * BLOCK_SIZE..5 * BLOCK_SIZE], &payload[..]);

    let (data, csw) = run(&mut scsi, vec![cbw(21, 1024, Direction::DeviceToHost, &read10(3, 2))]);
    assert_eq!(data, payload);
    assert_eq!(csw.status, CommandStatus::CommandOk);
}

#[test]
fn test_host_ends_write_early() {
    let mut scsi = scsi();
    let mut packets = vec![cbw(22, 512, Direction::HostToDevice, &write10(0, 1))];
    packets.extend((0..3).map(|_| vec![0xAA; PACKET_SIZE]));
    packets.push(vec![0xAA; 10]);
    let (_, csw) = run(&mut scsi, packets);
    assert_eq!(csw, CommandStatusWrapper { tag: 22, data_residue: 512, status: CommandStatus::PhaseError });
    assert!(scsi.transport().endpoints().stalled_out);
}

#[test]
fn test_lba_out_of_range() {
    let mut scsi = scsi();
    let (data, csw) = run(&mut scsi, vec![cbw(30, 1024, Direction::DeviceToHost, &read10(BLOCK_COUNT - 1, 2))]);
    assert!(data.is_empty());
    assert_eq!(csw, CommandStatusWrapper { tag: 30, data_residue: 1024, status: CommandStatus::CommandError });
    assert_eq!(scsi.block_device().read_calls, 0);
    assert_eq!(request_sense(&mut scsi, 31), (SenseKey::IllegalRequest, 0x21, 0));

    // the last block itself is fine
    let (data, csw) = run(&mut scsi, vec![cbw(32, 512, Direction::DeviceToHost, &read10(BLOCK_COUNT - 1, 1))]);
    assert_eq!(data.len(), 512);
    assert_eq!(csw.status, CommandStatus::CommandOk);
}

#[test]
fn test_eject_and_reinsert() {
    let mut scsi = scsi();
    // START STOP UNIT, LoEj set, Start clear
    let (_, csw) = run(&mut scsi, vec![cbw(40, 0, Direction::HostToDevice, &[0x1B, 0, 0, 0, 0x02, 0])]);
    assert_eq!(csw.status, CommandStatus::CommandOk);
    assert_eq!(scsi.state(), BotState::Ejected);
    assert!(!scsi.medium_present());

    let (_, csw) = run(&mut scsi, vec![cbw(41, 0, Direction::HostToDevice, &[0x00, 0, 0, 0, 0, 0])]);
    assert_eq!(csw.status, CommandStatus::CommandError);
    assert_eq!(request_sense(&mut scsi, 42), (SenseKey::NotReady, 0x3A, 0));
    // still ejected, so sense keeps saying so
    assert_eq!(request_sense(&mut scsi, 43), (SenseKey::NotReady, 0x3A, 0));

    let (data, csw) = run(&mut scsi, vec![cbw(44, 36, Direction::DeviceToHost, &[0x12, 0, 0, 0, 36, 0])]);
    assert_eq!(data.len(), 36);
    assert_eq!(csw.status, CommandStatus::CommandOk);

    // a reset doesn't bring the medium back
    scsi.reset();
    assert_eq!(scsi.state(), BotState::BotReset);
    assert!(!scsi.medium_present());

    scsi.medium_inserted();
    assert!(scsi.medium_present());
    let (_, csw) = run(&mut scsi, vec![cbw(45, 0, Direction::HostToDevice, &[0x00, 0, 0, 0, 0, 0])]);
    assert_eq!(csw.status, CommandStatus::CommandOk);
    assert_eq!(scsi.state(), BotState::Idle);
}

#[test]
fn test_mode_sense_reports_write_protect() {
    let mut scsi = scsi();
    let (data, csw) = run(&mut scsi, vec![cbw(50, 192, Direction::DeviceToHost, &[0x1A, 0, 0x3F, 0, 192, 0])]);
    assert_eq!(data, vec![3, 0, 0x00, 0]);
    assert_eq!(csw.data_residue, 188);

    scsi.block_device_mut().read_only = true;
    let (data, _) = run(&mut scsi, vec![cbw(51, 192, Direction::DeviceToHost, &[0x1A, 0, 0x3F, 0, 192, 0])]);
    assert_eq!(data, vec![3, 0, 0x80, 0]);

    let (data, csw) = run(
        &mut scsi,
        vec![cbw(52, 8, Direction::DeviceToHost, &[0x5A, 0, 0x3F, 0, 0, 0, 0, 0, 8, 0])],
    );
    assert_eq!(data.len(), 8);
    assert_eq!(data[3], 0x80);
    assert_eq!(csw.data_residue, 0);
}

#[test]
fn test_write_protected() {
    let mut scsi = scsi();
    scsi.block_device_mut().read_only = true;
    let (_, csw) = run(&mut scsi, vec![cbw(60, 512, Direction::HostToDevice, &write10(0, 1))]);
    assert_eq!(csw, CommandStatusWrapper { tag: 60, data_residue: 512, status: CommandStatus::CommandError });
    assert!(scsi.transport().endpoints().stalled_out);
    assert_eq!(request_sense(&mut scsi, 61), (SenseKey::DataProtect, 0x27, 0));
}

#[test]
fn test_phase_errors() {
    let mut scsi = scsi();
    // device wants to send a block, host declared nothing
    let (data, csw) = run(&mut scsi, vec![cbw(70, 0, Direction::DeviceToHost, &read10(0, 1))]);
    assert!(data.is_empty());
    assert_eq!(csw, CommandStatusWrapper { tag: 70, data_residue: 0, status: CommandStatus::PhaseError });
    assert!(!scsi.transport().endpoints().stalled_in);

    // wrong direction
    let (data, csw) = run(&mut scsi, vec![cbw(71, 36, Direction::HostToDevice, &[0x12, 0, 0, 0, 36, 0])]);
    assert!(data.is_empty());
    assert_eq!(csw, CommandStatusWrapper { tag: 71, data_residue: 36, status: CommandStatus::PhaseError });
    assert!(scsi.transport().endpoints().stalled_out);
    assert_eq!(scsi.state(), BotState::Idle);
}

#[test]
fn test_zero_length_transfers() {
    let mut scsi = scsi();
    let (_, csw) = run(&mut scsi, vec![cbw(80, 0, Direction::DeviceToHost, &read10(0, 0))]);
    assert_eq!(csw.status, CommandStatus::CommandOk);
    let (_, csw) = run(&mut scsi, vec![cbw(81, 0, Direction::DeviceToHost, &[0x12, 0, 0, 0, 0, 0])]);
    assert_eq!(csw.status, CommandStatus::CommandOk);
    for (tag, cdb) in [
        (82u32, &[0x1Au8, 0, 0x3F, 0, 0, 0][..]),
        (83, &[0x5A, 0, 0x3F, 0, 0, 0, 0, 0, 0, 0][..]),
        (84, &[0x23, 0, 0, 0, 0, 0, 0, 0, 0, 0][..]),
    ] {
        let (data, csw) = run(&mut scsi, vec![cbw(tag, 0, Direction::DeviceToHost, cdb)]);
        assert!(data.is_empty());
        assert_eq!(csw, CommandStatusWrapper { tag, data_residue: 0, status: CommandStatus::CommandOk });
    }
}

#[test]
fn test_empty_request_sense_clears_sense() {
    let mut scsi = scsi();
    let (_, csw) = run(&mut scsi, vec![cbw(85, 0, Direction::HostToDevice, &[0xFF, 0, 0, 0, 0, 0])]);
    assert_eq!(csw.status, CommandStatus::CommandError);

    let (data, csw) = run(&mut scsi, vec![cbw(86, 0, Direction::DeviceToHost, &[0x03, 0, 0, 0, 0, 0])]);
    assert!(data.is_empty());
    assert_eq!(csw, CommandStatusWrapper { tag: 86, data_residue: 0, status: CommandStatus::CommandOk });
    assert_eq!(request_sense(&mut scsi, 87), (SenseKey::NoSense, 0, 0));

    // host allocated room but the CDB asked for nothing
    let (data, csw) = run(&mut scsi, vec![cbw(88, 18, Direction::DeviceToHost, &[0x12, 0, 0, 0, 0, 0])]);
    assert!(data.is_empty());
    assert_eq!(csw, CommandStatusWrapper { tag: 88, data_residue: 18, status: CommandStatus::CommandOk });
    assert!(scsi.transport().endpoints().stalled_in);
}

#[test]
fn test_write_failure_reported_in_sense() {
    let mut scsi = scsi();
    scsi.block_device_mut().failing_writes = 2;
    let before = scsi.block_device().data.clone();

    let mut packets = vec![cbw(23, 1024, Direction::HostToDevice, &write10(0, 2))];
    packets.extend((0..1024 / PACKET_SIZE).map(|_| vec![0x55; PACKET_SIZE]));
    let (data, csw) = run(&mut scsi, packets);

    assert!(data.is_empty());
    // the first block was taken, the second never was
    assert_eq!(csw, CommandStatusWrapper { tag: 23, data_residue: 512, status: CommandStatus::CommandError });
    assert!(scsi.transport().endpoints().stalled_out);
    assert!(!scsi.transport().endpoints().stalled_in);
    // one retry, then give up on the command
    assert_eq!(scsi.block_device().write_calls, 2);
    assert_eq!(scsi.block_device().data, before);
    assert_eq!(request_sense(&mut scsi, 24), (SenseKey::MediumError, 0x0C, 0));
}

#[test]
fn test_transient_write_failure_retried() {
    let mut scsi = scsi();
    scsi.block_device_mut().failing_writes = 1;
    let mut packets = vec![cbw(25, 512, Direction::HostToDevice, &write10(4, 1))];
    packets.extend((0..512 / PACKET_SIZE).map(|_| vec![0x66; PACKET_SIZE]));
    let (_, csw) = run(&mut scsi, packets);

    assert_eq!(csw, CommandStatusWrapper { tag: 25, data_residue: 0, status: CommandStatus::CommandOk });
    assert_eq!(scsi.block_device().write_calls, 2);
    assert!(scsi.block_device().data[4 * BLOCK_SIZE..5 * BLOCK_SIZE].iter().all(|&b| b == 0x66));
}

#[test]
fn test_insert_while_present_keeps_sense() {
    let mut scsi = scsi();
    let (_, csw) = run(&mut scsi, vec![cbw(46, 0, Direction::HostToDevice, &[0xFF, 0, 0, 0, 0, 0])]);
    assert_eq!(csw.status, CommandStatus::CommandError);

    scsi.medium_inserted();
    assert!(scsi.medium_present());
    assert_eq!(request_sense(&mut scsi, 47), (SenseKey::IllegalRequest, 0x20, 0));

    // a real insert after an eject starts from clean sense
    scsi.medium_ejected();
    let (_, csw) = run(&mut scsi, vec![cbw(48, 0, Direction::HostToDevice, &[0x00, 0, 0, 0, 0, 0])]);
    assert_eq!(csw.status, CommandStatus::CommandError);
    scsi.medium_inserted();
    assert_eq!(request_sense(&mut scsi, 49), (SenseKey::NoSense, 0, 0));
}

#[test]
fn test_activity_callback() {
    let mut scsi = scsi();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let log = seen.clone();
    scsi.set_activity_callback(Some(Box::new(move |active| log.lock().unwrap().push(active))));

    run(&mut scsi, vec![cbw(90, 512, Direction::DeviceToHost, &read10(0, 1))]);
    run(&mut scsi, vec![cbw(91, 0, Direction::HostToDevice, &[0x00, 0, 0, 0, 0, 0])]);
    scsi.block_device_mut().failing_reads = 2;
    run(&mut scsi, vec![cbw(92, 512, Direction::DeviceToHost, &read10(0, 1))]);

    assert_eq!(*seen.lock().unwrap(), vec![true, false, true, false]);
}

#[test]
fn test_bad_envelope_gets_no_status() {
    let mut scsi = scsi();
    let mut packet = cbw(100, 0, Direction::HostToDevice, &[0x00, 0, 0, 0, 0, 0]);
    packet.truncate(30);
    scsi.transport_mut().endpoints_mut().rx.push_back(packet);

    assert_eq!(
        scsi.process_command(),
        Err(Error::BulkOnlyTransportError(BulkOnlyTransportError::MalformedEnvelope(Malformed::Length(30))))
    );
    assert!(scsi.transport().endpoints().tx.is_empty());
    assert_eq!(scsi.state(), BotState::BotReset);
}
