// Vendored from https://github.com/stm32-rs/stm32-usbd tag v0.6.0
// Original copyright (c) 2021 Matti Virkkunen <mvirkkunen@gmail.com>, Vadim Kaushan <admin@disasm.info>,
// Nicolas Stalder <n@stalder.io>", Jonas Martin <lichtfeind@gmail.com>
// SPDX-License-Identifier: MIT
// SPDX-LIcense-Identifier: Apache 2.0

//! CDB parsing. SCSI fields are big endian; each command names the byte
//! offsets it reads and refuses CDBs shorter than its fixed length.

use crate::scsi::Error;

mod command;
pub use command::*;

mod inquiry;
pub use inquiry::*;

mod mode_sense;
pub use mode_sense::*;

mod prevent_allow_medium_removal;
pub use prevent_allow_medium_removal::*;

mod read_capacity;
pub use read_capacity::*;

mod read_format_capacities;
pub use read_format_capacities::*;

mod read;
pub use read::*;

mod request_sense;
pub use request_sense::*;

mod send_diagnostic;
pub use send_diagnostic::*;

mod start_stop_unit;
pub use start_stop_unit::*;

mod synchronize_cache;
pub use synchronize_cache::*;

mod test_unit_ready;
pub use test_unit_ready::*;

mod verify;
pub use verify::*;

mod write;
pub use write::*;

pub(crate) fn check_length(cdb: &[u8], bytes: usize) -> Result<(), Error> {
    if cdb.len() < bytes {
        Err(Error::InsufficientDataForCommand)
    } else {
        Ok(())
    }
}

pub(crate) fn be_u16(cdb: &[u8], offset: usize) -> u16 {
    u16::from_be_bytes([cdb[offset], cdb[offset + 1]])
}

pub(crate) fn be_u32(cdb: &[u8], offset: usize) -> u32 {
    u32::from_be_bytes([cdb[offset], cdb[offset + 1], cdb[offset + 2], cdb[offset + 3]])
}
