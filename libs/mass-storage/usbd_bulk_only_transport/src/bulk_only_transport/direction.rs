// Vendored from https://github.com/stm32-rs/stm32-usbd tag v0.6.0
// Original copyright (c) 2021 Matti Virkkunen <mvirkkunen@gmail.com>, Vadim Kaushan <admin@disasm.info>,
// Nicolas Stalder <n@stalder.io>", Jonas Martin <lichtfeind@gmail.com>
// SPDX-License-Identifier: MIT
// SPDX-LIcense-Identifier: Apache 2.0

/// The direction of a data transfer
#[derive(Clone, Copy, Eq, PartialEq, Debug, num_derive::FromPrimitive, num_derive::ToPrimitive)]
pub enum Direction {
    /// Host to device, OUT in USB parlance
    HostToDevice = 0x00,
    /// Device to host, IN in USB parlance
    DeviceToHost = 0x80,
}

impl Direction {
    const FLAG_MASK: u8 = 0x80;

    /// Only bit 7 of the CBW flags byte carries meaning, the rest is reserved
    pub fn from_flags(flags: u8) -> Direction {
        if flags & Self::FLAG_MASK != 0 {
            Direction::DeviceToHost
        } else {
            Direction::HostToDevice
        }
    }

    pub fn flags(self) -> u8 { self as u8 }
}

/// What the command set intends to do in the data phase of a command
#[derive(Clone, Copy, Eq, PartialEq, Debug)]
pub enum DataPlan {
    NoData,
    /// Device sends this many bytes on bulk IN
    DeviceToHost(u32),
    /// Device expects this many bytes on bulk OUT
    HostToDevice(u32),
}

impl DataPlan {
    pub fn len(&self) -> u32 {
        match *self {
            DataPlan::NoData => 0,
            DataPlan::DeviceToHost(n) | DataPlan::HostToDevice(n) => n,
        }
    }

    pub fn direction(&self) -> Option<Direction> {
        match self {
            DataPlan::NoData => None,
            DataPlan::DeviceToHost(_) => Some(Direction::DeviceToHost),
            DataPlan::HostToDevice(_) => Some(Direction::HostToDevice),
        }
    }
}

#[test]
fn test_direction_from_flags() {
    assert_eq!(Direction::from_flags(0x80), Direction::DeviceToHost);
    assert_eq!(Direction::from_flags(0xFF), Direction::DeviceToHost);
    assert_eq!(Direction::from_flags(0x7F), Direction::HostToDevice);
    assert_eq!(Direction::DeviceToHost.flags(), 0x80);
}
