// Vendored from https://github.com/stm32-rs/stm32-usbd tag v0.6.0
// Original copyright (c) 2021 Matti Virkkunen <mvirkkunen@gmail.com>, Vadim Kaushan <admin@disasm.info>,
// Nicolas Stalder <n@stalder.io>", Jonas Martin <lichtfeind@gmail.com>
// SPDX-License-Identifier: MIT
// SPDX-LIcense-Identifier: Apache 2.0

/// This should be used as the interface class of a mass storage interface
///
/// Section 4.3 [USB Bulk Only Transport Spec](https://www.usb.org/document-library/mass-storage-bulk-only-10)
pub const USB_CLASS_MSC: u8 = 0x08;

const DESCRIPTOR_TYPE_INTERFACE: u8 = 0x04;
const DESCRIPTOR_TYPE_ENDPOINT: u8 = 0x05;
const INTERFACE_DESCRIPTOR_LEN: u8 = 9;
const ENDPOINT_DESCRIPTOR_LEN: u8 = 7;
const ENDPOINT_ATTRIBUTES_BULK: u8 = 0x02;
const ENDPOINT_ADDRESS_IN: u8 = 0x80;

/// Length of the block produced by [`MscInterface::descriptor`]: one interface and two endpoints
pub const MSC_DESCRIPTOR_BYTES: usize = (INTERFACE_DESCRIPTOR_LEN + 2 * ENDPOINT_DESCRIPTOR_LEN) as usize;

/// This specifies the subclass of the USB interface
///
/// Section 2 [USB Mass Storage Class Overview](https://www.usb.org/document-library/mass-storage-class-specification-overview-14)
#[derive(Clone, Copy, Eq, PartialEq, Debug, num_derive::FromPrimitive, num_derive::ToPrimitive)]
pub enum InterfaceSubclass {
    /// SCSI command set not reported. De facto use
    ScsiCommandSetNotReported = 0x00,
    /// Allocated by USB-IF for RBC
    Rbc = 0x01,
    /// Specifies how to interface Floppy Disk Drives to USB
    Ufi = 0x04,
    /// SCSI transparent command set, the only one the emulator speaks
    ScsiTransparentCommandSet = 0x06,
    /// Specific to device vendor. De facto use
    VendorSpecific = 0xFF,
}

/// This specifies the protocol of the USB interface
///
/// Section 3 [USB Mass Storage Class Overview](https://www.usb.org/document-library/mass-storage-class-specification-overview-14)
#[derive(Clone, Copy, Eq, PartialEq, Debug, num_derive::FromPrimitive, num_derive::ToPrimitive)]
pub enum InterfaceProtocol {
    /// Control/Bulk/Interrupt transport with command completion interrupt
    CbiWithCCInterrupt = 0x00,
    /// Control/Bulk/Interrupt transport without command completion interrupt
    CbiNoCCInterrupt = 0x01,
    /// Bulk-Only (BBB) Transport
    BulkOnlyTransport = 0x50,
    /// Allocated by USB-IF for UAS
    Uas = 0x62,
}

/// # USB Mass Storage Class interface
///
/// Describes one bulk-only interface: one bulk IN and one bulk OUT endpoint sharing an
/// endpoint number. The USB stack splices [`descriptor`](MscInterface::descriptor) into
/// its configuration descriptor and routes class requests for `interface_number` to
/// [`ClassRequest::decode`](crate::ClassRequest::decode).
#[derive(Clone, Copy, Eq, PartialEq, Debug)]
pub struct MscInterface {
    pub interface_number: u8,
    pub bulk_endpoint: u8,
    pub max_packet_size: u16,
    pub subclass: InterfaceSubclass,
    pub protocol: InterfaceProtocol,
}

impl MscInterface {
    pub fn new(interface_number: u8, bulk_endpoint: u8, max_packet_size: u16) -> MscInterface {
        MscInterface {
            interface_number,
            bulk_endpoint,
            max_packet_size,
            subclass: InterfaceSubclass::ScsiTransparentCommandSet,
            protocol: InterfaceProtocol::BulkOnlyTransport,
        }
    }

    pub fn in_address(&self) -> u8 { ENDPOINT_ADDRESS_IN | (self.bulk_endpoint & 0x0F) }

    pub fn out_address(&self) -> u8 { self.bulk_endpoint & 0x0F }

    /// Interface descriptor followed by the bulk IN and bulk OUT endpoint descriptors
    pub fn descriptor(&self) -> [u8; MSC_DESCRIPTOR_BYTES] {
        let mut d = [0u8; MSC_DESCRIPTOR_BYTES];
        d[0] = INTERFACE_DESCRIPTOR_LEN;
        d[1] = DESCRIPTOR_TYPE_INTERFACE;
        d[2] = self.interface_number;
        d[3] = 0; // alternate setting
        d[4] = 2; // endpoints
        d[5] = USB_CLASS_MSC;
        d[6] = self.subclass as u8;
        d[7] = self.protocol as u8;
        d[8] = 0; // no string
        let mps = self.max_packet_size.to_le_bytes();
        for (i, address) in [self.in_address(), self.out_address()].iter().enumerate() {
            let o = INTERFACE_DESCRIPTOR_LEN as usize + i * ENDPOINT_DESCRIPTOR_LEN as usize;
            d[o] = ENDPOINT_DESCRIPTOR_LEN;
            d[o + 1] = DESCRIPTOR_TYPE_ENDPOINT;
            d[o + 2] = *address;
            d[o + 3] = ENDPOINT_ATTRIBUTES_BULK;
            d[o + 4] = mps[0];
            d[o + 5] = mps[1];
            d[o + 6] = 0; // bulk endpoints ignore the interval
        }
        d
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptor_layout() {
        let d = MscInterface::new(1, 2, 64).descriptor();
        assert_eq!(&d[..9], &[9, 4, 1, 0, 2, 0x08, 0x06, 0x50, 0]);
        assert_eq!(&d[9..16], &[7, 5, 0x82, 2, 64, 0, 0]);
        assert_eq!(&d[16..23], &[7, 5, 0x02, 2, 64, 0, 0]);
    }

    #[test]
    fn test_high_speed_packet_size() {
        let d = MscInterface::new(0, 1, 512).descriptor();
        assert_eq!(d[13], 0x00);
        assert_eq!(d[14], 0x02);
        assert_eq!(&d[20..22], &[0x00, 0x02]);
    }
}
