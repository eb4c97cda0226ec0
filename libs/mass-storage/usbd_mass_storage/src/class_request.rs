//! Class-specific control requests of the bulk-only transport

use num_traits::FromPrimitive;
use usb_device::control::{Recipient, Request, RequestType};
use usb_device::UsbDirection;

use crate::logging::*;

/// Bulk-only class requests, keyed by `bRequest`
///
/// Section 3.1 and 3.2 [USB Bulk Only Transport Spec](https://www.usb.org/document-library/mass-storage-bulk-only-10)
#[derive(Clone, Copy, Eq, PartialEq, Debug, num_derive::FromPrimitive, num_derive::ToPrimitive)]
pub enum ClassRequest {
    /// Device answers with one byte: the highest LUN it serves
    GetMaxLun = 0xFE,
    /// Resets the transport and everything in flight; the host then clears both endpoint halts
    BulkOnlyReset = 0xFF,
}

impl ClassRequest {
    /// Recognizes a class request addressed to the mass storage interface `interface`.
    ///
    /// Requests for other interfaces, other request types and requests with malformed
    /// `wValue`/`wLength` come back as `None` so the USB stack can answer them itself.
    pub fn decode(req: &Request, interface: u16) -> Option<ClassRequest> {
        if req.request_type != RequestType::Class || req.recipient != Recipient::Interface || req.index != interface {
            return None;
        }
        let request = ClassRequest::from_u8(req.request)?;
        let well_formed = match request {
            ClassRequest::BulkOnlyReset => req.direction == UsbDirection::Out && req.value == 0 && req.length == 0,
            ClassRequest::GetMaxLun => req.direction == UsbDirection::In && req.value == 0 && req.length == 1,
        };
        if !well_formed {
            trace_usb_control!("USB_CONTROL> malformed {:?}: {:?}", request, req);
            return None;
        }
        trace_usb_control!("USB_CONTROL> {:?}", request);
        Some(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn class_request(direction: UsbDirection, request: u8, length: u16) -> Request {
        Request {
            direction,
            request_type: RequestType::Class,
            recipient: Recipient::Interface,
            request,
            value: 0,
            index: 0,
            length,
        }
    }

    #[test]
    fn test_decode_reset_and_max_lun() {
        let reset = class_request(UsbDirection::Out, 0xFF, 0);
        assert_eq!(ClassRequest::decode(&reset, 0), Some(ClassRequest::BulkOnlyReset));
        let max_lun = class_request(UsbDirection::In, 0xFE, 1);
        assert_eq!(ClassRequest::decode(&max_lun, 0), Some(ClassRequest::GetMaxLun));
    }

    #[test]
    fn test_other_interface_not_handled() {
        let reset = class_request(UsbDirection::Out, 0xFF, 0);
        assert_eq!(ClassRequest::decode(&reset, 1), None);
    }

    #[test]
    fn test_malformed_fields_rejected() {
        let mut reset = class_request(UsbDirection::Out, 0xFF, 0);
        reset.value = 1;
        assert_eq!(ClassRequest::decode(&reset, 0), None);

        let long_max_lun = class_request(UsbDirection::In, 0xFE, 2);
        assert_eq!(ClassRequest::decode(&long_max_lun, 0), None);

        let wrong_direction = class_request(UsbDirection::Out, 0xFE, 1);
        assert_eq!(ClassRequest::decode(&wrong_direction, 0), None);

        let mut standard = class_request(UsbDirection::Out, 0xFF, 0);
        standard.request_type = RequestType::Standard;
        assert_eq!(ClassRequest::decode(&standard, 0), None);

        let unknown = class_request(UsbDirection::In, 0x01, 1);
        assert_eq!(ClassRequest::decode(&unknown, 0), None);
    }
}
