//! Finding the controllers among the serial ports.

use crate::DeviceError;
use serialport::{SerialPortInfo, SerialPortType};

/// A serial port and, for USB devices, its identity strings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PortInfo {
    pub path: String,
    pub serial_number: Option<String>,
    pub product: Option<String>,
}

impl From<SerialPortInfo> for PortInfo {
    fn from(info: SerialPortInfo) -> Self {
        let (serial_number, product) = match info.port_type {
            SerialPortType::UsbPort(usb) => (usb.serial_number, usb.product),
            _ => (None, None),
        };
        Self {
            path: info.port_name,
            serial_number,
            product,
        }
    }
}

pub fn list_ports() -> Result<Vec<PortInfo>, DeviceError> {
    Ok(serialport::available_ports()?
        .into_iter()
        .map(PortInfo::from)
        .collect())
}

/// Port whose USB serial number equals `serial_number`, ignoring case.
pub fn find_port<'a>(ports: &'a [PortInfo], serial_number: &str) -> Option<&'a PortInfo> {
    ports.iter().find(|p| {
        p.serial_number
            .as_deref()
            .is_some_and(|s| s.eq_ignore_ascii_case(serial_number))
    })
}

/// Like [`find_port`] but failing with [`DeviceError::DeviceNotFound`].
pub fn locate<'a>(
    ports: &'a [PortInfo],
    controller: &'static str,
    serial_number: &str,
) -> Result<&'a PortInfo, DeviceError> {
    find_port(ports, serial_number).ok_or_else(|| DeviceError::DeviceNotFound {
        controller,
        serial_number: serial_number.to_string(),
    })
}
