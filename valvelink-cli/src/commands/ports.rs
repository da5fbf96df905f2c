//! Ports command - list serial devices the OS reports.

use serialport::{SerialPortInfo, SerialPortType};

use crate::error::CliError;

/// Run the ports command.
pub fn run() -> Result<(), CliError> {
    let ports = serialport::available_ports().map_err(CliError::PortList)?;

    if ports.is_empty() {
        println!("No serial ports found.");
        return Ok(());
    }

    for port in &ports {
        println!("{}", describe(port));
    }
    Ok(())
}

fn describe(port: &SerialPortInfo) -> String {
    match &port.port_type {
        SerialPortType::UsbPort(usb) => {
            let product = usb.product.as_deref().unwrap_or("USB device");
            format!(
                "{:<24} {} ({:04x}:{:04x})",
                port.port_name, product, usb.vid, usb.pid
            )
        }
        SerialPortType::BluetoothPort => format!("{:<24} Bluetooth", port.port_name),
        SerialPortType::PciPort => format!("{:<24} PCI", port.port_name),
        SerialPortType::Unknown => port.port_name.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serialport::UsbPortInfo;

    #[test]
    fn test_describe_usb_port() {
        let port = SerialPortInfo {
            port_name: "/dev/ttyACM0".to_string(),
            port_type: SerialPortType::UsbPort(UsbPortInfo {
                vid: 0x2341,
                pid: 0x0043,
                serial_number: None,
                manufacturer: None,
                product: Some("Arduino Uno".to_string()),
            }),
        };
        let line = describe(&port);
        assert!(line.starts_with("/dev/ttyACM0"));
        assert!(line.contains("Arduino Uno (2341:0043)"));
    }

    #[test]
    fn test_describe_unknown_port() {
        let port = SerialPortInfo {
            port_name: "COM3".to_string(),
            port_type: SerialPortType::Unknown,
        };
        assert_eq!(describe(&port), "COM3");
    }
}
