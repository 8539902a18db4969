//! Byte transport to one controller.

use crate::DeviceError;
use serialport::SerialPort;
use std::io::{self, Read, Write};
use std::thread;
use std::time::Duration;

/// Raw byte pipe to a controller.
pub trait Link: Send {
    fn write_bytes(&mut self, bytes: &[u8]) -> io::Result<()>;
    fn flush(&mut self) -> io::Result<()>;
    /// Everything received since the last call, without blocking.
    fn read_available(&mut self) -> io::Result<Vec<u8>>;
}

/// USB serial connection to an Arduino.
pub struct SerialLink {
    port: Box<dyn SerialPort>,
}

impl SerialLink {
    pub fn open(path: &str, baud_rate: u32) -> Result<Self, DeviceError> {
        let port = serialport::new(path, baud_rate)
            .timeout(Duration::from_millis(10))
            .open()?;
        log::info!("opened {path} at {baud_rate} baud");
        Ok(Self { port })
    }

    pub fn name(&self) -> Option<String> {
        self.port.name()
    }
}

impl Link for SerialLink {
    fn write_bytes(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.port.write_all(bytes)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.port.flush()
    }

    fn read_available(&mut self) -> io::Result<Vec<u8>> {
        let pending = self.port.bytes_to_read()? as usize;
        let mut buf = vec![0u8; pending];
        if pending > 0 {
            self.port.read_exact(&mut buf)?;
        }
        Ok(buf)
    }
}

/// Command/status framing on top of a [`Link`].
pub struct Controller<L> {
    name: &'static str,
    link: L,
}

impl<L: Link> Controller<L> {
    pub fn new(name: &'static str, link: L) -> Self {
        Self { name, link }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn link(&self) -> &L {
        &self.link
    }

    /// Send `value` as decimal text plus newline, flush, then yield.
    pub fn write_command(&mut self, value: u32) -> Result<(), DeviceError> {
        log::trace!("{} <- {value}", self.name);
        self.link.write_bytes(format!("{value}\n").as_bytes())?;
        self.link.flush()?;
        thread::yield_now();
        Ok(())
    }

    /// Status bytes received since the last read, zero bytes removed.
    pub fn read_status(&mut self) -> Result<Vec<u8>, DeviceError> {
        let mut bytes = self.link.read_available()?;
        bytes.retain(|b| *b != 0);
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    #[derive(Default)]
    struct Loopback {
        written: Vec<u8>,
        flushes: usize,
        inbound: VecDeque<Vec<u8>>,
    }

    impl Link for Loopback {
        fn write_bytes(&mut self, bytes: &[u8]) -> io::Result<()> {
            self.written.extend_from_slice(bytes);
            Ok(())
        }

        fn flush(&mut self) -> io::Result<()> {
            self.flushes += 1;
            Ok(())
        }

        fn read_available(&mut self) -> io::Result<Vec<u8>> {
            Ok(self.inbound.pop_front().unwrap_or_default())
        }
    }

    #[test]
    fn commands_are_decimal_lines() {
        let mut ctl = Controller::new("gantry", Loopback::default());
        ctl.write_command(70).expect("write");
        ctl.write_command(6).expect("write");
        assert_eq!(ctl.link().written, b"70\n6\n");
        assert_eq!(ctl.link().flushes, 2);
    }

    #[test]
    fn zero_bytes_are_dropped() {
        let mut link = Loopback::default();
        link.inbound.push_back(vec![0, 0x46, 0, 0, 0x12, 0]);
        let mut with_noise = Controller::new("board", link);

        let mut link = Loopback::default();
        link.inbound.push_back(vec![0x46, 0x12]);
        let mut clean = Controller::new("board", link);

        assert_eq!(
            with_noise.read_status().expect("read"),
            clean.read_status().expect("read")
        );
        assert!(with_noise.read_status().expect("read").is_empty());
    }
}
