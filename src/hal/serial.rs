//! Serial byte transport for the command/report protocol.

use std::io::{Read, Write};
use std::time::Duration;

use serialport::SerialPort;
use tracing::info;

use super::{FrameTransport, HalError};

/// Read timeout on the underlying port. The controller only calls
/// `read_exact` once `bytes_available` reports a full frame, so this is a
/// safety net rather than a pacing mechanism.
const READ_TIMEOUT: Duration = Duration::from_millis(5);

pub struct SerialTransport {
    port: Box<dyn SerialPort>,
}

impl SerialTransport {
    pub fn open(path: &str, baud: u32) -> Result<Self, HalError> {
        let port = serialport::new(path, baud)
            .timeout(READ_TIMEOUT)
            .open()
            .map_err(|e| HalError::Transport(format!("{path}: {e}")))?;
        info!("serial transport open on {path} at {baud} Bd");
        Ok(Self { port })
    }

    /// Opens the first enumerable port. Used when the config names none.
    pub fn open_first(baud: u32) -> Result<Self, HalError> {
        let ports = serialport::available_ports()
            .map_err(|e| HalError::Transport(e.to_string()))?;
        let first = ports
            .first()
            .ok_or_else(|| HalError::Transport("no serial ports found".into()))?;
        Self::open(&first.port_name, baud)
    }
}

impl FrameTransport for SerialTransport {
    fn bytes_available(&mut self) -> Result<usize, HalError> {
        self.port
            .bytes_to_read()
            .map(|n| n as usize)
            .map_err(|e| HalError::Transport(e.to_string()))
    }

    fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), HalError> {
        self.port
            .read_exact(buf)
            .map_err(|e| HalError::Transport(e.to_string()))
    }

    fn write_all(&mut self, buf: &[u8]) -> Result<(), HalError> {
        self.port
            .write_all(buf)
            .and_then(|()| self.port.flush())
            .map_err(|e| HalError::Transport(e.to_string()))
    }
}
