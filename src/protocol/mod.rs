//! Wire protocol shared by both directions of the serial link.
//!
//! Every unit on the wire is a fixed 16-byte frame: one command byte, a
//! command-specific payload in little-endian byte order, zero padding, and a
//! trailing checksum byte (sum of the first 15 bytes, modulo 256). Commands
//! below 0x20 mutate device state, their 0x2x twins read it back, and the 0x4x
//! range is reserved for device-to-host reports.

pub mod command;
pub mod report;

pub use command::HostCommand;

/// Fixed size of every frame in both directions.
pub const FRAME_LEN: usize = 16;

/// Errors raised while validating an inbound frame.
///
/// None of these reach the host: a frame that fails validation is dropped
/// without a reply and the host is expected to time out and retry.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FrameError {
    #[error("frame too short: got {0} bytes, need {FRAME_LEN}")]
    Truncated(usize),

    #[error("unrecognized command byte 0x{0:02x}")]
    UnknownCommand(u8),

    #[error("checksum mismatch: expected 0x{expected:02x}, found 0x{found:02x}")]
    ChecksumMismatch { expected: u8, found: u8 },
}

/// Command bytes understood on the wire.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandId {
    SetPollRate = 0x01,
    SetReportMode = 0x02,
    SetThreshold = 0x03,
    SetAction = 0x04,
    ManualTrigger = 0x1F,
    GetPollRate = 0x21,
    GetReportMode = 0x22,
    GetThreshold = 0x23,
    GetAction = 0x24,
    ReportRaw = 0x41,
    ReportSummary = 0x42,
}

impl CommandId {
    /// Whether the host is allowed to send this command to the device.
    /// Report ids are outbound-only.
    pub fn host_to_device(self) -> bool {
        !matches!(self, CommandId::ReportRaw | CommandId::ReportSummary)
    }
}

impl TryFrom<u8> for CommandId {
    type Error = FrameError;

    fn try_from(byte: u8) -> Result<Self, Self::Error> {
        match byte {
            0x01 => Ok(CommandId::SetPollRate),
            0x02 => Ok(CommandId::SetReportMode),
            0x03 => Ok(CommandId::SetThreshold),
            0x04 => Ok(CommandId::SetAction),
            0x1F => Ok(CommandId::ManualTrigger),
            0x21 => Ok(CommandId::GetPollRate),
            0x22 => Ok(CommandId::GetReportMode),
            0x23 => Ok(CommandId::GetThreshold),
            0x24 => Ok(CommandId::GetAction),
            0x41 => Ok(CommandId::ReportRaw),
            0x42 => Ok(CommandId::ReportSummary),
            other => Err(FrameError::UnknownCommand(other)),
        }
    }
}

/// Additive checksum over a byte slice, modulo 256.
pub fn checksum(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0u8, |acc, &b| acc.wrapping_add(b))
}

/// Computes the checksum over bytes 0..15 and writes it into byte 15.
pub fn seal(frame: &mut [u8; FRAME_LEN]) {
    frame[FRAME_LEN - 1] = checksum(&frame[..FRAME_LEN - 1]);
}

/// Validates the trailing checksum of a full frame.
pub fn verify_checksum(frame: &[u8; FRAME_LEN]) -> Result<(), FrameError> {
    let expected = checksum(&frame[..FRAME_LEN - 1]);
    let found = frame[FRAME_LEN - 1];
    if expected == found {
        Ok(())
    } else {
        Err(FrameError::ChecksumMismatch { expected, found })
    }
}
