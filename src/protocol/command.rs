//! Inbound command frame parsing.
//!
//! Parsing is strict but quiet: anything that fails validation turns into a
//! [`FrameError`] that the controller logs at debug level and swallows. Range
//! checks on parameter *values* (report mode, action mode) are deliberately not
//! done here — an out-of-range set is still a valid frame and must produce a
//! get-style echo of the unchanged state.

use super::{verify_checksum, CommandId, FrameError, FRAME_LEN};

/// A validated, decoded command from the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostCommand {
    SetPollRate(u16),
    GetPollRate,
    SetReportMode(u8),
    GetReportMode,
    SetThreshold(i16),
    GetThreshold,
    SetAction { mode: u8, code: u8 },
    GetAction,
    /// Carries the inbound param bytes so the response can echo them back.
    ManualTrigger([u8; 2]),
}

impl HostCommand {
    /// Decodes one 16-byte frame.
    ///
    /// A frame is accepted only if it is exactly [`FRAME_LEN`] bytes, its
    /// command byte is in the host-to-device allow-list, and its trailing
    /// checksum matches.
    pub fn parse(frame: &[u8]) -> Result<Self, FrameError> {
        let frame: &[u8; FRAME_LEN] = frame
            .try_into()
            .map_err(|_| FrameError::Truncated(frame.len()))?;

        let id = CommandId::try_from(frame[0])?;
        if !id.host_to_device() {
            return Err(FrameError::UnknownCommand(frame[0]));
        }
        verify_checksum(frame)?;

        let params = [frame[1], frame[2]];
        Ok(match id {
            CommandId::SetPollRate => {
                HostCommand::SetPollRate(u16::from_le_bytes(params))
            }
            CommandId::GetPollRate => HostCommand::GetPollRate,
            CommandId::SetReportMode => HostCommand::SetReportMode(params[0]),
            CommandId::GetReportMode => HostCommand::GetReportMode,
            CommandId::SetThreshold => {
                HostCommand::SetThreshold(i16::from_le_bytes(params))
            }
            CommandId::GetThreshold => HostCommand::GetThreshold,
            CommandId::SetAction => HostCommand::SetAction {
                mode: params[0],
                code: params[1],
            },
            CommandId::GetAction => HostCommand::GetAction,
            CommandId::ManualTrigger => HostCommand::ManualTrigger(params),
            // excluded by the host_to_device() check above
            CommandId::ReportRaw | CommandId::ReportSummary => unreachable!(),
        })
    }

    /// The wire id this command arrived under; responses echo it unchanged.
    pub fn id(&self) -> CommandId {
        match self {
            HostCommand::SetPollRate(_) => CommandId::SetPollRate,
            HostCommand::GetPollRate => CommandId::GetPollRate,
            HostCommand::SetReportMode(_) => CommandId::SetReportMode,
            HostCommand::GetReportMode => CommandId::GetReportMode,
            HostCommand::SetThreshold(_) => CommandId::SetThreshold,
            HostCommand::GetThreshold => CommandId::GetThreshold,
            HostCommand::SetAction { .. } => CommandId::SetAction,
            HostCommand::GetAction => CommandId::GetAction,
            HostCommand::ManualTrigger(_) => CommandId::ManualTrigger,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::seal;

    fn frame(id: CommandId, p1: u8, p2: u8) -> [u8; FRAME_LEN] {
        let mut frame = [0u8; FRAME_LEN];
        frame[0] = id as u8;
        frame[1] = p1;
        frame[2] = p2;
        seal(&mut frame);
        frame
    }

    #[test]
    fn set_poll_rate_decodes_little_endian() {
        let parsed = HostCommand::parse(&frame(CommandId::SetPollRate, 0xF4, 0x01)).unwrap();
        assert_eq!(parsed, HostCommand::SetPollRate(500));
    }

    #[test]
    fn set_threshold_decodes_negative_values() {
        let bytes = (-200i16).to_le_bytes();
        let parsed =
            HostCommand::parse(&frame(CommandId::SetThreshold, bytes[0], bytes[1])).unwrap();
        assert_eq!(parsed, HostCommand::SetThreshold(-200));
    }

    #[test]
    fn manual_trigger_keeps_param_bytes_for_echo() {
        let parsed = HostCommand::parse(&frame(CommandId::ManualTrigger, 0xAB, 0xCD)).unwrap();
        assert_eq!(parsed, HostCommand::ManualTrigger([0xAB, 0xCD]));
    }

    #[test]
    fn corrupted_checksum_is_rejected() {
        let mut bad = frame(CommandId::SetReportMode, 1, 0);
        bad[FRAME_LEN - 1] ^= 0xFF;
        assert!(matches!(
            HostCommand::parse(&bad),
            Err(FrameError::ChecksumMismatch { .. })
        ));
    }

    #[test]
    fn report_ids_are_rejected_even_with_valid_checksum() {
        let bad = frame(CommandId::ReportRaw, 0, 0);
        assert_eq!(
            HostCommand::parse(&bad),
            Err(FrameError::UnknownCommand(0x41))
        );
    }

    #[test]
    fn short_slice_is_rejected() {
        assert_eq!(HostCommand::parse(&[0x01, 0x00]), Err(FrameError::Truncated(2)));
    }
}
