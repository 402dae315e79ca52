//! Outbound frame encoding: command responses and sample/event reports.
//!
//! Raw and summary reports share one layout; a summary frame repurposes the
//! timestamp field for the measured latency and the brightness field for the
//! threshold at crossing time.
//!
//! ```text
//! [0]      command id
//! [1..9]   timestamp (raw) / latency in us (summary), u64 LE
//! [9..11]  brightness (raw) / crossing threshold (summary), u16 LE
//! [11]     trigger flag (raw) / constant 1 (summary)
//! [12..15] reserved, zero
//! [15]     checksum over bytes 0..15
//! ```

use super::{seal, CommandId, FRAME_LEN};

/// Builds the response to an accepted command: same id, result bytes in
/// positions 1..3, fresh checksum.
pub fn command_response(id: CommandId, result: [u8; 2]) -> [u8; FRAME_LEN] {
    let mut frame = [0u8; FRAME_LEN];
    frame[0] = id as u8;
    frame[1] = result[0];
    frame[2] = result[1];
    seal(&mut frame);
    frame
}

/// One raw sample: timestamp, brightness, and whether the trigger (real or
/// override-forced) is active this tick.
pub fn raw_report(timestamp_us: u64, brightness: u16, trigger_active: bool) -> [u8; FRAME_LEN] {
    encode(
        CommandId::ReportRaw,
        timestamp_us,
        brightness,
        u8::from(trigger_active),
    )
}

/// One latency event: microseconds between the trigger edge and the brightness
/// crossing, plus the threshold that was crossed.
pub fn summary_report(latency_us: u64, threshold: u16) -> [u8; FRAME_LEN] {
    encode(CommandId::ReportSummary, latency_us, threshold, 1)
}

fn encode(id: CommandId, wide: u64, narrow: u16, flag: u8) -> [u8; FRAME_LEN] {
    let mut frame = [0u8; FRAME_LEN];
    frame[0] = id as u8;
    frame[1..9].copy_from_slice(&wide.to_le_bytes());
    frame[9..11].copy_from_slice(&narrow.to_le_bytes());
    frame[11] = flag;
    seal(&mut frame);
    frame
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::verify_checksum;

    #[test]
    fn raw_report_layout() {
        let frame = raw_report(0x0102_0304_0506_0708, 0xBEEF, true);
        assert_eq!(frame[0], CommandId::ReportRaw as u8);
        assert_eq!(frame[1..9], 0x0102_0304_0506_0708u64.to_le_bytes());
        assert_eq!(frame[9..11], 0xBEEFu16.to_le_bytes());
        assert_eq!(frame[11], 1);
        assert_eq!(&frame[12..15], &[0, 0, 0]);
        assert!(verify_checksum(&frame).is_ok());
    }

    #[test]
    fn summary_report_forces_trigger_flag() {
        let frame = summary_report(12_500, 700);
        assert_eq!(frame[0], CommandId::ReportSummary as u8);
        assert_eq!(frame[1..9], 12_500u64.to_le_bytes());
        assert_eq!(frame[9..11], 700u16.to_le_bytes());
        assert_eq!(frame[11], 1);
        assert!(verify_checksum(&frame).is_ok());
    }

    #[test]
    fn command_response_echoes_id_and_result() {
        let frame = command_response(CommandId::GetThreshold, 150i16.to_le_bytes());
        assert_eq!(frame[0], CommandId::GetThreshold as u8);
        assert_eq!(i16::from_le_bytes([frame[1], frame[2]]), 150);
        assert!(verify_checksum(&frame).is_ok());
    }
}
