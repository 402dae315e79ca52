//! The device controller.
//!
//! `FakeLdat` owns every piece of mutable device state and advances it one
//! tick at a time: drain pending command frames, sample the photodiode, run
//! the trigger-override state machine, then emit whatever report frames the
//! current mode asks for. The statum states model the lifecycle — a device is
//! built `Idle` and armed into `Sampling` before the first tick.

use statum::{machine, state};
use tracing::{debug, info, warn};

use crate::device::action::ActionConfig;
use crate::device::sensor::Sensor;
use crate::device::threshold::ThresholdEstimator;
use crate::device::trigger::TriggerButton;
use crate::device::{DeviceError, DeviceSettings, ReportMode};
use crate::hal::{FrameTransport, Hardware, HidSink, MonotonicClock};
use crate::protocol::{report, HostCommand, FRAME_LEN};

/// How long a host-forced press is held.
const MANUAL_HOLD_US: u64 = 50_000;

/// Host-forced trigger override. Advanced once per tick; while anything other
/// than `NoOverride` is active the real trigger input is not read at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TriggerOverride {
    /// The real trigger drives the actuator.
    NoOverride,
    /// Entry state set by MANUAL_TRIGGER; presses and starts the countdown.
    Press,
    /// Holding the forced press while `override_ticks` runs down.
    OverrideInProgress,
    /// Countdown expired; release and hand control back to the real trigger.
    Release,
}

#[state]
#[derive(Debug, Clone)]
pub enum LdatState {
    Idle,
    Sampling,
}

#[machine]
pub struct FakeLdat<S: LdatState> {
    clock: Box<dyn MonotonicClock>,
    sensor: Sensor,
    trigger: TriggerButton,
    action: ActionConfig,
    hid: Box<dyn HidSink>,
    transport: Box<dyn FrameTransport>,
    estimator: ThresholdEstimator,
    report_mode: ReportMode,
    interval_us: u64,
    trigger_on_press: bool,
    override_state: TriggerOverride,
    override_ticks: u16,
    trigger_high_timestamp: u64,
    timestamp: u64,
}

impl FakeLdat<Idle> {
    pub fn create(settings: DeviceSettings, hardware: Hardware) -> Result<Self, DeviceError> {
        if settings.rate_hz == 0 {
            return Err(DeviceError::InvalidSettings(
                "poll rate must be non-zero".into(),
            ));
        }
        let interval_us = 1_000_000 / u64::from(settings.rate_hz);
        debug!(
            "creating device: {} Hz ({} us period), mode {:?}, bias {}",
            settings.rate_hz, interval_us, settings.report_mode, settings.threshold_bias
        );

        Ok(Self::new(
            hardware.clock,
            Sensor::new(hardware.brightness),
            TriggerButton::new(hardware.trigger),
            settings.action,
            hardware.hid,
            hardware.transport,
            ThresholdEstimator::new(settings.threshold_bias),
            settings.report_mode,
            interval_us,
            settings.trigger_on_press,
            TriggerOverride::NoOverride,
            0,
            0,
            0,
        ))
    }

    /// Starts the sampling lifecycle.
    pub fn arm(self) -> FakeLdat<Sampling> {
        info!(
            "device armed: {} us period, report mode {:?}",
            self.interval_us, self.report_mode
        );
        self.transition()
    }
}

impl FakeLdat<Sampling> {
    /// One control-loop iteration. Returns the period the caller should pace
    /// itself against; if it already overran the period it must run the next
    /// tick back-to-back rather than skip it.
    pub fn tick(&mut self) -> Result<u64, DeviceError> {
        self.drain_commands()?;

        self.sensor.measure()?;
        self.timestamp = self.clock.now_us();
        self.step_override()?;

        if matches!(self.report_mode, ReportMode::Raw | ReportMode::Combined) {
            self.emit_raw()?;
        }
        if matches!(self.report_mode, ReportMode::Summary | ReportMode::Combined) {
            self.emit_summary()?;
        }

        Ok(self.interval_us)
    }

    pub fn interval_us(&self) -> u64 {
        self.interval_us
    }

    pub fn now_us(&self) -> u64 {
        self.clock.now_us()
    }

    /// Reads every complete frame waiting on the transport. Valid commands are
    /// applied and answered; anything malformed is dropped without a reply.
    fn drain_commands(&mut self) -> Result<(), DeviceError> {
        let mut frame = [0u8; FRAME_LEN];
        while self.transport.bytes_available()? >= FRAME_LEN {
            self.transport.read_exact(&mut frame)?;
            match HostCommand::parse(&frame) {
                Ok(command) => {
                    let response = self.apply_command(command);
                    self.transport.write_all(&response)?;
                }
                Err(err) => debug!("dropping invalid frame: {err}"),
            }
        }
        Ok(())
    }

    /// Applies one command and builds its response. Every set falls through
    /// into its paired get so the response always echoes post-command state.
    fn apply_command(&mut self, command: HostCommand) -> [u8; FRAME_LEN] {
        use HostCommand::*;

        let id = command.id();
        let result: [u8; 2] = match command {
            SetPollRate(rate) => {
                self.set_rate(rate);
                self.poll_rate_echo()
            }
            GetPollRate => self.poll_rate_echo(),

            SetReportMode(mode) => {
                match ReportMode::from_wire(mode) {
                    Some(new_mode) => self.report_mode = new_mode,
                    None => warn!("ignoring out-of-range report mode {mode}"),
                }
                [self.report_mode.to_wire(), 0]
            }
            GetReportMode => [self.report_mode.to_wire(), 0],

            SetThreshold(bias) => {
                self.estimator.set_bias(bias);
                bias.to_le_bytes()
            }
            GetThreshold => self.estimator.bias().to_le_bytes(),

            SetAction { mode, code } => {
                match ActionConfig::from_wire(mode, code) {
                    Some(action) => self.action = action,
                    None => warn!("ignoring invalid action {mode}/{code}"),
                }
                self.action.to_wire()
            }
            GetAction => self.action.to_wire(),

            ManualTrigger(echo) => {
                self.manual_trigger();
                echo
            }
        };
        report::command_response(id, result)
    }

    fn set_rate(&mut self, rate_hz: u16) {
        if rate_hz == 0 {
            // division guard: keep the previous interval, the echo answers
            // with the unchanged rate
            warn!("rejecting zero poll rate");
            return;
        }
        self.interval_us = 1_000_000 / u64::from(rate_hz);
        debug!("poll interval set to {} us", self.interval_us);
    }

    fn poll_rate_echo(&self) -> [u8; 2] {
        ((1_000_000 / self.interval_us) as u16).to_le_bytes()
    }

    /// Forces a press for the next `50 ms / interval` ticks. A hard override:
    /// any countdown already in progress is restarted.
    fn manual_trigger(&mut self) {
        self.override_state = TriggerOverride::Press;
        self.override_ticks = (MANUAL_HOLD_US / self.interval_us) as u16;
        debug!("manual trigger: holding press for {} ticks", self.override_ticks);
    }

    /// Advances the override state machine and performs this tick's actuator
    /// action. The real trigger is only read while no override is active; the
    /// high-edge timestamp is recorded on whichever edge matches the
    /// configured polarity.
    fn step_override(&mut self) -> Result<(), DeviceError> {
        match self.override_state {
            TriggerOverride::Press => {
                self.action.press(self.hid.as_mut())?;
                if self.trigger_on_press {
                    self.trigger_high_timestamp = self.timestamp;
                }
                // the forced press tick consumes one tick of the hold
                self.override_ticks = self.override_ticks.saturating_sub(1);
                self.override_state = TriggerOverride::OverrideInProgress;
            }
            TriggerOverride::OverrideInProgress => {
                if self.override_ticks > 0 {
                    self.action.press(self.hid.as_mut())?;
                    self.override_ticks -= 1;
                } else {
                    self.action.release(self.hid.as_mut())?;
                    self.override_state = TriggerOverride::Release;
                }
            }
            TriggerOverride::Release => {
                self.action.release(self.hid.as_mut())?;
                if !self.trigger_on_press {
                    self.trigger_high_timestamp = self.timestamp;
                }
                self.override_state = TriggerOverride::NoOverride;
            }
            TriggerOverride::NoOverride => {
                self.trigger.measure()?;
                if self.trigger.changed() {
                    if self.trigger.is_active() == self.trigger_on_press {
                        self.action.press(self.hid.as_mut())?;
                        self.trigger_high_timestamp = self.timestamp;
                    } else {
                        self.action.release(self.hid.as_mut())?;
                    }
                }
            }
        }
        Ok(())
    }

    fn emit_raw(&mut self) -> Result<(), DeviceError> {
        let forced = matches!(
            self.override_state,
            TriggerOverride::Press | TriggerOverride::OverrideInProgress
        );
        let frame = report::raw_report(
            self.timestamp,
            self.sensor.brightness(),
            self.trigger.is_active() || forced,
        );
        self.transport.write_all(&frame)?;
        Ok(())
    }

    /// Feeds the estimator and emits a latency event once the brightness
    /// climbs above the rolling threshold after a recorded trigger edge.
    fn emit_summary(&mut self) -> Result<(), DeviceError> {
        let brightness = self.sensor.brightness();
        let threshold = self.estimator.observe(brightness);
        if self.trigger_high_timestamp != 0 && brightness > threshold {
            let latency = self.timestamp - self.trigger_high_timestamp;
            let frame = report::summary_report(latency, threshold);
            self.transport.write_all(&frame)?;
            self.trigger_high_timestamp = 0;
            debug!("latency event: {latency} us at threshold {threshold}");
        }
        Ok(())
    }
}
