//! # Device Module
//!
//! ## Why This Module Exists
//! This is the firmware core of the latency tester: a fixed-period sampling
//! loop that reads the photodiode and the manual trigger, injects HID presses
//! into the machine under test, and streams raw samples and derived latency
//! events to the host over the 16-byte frame protocol.
//!
//! ## Key Abstractions
//! - **[`controller::FakeLdat`]**: owns all device state, advances it one tick
//!   at a time
//! - **[`DeviceHandle`]**: spawn/shutdown lifecycle wrapper around the loop
//! - **[`DeviceSettings`]**: the startup profile (wire commands can change
//!   most of it at runtime)
//!
//! ## Error Handling Strategy
//! Wire input can never bring the loop down: malformed frames are dropped in
//! the codec. Peripheral faults are logged per tick and counted in the
//! periodic stats line; the loop keeps running so a transient fault (an
//! unplugged serial adapter, say) self-heals on reconnect.

pub mod action;
pub mod controller;
pub mod sensor;
pub mod threshold;
pub mod trigger;

use chrono::Local;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::watch;
use tracing::{error, info};

use crate::hal::{HalError, Hardware};
use action::ActionConfig;
use controller::{FakeLdat, Sampling};

/// Which report frames the device emits each tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportMode {
    Raw,
    Summary,
    Combined,
}

impl ReportMode {
    pub fn from_wire(byte: u8) -> Option<Self> {
        match byte {
            0 => Some(ReportMode::Raw),
            1 => Some(ReportMode::Summary),
            2 => Some(ReportMode::Combined),
            _ => None,
        }
    }

    pub fn to_wire(self) -> u8 {
        match self {
            ReportMode::Raw => 0,
            ReportMode::Summary => 1,
            ReportMode::Combined => 2,
        }
    }
}

/// Startup profile for one device instance.
#[derive(Clone, Debug)]
pub struct DeviceSettings {
    /// Sampling rate in Hz; the tick period is `1_000_000 / rate_hz`
    /// microseconds. Must be non-zero.
    pub rate_hz: u16,
    pub report_mode: ReportMode,
    /// Additive bias on top of the rolling brightness average.
    pub threshold_bias: i16,
    /// Which edge of the physical button counts as the trigger firing.
    pub trigger_on_press: bool,
    pub action: ActionConfig,
}

impl Default for DeviceSettings {
    /// The original device profile: 2 kHz, combined reports, bias 150,
    /// trigger on press, left mouse button.
    fn default() -> Self {
        Self {
            rate_hz: 2000,
            report_mode: ReportMode::Combined,
            threshold_bias: 150,
            trigger_on_press: true,
            action: ActionConfig::default(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DeviceError {
    #[error("hardware fault: {0}")]
    Hal(#[from] HalError),

    #[error("invalid device settings: {0}")]
    InvalidSettings(String),
}

/// Handle for the running sampling loop.
pub struct DeviceHandle {
    shutdown: watch::Sender<bool>,
}

impl DeviceHandle {
    /// Builds the device from its settings and peripherals and spawns the
    /// sampling loop as a tokio task.
    pub fn spawn(settings: DeviceSettings, hardware: Hardware) -> Result<Self, DeviceError> {
        info!("Initializing device with settings: {:?}", settings);
        let device = FakeLdat::create(settings, hardware)?;

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        tokio::spawn(async move {
            let device = device.arm();
            run_device_loop(device, shutdown_rx).await;
        });

        Ok(Self {
            shutdown: shutdown_tx,
        })
    }

    /// Asks the loop to stop after the current tick.
    pub fn shutdown(&self) {
        let _ = self.shutdown.send(true);
    }
}

/// Paces the tick loop. Each iteration runs one tick, then sleeps whatever is
/// left of the period. A tick that overruns its period is followed
/// back-to-back by the next one — ticks are shortened or delayed, never
/// skipped.
async fn run_device_loop(mut device: FakeLdat<Sampling>, shutdown: watch::Receiver<bool>) {
    info!(
        "entering sampling loop ({} us period)",
        device.interval_us()
    );

    let mut ticks: u64 = 0;
    let mut behind: u64 = 0;
    let mut faults: u64 = 0;
    let mut last_stats = Local::now();
    let stats_interval = chrono::Duration::seconds(10);

    while !*shutdown.borrow() {
        let started = device.now_us();
        let interval_us = match device.tick() {
            Ok(interval) => interval,
            Err(e) => {
                error!("tick failed: {e}");
                faults += 1;
                device.interval_us()
            }
        };
        ticks += 1;

        let elapsed = device.now_us().saturating_sub(started);
        if elapsed < interval_us {
            tokio::time::sleep(Duration::from_micros(interval_us - elapsed)).await;
        } else {
            // behind schedule: proceed immediately, never skip a tick
            behind += 1;
            tokio::task::yield_now().await;
        }

        let now = Local::now();
        if now - last_stats > stats_interval {
            info!(
                "sampling stats: {} ticks in last {}s ({} behind schedule, {} faults)",
                ticks,
                stats_interval.num_seconds(),
                behind,
                faults
            );
            ticks = 0;
            behind = 0;
            faults = 0;
            last_stats = now;
        }
    }

    info!("sampling loop stopped");
}
