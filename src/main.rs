pub mod config;
pub mod device;
pub mod hal;
pub mod protocol;

use color_eyre::{eyre::eyre, Result};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use crate::config::Config;
use crate::device::action::ActionConfig;
use crate::device::{DeviceHandle, DeviceSettings};
use crate::hal::hid::UinputHid;
use crate::hal::pi::{GpioTrigger, Mcp3008Brightness};
use crate::hal::serial::SerialTransport;
use crate::hal::{Hardware, SystemClock};

#[tokio::main]
async fn main() -> Result<()> {
    setup()?;

    config::ensure_default_config().await?;
    let config = config::load().await?;
    info!("Loaded configuration: {:?}", config);

    let settings = device_settings(&config)?;
    let hardware = build_hardware(&config)?;

    let handle = DeviceHandle::spawn(settings, hardware)
        .map_err(|e| eyre!("Failed to spawn device: {}", e))?;

    tokio::signal::ctrl_c().await?;
    info!("Ctrl-C received, shutting down");
    handle.shutdown();

    Ok(())
}

fn device_settings(config: &Config) -> Result<DeviceSettings> {
    let action = ActionConfig::from_wire(config.action.mode, config.action.code).ok_or_else(|| {
        eyre!(
            "invalid action in config: mode {}, code {}",
            config.action.mode,
            config.action.code
        )
    })?;
    Ok(DeviceSettings {
        rate_hz: config.sampling.rate_hz,
        report_mode: config.sampling.report_mode,
        threshold_bias: config.sampling.threshold_bias,
        trigger_on_press: config.sampling.trigger_on_press,
        action,
    })
}

fn build_hardware(config: &Config) -> Result<Hardware> {
    let transport = match &config.serial.port {
        Some(path) => SerialTransport::open(path, config.serial.baud)?,
        None => SerialTransport::open_first(config.serial.baud)?,
    };

    Ok(Hardware {
        clock: Box::new(SystemClock::new()),
        brightness: Box::new(Mcp3008Brightness::new(config.input.adc_channel)?),
        trigger: Box::new(GpioTrigger::new(config.input.button_pin)?),
        hid: Box::new(UinputHid::new()?),
        transport: Box::new(transport),
    })
}

fn setup() -> Result<()> {
    if std::env::var("RUST_LIB_BACKTRACE").is_err() {
        std::env::set_var("RUST_LIB_BACKTRACE", "0")
    }
    color_eyre::install()?;
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info")
    }
    setup_logging_env();
    Ok(())
}

fn setup_logging_env() {
    FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .pretty()
        .init();
}
