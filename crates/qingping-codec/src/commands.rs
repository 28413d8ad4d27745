//! Builders for the outbound settings frames.

use tracing::warn;

use crate::bytes::int_to_bytes;
use crate::error::{Result, TlvError};
use crate::frame::FrameBuilder;
use crate::tags::{cmd, tag};

/// Sensor calibration offsets.
///
/// Temperature and humidity are sent in tenths; the others as whole units.
/// Zero offsets are left out of the frame.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SensorOffsets {
    /// °C
    pub temperature: f64,
    /// % RH
    pub humidity: f64,
    /// ppm
    pub co2: i64,
    pub pm25: i64,
    pub pm10: i64,
}

/// Display unit for temperature.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TemperatureUnit {
    #[default]
    Celsius,
    Fahrenheit,
}

/// Set upload and sampling intervals.
pub fn config_command(
    report_interval_minutes: u16,
    collect_interval_seconds: u16,
) -> Result<Vec<u8>> {
    FrameBuilder::new(cmd::SETTINGS_WRITE)
        .record(tag::REPORT_INTERVAL, report_interval_minutes.to_le_bytes())
        .record(tag::COLLECT_INTERVAL, collect_interval_seconds.to_le_bytes())
        .build()
}

/// Set calibration offsets. Each value must fit a signed 16-bit field.
///
/// Temperature and humidity are scaled by 10 and truncated toward zero.
pub fn offset_command(offsets: &SensorOffsets) -> Result<Vec<u8>> {
    let mut builder = FrameBuilder::new(cmd::SETTINGS_WRITE);

    let fields = [
        (
            tag::TEMPERATURE_OFFSET,
            tenths(tag::TEMPERATURE_OFFSET, offsets.temperature)?,
        ),
        (
            tag::HUMIDITY_OFFSET,
            tenths(tag::HUMIDITY_OFFSET, offsets.humidity)?,
        ),
        (tag::CO2_OFFSET, offsets.co2),
        (tag::PM25_OFFSET, offsets.pm25),
        (tag::PM10_OFFSET, offsets.pm10),
    ];
    for (t, value) in fields {
        if value != 0 {
            builder.insert(t, int_to_bytes(value, 2, true)?);
        }
    }

    if builder.is_empty() {
        warn!("No offsets provided, creating empty command");
    }
    builder.build()
}

/// Enable or disable CO2 automatic self-calibration.
pub fn co2_asc_command(enable: bool) -> Result<Vec<u8>> {
    switch_command(tag::CO2_ASC, enable)
}

/// Turn the indicator LED on or off.
pub fn led_command(enable: bool) -> Result<Vec<u8>> {
    switch_command(tag::LED_SWITCH, enable)
}

/// Trigger a manual CO2 calibration.
pub fn calibration_command() -> Result<Vec<u8>> {
    switch_command(tag::CO2_CALIBRATION, true)
}

pub fn temperature_unit_command(unit: TemperatureUnit) -> Result<Vec<u8>> {
    let value = match unit {
        TemperatureUnit::Celsius => 0u8,
        TemperatureUnit::Fahrenheit => 1,
    };
    FrameBuilder::new(cmd::SETTINGS_PUSH)
        .record(tag::TEMPERATURE_UNIT, [value])
        .build()
}

/// Ask the device to report its current settings.
pub fn request_settings_command() -> Result<Vec<u8>> {
    FrameBuilder::new(cmd::SETTINGS_QUERY).build()
}

/// Lowercase hex rendering of a frame, for logs.
pub fn to_hex(frame: &[u8]) -> String {
    hex::encode(frame)
}

fn switch_command(t: u8, enable: bool) -> Result<Vec<u8>> {
    FrameBuilder::new(cmd::SETTINGS_PUSH)
        .record(t, [u8::from(enable)])
        .build()
}

fn tenths(t: u8, value: f64) -> Result<i64> {
    if !value.is_finite() {
        return Err(TlvError::NonFiniteOffset { tag: t });
    }
    Ok((value * 10.0).trunc() as i64)
}
