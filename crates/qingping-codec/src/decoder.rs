//! Semantic decoding of TLV frames into sensor telemetry.
//!
//! The decoder walks the sub-records produced by [`unpack_frame`] and fills
//! a fresh [`DecodedTelemetry`] per call. Fields are only set when their tag
//! was present, so an absent field means "unknown", never zero.
//!
//! ## Sensor data sources
//!
//! | Tag  | Layout                                             | `dataType` |
//! |------|----------------------------------------------------|------------|
//! | 0x14 | timestamp(4) + TH block(6) + rssi(1)               | `event`    |
//! | 0x03 | timestamp(4) + step(2) + N x TH block(6)           | `data`     |
//! | 0x85 | timestamp(4) + type(1) + type-specific fields      | -          |
//!
//! Realtime and history records replace each other in payload order.
//! Composite (0x85) records are collected separately and win if any exist.

use chrono::{DateTime, Utc};
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use tracing::{debug, warn};

use crate::bytes::{bytes_to_uint, sign_extend, MAX_WIDTH};
use crate::config::{ChecksumPolicy, DecoderConfig};
use crate::error::{Result, TlvError};
use crate::frame::{is_tlv_frame, unpack_frame, verify_checksum, UnpackedFrame};
use crate::tags::Tag;

/// Packed temperature/humidity/pressure/battery block.
pub const TH_BLOCK_LEN: usize = 6;

/// Timestamp, TH block and one RSSI byte.
pub const REALTIME_LEN: usize = 4 + TH_BLOCK_LEN + 1;

/// Start timestamp and sample step.
pub const HISTORY_HEADER_LEN: usize = 6;

/// Timestamp and sub-type selector.
pub const SENSOR_V2_HEADER_LEN: usize = 5;

/// Offset baked into the packed temperature, in tenths of a degree.
const TEMPERATURE_OFFSET_TENTHS: i64 = 500;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Origin of a reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    /// Realtime push
    Event,
    /// Historical sample
    Data,
}

/// One timestamped sample.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SensorReading {
    pub data_type: Option<DataType>,
    /// Unix seconds, 0 when the block carried no timestamp
    pub timestamp: u64,
    /// °C
    pub temperature: Option<f64>,
    /// % RH
    pub humidity: Option<f64>,
    /// kPa
    pub pressure: Option<f64>,
    /// 0-100 %
    pub battery: Option<u8>,
    /// dBm
    pub rssi: Option<i64>,
    /// ppm
    pub co2: Option<u64>,
    pub pm25: Option<u64>,
    pub pm10: Option<u64>,
    pub tvoc: Option<u64>,
    pub noise: Option<u64>,
    pub light: Option<u64>,
}

impl SensorReading {
    /// UTC rendering of `timestamp`, `None` when there is no timestamp.
    pub fn time(&self) -> Option<String> {
        if self.timestamp == 0 {
            return None;
        }
        let secs = i64::try_from(self.timestamp).ok()?;
        DateTime::<Utc>::from_timestamp(secs, 0).map(|dt| dt.format(TIME_FORMAT).to_string())
    }
}

impl Serialize for SensorReading {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        optional_entry(&mut map, "dataType", &self.data_type)?;
        map.serialize_entry("timestamp", &self.timestamp)?;
        optional_entry(&mut map, "time", &self.time())?;
        optional_entry(&mut map, "temperature", &self.temperature)?;
        optional_entry(&mut map, "humidity", &self.humidity)?;
        optional_entry(&mut map, "pressure", &self.pressure)?;
        optional_entry(&mut map, "battery", &self.battery)?;
        optional_entry(&mut map, "rssi", &self.rssi)?;
        optional_entry(&mut map, "co2", &self.co2)?;
        optional_entry(&mut map, "pm25", &self.pm25)?;
        optional_entry(&mut map, "pm10", &self.pm10)?;
        optional_entry(&mut map, "tvoc", &self.tvoc)?;
        optional_entry(&mut map, "noise", &self.noise)?;
        optional_entry(&mut map, "light", &self.light)?;
        map.end()
    }
}

fn optional_entry<M, T>(
    map: &mut M,
    key: &'static str,
    value: &Option<T>,
) -> std::result::Result<(), M::Error>
where
    M: SerializeMap,
    T: Serialize,
{
    match value {
        Some(v) => map.serialize_entry(key, v),
        None => Ok(()),
    }
}

/// Everything the decoder understood about one frame.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DecodedTelemetry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<u8>,
    pub product_id: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version_model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version_mcu: Option<String>,
    /// Minutes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report_interval: Option<u64>,
    /// Seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collect_interval: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub battery: Option<u8>,
    /// dBm
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signal_strength: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usb_plugged_in: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub battery_charging: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pm_module_connected: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pm_module_serial: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_status: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sensor_data: Option<Vec<SensorReading>>,
}

impl DecodedTelemetry {
    /// True when nothing was decoded, e.g. for a malformed frame.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Frame decoder holding its configuration.
#[derive(Debug, Clone, Default)]
pub struct Decoder {
    config: DecoderConfig,
}

impl Decoder {
    pub fn new(config: DecoderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// Decode a frame, reporting structural problems as errors.
    ///
    /// Truncated sub-records and undecodable fields are still tolerated;
    /// only a missing marker, a short header, a payload longer than the
    /// buffer, or (in `Verify` mode) a bad checksum fail.
    pub fn try_decode(&self, frame: &[u8]) -> Result<DecodedTelemetry> {
        if !is_tlv_frame(frame) {
            return Err(TlvError::MissingMarker);
        }
        if self.config.checksum == ChecksumPolicy::Verify {
            verify_checksum(frame)?;
        }
        let unpacked = unpack_frame(frame)?;
        Ok(interpret(&unpacked))
    }

    /// Decode a frame, returning an empty result for malformed input.
    pub fn decode(&self, frame: &[u8]) -> DecodedTelemetry {
        match self.try_decode(frame) {
            Ok(telemetry) => telemetry,
            Err(e) => {
                warn!("Failed to decode TLV frame ({} bytes): {}", frame.len(), e);
                DecodedTelemetry::default()
            }
        }
    }
}

/// Decode a frame with the default configuration.
pub fn decode(frame: &[u8]) -> DecodedTelemetry {
    Decoder::default().decode(frame)
}

/// Interpret the sub-records of an unpacked frame.
pub fn interpret(frame: &UnpackedFrame<'_>) -> DecodedTelemetry {
    let mut out = DecodedTelemetry {
        command: Some(frame.command),
        product_id: frame.product_id,
        ..Default::default()
    };
    let mut composite = Vec::new();

    for record in &frame.records {
        let value = record.value;
        match record.kind() {
            Tag::RealtimeData => {
                if let Some(reading) = decode_realtime(value) {
                    out.sensor_data = Some(vec![reading]);
                }
            }
            Tag::HistoryData => {
                let readings = decode_history(value);
                if !readings.is_empty() {
                    out.sensor_data = Some(readings);
                }
            }
            Tag::SensorDataV2 => {
                if let Some(reading) = decode_sensor_v2(value) {
                    composite.push(reading);
                }
            }
            Tag::FirmwareVersion => {
                if let Some(s) = decode_utf8(value, "firmware version") {
                    out.version = Some(s);
                }
            }
            Tag::ModelVersion => {
                if let Some(s) = decode_utf8(value, "model version") {
                    out.version_model = Some(s);
                }
            }
            Tag::McuVersion => {
                if let Some(s) = decode_utf8(value, "MCU version") {
                    out.version_mcu = Some(s);
                }
            }
            Tag::ReportInterval if !value.is_empty() => {
                out.report_interval = Some(bytes_to_uint(value));
            }
            Tag::CollectInterval if !value.is_empty() => {
                out.collect_interval = Some(bytes_to_uint(value));
            }
            Tag::DeviceStatus if !value.is_empty() => {
                out.device_status = Some(value[0]);
            }
            Tag::Battery | Tag::BatteryLegacy if !value.is_empty() => {
                out.battery = Some(value[0]);
            }
            Tag::SignalStrength if value.len() > MAX_WIDTH => {
                warn!("Signal strength value too wide: {} bytes", value.len());
            }
            Tag::SignalStrength if !value.is_empty() => {
                out.signal_strength = Some(sign_extend(bytes_to_uint(value), value.len()));
            }
            Tag::UsbStatus if !value.is_empty() => {
                let plugged = value[0] == 1;
                out.usb_plugged_in = Some(plugged);
                out.battery_charging = Some(plugged);
            }
            Tag::PmModuleSerial => {
                if value.is_empty() {
                    out.pm_module_connected = Some(false);
                } else {
                    out.pm_module_connected = Some(true);
                    out.pm_module_serial = Some(hex::encode(value));
                }
            }
            Tag::ProductId => {}
            other => {
                debug!(
                    "Ignoring sub-record {:#04x} ({}, {} bytes)",
                    record.tag,
                    other.name(),
                    value.len()
                );
            }
        }
    }

    if !composite.is_empty() {
        out.sensor_data = Some(composite);
    }

    debug!(
        "Decoded frame cmd={:#04x} product={} records={} readings={}",
        frame.command,
        frame.product_id,
        frame.records.len(),
        out.sensor_data.as_ref().map_or(0, Vec::len)
    );
    out
}

fn decode_utf8(value: &[u8], field: &str) -> Option<String> {
    match std::str::from_utf8(value) {
        Ok(s) => Some(s.to_string()),
        Err(e) => {
            warn!("Failed to decode {} string: {}", field, e);
            None
        }
    }
}

/// Decode the packed 6-byte temperature/humidity/pressure/battery block.
///
/// Bytes 0..3 hold `th`: temperature in tenths above -50.0 °C in the bits
/// above 12, humidity in tenths in the low 12 bits. Bytes 3..5 hold
/// pressure in hundredths of a kPa, byte 5 the battery percentage.
pub fn decode_th_block(bytes: &[u8]) -> Option<SensorReading> {
    if bytes.len() < TH_BLOCK_LEN {
        warn!("TH block too short: {} bytes", bytes.len());
        return None;
    }

    let th = bytes_to_uint(&bytes[0..3]);
    let temperature = ((th >> 12) as i64 - TEMPERATURE_OFFSET_TENTHS) as f64 / 10.0;
    let humidity = (th & 0xfff) as f64 / 10.0;
    let pressure = bytes_to_uint(&bytes[3..5]) as f64 / 100.0;

    Some(SensorReading {
        data_type: Some(DataType::Data),
        temperature: Some(temperature),
        humidity: Some(humidity),
        pressure: Some(pressure),
        battery: Some(bytes[5]),
        ..Default::default()
    })
}

/// Decode a realtime (0x14) value.
pub fn decode_realtime(bytes: &[u8]) -> Option<SensorReading> {
    if bytes.len() < REALTIME_LEN {
        warn!("Realtime data too short: {} bytes", bytes.len());
        return None;
    }

    let reading = decode_th_block(&bytes[4..4 + TH_BLOCK_LEN])?;
    Some(SensorReading {
        data_type: Some(DataType::Event),
        timestamp: bytes_to_uint(&bytes[0..4]),
        rssi: Some(sign_extend(u64::from(bytes[REALTIME_LEN - 1]), 1)),
        ..reading
    })
}

/// Decode a history (0x03) value into evenly spaced readings.
pub fn decode_history(bytes: &[u8]) -> Vec<SensorReading> {
    if bytes.len() < HISTORY_HEADER_LEN {
        warn!("History data too short: {} bytes", bytes.len());
        return Vec::new();
    }

    let start = bytes_to_uint(&bytes[0..4]);
    let step = bytes_to_uint(&bytes[4..6]);

    bytes[HISTORY_HEADER_LEN..]
        .chunks_exact(TH_BLOCK_LEN)
        .filter_map(decode_th_block)
        .enumerate()
        .map(|(i, reading)| SensorReading {
            data_type: Some(DataType::Data),
            timestamp: start + step * i as u64,
            ..reading
        })
        .collect()
}

/// Decode a versioned composite sensor block (0x85).
///
/// Every field is unsigned little-endian; temperature and humidity are in
/// tenths. A body too short for its sub-type yields a reading with only the
/// timestamp set.
pub fn decode_sensor_v2(bytes: &[u8]) -> Option<SensorReading> {
    if bytes.len() < SENSOR_V2_HEADER_LEN {
        warn!("Sensor data v2 too short: {} bytes", bytes.len());
        return None;
    }

    let mut reading = SensorReading {
        timestamp: bytes_to_uint(&bytes[0..4]),
        ..Default::default()
    };
    let sub_type = bytes[4];
    let body = &bytes[SENSOR_V2_HEADER_LEN..];
    let word = |i: usize| bytes_to_uint(&body[2 * i..2 * i + 2]);
    let tenths = |i: usize| word(i) as f64 / 10.0;

    match sub_type {
        // Temperature + humidity
        1 if body.len() >= 4 => {
            reading.temperature = Some(tenths(0));
            reading.humidity = Some(word(1) as f64 / 10.0);
        }
        // Temperature only
        2 if body.len() >= 2 => {
            reading.temperature = Some(tenths(0));
        }
        // Temperature + humidity + pressure
        3 if body.len() >= 6 => {
            reading.temperature = Some(tenths(0));
            reading.humidity = Some(word(1) as f64 / 10.0);
            reading.pressure = Some(word(2) as f64 / 100.0);
        }
        // Temperature + humidity + CO2
        4 if body.len() >= 6 => {
            reading.temperature = Some(tenths(0));
            reading.humidity = Some(word(1) as f64 / 10.0);
            reading.co2 = Some(word(2));
        }
        // Full environment monitor (CGR1W, CGR1PW)
        10 if body.len() >= 18 => {
            reading.temperature = Some(tenths(0));
            reading.humidity = Some(word(1) as f64 / 10.0);
            reading.co2 = Some(word(2));
            reading.pm25 = Some(word(3));
            reading.pm10 = Some(word(4));
            reading.tvoc = Some(word(5));
            reading.noise = Some(word(6));
            reading.light = Some(bytes_to_uint(&body[14..18]));
        }
        1..=4 | 10 => {
            warn!(
                "Sensor data v2 type {} body too short: {} bytes",
                sub_type,
                body.len()
            );
        }
        other => {
            debug!("Unknown sensor data v2 type {}", other);
        }
    }

    Some(reading)
}
