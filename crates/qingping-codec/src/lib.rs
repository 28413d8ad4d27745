//! Qingping TLV Binary Protocol Codec
//!
//! Newer Qingping sensors (CGR1W, CGR1PW, CGDN1, ...) publish telemetry as
//! compact binary frames instead of the legacy JSON messages. This crate
//! turns those frames into structured readings and builds outbound command
//! frames for the device.
//!
//! ## Frame layout
//!
//! ```text
//! +------+-----+---------+---------------------------+----------+
//! | "CG" | cmd | len LE  | tag | len LE | value | ... | checksum |
//! | 2 B  | 1 B | 2 B     | 1 B | 2 B    | len B |     | 2 B LE   |
//! +------+-----+---------+---------------------------+----------+
//! ```
//!
//! ## Architecture
//!
//! - **bytes**: little-endian integer helpers and the additive checksum
//! - **frame**: marker check, unpacking into sub-records, packing
//! - **decoder**: semantic interpretation of sub-records into `DecodedTelemetry`
//! - **commands**: builders for the settings frames the integration sends
//!
//! Everything is a pure function over byte slices. There is no I/O and no
//! shared state, so the codec can be called from any thread or task.

pub mod bytes;
pub mod commands;
pub mod config;
pub mod decoder;
pub mod error;
pub mod frame;
pub mod tags;

pub use bytes::{bytes_to_uint, checksum, int_to_bytes, sign_extend};
pub use commands::{
    calibration_command, co2_asc_command, config_command, led_command, offset_command,
    request_settings_command, temperature_unit_command, to_hex, SensorOffsets, TemperatureUnit,
};
pub use config::{ChecksumPolicy, DecoderConfig};
pub use decoder::{decode, DataType, DecodedTelemetry, Decoder, SensorReading};
pub use error::{Result, TlvError};
pub use frame::{
    encode, is_tlv_frame, pack_frame, unpack_frame, verify_checksum, FrameBuilder, SubRecord,
    UnpackedFrame, FRAME_MARKER, HEADER_LEN,
};
pub use tags::{Command, Tag};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
