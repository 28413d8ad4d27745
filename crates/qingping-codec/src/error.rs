//! Error types for the TLV codec.

use thiserror::Error;

/// Result type for codec operations.
pub type Result<T> = std::result::Result<T, TlvError>;

/// Codec errors.
///
/// Structural problems with inbound frames are only surfaced by the strict
/// entry points (`unpack_frame`, `Decoder::try_decode`); the lenient `decode`
/// turns them into an empty result. Encoder errors are always returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TlvError {
    /// Frame is shorter than the fixed header
    #[error("Frame too short: {len} bytes, need at least {min}")]
    TooShort { len: usize, min: usize },

    /// Frame does not start with the "CG" marker
    #[error("Missing 'CG' frame marker")]
    MissingMarker,

    /// Declared payload length runs past the end of the buffer
    #[error("Declared payload length {declared} exceeds the {available} bytes available")]
    LengthExceeded { declared: usize, available: usize },

    /// Checksum verification requested but the frame carries none
    #[error("Frame has no trailing checksum")]
    MissingChecksum,

    /// Trailing checksum does not match the frame contents
    #[error("Checksum mismatch: frame carries {expected:#06x}, computed {computed:#06x}")]
    ChecksumMismatch { expected: u16, computed: u16 },

    /// Integer width outside the supported range
    #[error("Invalid integer width {0}, expected 1..=8")]
    InvalidWidth(usize),

    /// Integer does not fit in the requested width
    #[error("Value {value} does not fit in {width} {} byte(s)", signedness(.signed))]
    IntegerOverflow {
        value: i64,
        width: usize,
        signed: bool,
    },

    /// Calibration offset is NaN or infinite
    #[error("Offset for tag {tag:#04x} is not a finite number")]
    NonFiniteOffset { tag: u8 },

    /// Sub-record value is too long for its 16-bit length field
    #[error("Value for tag {tag:#04x} is {len} bytes, the length field holds at most 65535")]
    ValueTooLong { tag: u8, len: usize },

    /// Frame payload is too long for the 16-bit length field
    #[error("Payload is {0} bytes, the length field holds at most 65535")]
    PayloadTooLong(usize),
}

fn signedness(signed: &bool) -> &'static str {
    if *signed {
        "signed"
    } else {
        "unsigned"
    }
}
