//! Outer frame layer: marker check, sub-record walking and packing.
//!
//! This layer knows nothing about what a tag means apart from the product
//! id marker. Semantic interpretation lives in [`crate::decoder`].

use tracing::{trace, warn};

use crate::bytes::{bytes_to_uint, checksum};
use crate::error::{Result, TlvError};
use crate::tags::{tag, Tag};

/// Literal marker every binary frame starts with. JSON messages never do.
pub const FRAME_MARKER: [u8; 2] = *b"CG";

/// Marker, command byte and payload length.
pub const HEADER_LEN: usize = 5;

/// Tag byte plus the 2-byte value length.
pub const RECORD_HEADER_LEN: usize = 3;

/// Trailing checksum width.
pub const CHECKSUM_LEN: usize = 2;

/// One tag-length-value entry, borrowing its value from the frame buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubRecord<'a> {
    pub tag: u8,
    pub value: &'a [u8],
}

impl SubRecord<'_> {
    /// Typed view of the tag byte.
    pub fn kind(&self) -> Tag {
        Tag::from(self.tag)
    }

    /// Length of the value, as carried in the length field.
    pub fn len(&self) -> usize {
        self.value.len()
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }
}

/// Result of walking a frame's payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnpackedFrame<'a> {
    /// Command byte at offset 2
    pub command: u8,
    /// Value of the product id marker (tag 0x38), 0 when absent
    pub product_id: u8,
    /// Payload length declared in the header
    pub payload_len: usize,
    /// Sub-records in payload order
    pub records: Vec<SubRecord<'a>>,
    /// Whether the walk stopped early on a record that ran past the payload
    pub truncated: bool,
}

impl<'a> UnpackedFrame<'a> {
    /// First record carrying `tag`.
    pub fn get(&self, tag: u8) -> Option<&SubRecord<'a>> {
        self.records.iter().find(|r| r.tag == tag)
    }
}

/// True when `buffer` carries the binary protocol marker.
///
/// Callers route anything else to the JSON path.
pub fn is_tlv_frame(buffer: &[u8]) -> bool {
    buffer.len() >= FRAME_MARKER.len() && buffer[..FRAME_MARKER.len()] == FRAME_MARKER
}

/// Split a frame into its command, product id and sub-records.
///
/// The marker is not checked here, see [`is_tlv_frame`]. A header that is
/// too short, or a declared payload longer than the buffer, is an error.
/// A sub-record that runs past the payload is not: the walk stops and the
/// records parsed so far are returned with `truncated` set.
pub fn unpack_frame(buffer: &[u8]) -> Result<UnpackedFrame<'_>> {
    if buffer.len() < HEADER_LEN {
        return Err(TlvError::TooShort {
            len: buffer.len(),
            min: HEADER_LEN,
        });
    }

    let command = buffer[2];
    let payload_len = bytes_to_uint(&buffer[3..HEADER_LEN]) as usize;
    let available = buffer.len() - HEADER_LEN;
    if available < payload_len {
        return Err(TlvError::LengthExceeded {
            declared: payload_len,
            available,
        });
    }

    let payload = &buffer[HEADER_LEN..HEADER_LEN + payload_len];
    let mut records = Vec::new();
    let mut product_id = 0;
    let mut truncated = false;
    let mut index = 0;

    while index < payload.len() {
        if payload.len() - index < RECORD_HEADER_LEN {
            warn!("Truncated TLV header at offset {}", index);
            truncated = true;
            break;
        }

        let tag = payload[index];
        let len = bytes_to_uint(&payload[index + 1..index + RECORD_HEADER_LEN]) as usize;
        let start = index + RECORD_HEADER_LEN;
        let end = start + len;
        if end > payload.len() {
            warn!(
                "Sub-record {:#04x} at offset {} claims {} bytes, only {} left",
                tag,
                index,
                len,
                payload.len() - start
            );
            truncated = true;
            break;
        }

        let value = &payload[start..end];
        if tag == tag::PRODUCT_ID {
            product_id = value.first().copied().unwrap_or(0);
        }
        trace!("Sub-record {:#04x} ({} bytes)", tag, len);

        records.push(SubRecord { tag, value });
        index = end;
    }

    Ok(UnpackedFrame {
        command,
        product_id,
        payload_len,
        records,
        truncated,
    })
}

/// Check the trailing checksum of a complete frame.
pub fn verify_checksum(frame: &[u8]) -> Result<()> {
    if frame.len() < HEADER_LEN {
        return Err(TlvError::TooShort {
            len: frame.len(),
            min: HEADER_LEN,
        });
    }

    let body_len = HEADER_LEN + bytes_to_uint(&frame[3..HEADER_LEN]) as usize;
    if frame.len() < body_len {
        return Err(TlvError::LengthExceeded {
            declared: body_len - HEADER_LEN,
            available: frame.len() - HEADER_LEN,
        });
    }
    if frame.len() < body_len + CHECKSUM_LEN {
        return Err(TlvError::MissingChecksum);
    }

    let expected = bytes_to_uint(&frame[body_len..body_len + CHECKSUM_LEN]) as u16;
    let computed = checksum(&frame[..body_len]);
    if expected != computed {
        return Err(TlvError::ChecksumMismatch { expected, computed });
    }
    Ok(())
}

/// Serialize a complete frame: marker, command, payload length, the
/// records in iteration order, then the checksum.
///
/// A value longer than 65535 bytes, or a payload that adds up to more,
/// cannot be expressed in the length fields and is rejected.
pub fn pack_frame<I, V>(command: u8, records: I) -> Result<Vec<u8>>
where
    I: IntoIterator<Item = (u8, V)>,
    V: AsRef<[u8]>,
{
    let mut payload = Vec::new();
    for (tag, value) in records {
        let value = value.as_ref();
        let len = u16::try_from(value.len()).map_err(|_| TlvError::ValueTooLong {
            tag,
            len: value.len(),
        })?;
        payload.push(tag);
        payload.extend_from_slice(&len.to_le_bytes());
        payload.extend_from_slice(value);
    }

    let payload_len =
        u16::try_from(payload.len()).map_err(|_| TlvError::PayloadTooLong(payload.len()))?;

    let mut out = Vec::with_capacity(HEADER_LEN + payload.len() + CHECKSUM_LEN);
    out.extend_from_slice(&FRAME_MARKER);
    out.push(command);
    out.extend_from_slice(&payload_len.to_le_bytes());
    out.extend_from_slice(&payload);
    let sum = checksum(&out);
    out.extend_from_slice(&sum.to_le_bytes());
    Ok(out)
}

/// Alias of [`pack_frame`] named after the encode direction.
pub fn encode<I, V>(command: u8, records: I) -> Result<Vec<u8>>
where
    I: IntoIterator<Item = (u8, V)>,
    V: AsRef<[u8]>,
{
    pack_frame(command, records)
}

/// Ordered set of outbound records, one value per tag.
///
/// Setting a tag twice keeps its original position and replaces the value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrameBuilder {
    command: u8,
    records: Vec<(u8, Vec<u8>)>,
}

impl FrameBuilder {
    pub fn new(command: u8) -> Self {
        Self {
            command,
            records: Vec::new(),
        }
    }

    /// Add or replace a record, builder style.
    pub fn record(mut self, tag: u8, value: impl Into<Vec<u8>>) -> Self {
        self.insert(tag, value);
        self
    }

    /// Add or replace a record.
    pub fn insert(&mut self, tag: u8, value: impl Into<Vec<u8>>) {
        let value = value.into();
        match self.records.iter_mut().find(|(t, _)| *t == tag) {
            Some(slot) => slot.1 = value,
            None => self.records.push((tag, value)),
        }
    }

    pub fn command(&self) -> u8 {
        self.command
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn build(&self) -> Result<Vec<u8>> {
        pack_frame(self.command, self.records.iter().map(|(t, v)| (*t, v)))
    }
}
