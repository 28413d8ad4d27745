//! Little-endian integer helpers shared by the decoder and encoder.

use crate::error::{Result, TlvError};

/// Widest integer the helpers handle.
pub const MAX_WIDTH: usize = 8;

/// Interpret `bytes` as an unsigned little-endian integer.
///
/// Byte `i` contributes `bytes[i] << (8 * i)`. Works for any width from 0
/// to 8 bytes (3-byte packed fields appear in the sensor block); bytes past
/// the eighth cannot be represented and are ignored. An empty slice is 0.
pub fn bytes_to_uint(bytes: &[u8]) -> u64 {
    bytes
        .iter()
        .take(MAX_WIDTH)
        .enumerate()
        .fold(0u64, |acc, (i, b)| acc | (u64::from(*b) << (8 * i)))
}

/// Encode `value` as exactly `width` little-endian bytes.
///
/// With `signed` the value is written as two's complement and must lie in
/// `[-2^(8w-1), 2^(8w-1))`; otherwise it must lie in `[0, 2^(8w))`. Values
/// outside the range are rejected rather than truncated.
pub fn int_to_bytes(value: i64, width: usize, signed: bool) -> Result<Vec<u8>> {
    if width == 0 || width > MAX_WIDTH {
        return Err(TlvError::InvalidWidth(width));
    }

    let bits = 8 * width as u32;
    let v = i128::from(value);
    let (min, max) = if signed {
        (-(1i128 << (bits - 1)), (1i128 << (bits - 1)) - 1)
    } else {
        (0, (1i128 << bits) - 1)
    };

    if v < min || v > max {
        return Err(TlvError::IntegerOverflow {
            value,
            width,
            signed,
        });
    }

    Ok(value.to_le_bytes()[..width].to_vec())
}

/// Reinterpret the low `width` bytes of `raw` as a two's complement number.
///
/// A one-byte `0x9C` (156) becomes -100, which is how devices report
/// negative dBm values.
pub fn sign_extend(raw: u64, width: usize) -> i64 {
    if width == 0 || width >= MAX_WIDTH {
        return raw as i64;
    }
    let shift = 64 - 8 * width as u32;
    ((raw << shift) as i64) >> shift
}

/// 16-bit additive checksum: the sum of every byte, modulo 65536.
pub fn checksum(data: &[u8]) -> u16 {
    data.iter()
        .fold(0u16, |acc, b| acc.wrapping_add(u16::from(*b)))
}
