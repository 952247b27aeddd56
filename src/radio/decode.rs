use crate::errors::FrameError;

use super::sensors::{NodeKind, Sensor};

/// Unpack a node's payload into raw per-sensor values, in schema order.
///
/// The payload is a little-endian bit stream: byte 0 is least significant,
/// and each sensor occupies `bit_width` bits starting wherever the previous
/// sensor ended, with no padding. Unused high-order bits in the final byte
/// are masked off and never interpreted.
///
/// The payload length must match the kind's schema exactly; on a mismatch no
/// partial result is produced.
pub fn decode_payload(
    kind: NodeKind,
    payload: &[u8],
) -> Result<Vec<(Sensor, u64)>, FrameError> {
    let expected = kind.payload_len();
    if payload.len() != expected {
        return Err(FrameError::UnexpectedPayloadLength {
            expected,
            actual: payload.len(),
        });
    }

    let mut readings = Vec::with_capacity(kind.sensors().len());
    let mut byte_index = 0usize;
    let mut bit_offset = 0u32;

    for &sensor in kind.sensors() {
        let width = sensor.bit_width();
        let consumed = bit_offset + width;
        let bytes_needed = consumed.div_ceil(8) as usize;

        let mut acc = 0u64;
        for i in 0..bytes_needed {
            acc |= (payload[byte_index + i] as u64) << (8 * i);
        }

        let raw = (acc >> bit_offset) & ((1u64 << width) - 1);
        readings.push((sensor, raw));

        byte_index += (consumed / 8) as usize;
        bit_offset = consumed % 8;
    }

    Ok(readings)
}
