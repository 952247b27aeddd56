use crate::errors::FrameError;

/// One parsed radio frame, as relayed by the RF12demo sketch on the
/// receiver: node identity plus the raw packed payload, not yet decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedFrame {
    pub node_id: u8,
    pub kind_code: u8,
    pub payload: Vec<u8>,
}

/// Parse a trimmed line received from the central node.
///
/// Example line for a TinyTX temperature node:
///
/// ```text
///       OK 2 3 213 224 46
///          ^ ^ ----------
///     header |     ^
///            |  payload bytes
///         node info
/// ```
///
/// The header byte carries the node id in bits 0-4; bits 5-7 are link-layer
/// flags (CTL/DST/ACK) that the parser ignores. The node-info byte carries
/// the node kind code in bits 0-6; bit 7 is reserved and must be zero.
pub fn parse_line(line: &str) -> Result<DecodedFrame, FrameError> {
    let fields: Vec<&str> = line.split_whitespace().collect();

    if fields.len() < 4 || fields[0] != "OK" {
        return Err(FrameError::MalformedFrame);
    }

    let header = parse_byte(fields[1])?;

    let info = parse_byte(fields[2])?;
    if info & 0x80 != 0 {
        return Err(FrameError::ReservedFieldSet);
    }

    let payload = fields[3..]
        .iter()
        .map(|field| parse_byte(field))
        .collect::<Result<Vec<u8>, _>>()?;

    Ok(DecodedFrame {
        node_id: header & 0x1f,
        kind_code: info & 0x7f,
        payload,
    })
}

fn parse_byte(field: &str) -> Result<u8, FrameError> {
    field
        .parse::<u8>()
        .map_err(|_| FrameError::InvalidByteValue(field.to_string()))
}
