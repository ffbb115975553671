//! Outer framing shared by every datagram: 2-byte tag + 2-byte length + payload.

use crate::types::{InboundTag, OutboundTag};

const HEADER_LEN: usize = 4;
/// The length field is hi/lo byte pair, so payloads cap at 65535 bytes.
const MAX_PAYLOAD_LEN: usize = u16::MAX as usize;

/// One decoded inbound datagram.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub tag: InboundTag,
    pub payload: Vec<u8>,
}

/// Encode a frame: tag pair, payload length as hi/lo bytes, payload.
pub fn encode_frame(tag: OutboundTag, payload: &[u8]) -> Result<Vec<u8>, FrameEncodeError> {
    encode_frame_raw(tag.bytes(), payload)
}

/// Encode with an explicit tag pair. Peers under test use this to speak the
/// response tag set.
pub fn encode_frame_raw(tag: [u8; 2], payload: &[u8]) -> Result<Vec<u8>, FrameEncodeError> {
    if payload.len() > MAX_PAYLOAD_LEN {
        return Err(FrameEncodeError::TooLarge { len: payload.len() });
    }
    let mut out = Vec::with_capacity(HEADER_LEN + payload.len());
    out.extend_from_slice(&tag);
    out.push((payload.len() / 256) as u8);
    out.push((payload.len() % 256) as u8);
    out.extend_from_slice(payload);
    Ok(out)
}

/// Error encoding a frame (payload exceeds the two-byte length field).
#[derive(Debug, thiserror::Error)]
pub enum FrameEncodeError {
    #[error("payload too large for frame: {len} bytes")]
    TooLarge { len: usize },
}

/// Decode one datagram. The length bytes are carried but not enforced:
/// UDP already delimits the payload.
pub fn decode_frame(datagram: &[u8]) -> Result<Frame, FrameDecodeError> {
    if datagram.len() < HEADER_LEN {
        return Err(FrameDecodeError::Truncated {
            len: datagram.len(),
        });
    }
    Ok(Frame {
        tag: InboundTag::from_bytes([datagram[0], datagram[1]]),
        payload: datagram[HEADER_LEN..].to_vec(),
    })
}

/// Error decoding a datagram (shorter than the fixed header).
#[derive(Debug, thiserror::Error)]
pub enum FrameDecodeError {
    #[error("datagram too short: {len} bytes")]
    Truncated { len: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_empty_ping() {
        let frame = encode_frame(OutboundTag::Ping, &[]).unwrap();
        assert_eq!(frame, vec![0xF1, 0xE0, 0x00, 0x00]);
        let decoded = decode_frame(&frame).unwrap();
        assert_eq!(decoded.tag, InboundTag::Ping);
        assert!(decoded.payload.is_empty());
    }

    #[test]
    fn length_bytes_are_hi_lo() {
        let payload = vec![0xAB; 300];
        let frame = encode_frame(OutboundTag::Data, &payload).unwrap();
        assert_eq!(&frame[..2], &[0xF1, 0xD0]);
        assert_eq!(frame[2], 1);
        assert_eq!(frame[3], 44);
        let decoded = decode_frame(&frame).unwrap();
        assert_eq!(decoded.tag, InboundTag::Data);
        assert_eq!(decoded.payload, payload);
    }

    #[test]
    fn max_payload_boundary() {
        let just_fits = vec![0u8; 65535];
        assert!(encode_frame(OutboundTag::Data, &just_fits).is_ok());
        let too_big = vec![0u8; 65536];
        assert!(matches!(
            encode_frame(OutboundTag::Data, &too_big),
            Err(FrameEncodeError::TooLarge { len: 65536 })
        ));
    }

    #[test]
    fn unknown_tag_is_not_an_error() {
        let frame = encode_frame_raw([0xF1, 0x77], b"x").unwrap();
        let decoded = decode_frame(&frame).unwrap();
        assert_eq!(decoded.tag, InboundTag::Unknown([0xF1, 0x77]));
        assert_eq!(decoded.payload, b"x");
    }

    #[test]
    fn truncated_datagram() {
        assert!(matches!(
            decode_frame(&[0xF1, 0xD0]),
            Err(FrameDecodeError::Truncated { len: 2 })
        ));
        assert!(matches!(
            decode_frame(&[]),
            Err(FrameDecodeError::Truncated { len: 0 })
        ));
    }
}
