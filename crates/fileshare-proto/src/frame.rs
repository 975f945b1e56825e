//! Complete wire frame: header plus payload bytes.

use bytes::{Bytes, BytesMut};

use crate::{
    error::{ProtocolError, Result},
    header::FrameHeader,
};

/// One decoded wire frame: a command byte and its payload.
///
/// The payload is either UTF-8 JSON or raw binary depending on the command
/// (see [`crate::Opcode`]); `Frame` itself is agnostic to which.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// The frame's command byte.
    pub command: u8,
    /// Raw payload bytes, exactly `header.length` long.
    pub payload: Bytes,
}

impl Frame {
    /// Build a frame from a command and owned/borrowed payload bytes.
    ///
    /// # Panics
    ///
    /// Panics if `payload.len()` does not fit in a `u32`. In practice this
    /// cannot happen: callers are bound by [`FrameHeader::MAX_PAYLOAD_SIZE`]
    /// well before reaching `u32::MAX`.
    #[must_use]
    pub fn new(command: u8, payload: impl Into<Bytes>) -> Self {
        let payload = payload.into();
        Self { command, payload }
    }

    /// Encode this frame to its wire representation: header followed by payload.
    ///
    /// # Errors
    ///
    /// [`ProtocolError::PayloadTooLarge`] if the payload exceeds the protocol
    /// maximum.
    pub fn encode(&self) -> Result<Vec<u8>> {
        let len = u32::try_from(self.payload.len()).map_err(|_| ProtocolError::PayloadTooLarge {
            size: self.payload.len(),
            max: FrameHeader::MAX_PAYLOAD_SIZE as usize,
        })?;

        if len > FrameHeader::MAX_PAYLOAD_SIZE {
            return Err(ProtocolError::PayloadTooLarge {
                size: len as usize,
                max: FrameHeader::MAX_PAYLOAD_SIZE as usize,
            });
        }

        let header = FrameHeader::new(self.command, len);
        let mut out = Vec::with_capacity(FrameHeader::SIZE + self.payload.len());
        out.extend_from_slice(&header.to_bytes());
        out.extend_from_slice(&self.payload);
        Ok(out)
    }

    /// Decode a frame from a buffer that holds at least one full frame.
    ///
    /// Only the leading `FrameHeader::SIZE + header.length` bytes of `bytes`
    /// are consumed; trailing bytes (the start of the next frame) are
    /// ignored.
    ///
    /// # Errors
    ///
    /// Propagates [`FrameHeader::from_bytes`] errors, plus
    /// [`ProtocolError::ShortRead`] if the payload itself is truncated.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let header = FrameHeader::from_bytes(bytes)?;
        let end = FrameHeader::SIZE + header.length as usize;

        if bytes.len() < end {
            return Err(ProtocolError::ShortRead {
                expected: header.length as usize,
                actual: bytes.len() - FrameHeader::SIZE,
            });
        }

        let mut payload = BytesMut::with_capacity(header.length as usize);
        payload.extend_from_slice(&bytes[FrameHeader::SIZE..end]);

        Ok(Self { command: header.command, payload: payload.freeze() })
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn round_trip_empty_payload() {
        let frame = Frame::new(0x01, Bytes::new());
        let wire = frame.encode().expect("encode");
        assert_eq!(Frame::decode(&wire).expect("decode"), frame);
    }

    #[test]
    fn round_trip_with_payload() {
        let frame = Frame::new(0x21, Bytes::from_static(b"hello"));
        let wire = frame.encode().expect("encode");
        let decoded = Frame::decode(&wire).expect("decode");
        assert_eq!(decoded, frame);
    }

    #[test]
    fn rejects_truncated_payload() {
        let frame = Frame::new(0x21, Bytes::from_static(b"hello"));
        let mut wire = frame.encode().expect("encode");
        wire.truncate(wire.len() - 2);
        assert!(matches!(Frame::decode(&wire), Err(ProtocolError::ShortRead { .. })));
    }

    #[test]
    fn rejects_oversized_payload_on_encode() {
        // Header length field itself can't represent more than u32::MAX, but
        // the protocol maximum is far smaller; a payload one byte over the
        // limit must be rejected before it reaches the wire.
        let huge = vec![0u8; (FrameHeader::MAX_PAYLOAD_SIZE as usize) + 1];
        let frame = Frame::new(0x20, huge);
        assert!(matches!(frame.encode(), Err(ProtocolError::PayloadTooLarge { .. })));
    }

    proptest! {
        #[test]
        fn frame_round_trip(command in any::<u8>(), payload in prop::collection::vec(any::<u8>(), 0..4096)) {
            let frame = Frame::new(command, payload);
            let wire = frame.encode().expect("encode");
            let decoded = Frame::decode(&wire).expect("decode");
            prop_assert_eq!(decoded, frame);
        }
    }
}
