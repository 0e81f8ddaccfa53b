//! Message codec for channel framing
//!
//! Frames are a 4-byte big-endian length prefix followed by a JSON
//! document. A frame is consumed from the buffer before it is parsed,
//! so a malformed frame surfaces as a `CodecError::Json` without
//! wedging the stream; decoding continues at the next frame.

use bytes::{Buf, BufMut, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use crate::messages::{Command, Reply};

/// Maximum message size (1 MB)
const MAX_MESSAGE_SIZE: usize = 1024 * 1024;

/// Protocol codec error
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Message too large: {size} bytes (max {max})")]
    MessageTooLarge { size: usize, max: usize },
}

/// Codec for Command (encoding) and Reply (decoding)
/// Used by the tab side
pub struct TabCodec;

impl TabCodec {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TabCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for TabCodec {
    type Item = Reply;
    type Error = CodecError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        decode_message(src)
    }
}

impl Encoder<Command> for TabCodec {
    type Error = CodecError;

    fn encode(&mut self, item: Command, dst: &mut BytesMut) -> Result<(), Self::Error> {
        encode_message(&item, dst)
    }
}

/// Codec for Reply (encoding) and Command (decoding)
/// Used by the broker side
pub struct BrokerCodec;

impl BrokerCodec {
    pub fn new() -> Self {
        Self
    }
}

impl Default for BrokerCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for BrokerCodec {
    type Item = Command;
    type Error = CodecError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        decode_message(src)
    }
}

impl Encoder<Reply> for BrokerCodec {
    type Error = CodecError;

    fn encode(&mut self, item: Reply, dst: &mut BytesMut) -> Result<(), Self::Error> {
        encode_message(&item, dst)
    }
}

/// Decode a length-prefixed JSON message
fn decode_message<T: serde::de::DeserializeOwned>(
    src: &mut BytesMut,
) -> Result<Option<T>, CodecError> {
    // Need at least 4 bytes for length prefix
    if src.len() < 4 {
        return Ok(None);
    }

    // Peek at length without consuming
    let len = u32::from_be_bytes([src[0], src[1], src[2], src[3]]) as usize;

    // Validate message size
    if len > MAX_MESSAGE_SIZE {
        return Err(CodecError::MessageTooLarge {
            size: len,
            max: MAX_MESSAGE_SIZE,
        });
    }

    // Check if we have the full message
    if src.len() < 4 + len {
        // Reserve space for the rest of the message
        src.reserve(4 + len - src.len());
        return Ok(None);
    }

    // Consume length prefix and frame before parsing, so a bad frame
    // does not block the ones behind it
    src.advance(4);
    let data = src.split_to(len);

    let msg: T = serde_json::from_slice(&data)?;
    Ok(Some(msg))
}

/// Encode a length-prefixed JSON message
fn encode_message<T: serde::Serialize>(item: &T, dst: &mut BytesMut) -> Result<(), CodecError> {
    let data = serde_json::to_vec(item)?;

    if data.len() > MAX_MESSAGE_SIZE {
        return Err(CodecError::MessageTooLarge {
            size: data.len(),
            max: MAX_MESSAGE_SIZE,
        });
    }

    dst.reserve(4 + data.len());
    dst.put_u32(data.len() as u32);
    dst.put_slice(&data);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_command_roundtrip() {
        let mut tab_codec = TabCodec::new();
        let mut broker_codec = BrokerCodec::new();

        let msg = Command::UpdateWebsocket { is_active: true };

        let mut buf = BytesMut::new();
        tab_codec.encode(msg.clone(), &mut buf).unwrap();

        let decoded = broker_codec.decode(&mut buf).unwrap().unwrap();
        assert_eq!(msg, decoded);
    }

    #[test]
    fn test_reply_roundtrip() {
        let mut broker_codec = BrokerCodec::new();
        let mut tab_codec = TabCodec::new();

        let msg = Reply::Relay {
            message: json!({ "event": "refresh" }),
        };

        let mut buf = BytesMut::new();
        broker_codec.encode(msg.clone(), &mut buf).unwrap();

        let decoded = tab_codec.decode(&mut buf).unwrap().unwrap();
        assert_eq!(msg, decoded);
    }

    #[test]
    fn test_all_command_variants_roundtrip() {
        let mut tab_codec = TabCodec::new();
        let mut broker_codec = BrokerCodec::new();

        let messages = vec![
            Command::CheckWebsocket,
            Command::UpdateWebsocket { is_active: true },
            Command::UpdateWebsocket { is_active: false },
            Command::SendMessagesTabs(json!("hello")),
            Command::SendMessagesTabs(json!({ "a": [1, 2, 3] })),
            Command::DeletePort,
        ];

        for msg in messages {
            let mut buf = BytesMut::new();
            tab_codec.encode(msg.clone(), &mut buf).unwrap();
            let decoded = broker_codec.decode(&mut buf).unwrap().unwrap();
            assert_eq!(msg, decoded);
        }
    }

    #[test]
    fn test_partial_message() {
        let mut tab_codec = TabCodec::new();
        let mut broker_codec = BrokerCodec::new();

        let msg = Command::CheckWebsocket;

        let mut buf = BytesMut::new();
        tab_codec.encode(msg, &mut buf).unwrap();

        // Split buffer to simulate partial read
        let mut partial = buf.split_to(2);

        // Should return None for partial message
        assert!(broker_codec.decode(&mut partial).unwrap().is_none());

        // Add rest of message
        partial.unsplit(buf);

        // Now should decode
        assert!(broker_codec.decode(&mut partial).unwrap().is_some());
    }

    #[test]
    fn test_multiple_messages_in_buffer() {
        let mut tab_codec = TabCodec::new();
        let mut broker_codec = BrokerCodec::new();

        let msg1 = Command::CheckWebsocket;
        let msg2 = Command::SendMessagesTabs(json!("one"));
        let msg3 = Command::DeletePort;

        let mut buf = BytesMut::new();
        tab_codec.encode(msg1.clone(), &mut buf).unwrap();
        tab_codec.encode(msg2.clone(), &mut buf).unwrap();
        tab_codec.encode(msg3.clone(), &mut buf).unwrap();

        assert_eq!(broker_codec.decode(&mut buf).unwrap().unwrap(), msg1);
        assert_eq!(broker_codec.decode(&mut buf).unwrap().unwrap(), msg2);
        assert_eq!(broker_codec.decode(&mut buf).unwrap().unwrap(), msg3);

        // Buffer should be empty now
        assert!(broker_codec.decode(&mut buf).unwrap().is_none());
    }

    #[test]
    fn test_message_too_large_on_decode() {
        let mut broker_codec = BrokerCodec::new();
        let mut buf = BytesMut::new();

        // Write a length that exceeds MAX_MESSAGE_SIZE
        let huge_size: u32 = (MAX_MESSAGE_SIZE + 1) as u32;
        buf.put_u32(huge_size);

        let result = broker_codec.decode(&mut buf);
        assert!(matches!(result, Err(CodecError::MessageTooLarge { .. })));
    }

    #[test]
    fn test_malformed_frame_is_skipped() {
        let mut tab_codec = TabCodec::new();
        let mut broker_codec = BrokerCodec::new();

        // Frame 1: a valid envelope with an unrecognized command
        let bad = br#"{"cmd":"NOT-A-COMMAND"}"#;
        let mut buf = BytesMut::new();
        buf.put_u32(bad.len() as u32);
        buf.put_slice(bad);

        // Frame 2: a valid command behind it
        tab_codec.encode(Command::CheckWebsocket, &mut buf).unwrap();

        // The bad frame errors but is consumed
        let result = broker_codec.decode(&mut buf);
        assert!(matches!(result, Err(CodecError::Json(_))));

        // The next frame decodes normally
        let decoded = broker_codec.decode(&mut buf).unwrap().unwrap();
        assert_eq!(decoded, Command::CheckWebsocket);
    }

    #[test]
    fn test_empty_buffer_decodes_none() {
        let mut broker_codec = BrokerCodec::new();
        let mut buf = BytesMut::new();
        assert!(broker_codec.decode(&mut buf).unwrap().is_none());
    }
}
