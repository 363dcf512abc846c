//! Framing for the command transport: a 4-byte big-endian length prefix
//! followed by a UTF-8 JSON document.

use bytes::Bytes;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_util::codec::{Framed, LengthDelimitedCodec};

/// Upper bound on a single frame body.
pub const MAX_FRAME_LENGTH: usize = 8 * 1024 * 1024;

/// Errors raised while turning frames into envelopes and back.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The frame body is not the expected JSON document.
    #[error("malformed frame: {0}")]
    Malformed(#[from] serde_json::Error),
    /// The underlying stream failed or delivered an oversized frame.
    #[error("frame transport failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Length-prefixed codec shared by both ends of the transport.
pub fn frame_codec() -> LengthDelimitedCodec {
    LengthDelimitedCodec::builder()
        .length_field_length(4)
        .big_endian()
        .max_frame_length(MAX_FRAME_LENGTH)
        .new_codec()
}

/// Wrap a byte stream in the command framing.
pub fn framed<T>(io: T) -> Framed<T, LengthDelimitedCodec>
where
    T: AsyncRead + AsyncWrite,
{
    Framed::new(io, frame_codec())
}

/// Serialise an envelope into a frame body.
pub fn encode<T: Serialize>(envelope: &T) -> Result<Bytes, FrameError> {
    Ok(Bytes::from(serde_json::to_vec(envelope)?))
}

/// Parse a frame body into an envelope.
pub fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T, FrameError> {
    Ok(serde_json::from_slice(body)?)
}
