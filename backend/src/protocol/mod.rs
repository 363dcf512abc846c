//! Wire protocol of the command transport.
//!
//! Shared by the users service listener (`inbound::command`) and the gateway's
//! TCP client (`outbound::transport`).

pub mod codec;
pub mod envelope;

pub use codec::{FrameError, MAX_FRAME_LENGTH, decode, encode, frame_codec, framed};
pub use envelope::{CommandFrame, ReplyFrame, WireError};
