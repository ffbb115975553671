//! Client side of the UDP p2p protocol eufy stations speak.
//!
//! The flow mirrors the vendor app: resolve candidate addresses through
//! the rendezvous servers ([`discovery`]), win a CHECK_CAM handshake
//! against the best candidate, then drive the command channel over
//! acknowledged DATA datagrams ([`session`]). Framing lives in [`codec`],
//! the wire constant tables in [`types`].

pub mod codec;
pub mod demux;
pub mod discovery;
pub mod error;
pub mod identity;
pub mod session;
pub mod types;

pub use codec::{decode_frame, encode_frame, Frame, FrameDecodeError, FrameEncodeError};
pub use demux::{Demux, Link, LinkEvent, LinkSender};
pub use discovery::{DiscoveryConfig, DEFAULT_SEEDS, RENDEZVOUS_PORT};
pub use error::P2pError;
pub use identity::{DidParts, StationIdentity};
pub use session::{CommandEvent, Session, SessionOptions};
pub use types::{CommandType, DataType, InboundTag, OutboundTag};
