//! Error taxonomy for discovery, handshake, and established sessions.

use std::time::Duration;

/// Errors surfaced by `connect` and `send_command`. Wire-level anomalies
/// (undecodable datagrams, duplicate sequence numbers) are absorbed where
/// they occur and never reach this enum.
#[derive(Debug, thiserror::Error)]
pub enum P2pError {
    /// Discovery produced no candidate addresses at all.
    #[error("discovery found no addresses for the station")]
    DiscoveryEmpty,
    /// Every discovered candidate failed its handshake.
    #[error("all {0} candidate addresses failed the handshake")]
    AllCandidatesExhausted(usize),
    /// The transport went away under an active session.
    #[error("connection to the station was lost")]
    ConnectionLost,
    /// No acknowledgement arrived within the configured window.
    #[error("command not acknowledged within {0:?}")]
    CommandTimeout(Duration),
    /// The p2p did is not of the PREFIX-NUMBER-SUFFIX form.
    #[error("malformed p2p did: {0:?}")]
    MalformedDid(String),
    #[error(transparent)]
    Encode(#[from] crate::codec::FrameEncodeError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
