//! Error taxonomy for the cloud surface and the p2p bootstrap on top of it.

/// Errors surfaced by [`crate::Api`] and the station/device handles.
#[derive(Debug, thiserror::Error)]
pub enum CloudError {
    /// The service rejected the email/password pair, or kept rejecting a
    /// token we just refreshed.
    #[error("the cloud rejected these credentials")]
    InvalidCredentials,
    /// Non-zero business code in an otherwise successful response.
    #[error("cloud request rejected with code {code}: {msg}")]
    Rejected { code: i64, msg: String },
    /// A response that must carry data came back without any.
    #[error("cloud response for {0} carried no data")]
    MissingData(String),
    /// The cloud has no DSK key on record for the station.
    #[error("no dsk key on record for station {0}")]
    MissingDskKey(String),
    /// The station record lacks the fields a p2p session needs.
    #[error("station {0} has no p2p identity on record")]
    MissingP2pIdentity(String),
    #[error("http request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error(transparent)]
    P2p(#[from] eufy_p2p::P2pError),
}
