//! Station identity material needed to dial a P2P session.

use crate::error::P2pError;

/// Everything the cloud layer hands over about one station. Immutable for
/// the lifetime of a connection attempt.
#[derive(Debug, Clone)]
pub struct StationIdentity {
    /// Station serial number, used to match sessions back to stations.
    pub serial: String,
    /// Dialing identifier of the form `PREFIX-NUMBER-SUFFIX`.
    pub p2p_did: String,
    /// Per-account discovery key required by the rendezvous lookup.
    pub dsk_key: String,
    /// Acting account id embedded in parameterised command bodies.
    pub actor_id: String,
}

/// A p2p did split into its dialable components.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DidParts {
    prefix: String,
    number: u64,
    suffix: String,
}

impl DidParts {
    /// Split and validate a did before any network traffic happens.
    /// The numeric middle component must fit the five bytes the wire
    /// format reserves for it.
    pub fn parse(did: &str) -> Result<DidParts, P2pError> {
        let malformed = || P2pError::MalformedDid(did.to_string());
        let mut parts = did.split('-');
        let prefix = parts.next().ok_or_else(malformed)?;
        let number = parts.next().ok_or_else(malformed)?;
        let suffix = parts.next().ok_or_else(malformed)?;
        if parts.next().is_some() || prefix.is_empty() || suffix.is_empty() {
            return Err(malformed());
        }
        let number: u64 = number.parse().map_err(|_| malformed())?;
        if number >> 40 != 0 {
            return Err(malformed());
        }
        Ok(DidParts {
            prefix: prefix.to_string(),
            number,
            suffix: suffix.to_string(),
        })
    }

    /// The did as lookup and handshake payloads carry it: prefix ascii,
    /// number as five big-endian bytes, suffix ascii.
    pub fn wire_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.prefix.len() + 5 + self.suffix.len());
        out.extend_from_slice(self.prefix.as_bytes());
        out.extend_from_slice(&self.number.to_be_bytes()[3..]);
        out.extend_from_slice(self.suffix.as_bytes());
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_valid_did() {
        let parts = DidParts::parse("T8010-123456-ABCDE").unwrap();
        assert_eq!(
            parts,
            DidParts {
                prefix: "T8010".to_string(),
                number: 123456,
                suffix: "ABCDE".to_string(),
            }
        );
    }

    #[test]
    fn wire_bytes_layout() {
        let parts = DidParts::parse("T8010-123456-ABCDE").unwrap();
        let bytes = parts.wire_bytes();
        assert_eq!(&bytes[..5], b"T8010");
        assert_eq!(&bytes[5..10], &[0x00, 0x00, 0x01, 0xE2, 0x40]);
        assert_eq!(&bytes[10..], b"ABCDE");
    }

    #[test]
    fn rejects_malformed_dids() {
        for bad in [
            "",
            "T8010",
            "T8010-123456",
            "T8010-123456-ABCDE-EXTRA",
            "T8010-NOTANUMBER-ABCDE",
            "-123456-ABCDE",
            "T8010-123456-",
            "T8010-1099511627776-ABCDE",
        ] {
            assert!(
                matches!(DidParts::parse(bad), Err(P2pError::MalformedDid(_))),
                "accepted {:?}",
                bad
            );
        }
    }

    #[test]
    fn number_at_forty_bit_boundary() {
        let did = format!("T8010-{}-ABCDE", (1u64 << 40) - 1);
        let parts = DidParts::parse(&did).unwrap();
        assert_eq!(parts.wire_bytes()[5..10], [0xFF, 0xFF, 0xFF, 0xFF, 0xFF]);
    }
}
