//! Candidate address discovery via rendezvous servers and the local subnet.
//!
//! A station registers itself with a pool of vendor rendezvous servers. A
//! keyed lookup against those servers returns the station's registered
//! addresses, usually one LAN address and one public mapping. When the
//! station's LAN address is already known, a broadcast-style local probe
//! can confirm it without touching the internet.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use log::{debug, trace};
use tokio::time::{timeout, Instant};

use crate::codec::{decode_frame, encode_frame};
use crate::demux::{Demux, LinkEvent};
use crate::error::P2pError;
use crate::identity::DidParts;
use crate::types::{InboundTag, OutboundTag};

/// Port the vendor rendezvous servers listen on.
pub const RENDEZVOUS_PORT: u16 = 32100;

/// Rendezvous server pool baked into the vendor app.
pub const DEFAULT_SEEDS: [Ipv4Addr; 6] = [
    Ipv4Addr::new(34, 235, 4, 153),
    Ipv4Addr::new(54, 153, 101, 7),
    Ipv4Addr::new(18, 223, 127, 200),
    Ipv4Addr::new(54, 223, 148, 206),
    Ipv4Addr::new(18, 197, 212, 165),
    Ipv4Addr::new(13, 251, 222, 7),
];

/// Which servers to ask and how long to wait on each.
#[derive(Debug, Clone)]
pub struct DiscoveryConfig {
    pub seeds: Vec<SocketAddr>,
    pub lookup_timeout: Duration,
}

impl Default for DiscoveryConfig {
    fn default() -> DiscoveryConfig {
        DiscoveryConfig {
            seeds: DEFAULT_SEEDS
                .iter()
                .map(|ip| SocketAddr::from((*ip, RENDEZVOUS_PORT)))
                .collect(),
            lookup_timeout: Duration::from_millis(1500),
        }
    }
}

/// Resolve candidate station addresses, LAN candidates first.
///
/// With a `local_hint` the station is probed directly and the seeds are
/// skipped. The result may be empty; callers decide whether that is fatal.
pub async fn discover(
    demux: &Demux,
    did: &DidParts,
    dsk_key: &str,
    config: &DiscoveryConfig,
    local_hint: Option<SocketAddr>,
) -> Result<Vec<SocketAddr>, P2pError> {
    let raw = match local_hint {
        Some(hint) => local_lookup(demux, hint, config.lookup_timeout).await?,
        None => seed_lookup(demux, did, dsk_key, config).await?,
    };
    Ok(order_candidates(raw))
}

/// Ask a station on the local subnet to confirm it is there.
async fn local_lookup(
    demux: &Demux,
    hint: SocketAddr,
    window: Duration,
) -> Result<Vec<SocketAddr>, P2pError> {
    let frame = encode_frame(OutboundTag::LocalLookup, &[])?;
    let mut link = demux.connect(hint).await;
    link.sender().send(&frame).await?;

    let deadline = Instant::now() + window;
    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return Ok(Vec::new());
        }
        match timeout(remaining, link.event()).await {
            Ok(Some(LinkEvent::Datagram(datagram))) => match decode_frame(&datagram) {
                Ok(frame) if frame.tag == InboundTag::LocalLookupResp => {
                    return Ok(vec![hint]);
                }
                Ok(frame) => trace!("local lookup: ignoring {:?}", frame.tag),
                Err(e) => debug!("local lookup: bad datagram from {}: {}", hint, e),
            },
            Ok(Some(LinkEvent::Closed)) | Ok(None) => return Ok(Vec::new()),
            Err(_) => return Ok(Vec::new()),
        }
    }
}

/// Fan a keyed lookup out to every seed and pool the answers.
async fn seed_lookup(
    demux: &Demux,
    did: &DidParts,
    dsk_key: &str,
    config: &DiscoveryConfig,
) -> Result<Vec<SocketAddr>, P2pError> {
    let local = demux.local_addr()?;
    let local_ip = match local.ip() {
        IpAddr::V4(v4) => v4,
        IpAddr::V6(_) => Ipv4Addr::UNSPECIFIED,
    };
    let payload = lookup_payload(did, local.port(), local_ip, dsk_key);
    let frame = encode_frame(OutboundTag::LookupWithKey, &payload)?;

    let mut handles = Vec::new();
    for seed in &config.seeds {
        handles.push(tokio::spawn(query_seed(
            demux.clone(),
            *seed,
            frame.clone(),
            config.lookup_timeout,
        )));
    }
    let mut found = Vec::new();
    for handle in handles {
        if let Ok(addrs) = handle.await {
            found.extend(addrs);
        }
    }
    Ok(found)
}

/// Collect LOOKUP_ADDR answers from one seed. A seed knows at most two
/// addresses for a station, so two answers end the wait early.
async fn query_seed(
    demux: Demux,
    seed: SocketAddr,
    frame: Vec<u8>,
    window: Duration,
) -> Vec<SocketAddr> {
    let mut link = demux.connect(seed).await;
    if let Err(e) = link.sender().send(&frame).await {
        debug!("lookup send to {} failed: {}", seed, e);
        return Vec::new();
    }

    let mut found = Vec::new();
    let deadline = Instant::now() + window;
    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            break;
        }
        match timeout(remaining, link.event()).await {
            Ok(Some(LinkEvent::Datagram(datagram))) => match decode_frame(&datagram) {
                Ok(f) if f.tag == InboundTag::LookupAddr => {
                    match parse_lookup_addr(&f.payload) {
                        Some(addr) => {
                            trace!("seed {} says station is at {}", seed, addr);
                            found.push(addr);
                            if found.len() >= 2 {
                                break;
                            }
                        }
                        None => debug!("seed {}: short LOOKUP_ADDR payload", seed),
                    }
                }
                Ok(f) => trace!("seed {}: ignoring {:?}", seed, f.tag),
                Err(e) => debug!("seed {}: bad datagram: {}", seed, e),
            },
            Ok(Some(LinkEvent::Closed)) | Ok(None) => break,
            Err(_) => break,
        }
    }
    found
}

/// Keyed lookup body: DID wire form, then our own address for the server
/// to relay, a fixed marker block, and the station's DSK key.
fn lookup_payload(did: &DidParts, local_port: u16, local_ip: Ipv4Addr, dsk_key: &str) -> Vec<u8> {
    let mut p = did.wire_bytes();
    p.extend_from_slice(&[0u8; 5]);
    p.extend_from_slice(&local_port.to_le_bytes());
    let octets = local_ip.octets();
    p.extend_from_slice(&[octets[3], octets[2], octets[1], octets[0]]);
    p.extend_from_slice(&[0, 0, 0, 0, 0, 0, 0, 0, 0x02, 0x04, 0, 0]);
    p.extend_from_slice(dsk_key.as_bytes());
    p.extend_from_slice(&[0u8; 4]);
    p
}

/// LOOKUP_ADDR carries port little-endian at offset 2 and the IPv4
/// octets reversed at offsets 4 through 7.
fn parse_lookup_addr(payload: &[u8]) -> Option<SocketAddr> {
    if payload.len() < 8 {
        return None;
    }
    let port = u16::from_le_bytes([payload[2], payload[3]]);
    let ip = Ipv4Addr::new(payload[7], payload[6], payload[5], payload[4]);
    Some(SocketAddr::from((ip, port)))
}

/// Deduplicate keeping first-seen order, then move LAN addresses to the
/// front so the cheap route is tried before the relayed one.
fn order_candidates(raw: Vec<SocketAddr>) -> Vec<SocketAddr> {
    let mut local = Vec::new();
    let mut remote = Vec::new();
    for addr in raw {
        if local.contains(&addr) || remote.contains(&addr) {
            continue;
        }
        if is_local_addr(&addr) {
            local.push(addr);
        } else {
            remote.push(addr);
        }
    }
    local.extend(remote);
    local
}

fn is_local_addr(addr: &SocketAddr) -> bool {
    match addr.ip() {
        IpAddr::V4(ip) => ip.is_private() || ip.is_loopback() || ip.is_link_local(),
        IpAddr::V6(ip) => ip.is_loopback(),
    }
}
