//! One UDP socket fanned out to per-address handlers.
//!
//! Discovery and handshake traffic for a connection attempt share a single
//! socket. Inbound datagrams route by source address; datagrams from
//! unregistered sources are dropped. Socket loss is announced to every
//! registered link exactly once.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::{debug, trace};
use tokio::net::UdpSocket;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;

/// Events delivered to a registered link.
#[derive(Debug)]
pub enum LinkEvent {
    /// A datagram from the link's peer address.
    Datagram(Vec<u8>),
    /// The shared socket is gone. Delivered at most once per link.
    Closed,
}

type LinkMap = Arc<Mutex<HashMap<SocketAddr, mpsc::UnboundedSender<LinkEvent>>>>;

/// Address-keyed router over one UDP socket. Cheap to clone; all clones
/// share the socket and registration table.
#[derive(Debug, Clone)]
pub struct Demux {
    socket: Arc<UdpSocket>,
    links: LinkMap,
    closed: Arc<AtomicBool>,
    recv_task: Arc<Mutex<Option<JoinHandle<()>>>>,
}

/// Send half of a registered link. Cheap to clone.
#[derive(Debug, Clone)]
pub struct LinkSender {
    socket: Arc<UdpSocket>,
    closed: Arc<AtomicBool>,
    peer: SocketAddr,
}

/// A registration for one peer address: its event stream plus a sender
/// aimed at the peer.
pub struct Link {
    sender: LinkSender,
    events: mpsc::UnboundedReceiver<LinkEvent>,
}

impl Demux {
    /// Bind a fresh wildcard socket and start routing.
    pub async fn bind() -> std::io::Result<Demux> {
        let socket = Arc::new(UdpSocket::bind(("0.0.0.0", 0)).await?);
        let links: LinkMap = Arc::new(Mutex::new(HashMap::new()));
        let closed = Arc::new(AtomicBool::new(false));
        let task = tokio::spawn(recv_loop(socket.clone(), links.clone(), closed.clone()));
        Ok(Demux {
            socket,
            links,
            closed,
            recv_task: Arc::new(Mutex::new(Some(task))),
        })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    /// Register a handler for `peer`, replacing any previous registration.
    /// The returned link is ready immediately; the caller may send its first
    /// datagram without waiting. Connecting on a closed demux yields a link
    /// whose first event is `Closed`.
    pub async fn connect(&self, peer: SocketAddr) -> Link {
        let (tx, rx) = mpsc::unbounded_channel();
        {
            let mut links = self.links.lock().await;
            if self.closed.load(Ordering::SeqCst) {
                let _ = tx.send(LinkEvent::Closed);
            } else {
                links.insert(peer, tx);
            }
        }
        Link {
            sender: LinkSender {
                socket: self.socket.clone(),
                closed: self.closed.clone(),
                peer,
            },
            events: rx,
        }
    }

    /// Tear the socket down and notify every registered link. Idempotent.
    pub async fn close(&self) {
        close_links(&self.links, &self.closed).await;
        if let Some(task) = self.recv_task.lock().await.take() {
            task.abort();
        }
    }
}

impl LinkSender {
    pub fn peer(&self) -> SocketAddr {
        self.peer
    }

    /// Fire one datagram at the peer.
    pub async fn send(&self, datagram: &[u8]) -> std::io::Result<()> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(std::io::Error::new(
                std::io::ErrorKind::NotConnected,
                "demux closed",
            ));
        }
        self.socket.send_to(datagram, self.peer).await?;
        Ok(())
    }
}

impl Link {
    pub fn peer(&self) -> SocketAddr {
        self.sender.peer
    }

    pub fn sender(&self) -> LinkSender {
        self.sender.clone()
    }

    /// Next event for this link. `None` once the stream has ended, which
    /// happens after `Closed` or when another registration replaced this one.
    pub async fn event(&mut self) -> Option<LinkEvent> {
        self.events.recv().await
    }
}

async fn recv_loop(socket: Arc<UdpSocket>, links: LinkMap, closed: Arc<AtomicBool>) {
    let mut buf = vec![0u8; 65536];
    loop {
        match socket.recv_from(&mut buf).await {
            Ok((n, from)) => {
                let mut links = links.lock().await;
                let stale = match links.get(&from) {
                    Some(tx) => tx.send(LinkEvent::Datagram(buf[..n].to_vec())).is_err(),
                    None => {
                        trace!("dropping datagram from unregistered {}", from);
                        false
                    }
                };
                if stale {
                    links.remove(&from);
                }
            }
            Err(e) => {
                debug!("socket receive failed: {}", e);
                break;
            }
        }
    }
    close_links(&links, &closed).await;
}

/// Broadcast `Closed` to all registered links, once across all callers.
async fn close_links(links: &LinkMap, closed: &AtomicBool) {
    if closed.swap(true, Ordering::SeqCst) {
        return;
    }
    let mut links = links.lock().await;
    for (_, tx) in links.drain() {
        let _ = tx.send(LinkEvent::Closed);
    }
}
