//! Connected station sessions: handshake, keepalive, reliable commands.
//!
//! A session owns one demultiplexed link to a station. Outbound commands
//! ride DATA datagrams that the station acknowledges per sequence number;
//! inbound pushes are acknowledged in batches from the keepalive loop and
//! deduplicated against a per-channel watermark before they surface as
//! [`CommandEvent`]s.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicU16, Ordering};
use std::sync::Arc;
use std::time::Duration;

use log::{debug, error, info, trace};
use tokio::sync::{mpsc, oneshot, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{interval, timeout, Instant};

use crate::codec::{decode_frame, encode_frame};
use crate::demux::{Demux, Link, LinkEvent, LinkSender};
use crate::discovery::{discover, DiscoveryConfig};
use crate::error::P2pError;
use crate::identity::{DidParts, StationIdentity};
use crate::types::{CommandType, DataType, InboundTag, OutboundTag};

const KEEPALIVE_TICK: Duration = Duration::from_millis(50);
const PING_EVERY_TICKS: u32 = 20;
const CHECK_CAM_BURST: usize = 4;
const DATA_MAGIC: &[u8; 4] = b"XZYH";
const DEVICE_PING_REPLY_HEAD: [u8; 5] = [0x88, 0x00, 0x00, 0x00, 0x01];
const DEVICE_PING_REPLY_PAD: usize = 141;
const HANDSHAKE_PING_PAYLOAD: [u8; 10] =
    [0x00, 0x00, 0x00, 0x00, 0x01, 0x00, 0xFF, 0x00, 0x00, 0x00];

/// Knobs for establishing a session.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub discovery: DiscoveryConfig,
    /// Known LAN address of the station. Skips the rendezvous servers.
    pub local_hint: Option<SocketAddr>,
    /// How long to wait on each candidate address for CAM_ID.
    pub handshake_timeout: Duration,
    /// How long a sent command may wait for its acknowledgement.
    pub command_timeout: Duration,
}

impl Default for SessionOptions {
    fn default() -> SessionOptions {
        SessionOptions {
            discovery: DiscoveryConfig::default(),
            local_hint: None,
            handshake_timeout: Duration::from_secs(1),
            command_timeout: Duration::from_secs(5),
        }
    }
}

/// A command pushed by the station, stripped of its envelope.
#[derive(Debug, Clone)]
pub struct CommandEvent {
    pub command: CommandType,
    pub payload: Vec<u8>,
}

#[derive(Debug)]
struct Shared {
    sender: LinkSender,
    serial: String,
    actor_id: String,
    next_seq: AtomicU16,
    closed: AtomicBool,
    pending: Mutex<HashMap<u16, oneshot::Sender<()>>>,
    ack_queue: Mutex<HashMap<DataType, Vec<u16>>>,
    seen: Mutex<HashMap<DataType, u16>>,
    command_timeout: Duration,
}

/// A live p2p session with one station.
///
/// Call [`Session::close`] when finished; dropping only stops the
/// background tasks and leaves the goodbye unsent.
#[derive(Debug)]
pub struct Session {
    shared: Arc<Shared>,
    demux: Demux,
    events: mpsc::UnboundedReceiver<CommandEvent>,
    keepalive: JoinHandle<()>,
    driver: JoinHandle<()>,
}

impl Session {
    /// Discover the station and establish a session with it.
    ///
    /// Candidates are tried in order, LAN addresses first; the first one
    /// that answers CHECK_CAM wins.
    pub async fn connect(
        identity: &StationIdentity,
        options: SessionOptions,
    ) -> Result<Session, P2pError> {
        let did = DidParts::parse(&identity.p2p_did)?;
        let demux = Demux::bind().await?;
        let lookup = discover(
            &demux,
            &did,
            &identity.dsk_key,
            &options.discovery,
            options.local_hint,
        )
        .await;
        let candidates = match lookup {
            Ok(candidates) => candidates,
            Err(e) => {
                demux.close().await;
                return Err(e);
            }
        };
        if candidates.is_empty() {
            demux.close().await;
            return Err(P2pError::DiscoveryEmpty);
        }

        let total = candidates.len();
        for candidate in candidates {
            match handshake(&demux, candidate, &did, options.handshake_timeout).await {
                Ok(Some(link)) => return Ok(Session::start(demux, link, identity, &options).await),
                Ok(None) => continue,
                Err(e) => {
                    demux.close().await;
                    return Err(e);
                }
            }
        }
        demux.close().await;
        Err(P2pError::AllCandidatesExhausted(total))
    }

    async fn start(
        demux: Demux,
        link: Link,
        identity: &StationIdentity,
        options: &SessionOptions,
    ) -> Session {
        let shared = Arc::new(Shared {
            sender: link.sender(),
            serial: identity.serial.clone(),
            actor_id: identity.actor_id.clone(),
            next_seq: AtomicU16::new(0),
            closed: AtomicBool::new(false),
            pending: Mutex::new(HashMap::new()),
            ack_queue: Mutex::new(HashMap::new()),
            seen: Mutex::new(HashMap::new()),
            command_timeout: options.command_timeout,
        });
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let keepalive = tokio::spawn(keepalive_loop(shared.clone()));
        let driver = tokio::spawn(drive(link, shared.clone(), events_tx, demux.clone()));
        info!(
            "p2p session with {} established via {}",
            shared.serial,
            shared.sender.peer()
        );

        // The station expects a hello on the command channel before it
        // starts pushing state.
        send_plain(&shared.sender, OutboundTag::Ping).await;
        let hello = shared.clone();
        tokio::spawn(async move {
            let payload = HANDSHAKE_PING_PAYLOAD.to_vec();
            if let Err(e) = send_command_on(&hello, CommandType::CmdPing, payload).await {
                debug!("session hello went unacknowledged: {}", e);
            }
        });

        Session {
            shared,
            demux,
            events: events_rx,
            keepalive,
            driver,
        }
    }

    pub fn serial(&self) -> &str {
        &self.shared.serial
    }

    /// True while this session is alive and belongs to `serial`.
    pub fn valid_for(&self, serial: &str) -> bool {
        !self.shared.closed.load(Ordering::SeqCst) && self.shared.serial == serial
    }

    /// Next command pushed by the station. `None` once the session is down.
    pub async fn next_command(&mut self) -> Option<CommandEvent> {
        self.events.recv().await
    }

    /// Send a raw command body and wait for the station's acknowledgement.
    pub async fn send_command(
        &self,
        command: CommandType,
        payload: Vec<u8>,
    ) -> Result<(), P2pError> {
        send_command_on(&self.shared, command, payload).await
    }

    /// Send a command whose body carries one integer in the string slot.
    pub async fn send_command_with_int_string(
        &self,
        channel: u8,
        command: CommandType,
        value: u8,
    ) -> Result<(), P2pError> {
        let body = int_string_body(channel, value, &self.shared.actor_id);
        send_command_on(&self.shared, command, body).await
    }

    /// Send a command whose body carries one plain integer.
    pub async fn send_command_with_int(
        &self,
        channel: u8,
        command: CommandType,
        value: u8,
    ) -> Result<(), P2pError> {
        let body = int_body(channel, value, &self.shared.actor_id);
        send_command_on(&self.shared, command, body).await
    }

    /// Say goodbye to the station and release the socket. Idempotent.
    pub async fn close(&mut self) {
        if self.shared.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        send_plain(&self.shared.sender, OutboundTag::End).await;
        self.shared.pending.lock().await.clear();
        self.keepalive.abort();
        self.demux.close().await;
        self.driver.abort();
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.keepalive.abort();
        self.driver.abort();
    }
}

/// Knock on one candidate address: a burst of CHECK_CAM probes, then wait
/// for CAM_ID within the window.
async fn handshake(
    demux: &Demux,
    candidate: SocketAddr,
    did: &DidParts,
    window: Duration,
) -> Result<Option<Link>, P2pError> {
    let mut payload = did.wire_bytes();
    payload.extend_from_slice(&[0u8; 3]);
    let frame = encode_frame(OutboundTag::CheckCam, &payload)?;

    let mut link = demux.connect(candidate).await;
    let sender = link.sender();
    for _ in 0..CHECK_CAM_BURST {
        if let Err(e) = sender.send(&frame).await {
            debug!("probe send to {} failed: {}", candidate, e);
            return Ok(None);
        }
    }

    let deadline = Instant::now() + window;
    let answered = loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            break false;
        }
        match timeout(remaining, link.event()).await {
            Ok(Some(LinkEvent::Datagram(datagram))) => match decode_frame(&datagram) {
                Ok(frame) if frame.tag == InboundTag::CamId => break true,
                Ok(frame) => trace!("handshake with {}: ignoring {:?}", candidate, frame.tag),
                Err(e) => debug!("handshake with {}: bad datagram: {}", candidate, e),
            },
            Ok(Some(LinkEvent::Closed)) | Ok(None) => break false,
            Err(_) => break false,
        }
    };
    if answered {
        info!("station answered from {}", candidate);
        Ok(Some(link))
    } else {
        trace!("no answer from {}", candidate);
        Ok(None)
    }
}

/// Best-effort fire of an empty frame. Losing one is handled by the next
/// keepalive tick.
async fn send_plain(sender: &LinkSender, tag: OutboundTag) {
    if let Ok(frame) = encode_frame(tag, &[]) {
        let _ = sender.send(&frame).await;
    }
}

/// 50 ms heartbeat: flush queued acks every tick, ping every twentieth.
async fn keepalive_loop(shared: Arc<Shared>) {
    let mut ticker = interval(KEEPALIVE_TICK);
    let mut tick = 0u32;
    loop {
        ticker.tick().await;
        if shared.closed.load(Ordering::SeqCst) {
            break;
        }
        flush_acks(&shared).await;
        if tick == 0 {
            send_plain(&shared.sender, OutboundTag::Ping).await;
        }
        tick = (tick + 1) % PING_EVERY_TICKS;
    }
}

/// Drain the ack queue, one ACK frame per channel with traffic.
async fn flush_acks(shared: &Shared) {
    let drained: Vec<(DataType, Vec<u16>)> = {
        let mut queue = shared.ack_queue.lock().await;
        DataType::ALL
            .iter()
            .filter_map(|dt| queue.remove(dt).map(|seqs| (*dt, seqs)))
            .collect()
    };
    for (data_type, seqs) in drained {
        let mut payload = data_type.bytes().to_vec();
        payload.extend_from_slice(&(seqs.len() as u16).to_be_bytes());
        for seq in seqs {
            payload.extend_from_slice(&seq.to_be_bytes());
        }
        match encode_frame(OutboundTag::Ack, &payload) {
            Ok(frame) => {
                let _ = shared.sender.send(&frame).await;
            }
            Err(e) => debug!("ack frame for {:?} not sent: {}", data_type, e),
        }
    }
}

/// Pump link events until the link dies or the station says goodbye.
async fn drive(
    mut link: Link,
    shared: Arc<Shared>,
    events: mpsc::UnboundedSender<CommandEvent>,
    demux: Demux,
) {
    while let Some(event) = link.event().await {
        match event {
            LinkEvent::Datagram(datagram) => {
                if handle_datagram(&shared, &events, &datagram).await {
                    demux.close().await;
                }
            }
            LinkEvent::Closed => break,
        }
    }
    connection_down(&shared).await;
}

async fn connection_down(shared: &Shared) {
    shared.closed.store(true, Ordering::SeqCst);
    let mut pending = shared.pending.lock().await;
    if !pending.is_empty() {
        debug!("dropping {} commands still waiting for acks", pending.len());
    }
    pending.clear();
    info!("p2p session with {} is down", shared.serial);
}

/// Returns true when the station asked to end the session.
async fn handle_datagram(
    shared: &Arc<Shared>,
    events: &mpsc::UnboundedSender<CommandEvent>,
    datagram: &[u8],
) -> bool {
    let frame = match decode_frame(datagram) {
        Ok(frame) => frame,
        Err(e) => {
            debug!("undecodable datagram: {}", e);
            return false;
        }
    };
    match frame.tag {
        InboundTag::Pong => {}
        InboundTag::Ping => send_plain(&shared.sender, OutboundTag::Pong).await,
        InboundTag::End => {
            info!("station {} ended the session", shared.serial);
            return true;
        }
        InboundTag::Ack => handle_ack(shared, &frame.payload).await,
        InboundTag::Data => handle_data(shared, events, &frame.payload).await,
        other => trace!("ignoring {:?}", other),
    }
    false
}

/// ACK payload: channel, count big-endian, then that many sequence numbers.
async fn handle_ack(shared: &Shared, payload: &[u8]) {
    if payload.len() < 4 {
        debug!("short ack payload ({} bytes)", payload.len());
        return;
    }
    let count = u16::from_be_bytes([payload[2], payload[3]]) as usize;
    let mut pending = shared.pending.lock().await;
    for i in 0..count {
        let off = 4 + 2 * i;
        let seq = match payload.get(off..off + 2) {
            Some(bytes) => u16::from_be_bytes([bytes[0], bytes[1]]),
            None => break,
        };
        if let Some(waiter) = pending.remove(&seq) {
            let _ = waiter.send(());
        }
    }
}

/// DATA payload: channel, sequence big-endian, magic, then the command
/// envelope. Every datagram gets queued for acknowledgement, duplicates
/// included; only fresh sequence numbers reach the command handler.
async fn handle_data(
    shared: &Arc<Shared>,
    events: &mpsc::UnboundedSender<CommandEvent>,
    payload: &[u8],
) {
    if payload.len() < 8 {
        debug!("short data payload ({} bytes)", payload.len());
        return;
    }
    let data_type = match DataType::from_bytes([payload[0], payload[1]]) {
        Some(data_type) => data_type,
        None => {
            debug!("data on unknown channel {:02x}{:02x}", payload[0], payload[1]);
            return;
        }
    };
    let seq = u16::from_be_bytes([payload[2], payload[3]]);
    shared.ack_queue.lock().await.entry(data_type).or_default().push(seq);
    {
        let mut seen = shared.seen.lock().await;
        if let Some(watermark) = seen.get(&data_type) {
            if seq <= *watermark {
                trace!("duplicate {:?} seq {}", data_type, seq);
                return;
            }
        }
        seen.insert(data_type, seq);
    }
    process_command(shared, events, &payload[8..]).await;
}

/// Command envelope: identifier little-endian, a length word this client
/// does not need, then the body.
async fn process_command(
    shared: &Arc<Shared>,
    events: &mpsc::UnboundedSender<CommandEvent>,
    inner: &[u8],
) {
    if inner.len() < 2 {
        debug!("command envelope too short");
        return;
    }
    let raw = u16::from_le_bytes([inner[0], inner[1]]);
    let command = match CommandType::from_raw(raw) {
        Some(command) => command,
        None => {
            error!("station sent unknown command {}", raw);
            return;
        }
    };
    let body = inner.get(4..).unwrap_or(&[]).to_vec();
    if command == CommandType::CmdGetDevicePing && body.get(6) == Some(&0) {
        // Liveness poll on the command channel; answer in-band so the
        // station keeps the session open.
        let shared = shared.clone();
        tokio::spawn(async move {
            let mut payload = DEVICE_PING_REPLY_HEAD.to_vec();
            payload.extend_from_slice(&[0u8; DEVICE_PING_REPLY_PAD]);
            if let Err(e) = send_command_on(&shared, CommandType::CmdGetDevicePing, payload).await {
                debug!("device ping reply failed: {}", e);
            }
        });
        return;
    }
    let _ = events.send(CommandEvent { command, payload: body });
}

/// Send one command envelope and wait for the station to acknowledge the
/// carrying datagram.
async fn send_command_on(
    shared: &Arc<Shared>,
    command: CommandType,
    payload: Vec<u8>,
) -> Result<(), P2pError> {
    if shared.closed.load(Ordering::SeqCst) {
        return Err(P2pError::ConnectionLost);
    }
    let seq = shared.next_seq.fetch_add(1, Ordering::SeqCst);
    let mut message = DataType::Data.bytes().to_vec();
    message.extend_from_slice(&seq.to_be_bytes());
    message.extend_from_slice(DATA_MAGIC);
    message.extend_from_slice(&command.raw().to_le_bytes());
    message.extend_from_slice(&payload);
    let frame = encode_frame(OutboundTag::Data, &message)?;

    let (tx, rx) = oneshot::channel();
    shared.pending.lock().await.insert(seq, tx);
    if let Err(e) = shared.sender.send(&frame).await {
        shared.pending.lock().await.remove(&seq);
        return Err(P2pError::Io(e));
    }
    trace!("sent {:?} as seq {}", command, seq);
    match timeout(shared.command_timeout, rx).await {
        Ok(Ok(())) => Ok(()),
        Ok(Err(_)) => Err(P2pError::ConnectionLost),
        Err(_) => {
            shared.pending.lock().await.remove(&seq);
            Err(P2pError::CommandTimeout(shared.command_timeout))
        }
    }
}

/// Body shared by commands that carry an integer in their string slot.
/// The device channel is currently ignored by the body layout.
fn int_string_body(_channel: u8, value: u8, actor: &str) -> Vec<u8> {
    let mut body = vec![0x88, 0x00];
    body.extend_from_slice(&[0x00, 0x00, 0x01, 0x00]);
    body.extend_from_slice(&[0u8; 8]);
    body.extend_from_slice(&[value, 0x00, 0x00, 0x00]);
    body.extend_from_slice(actor.as_bytes());
    body.extend_from_slice(&[0u8; 88]);
    body
}

fn int_body(_channel: u8, value: u8, actor: &str) -> Vec<u8> {
    let mut body = vec![0x84, 0x00];
    body.extend_from_slice(&[0x00, 0x00, 0x01, 0x00, 0xFF, 0x00, 0x00, 0x00]);
    body.extend_from_slice(&[value, 0x00, 0x00, 0x00]);
    body.extend_from_slice(actor.as_bytes());
    body.extend_from_slice(&[0u8; 88]);
    body
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::encode_frame_raw;
    use tokio::net::UdpSocket;

    fn identity() -> StationIdentity {
        StationIdentity {
            serial: "T8010FAKE0000001".to_string(),
            p2p_did: "ABCDE-123456-FGHIJ".to_string(),
            dsk_key: "dskdskdsk".to_string(),
            actor_id: "admin".to_string(),
        }
    }

    fn test_options(hint: SocketAddr) -> SessionOptions {
        SessionOptions {
            discovery: DiscoveryConfig {
                seeds: Vec::new(),
                lookup_timeout: Duration::from_millis(500),
            },
            local_hint: Some(hint),
            handshake_timeout: Duration::from_millis(500),
            command_timeout: Duration::from_millis(500),
        }
    }

    /// Serve the local probe and the CHECK_CAM handshake, returning the
    /// client's address once CAM_ID went out.
    async fn answer_handshake(socket: &UdpSocket) -> SocketAddr {
        let mut buf = [0u8; 2048];
        loop {
            let (_, from) = socket.recv_from(&mut buf).await.unwrap();
            match [buf[0], buf[1]] {
                [0xF1, 0x30] => {
                    let resp = encode_frame_raw([0xF1, 0x41], &[]).unwrap();
                    socket.send_to(&resp, from).await.unwrap();
                }
                [0xF1, 0x41] => {
                    let resp = encode_frame_raw([0xF1, 0x42], &[]).unwrap();
                    socket.send_to(&resp, from).await.unwrap();
                    return from;
                }
                _ => {}
            }
        }
    }

    /// Acknowledge one received DATA datagram back to the client.
    async fn ack_data(socket: &UdpSocket, datagram: &[u8], to: SocketAddr) {
        let payload = [
            datagram[4],
            datagram[5],
            0x00,
            0x01,
            datagram[6],
            datagram[7],
        ];
        let frame = encode_frame_raw([0xF1, 0xD1], &payload).unwrap();
        socket.send_to(&frame, to).await.unwrap();
    }

    /// Build a station-side DATA push.
    fn data_push(seq: u16, command: u16, body: &[u8]) -> Vec<u8> {
        let mut payload = vec![0xD1, 0x00];
        payload.extend_from_slice(&seq.to_be_bytes());
        payload.extend_from_slice(b"XZYH");
        payload.extend_from_slice(&command.to_le_bytes());
        payload.extend_from_slice(&[0x00, 0x00]);
        payload.extend_from_slice(body);
        encode_frame_raw([0xF1, 0xD0], &payload).unwrap()
    }

    /// Sequence numbers listed in a received ACK datagram.
    fn ack_seqs(datagram: &[u8]) -> Vec<u8> {
        let count = u16::from_be_bytes([datagram[6], datagram[7]]) as usize;
        (0..count).map(|i| datagram[9 + 2 * i]).collect()
    }

    async fn wait<T>(fut: impl std::future::Future<Output = T>) -> T {
        timeout(Duration::from_secs(5), fut).await.expect("test deadline")
    }

    #[tokio::test]
    async fn connects_through_local_hint() {
        let station = UdpSocket::bind(("127.0.0.1", 0)).await.unwrap();
        let hint = station.local_addr().unwrap();
        tokio::spawn(async move {
            let _client = answer_handshake(&station).await;
            let mut buf = [0u8; 2048];
            loop {
                let (n, from) = station.recv_from(&mut buf).await.unwrap();
                match [buf[0], buf[1]] {
                    [0xF1, 0xD0] => ack_data(&station, &buf[..n], from).await,
                    [0xF1, 0xF0] => break,
                    _ => {}
                }
            }
        });

        let mut session = wait(Session::connect(&identity(), test_options(hint))).await.unwrap();
        assert_eq!(session.serial(), "T8010FAKE0000001");
        assert!(session.valid_for("T8010FAKE0000001"));
        assert!(!session.valid_for("T8010OTHER000002"));
        session.close().await;
        assert!(!session.valid_for("T8010FAKE0000001"));
    }

    #[tokio::test]
    async fn command_resolves_once_acknowledged() {
        let station = UdpSocket::bind(("127.0.0.1", 0)).await.unwrap();
        let hint = station.local_addr().unwrap();
        tokio::spawn(async move {
            answer_handshake(&station).await;
            let mut buf = [0u8; 2048];
            loop {
                let (n, from) = station.recv_from(&mut buf).await.unwrap();
                if [buf[0], buf[1]] == [0xF1, 0xD0] {
                    ack_data(&station, &buf[..n], from).await;
                }
            }
        });

        let mut session = wait(Session::connect(&identity(), test_options(hint))).await.unwrap();
        wait(session.send_command_with_int_string(0, CommandType::CmdSetArming, 1))
            .await
            .unwrap();
        session.close().await;
    }

    #[tokio::test]
    async fn command_without_ack_times_out() {
        let station = UdpSocket::bind(("127.0.0.1", 0)).await.unwrap();
        let hint = station.local_addr().unwrap();
        tokio::spawn(async move {
            answer_handshake(&station).await;
            // Swallow everything; never acknowledge.
            let mut buf = [0u8; 2048];
            loop {
                let _ = station.recv_from(&mut buf).await;
            }
        });

        let mut options = test_options(hint);
        options.command_timeout = Duration::from_millis(200);
        let mut session = wait(Session::connect(&identity(), options)).await.unwrap();
        let err = wait(session.send_command(CommandType::CmdSetDevsOsd, vec![0x02]))
            .await
            .unwrap_err();
        assert!(matches!(err, P2pError::CommandTimeout(_)));
        session.close().await;
    }

    #[tokio::test]
    async fn duplicate_pushes_are_acked_but_not_surfaced() {
        let station = UdpSocket::bind(("127.0.0.1", 0)).await.unwrap();
        let hint = station.local_addr().unwrap();
        let (tally_tx, tally_rx) = oneshot::channel();
        tokio::spawn(async move {
            let client = answer_handshake(&station).await;
            let pushes = [(5u16, "five"), (5, "five"), (6, "six"), (4, "four"), (7, "seven")];
            for (seq, body) in pushes {
                let push = data_push(seq, 1224, body.as_bytes());
                station.send_to(&push, client).await.unwrap();
            }
            let mut tally: HashMap<u8, usize> = HashMap::new();
            let mut buf = [0u8; 2048];
            while tally.values().sum::<usize>() < 5 {
                let (n, from) = station.recv_from(&mut buf).await.unwrap();
                match [buf[0], buf[1]] {
                    [0xF1, 0xD1] => {
                        for seq in ack_seqs(&buf[..n]) {
                            *tally.entry(seq).or_default() += 1;
                        }
                    }
                    [0xF1, 0xD0] => ack_data(&station, &buf[..n], from).await,
                    _ => {}
                }
            }
            let _ = tally_tx.send(tally);
        });

        let mut session = wait(Session::connect(&identity(), test_options(hint))).await.unwrap();
        let mut bodies = Vec::new();
        for _ in 0..3 {
            let event = wait(session.next_command()).await.unwrap();
            assert_eq!(event.command, CommandType::CmdSetArming);
            bodies.push(String::from_utf8(event.payload).unwrap());
        }
        assert_eq!(bodies, vec!["five", "six", "seven"]);

        let tally = wait(tally_rx).await.unwrap();
        assert_eq!(tally.get(&5), Some(&2));
        assert_eq!(tally.get(&6), Some(&1));
        assert_eq!(tally.get(&4), Some(&1));
        assert_eq!(tally.get(&7), Some(&1));
        session.close().await;
    }

    #[tokio::test]
    async fn acks_flush_as_one_frame_per_channel() {
        let scratch = UdpSocket::bind(("127.0.0.1", 0)).await.unwrap();
        let demux = Demux::bind().await.unwrap();
        let link = demux.connect(scratch.local_addr().unwrap()).await;
        let shared = Shared {
            sender: link.sender(),
            serial: "T8010FAKE0000001".to_string(),
            actor_id: "admin".to_string(),
            next_seq: AtomicU16::new(0),
            closed: AtomicBool::new(false),
            pending: Mutex::new(HashMap::new()),
            ack_queue: Mutex::new(HashMap::new()),
            seen: Mutex::new(HashMap::new()),
            command_timeout: Duration::from_millis(500),
        };
        shared
            .ack_queue
            .lock()
            .await
            .insert(DataType::Data, vec![1, 2, 3]);

        flush_acks(&shared).await;

        let mut buf = [0u8; 256];
        let (n, _) = wait(scratch.recv_from(&mut buf)).await.unwrap();
        assert_eq!(
            &buf[..n],
            &[0xF1, 0xD1, 0x00, 0x0A, 0xD1, 0x00, 0x00, 0x03, 0x00, 0x01, 0x00, 0x02, 0x00, 0x03]
        );
        assert!(shared.ack_queue.lock().await.is_empty());
        demux.close().await;
    }

    #[tokio::test]
    async fn sequence_numbers_cover_every_send() {
        let station = UdpSocket::bind(("127.0.0.1", 0)).await.unwrap();
        let hint = station.local_addr().unwrap();
        let (seqs_tx, seqs_rx) = oneshot::channel();
        tokio::spawn(async move {
            answer_handshake(&station).await;
            let mut seqs = Vec::new();
            let mut buf = [0u8; 2048];
            while seqs.len() < 4 {
                let (n, from) = station.recv_from(&mut buf).await.unwrap();
                if [buf[0], buf[1]] == [0xF1, 0xD0] {
                    seqs.push(u16::from_be_bytes([buf[6], buf[7]]));
                    ack_data(&station, &buf[..n], from).await;
                }
            }
            let _ = seqs_tx.send(seqs);
        });

        let mut session = wait(Session::connect(&identity(), test_options(hint))).await.unwrap();
        for value in [0u8, 1, 2] {
            wait(session.send_command_with_int(0, CommandType::CmdDevLedSwitch, value))
                .await
                .unwrap();
        }
        // The session hello takes one sequence number as well.
        let mut seqs = wait(seqs_rx).await.unwrap();
        seqs.sort_unstable();
        assert_eq!(seqs, vec![0, 1, 2, 3]);
        session.close().await;
    }

    #[tokio::test]
    async fn dead_candidate_falls_through_to_live_one() {
        let dead = UdpSocket::bind(("127.0.0.1", 0)).await.unwrap();
        let dead_addr = dead.local_addr().unwrap();
        let live = UdpSocket::bind(("127.0.0.1", 0)).await.unwrap();
        let live_addr = live.local_addr().unwrap();
        tokio::spawn(async move {
            // Keep the dead socket open so probes vanish instead of erroring.
            let mut buf = [0u8; 2048];
            loop {
                let _ = dead.recv_from(&mut buf).await;
            }
        });
        tokio::spawn(async move {
            answer_handshake(&live).await;
            let mut buf = [0u8; 2048];
            loop {
                let (n, from) = live.recv_from(&mut buf).await.unwrap();
                if [buf[0], buf[1]] == [0xF1, 0xD0] {
                    ack_data(&live, &buf[..n], from).await;
                }
            }
        });

        let seed = UdpSocket::bind(("127.0.0.1", 0)).await.unwrap();
        let seed_addr = seed.local_addr().unwrap();
        tokio::spawn(async move {
            let mut buf = [0u8; 2048];
            let (_, from) = seed.recv_from(&mut buf).await.unwrap();
            for addr in [dead_addr, live_addr] {
                let (ip, port) = match addr {
                    SocketAddr::V4(v4) => (v4.ip().octets(), v4.port()),
                    SocketAddr::V6(_) => unreachable!(),
                };
                let mut payload = vec![0x00, 0x00];
                payload.extend_from_slice(&port.to_le_bytes());
                payload.extend_from_slice(&[ip[3], ip[2], ip[1], ip[0]]);
                let frame = encode_frame_raw([0xF1, 0x40], &payload).unwrap();
                seed.send_to(&frame, from).await.unwrap();
            }
        });

        let options = SessionOptions {
            discovery: DiscoveryConfig {
                seeds: vec![seed_addr],
                lookup_timeout: Duration::from_millis(300),
            },
            local_hint: None,
            handshake_timeout: Duration::from_millis(200),
            command_timeout: Duration::from_millis(500),
        };
        let mut session = wait(Session::connect(&identity(), options)).await.unwrap();
        session.close().await;
    }

    #[tokio::test]
    async fn silent_candidates_exhaust_the_attempt() {
        let dead = UdpSocket::bind(("127.0.0.1", 0)).await.unwrap();
        let hint = dead.local_addr().unwrap();
        tokio::spawn(async move {
            // Answer the local probe so the candidate list is nonempty,
            // then go quiet.
            let mut buf = [0u8; 2048];
            let (_, from) = dead.recv_from(&mut buf).await.unwrap();
            let resp = encode_frame_raw([0xF1, 0x41], &[]).unwrap();
            dead.send_to(&resp, from).await.unwrap();
            loop {
                let _ = dead.recv_from(&mut buf).await;
            }
        });

        let mut options = test_options(hint);
        options.handshake_timeout = Duration::from_millis(200);
        let err = wait(Session::connect(&identity(), options)).await.unwrap_err();
        assert!(matches!(err, P2pError::AllCandidatesExhausted(1)));
    }

    #[tokio::test]
    async fn no_candidates_is_its_own_error() {
        let options = SessionOptions {
            discovery: DiscoveryConfig {
                seeds: Vec::new(),
                lookup_timeout: Duration::from_millis(100),
            },
            local_hint: None,
            handshake_timeout: Duration::from_millis(100),
            command_timeout: Duration::from_millis(100),
        };
        let err = wait(Session::connect(&identity(), options)).await.unwrap_err();
        assert!(matches!(err, P2pError::DiscoveryEmpty));
    }

    #[tokio::test]
    async fn station_ping_is_answered_with_pong() {
        let station = UdpSocket::bind(("127.0.0.1", 0)).await.unwrap();
        let hint = station.local_addr().unwrap();
        let (pong_tx, pong_rx) = oneshot::channel();
        tokio::spawn(async move {
            let client = answer_handshake(&station).await;
            let ping = encode_frame_raw([0xF1, 0xE0], &[]).unwrap();
            station.send_to(&ping, client).await.unwrap();
            let mut buf = [0u8; 2048];
            loop {
                let (n, from) = station.recv_from(&mut buf).await.unwrap();
                match [buf[0], buf[1]] {
                    [0xF1, 0xE1] => {
                        let _ = pong_tx.send(());
                        break;
                    }
                    [0xF1, 0xD0] => ack_data(&station, &buf[..n], from).await,
                    _ => {}
                }
            }
        });

        let mut session = wait(Session::connect(&identity(), test_options(hint))).await.unwrap();
        wait(pong_rx).await.unwrap();
        session.close().await;
    }

    #[tokio::test]
    async fn station_goodbye_tears_the_session_down() {
        let station = UdpSocket::bind(("127.0.0.1", 0)).await.unwrap();
        let hint = station.local_addr().unwrap();
        tokio::spawn(async move {
            let client = answer_handshake(&station).await;
            let end = encode_frame_raw([0xF1, 0xF0], &[]).unwrap();
            station.send_to(&end, client).await.unwrap();
            let mut buf = [0u8; 2048];
            loop {
                let _ = station.recv_from(&mut buf).await;
            }
        });

        let mut session = wait(Session::connect(&identity(), test_options(hint))).await.unwrap();
        assert!(wait(session.next_command()).await.is_none());
        let err = wait(session.send_command(CommandType::CmdPing, vec![]))
            .await
            .unwrap_err();
        assert!(matches!(err, P2pError::ConnectionLost));
    }

    #[tokio::test]
    async fn device_ping_poll_is_answered_in_band() {
        let station = UdpSocket::bind(("127.0.0.1", 0)).await.unwrap();
        let hint = station.local_addr().unwrap();
        let (reply_tx, reply_rx) = oneshot::channel();
        tokio::spawn(async move {
            let client = answer_handshake(&station).await;
            // Liveness poll: CMD_GET_DEVICE_PING with a zero marker byte.
            let push = data_push(10, 1152, &[0, 0, 0, 0, 0, 0, 0]);
            station.send_to(&push, client).await.unwrap();
            let mut buf = [0u8; 2048];
            loop {
                let (n, from) = station.recv_from(&mut buf).await.unwrap();
                if [buf[0], buf[1]] != [0xF1, 0xD0] {
                    continue;
                }
                ack_data(&station, &buf[..n], from).await;
                let cmd = u16::from_le_bytes([buf[12], buf[13]]);
                if cmd == 1152 {
                    let _ = reply_tx.send((n, buf[14]));
                    break;
                }
            }
        });

        let mut session = wait(Session::connect(&identity(), test_options(hint))).await.unwrap();
        let (n, first_byte) = wait(reply_rx).await.unwrap();
        // Envelope: 4 header + 2 channel + 2 seq + 4 magic + 2 command
        // + 146 reply bytes.
        assert_eq!(n, 160);
        assert_eq!(first_byte, 0x88);
        session.close().await;
    }
}
