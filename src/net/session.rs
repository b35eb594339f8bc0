//! Session establishment and the full peer mesh.
//!
//! Seat numbers double as connection roles: every pair of peers has one
//! TCP link. The host is seat 0 and accepts every `Join`; between
//! joiners the lower seat dials the higher one, which accepts the call
//! and learns who it is from the `Peer` greeting. The first joiner
//! therefore dials everyone and the last joiner only accepts. Once each
//! peer has broadcast `Ready` and heard it from all the others, every
//! machine holds an identical roster, rule document, and seed, and the
//! engines run in lockstep.

use log::{info, warn};
use std::io;
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use crate::net::discovery::{self, BeaconHost};
use crate::net::errors::TransportError;
use crate::net::events::{PeerAddr, SessionDescriptor, WireEvent};
use crate::net::utils::{read_prefixed, write_prefixed};

/// An established full mesh. One outgoing stream and one inbox per
/// remote seat; the local seat's slots stay empty.
pub struct PeerNetwork {
    local_seat: usize,
    seed: u64,
    spec_document: String,
    links: Vec<Option<TcpStream>>,
    inboxes: Vec<Option<mpsc::Receiver<WireEvent>>>,
    peers: Vec<PeerAddr>,
}

impl PeerNetwork {
    pub fn local_seat(&self) -> usize {
        self.local_seat
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// The rule document every peer agreed to play, verbatim.
    pub fn spec_document(&self) -> &str {
        &self.spec_document
    }

    pub fn player_count(&self) -> usize {
        self.peers.len()
    }

    /// Sends an event to every connected peer. A failed write drops that
    /// link; the engine will see the loss when it next waits on the seat.
    pub fn broadcast(&mut self, event: &WireEvent) {
        for (seat, link) in self.links.iter_mut().enumerate() {
            if let Some(stream) = link {
                if let Err(e) = write_prefixed(stream, event) {
                    warn!("dropping link to seat {seat}: {e}");
                    *link = None;
                }
            }
        }
    }

    /// Blocks for the next event from one seat.
    pub fn receive_event(&mut self, seat: usize) -> Result<WireEvent, TransportError> {
        let inbox = self
            .inboxes
            .get_mut(seat)
            .and_then(Option::as_mut)
            .ok_or(TransportError::ConnectionLost(seat))?;
        inbox.recv().map_err(|_| TransportError::ConnectionLost(seat))
    }

    fn install(&mut self, seat: usize, stream: TcpStream) -> Result<(), TransportError> {
        let (tx, rx) = mpsc::channel();
        spawn_reader(stream.try_clone().map_err(TransportError::Io)?, seat, tx)?;
        self.links[seat] = Some(stream);
        self.inboxes[seat] = Some(rx);
        Ok(())
    }

    /// Waits for the ready barrier: every other seat announces itself
    /// exactly once.
    fn await_ready(&mut self) -> Result<(), TransportError> {
        for seat in 0..self.peers.len() {
            if seat == self.local_seat {
                continue;
            }
            match self.receive_event(seat)? {
                WireEvent::Ready { player_index } if player_index == seat => {}
                other => {
                    return Err(TransportError::UnexpectedMessage(format!(
                        "waiting for ready from seat {seat}, got {other:?}"
                    )))
                }
            }
        }
        Ok(())
    }
}

/// Hosts a session on an already-bound listener: accepts joiners until
/// the table is full, then hands each one the descriptor and runs the
/// ready barrier. With a label, a discovery beacon announces the session
/// while seats are open. The host always takes seat 0.
pub fn host_session(
    listener: TcpListener,
    label: Option<&str>,
    spec_document: String,
    max_players: usize,
    seed: u64,
) -> Result<PeerNetwork, TransportError> {
    let host_port = listener.local_addr().map_err(TransportError::Io)?.port();
    let beacon = match label {
        Some(label) => Some(
            BeaconHost::spawn(label.to_string(), max_players, host_port)
                .map_err(TransportError::Io)?,
        ),
        None => None,
    };

    let mut net = PeerNetwork {
        local_seat: 0,
        seed,
        spec_document,
        links: vec![None],
        inboxes: vec![None],
        peers: vec![PeerAddr {
            ip: discovery::local_ip(),
            port: host_port,
        }],
    };

    while net.peers.len() < max_players {
        let (mut stream, from) = listener.accept().map_err(TransportError::Io)?;
        match read_prefixed::<_, WireEvent>(&mut stream) {
            Ok(WireEvent::Join { ip, port }) => {
                let seat = net.peers.len();
                info!("seat {seat} joined from {from} (listening on {ip}:{port})");
                net.peers.push(PeerAddr { ip, port });
                net.links.push(None);
                net.inboxes.push(None);
                net.install(seat, stream)?;
                if let Some(beacon) = &beacon {
                    beacon.set_current(net.peers.len());
                }
            }
            Ok(other) => {
                if let Some(beacon) = beacon {
                    beacon.stop();
                }
                return Err(TransportError::UnexpectedMessage(format!(
                    "expected a join from {from}, got {other:?}"
                )));
            }
            Err(e) => {
                warn!("rejected connection from {from}: {e}");
                continue;
            }
        }
    }
    if let Some(beacon) = beacon {
        beacon.stop();
    }

    let descriptor = SessionDescriptor {
        spec: net.spec_document.clone(),
        players: net.peers.clone(),
        seed,
    };
    net.broadcast(&WireEvent::Descriptor(descriptor));
    // Give joiners a moment to finish wiring the mesh among themselves
    // before the ready barrier starts.
    thread::sleep(Duration::from_millis(100));
    net.broadcast(&WireEvent::Ready { player_index: 0 });
    net.await_ready()?;
    Ok(net)
}

/// Joins a session at a known host address. The listener must already be
/// bound so lower-seated joiners can dial us while we set up.
pub fn join_session(
    host: SocketAddr,
    listener: TcpListener,
) -> Result<PeerNetwork, TransportError> {
    let local_port = listener.local_addr().map_err(TransportError::Io)?.port();
    let local_ip = discovery::local_ip();

    let mut host_link = TcpStream::connect(host).map_err(TransportError::Io)?;
    write_prefixed(
        &mut host_link,
        &WireEvent::Join {
            ip: local_ip.clone(),
            port: local_port,
        },
    )
    .map_err(TransportError::Io)?;

    let descriptor = match read_prefixed::<_, WireEvent>(&mut host_link)
        .map_err(TransportError::Io)?
    {
        WireEvent::Descriptor(descriptor) => descriptor,
        other => {
            return Err(TransportError::UnexpectedMessage(format!(
                "expected a session descriptor, got {other:?}"
            )))
        }
    };
    let local_seat = descriptor
        .players
        .iter()
        .position(|p| p.ip == local_ip && p.port == local_port)
        .ok_or(TransportError::NotInRoster)?;
    let player_count = descriptor.players.len();
    info!("joined as seat {local_seat} of {player_count}");

    let mut net = PeerNetwork {
        local_seat,
        seed: descriptor.seed,
        spec_document: descriptor.spec,
        links: (0..player_count).map(|_| None).collect(),
        inboxes: (0..player_count).map(|_| None).collect(),
        peers: descriptor.players,
    };
    net.install(0, host_link)?;

    // Lower-seated joiners dial us; each identifies itself first thing.
    let mut pending = local_seat.saturating_sub(1);
    while pending > 0 {
        let (mut stream, from) = listener.accept().map_err(TransportError::Io)?;
        match read_prefixed::<_, WireEvent>(&mut stream).map_err(TransportError::Io)? {
            WireEvent::Peer { seat } if seat > 0 && seat < local_seat => {
                if net.links[seat].is_some() {
                    return Err(TransportError::UnexpectedMessage(format!(
                        "seat {seat} connected twice"
                    )));
                }
                net.install(seat, stream)?;
                pending -= 1;
            }
            other => {
                return Err(TransportError::UnexpectedMessage(format!(
                    "expected a peer greeting from {from}, got {other:?}"
                )))
            }
        }
    }

    // We dial everyone seated above us.
    for seat in local_seat + 1..player_count {
        let peer = &net.peers[seat];
        let mut stream = TcpStream::connect((peer.ip.as_str(), peer.port))
            .map_err(TransportError::Io)?;
        write_prefixed(&mut stream, &WireEvent::Peer { seat: local_seat })
            .map_err(TransportError::Io)?;
        net.install(seat, stream)?;
    }

    net.broadcast(&WireEvent::Ready {
        player_index: local_seat,
    });
    net.await_ready()?;
    Ok(net)
}

/// Finds a session on the local network by label and joins it.
pub fn discover_and_join(
    label: &str,
    listener: TcpListener,
) -> Result<PeerNetwork, TransportError> {
    let host = discovery::discover(Some(label)).map_err(TransportError::Io)?;
    join_session(host, listener)
}

/// One blocking reader thread per link, forwarding frames into the
/// seat's inbox until the stream closes.
fn spawn_reader(
    mut stream: TcpStream,
    seat: usize,
    tx: mpsc::Sender<WireEvent>,
) -> Result<(), TransportError> {
    thread::Builder::new()
        .name(format!("peer-reader-{seat}"))
        .spawn(move || loop {
            match read_prefixed::<_, WireEvent>(&mut stream) {
                Ok(event) => {
                    if tx.send(event).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    if e.kind() != io::ErrorKind::UnexpectedEof {
                        info!("link from seat {seat} closed: {e}");
                    }
                    break;
                }
            }
        })
        .map_err(TransportError::Io)?;
    Ok(())
}
