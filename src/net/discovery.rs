use log::warn;
use std::io;
use std::net::{Ipv4Addr, SocketAddr, UdpSocket};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Multicast group the session beacon is announced on.
pub const MULTICAST_GROUP: Ipv4Addr = Ipv4Addr::new(239, 40, 40, 6);
pub const MULTICAST_PORT: u16 = 1903;
const BEACON_INTERVAL: Duration = Duration::from_secs(1);

/// One beacon datagram, as a colon-separated line:
/// `label:current:wanted:ip:port`. Labels therefore must not contain a
/// colon.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Beacon {
    pub label: String,
    pub current: usize,
    pub wanted: usize,
    pub host_ip: String,
    pub host_port: u16,
}

impl Beacon {
    pub fn encode(&self) -> String {
        format!(
            "{}:{}:{}:{}:{}",
            self.label, self.current, self.wanted, self.host_ip, self.host_port
        )
    }

    pub fn parse(text: &str) -> Option<Self> {
        let parts: Vec<&str> = text.split(':').collect();
        if parts.len() != 5 {
            return None;
        }
        Some(Self {
            label: parts[0].to_string(),
            current: parts[1].parse().ok()?,
            wanted: parts[2].parse().ok()?,
            host_ip: parts[3].to_string(),
            host_port: parts[4].parse().ok()?,
        })
    }

    pub fn host_addr(&self) -> Option<SocketAddr> {
        format!("{}:{}", self.host_ip, self.host_port).parse().ok()
    }
}

/// Background announcer run by a session host while seats are open.
pub struct BeaconHost {
    stop: Arc<AtomicBool>,
    current: Arc<AtomicUsize>,
    handle: thread::JoinHandle<()>,
}

impl BeaconHost {
    /// Starts announcing `label` once a second until stopped or until the
    /// advertised player count reaches `wanted`.
    pub fn spawn(label: String, wanted: usize, host_port: u16) -> io::Result<Self> {
        let socket = UdpSocket::bind("0.0.0.0:0")?;
        let stop = Arc::new(AtomicBool::new(false));
        let current = Arc::new(AtomicUsize::new(1));
        let host_ip = local_ip();
        let handle = thread::Builder::new().name("beacon".to_string()).spawn({
            let stop = Arc::clone(&stop);
            let current = Arc::clone(&current);
            move || {
                while !stop.load(Ordering::Relaxed) {
                    let beacon = Beacon {
                        label: label.clone(),
                        current: current.load(Ordering::Relaxed),
                        wanted,
                        host_ip: host_ip.clone(),
                        host_port,
                    };
                    let payload = beacon.encode();
                    if let Err(e) =
                        socket.send_to(payload.as_bytes(), (MULTICAST_GROUP, MULTICAST_PORT))
                    {
                        warn!("beacon send failed: {e}");
                    }
                    thread::sleep(BEACON_INTERVAL);
                }
            }
        })?;
        Ok(Self {
            stop,
            current,
            handle,
        })
    }

    /// Updates the player count the beacon advertises.
    pub fn set_current(&self, current: usize) {
        self.current.store(current, Ordering::Relaxed);
    }

    pub fn stop(self) {
        self.stop.store(true, Ordering::Relaxed);
        let _ = self.handle.join();
    }
}

/// Listens on the multicast group until a beacon for a joinable session
/// appears, and returns the host's TCP endpoint. With a label, only that
/// session matches; without one, the first open session wins. Blocks
/// indefinitely if nothing is announcing.
pub fn discover(label: Option<&str>) -> io::Result<SocketAddr> {
    let socket = UdpSocket::bind(("0.0.0.0", MULTICAST_PORT))?;
    socket.join_multicast_v4(&MULTICAST_GROUP, &Ipv4Addr::UNSPECIFIED)?;
    let mut buf = [0u8; 512];
    loop {
        let (n, _) = socket.recv_from(&mut buf)?;
        let Ok(text) = std::str::from_utf8(&buf[..n]) else {
            continue;
        };
        let Some(beacon) = Beacon::parse(text.trim()) else {
            continue;
        };
        if let Some(wanted) = label {
            if beacon.label != wanted {
                continue;
            }
        }
        if beacon.current >= beacon.wanted {
            continue;
        }
        if let Some(addr) = beacon.host_addr() {
            return Ok(addr);
        }
    }
}

/// The address other machines on the local network can reach us at. The
/// socket is never written to; connecting only selects the outbound
/// interface.
pub fn local_ip() -> String {
    let probe = || -> io::Result<String> {
        let socket = UdpSocket::bind("0.0.0.0:0")?;
        socket.connect((MULTICAST_GROUP, MULTICAST_PORT))?;
        Ok(socket.local_addr()?.ip().to_string())
    };
    probe().unwrap_or_else(|_| "127.0.0.1".to_string())
}
