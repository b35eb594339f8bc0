//! Peer-to-peer session plumbing: multicast discovery, mesh
//! establishment, and the framed event protocol the engines replay.

pub mod discovery;
pub mod errors;
pub mod events;
pub mod session;
pub mod utils;

pub use errors::TransportError;
pub use events::{PeerAddr, SessionDescriptor, WireEvent};
pub use session::{discover_and_join, host_session, join_session, PeerNetwork};
