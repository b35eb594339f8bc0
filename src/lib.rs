//! A rule-driven engine for multiplayer trick-taking card games.
//!
//! The shape of a game lives in a declarative JSON document: deck and
//! rank order, hand sizes, bidding rules, trump selection, scoring, and
//! when hands, games, and the session end. [`spec::RuleSpec`] loads such
//! a document leniently, [`game::Engine`] plays it with any mix of
//! local, computer, and remote seats, and [`net`] establishes the peer
//! mesh that keeps remote engines in lockstep: every machine runs the
//! same deterministic engine from the same seed and only bids and card
//! plays cross the wire.

pub mod game;
pub mod net;
pub mod player;
pub mod spec;

pub use game::engine::Engine;
pub use game::entities::{Bid, Card, Suit};
pub use game::state::GameState;
pub use game::EngineError;
pub use net::{discover_and_join, host_session, join_session, PeerNetwork, WireEvent};
pub use player::{AiPlayer, LocalPlayer, PlayerIo, RemotePlayer, SeatIo};
pub use spec::{RuleSpec, SpecFormatError};
