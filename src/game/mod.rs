//! The rule-driven turn-taking engine and its supporting types.

pub mod engine;
pub mod entities;
pub mod scoring;
pub mod state;

use thiserror::Error;

use crate::net::TransportError;
use crate::spec::SpecFormatError;

pub use engine::Engine;
pub use entities::{Bid, BidKind, Card, Deck, DeckHandler, Seat, Suit, Table};
pub use state::GameState;

/// Everything that can abort a running session. Rule-violating input from a
/// local seat never surfaces here (the engine re-prompts); from a remote
/// seat there is no way to ask again without desynchronizing the peers, so
/// it is fatal.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Spec(#[from] SpecFormatError),
    #[error("remote seat {seat} made an illegal bid")]
    IllegalBid { seat: usize },
    #[error("remote seat {seat} played an illegal card")]
    IllegalMove { seat: usize },
    #[error("remote seat {seat} broke protocol: {reason}")]
    ProtocolViolation { seat: usize, reason: String },
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("local player input failed: {0}")]
    LocalIo(#[from] std::io::Error),
    #[error("engine misconfigured: {0}")]
    Config(String),
}
