//! Declarative rule specifications: the document model and its lenient
//! loader.

pub mod loader;
pub mod model;

use thiserror::Error;

pub use loader::{standard_deck, standard_rank_order};
pub use model::{
    BidRules, BonusScore, DeckSpec, FirstLeader, FollowMode, GameEnd, HandSizeRule, LeadRule,
    Policies, RuleSpec, ScorePolicy, SessionEnd, SpecialBid, TrumpPicking, UndertrickTarget,
};

/// Failure to make any sense of a specification document. Field-level
/// problems never produce this; they fall back to defaults instead.
#[derive(Debug, Error)]
pub enum SpecFormatError {
    #[error("specification document is not valid JSON: {0}")]
    Unreadable(#[from] serde_json::Error),
    #[error("specification document root must be a JSON object")]
    NotAnObject,
}
