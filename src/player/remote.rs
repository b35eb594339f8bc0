use crate::game::entities::{Bid, Card, Suit};
use crate::game::state::GameState;
use crate::game::EngineError;
use crate::net::events::WireEvent;
use crate::net::session::PeerNetwork;
use crate::player::SeatIo;

/// A seat controlled by a peer machine. Bids and moves arrive over that
/// peer's mesh link; everything the engine would show a local player is
/// already known to the peer's own engine, so the send hooks are no-ops.
pub struct RemotePlayer {
    seat: usize,
    name: String,
}

impl RemotePlayer {
    pub fn new(seat: usize, name: impl Into<String>) -> Self {
        Self {
            seat,
            name: name.into(),
        }
    }

    fn violation(&self, reason: impl Into<String>) -> EngineError {
        EngineError::ProtocolViolation {
            seat: self.seat,
            reason: reason.into(),
        }
    }
}

impl SeatIo for RemotePlayer {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_remote(&self) -> bool {
        true
    }

    fn receive_bid(
        &mut self,
        _state: &GameState,
        net: Option<&mut PeerNetwork>,
    ) -> Result<Bid, EngineError> {
        let net = net.ok_or_else(|| {
            EngineError::Config("remote seat polled without a peer network".into())
        })?;
        match net.receive_event(self.seat)? {
            WireEvent::Bid {
                suit,
                value,
                blind,
                doubling,
            } => {
                if value < 0 {
                    return Ok(Bid::pass());
                }
                if doubling {
                    return Ok(Bid::double());
                }
                let suit = match suit {
                    None => None,
                    Some(code) => Some(
                        Suit::from_code(&code)
                            .ok_or_else(|| self.violation(format!("unknown suit '{code}'")))?,
                    ),
                };
                Ok(Bid::offer(value as u32, suit, blind))
            }
            other => Err(self.violation(format!("expected a bid, got {other:?}"))),
        }
    }

    fn receive_move(
        &mut self,
        state: &GameState,
        net: Option<&mut PeerNetwork>,
    ) -> Result<Card, EngineError> {
        let net = net.ok_or_else(|| {
            EngineError::Config("remote seat polled without a peer network".into())
        })?;
        match net.receive_event(self.seat)? {
            WireEvent::Play { suit, rank } => {
                let suit = Suit::from_code(&suit)
                    .ok_or_else(|| self.violation(format!("unknown suit '{suit}'")))?;
                let rank = Card::rank_from_str(&rank, &state.spec.deck.rank_order)
                    .ok_or_else(|| self.violation(format!("unknown rank '{rank}'")))?;
                Ok(Card::new(rank, suit))
            }
            other => Err(self.violation(format!("expected a card, got {other:?}"))),
        }
    }

    fn send_game_state(&mut self, _state: &GameState) {}

    fn send_trick_summary(&mut self, _winning_card: &Card, _winner: &str, _state: &GameState) {}

    fn send_session_winners(&mut self, _winners: &[String]) {}
}
