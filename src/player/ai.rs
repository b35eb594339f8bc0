use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::game::entities::{Bid, BidKind, Card, Suit};
use crate::game::state::GameState;
use crate::game::EngineError;
use crate::net::session::PeerNetwork;
use crate::player::SeatIo;

/// A naive stand-in player: bids one over the auction floor and plays a
/// uniformly random card. It makes no legality pre-check beyond the floor;
/// the engine's validation loop is its safety net.
pub struct AiPlayer {
    seat: usize,
    name: String,
    rng: ChaCha8Rng,
}

impl AiPlayer {
    pub fn new(seat: usize, name: impl Into<String>, seed: u64) -> Self {
        Self {
            seat,
            name: name.into(),
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    fn random_bid_suit(&mut self, state: &GameState) -> Option<Suit> {
        let ranking = state
            .spec
            .bid_rules
            .as_ref()
            .and_then(|r| r.suit_bid_rank.as_ref())?;
        if ranking.is_empty() {
            return None;
        }
        Some(ranking[self.rng.gen_range(0..ranking.len())])
    }
}

impl SeatIo for AiPlayer {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_remote(&self) -> bool {
        false
    }

    fn receive_bid(
        &mut self,
        state: &GameState,
        _net: Option<&mut PeerNetwork>,
    ) -> Result<Bid, EngineError> {
        let rules = state
            .spec
            .bid_rules
            .as_ref()
            .ok_or_else(|| EngineError::Config("bid requested without bid rules".into()))?;
        let blind = !state.seats[self.seat].seen_cards;

        if rules.ascending_bid {
            let previous = state.seats[state.seat_before(self.seat)].bid.as_ref();
            if let Some(previous) = previous {
                // Nothing left to raise, or the auction is winding down:
                // fold.
                if state.auction_floor >= rules.max_bid || previous.kind == BidKind::Pass {
                    return Ok(Bid::pass());
                }
                let suit = self.random_bid_suit(state);
                return Ok(Bid::offer(state.auction_floor + 1, suit, blind));
            }
        }

        let value = (state.auction_floor + 1).min(rules.max_bid);
        let suit = self.random_bid_suit(state);
        Ok(Bid::offer(value, suit, blind))
    }

    fn receive_move(
        &mut self,
        state: &GameState,
        _net: Option<&mut PeerNetwork>,
    ) -> Result<Card, EngineError> {
        let hand = &state.seats[self.seat].hand;
        if hand.is_empty() {
            return Err(EngineError::Config(format!(
                "seat {} asked to move with an empty hand",
                self.seat
            )));
        }
        Ok(hand[self.rng.gen_range(0..hand.len())])
    }

    fn send_game_state(&mut self, _state: &GameState) {}

    fn send_trick_summary(&mut self, _winning_card: &Card, _winner: &str, _state: &GameState) {}

    fn send_session_winners(&mut self, _winners: &[String]) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::entities::Seat;
    use crate::spec::RuleSpec;
    use serde_json::json;
    use std::sync::Arc;

    fn state_with_bids() -> GameState {
        let doc = json!({
            "players": 2,
            "bid": {
                "ascendingBid": true,
                "canPass": true,
                "minBid": 1,
                "maxBid": 5,
                "suitBidRank": ["CLUBS", "SPADES"]
            }
        });
        let spec = Arc::new(RuleSpec::from_value(&doc).unwrap());
        let seats = (0..2).map(|i| Seat::new(i, format!("p{i}"), false)).collect();
        GameState::new(spec, seats, 1, false)
    }

    #[test]
    fn raises_the_auction_floor_by_one() {
        let mut state = state_with_bids();
        state.auction_floor = 2;
        state.seats[1].bid = Some(Bid::offer(2, None, false));
        let mut ai = AiPlayer::new(0, "bot", 7);
        let bid = ai.receive_bid(&state, None).unwrap();
        assert_eq!(bid.kind, BidKind::Bid);
        assert_eq!(bid.value, 3);
    }

    #[test]
    fn passes_when_the_floor_is_at_the_ceiling_or_after_a_pass() {
        let mut state = state_with_bids();
        state.auction_floor = 5;
        state.seats[1].bid = Some(Bid::offer(5, None, false));
        let mut ai = AiPlayer::new(0, "bot", 7);
        assert_eq!(ai.receive_bid(&state, None).unwrap().kind, BidKind::Pass);

        state.auction_floor = 2;
        state.seats[1].bid = Some(Bid::pass());
        assert_eq!(ai.receive_bid(&state, None).unwrap().kind, BidKind::Pass);
    }

    #[test]
    fn plays_a_card_it_holds() {
        let mut state = state_with_bids();
        state.seats[0].hand = vec![Card::new(0, Suit::Clubs), Card::new(5, Suit::Hearts)];
        let mut ai = AiPlayer::new(0, "bot", 42);
        for _ in 0..10 {
            let card = ai.receive_move(&state, None).unwrap();
            assert!(state.seats[0].holds(&card));
        }
    }

    #[test]
    fn same_seed_same_choices() {
        let mut state = state_with_bids();
        state.seats[0].hand = (0..8).map(|r| Card::new(r, Suit::Clubs)).collect();
        let mut a = AiPlayer::new(0, "a", 99);
        let mut b = AiPlayer::new(0, "b", 99);
        for _ in 0..8 {
            assert_eq!(
                a.receive_move(&state, None).unwrap(),
                b.receive_move(&state, None).unwrap()
            );
        }
    }
}
