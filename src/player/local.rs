use log::warn;
use serde_json::{json, Value};
use std::io::{self, BufRead, BufReader, Write};

use crate::game::entities::{Bid, Card, Suit};
use crate::game::state::GameState;
use crate::game::EngineError;
use crate::net::session::PeerNetwork;
use crate::player::SeatIo;

/// A local human seat, speaking line-oriented JSON to an interface process.
/// Each request carries a `request_type` and an optional message; each
/// response is one line with a single `value` field. Numeric nonsense from
/// the interface is re-requested here, inside the player, so the engine
/// only ever sees well-formed (if possibly illegal) bids and moves.
pub struct LocalPlayer {
    seat: usize,
    name: String,
    input: Box<dyn BufRead + Send>,
    output: Box<dyn Write + Send>,
}

impl LocalPlayer {
    /// A player wired to this process's stdin/stdout.
    pub fn stdio(seat: usize, name: impl Into<String>) -> Self {
        Self::with_streams(
            seat,
            name,
            Box::new(BufReader::new(io::stdin())),
            Box::new(io::stdout()),
        )
    }

    /// A player on explicit streams. Tests (and alternative front ends)
    /// inject their own.
    pub fn with_streams(
        seat: usize,
        name: impl Into<String>,
        input: Box<dyn BufRead + Send>,
        output: Box<dyn Write + Send>,
    ) -> Self {
        Self {
            seat,
            name: name.into(),
            input,
            output,
        }
    }

    /// One request/response round trip. A closed input stream or a
    /// response line that is not a `value` object is an error; the engine
    /// treats it as fatal for the session.
    fn request(&mut self, request_type: &str, msg: &str) -> io::Result<String> {
        let mut request = json!({ "request_type": request_type });
        if !msg.is_empty() {
            request["msg"] = Value::String(msg.to_string());
        }
        writeln!(self.output, "{request}")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "player input stream closed",
            ));
        }
        let response: Value = serde_json::from_str(&line)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        match response.get("value") {
            Some(Value::String(s)) => Ok(s.clone()),
            Some(Value::Number(n)) => Ok(n.to_string()),
            _ => Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "response line carries no usable 'value'",
            )),
        }
    }

    fn notify(&mut self, message: Value) {
        if let Err(e) = writeln!(self.output, "{message}").and_then(|_| self.output.flush()) {
            warn!("dropping notification to seat {}: {e}", self.seat);
        }
    }
}

fn card_labels(cards: &[Card], rank_order: &[String]) -> Vec<String> {
    cards.iter().map(|c| c.label(rank_order)).collect()
}

impl SeatIo for LocalPlayer {
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

        match self.request("bid_choice", "")?.as_str() {
            "Pass" => return Ok(Bid::pass()),
            "Double" => return Ok(Bid::double()),
            _ => {}
        }

        let mut msg = String::new();
        let value = loop {
            let input = self.request("bid_value", &msg)?;
            match input.trim().parse::<u32>() {
                Ok(value) => break value,
                Err(_) => msg = "INVALID CHOICE".to_string(),
            }
        };

        let mut suit = None;
        if rules.trump_suit_bid {
            let mut msg = String::new();
            suit = loop {
                let input = self.request("bid_trump", &msg)?;
                match input.trim().parse::<u8>() {
                    Ok(0) => break None,
                    Ok(1) => break Some(Suit::Spades),
                    Ok(2) => break Some(Suit::Hearts),
                    Ok(3) => break Some(Suit::Diamonds),
                    Ok(4) => break Some(Suit::Clubs),
                    _ => {
                        msg = "INVALID CHOICE - Please enter a number which matches to a suit"
                            .to_string()
                    }
                }
            };
        }

        let blind = !state.seats[self.seat].seen_cards;
        Ok(Bid::offer(value, suit, blind))
    }

    fn receive_move(
        &mut self,
        state: &GameState,
        _net: Option<&mut PeerNetwork>,
    ) -> Result<Card, EngineError> {
        let hand = &state.seats[self.seat].hand;
        let mut msg = String::new();
        loop {
            let input = self.request("card_move", &msg)?;
            match input.trim().parse::<usize>() {
                Ok(index) if index < hand.len() => return Ok(hand[index]),
                _ => msg = "INVALID CHOICE".to_string(),
            }
        }
    }

    fn send_game_state(&mut self, state: &GameState) {
        let order = &state.spec.deck.rank_order;
        let mut game = json!({
            "cards_played": card_labels(state.table.cards(), order),
            "follow_suit": match state.allowed_suits.as_deref() {
                Some([suit]) => suit.glyph().to_string(),
                _ => "none".to_string(),
            },
            "trump_suit": match state.trump_suit {
                Some(suit) => suit.glyph().to_string(),
                None => "none".to_string(),
            },
            "player_bids": state
                .seats
                .iter()
                .map(|s| s.bid.as_ref().map_or(String::new(), |b| b.to_string()))
                .collect::<Vec<_>>(),
            "player_to_go": state.current,
            "player_to_go_points": state.seats[state.current].points_this_game,
        });
        if state.spec.can_view_previous_trick && !state.prev_trick.is_empty() {
            game["prev_trick"] = json!(card_labels(&state.prev_trick, order));
        }
        // A remote seat's cards stay on its own machine.
        if !state.seats[state.current].remote {
            game["cards_in_hand"] = json!(card_labels(&state.seats[state.current].hand, order));
        }
        self.notify(json!({ "request_type": "sending_game_state", "game_state": game }));
    }

    fn send_trick_summary(&mut self, winning_card: &Card, winner: &str, state: &GameState) {
        self.notify(json!({
            "request_type": "send_trick_summary",
            "trick_count": state.trick_number,
            "winning_card": winning_card.label(&state.spec.deck.rank_order),
            "winning_player": winner,
        }));
    }

    fn send_session_winners(&mut self, winners: &[String]) {
        self.notify(json!({ "request_type": "session_winners", "data": winners }));
    }
}
