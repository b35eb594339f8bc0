use std::sync::Arc;

use crate::game::entities::{step_seat, step_seat_back, Card, DeckHandler, Seat, Suit, Table};
use crate::spec::RuleSpec;

/// The root mutable aggregate for one running session. Owned exclusively by
/// the engine; player I/O handles and the network transport live alongside
/// it, not inside it, so the engine can hand a player a shared view of the
/// state while mutating nothing else.
#[derive(Debug)]
pub struct GameState {
    pub spec: Arc<RuleSpec>,
    pub seats: Vec<Seat>,

    pub dealer: usize,
    pub current: usize,
    pub first_player: usize,
    pub prev_winner: usize,

    pub table: Table,
    pub deck: DeckHandler,
    pub prev_trick: Vec<Card>,

    pub turn_number: u32,
    pub trick_number: u32,
    pub hand_number: u32,
    pub game_number: u32,
    pub session_number: u32,

    pub trump_suit: Option<Suit>,
    /// Suits the next card must be one of; `None` when unconstrained.
    pub allowed_suits: Option<Vec<Suit>>,
    /// Ranks the next card must be one of; `None` when unconstrained.
    pub allowed_values: Option<Vec<u8>>,

    pub current_hand_size: u32,
    pub team_game: bool,
    /// Highest accepted bid value in the current auction. Every seat sees
    /// the same floor through the state instead of through shared mutable
    /// statics in the bidders themselves.
    pub auction_floor: u32,
    /// Whether accepted local inputs must be broadcast to peers.
    pub networked: bool,
}

impl GameState {
    pub fn new(spec: Arc<RuleSpec>, seats: Vec<Seat>, seed: u64, networked: bool) -> Self {
        let deck = DeckHandler::new(&spec.deck.cards, seed);
        let team_game = spec.is_team_game();
        let current_hand_size = spec.initial_hand_size;
        Self {
            spec,
            seats,
            dealer: 0,
            current: 0,
            first_player: 0,
            prev_winner: 0,
            table: Table::default(),
            deck,
            prev_trick: Vec::new(),
            turn_number: 0,
            trick_number: 0,
            hand_number: 0,
            game_number: 0,
            session_number: 0,
            trump_suit: None,
            allowed_suits: None,
            allowed_values: None,
            current_hand_size,
            team_game,
            auction_floor: 0,
            networked,
        }
    }

    pub fn seat_after(&self, seat: usize) -> usize {
        step_seat(seat, self.seats.len(), self.spec.ascending_ordering)
    }

    pub fn seat_before(&self, seat: usize) -> usize {
        step_seat_back(seat, self.seats.len(), self.spec.ascending_ordering)
    }

    pub fn same_team(&self, a: usize, b: usize) -> bool {
        self.spec.team_of(a) == self.spec.team_of(b)
    }

    /// Total points this game for a team, by team index.
    pub fn team_points(&self, team: usize) -> i64 {
        self.spec.teams[team]
            .iter()
            .map(|&seat| self.seats[seat].points_this_game)
            .sum()
    }

    /// Total session wins for a team. Wins are recorded against one
    /// representative seat per team, so summing members is exact.
    pub fn team_games_won(&self, team: usize) -> u32 {
        self.spec.teams[team]
            .iter()
            .map(|&seat| self.seats[seat].games_this_session)
            .sum()
    }

    pub fn is_trump(&self, card: &Card) -> bool {
        self.trump_suit == Some(card.suit)
    }
}
