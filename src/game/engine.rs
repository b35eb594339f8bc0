//! The turn-taking engine: one session of games, hands, tricks and turns,
//! driven against an immutable [`RuleSpec`].

use log::{debug, info, warn};
use std::sync::Arc;

use crate::game::entities::{Bid, BidKind, Card, Seat, Suit, Table};
use crate::game::scoring;
use crate::game::state::GameState;
use crate::game::EngineError;
use crate::net::events::WireEvent;
use crate::net::session::PeerNetwork;
use crate::player::{PlayerIo, SeatIo};
use crate::spec::{
    FirstLeader, FollowMode, GameEnd, HandSizeRule, LeadRule, RuleSpec, SessionEnd, TrumpPicking,
};

/// Drives one session to completion. The engine owns the game state and the
/// per-seat I/O handles; states flow out to players as shared references,
/// inputs flow back in and are validated before anything is committed.
pub struct Engine {
    pub state: GameState,
    seats: Vec<PlayerIo>,
    net: Option<PeerNetwork>,
}

impl Engine {
    /// A purely local session (no transport attached).
    pub fn new(spec: Arc<RuleSpec>, seats: Vec<PlayerIo>, seed: u64) -> Result<Self, EngineError> {
        Self::build(spec, seats, seed, None)
    }

    /// A networked session. The shared seed and local seat layout come from
    /// the established peer network.
    pub fn with_network(
        spec: Arc<RuleSpec>,
        seats: Vec<PlayerIo>,
        net: PeerNetwork,
    ) -> Result<Self, EngineError> {
        let seed = net.seed();
        Self::build(spec, seats, seed, Some(net))
    }

    /// Convenience: parse the specification document and build a local
    /// engine in one step.
    pub fn from_document(
        document: &str,
        seats: Vec<PlayerIo>,
        seed: u64,
    ) -> Result<Self, EngineError> {
        let spec = Arc::new(RuleSpec::from_str(document)?);
        Self::new(spec, seats, seed)
    }

    fn build(
        spec: Arc<RuleSpec>,
        seats: Vec<PlayerIo>,
        seed: u64,
        net: Option<PeerNetwork>,
    ) -> Result<Self, EngineError> {
        if seats.len() != spec.num_players {
            return Err(EngineError::Config(format!(
                "specification wants {} players, got {} seats",
                spec.num_players,
                seats.len()
            )));
        }
        let networked = net.is_some();
        let seat_data = seats
            .iter()
            .enumerate()
            .map(|(i, io)| Seat::new(i, io.name().to_string(), io.is_remote()))
            .collect();
        let state = GameState::new(spec, seat_data, seed, networked);
        Ok(Self { state, seats, net })
    }

    /// Play the whole session (including any re-runs) to completion.
    pub fn run_session(&mut self) -> Result<(), EngineError> {
        info!(
            "starting session of '{}' with {} seats, seed {}",
            self.state.spec.name,
            self.state.seats.len(),
            self.state.deck.seed()
        );
        while !self.runs_complete() {
            while !self.session_has_ended() {
                // A tied game is not allowed to stand; extra hands are
                // played until the tie breaks.
                while !self.game_has_ended() || scoring::game_has_tie(&self.state) {
                    self.start_hand();
                    self.run_bid_phase()?;
                    while !self.hand_has_ended() {
                        while !self.trick_has_ended() {
                            self.run_turn()?;
                        }
                        self.advance_trick();
                    }
                    self.advance_hand();
                }
                self.advance_game();
            }
            self.end_session();
        }
        Ok(())
    }

    // ---- hand setup -----------------------------------------------------

    /// Reshuffle, deal, and apply the hand-start policies: initial trump,
    /// fixed first lead, and the leader seat.
    pub fn start_hand(&mut self) {
        let spec = self.state.spec.clone();
        let state = &mut self.state;

        for seat in &mut state.seats {
            seat.hand.clear();
            seat.bid = None;
            seat.seen_cards = false;
        }

        state.deck.rebuild(&spec.deck.cards);
        state.deck.shuffle();
        state.deck.deal(
            &mut state.seats,
            state.dealer,
            spec.ascending_ordering,
            state.current_hand_size,
        );

        state.table = Table::default();
        state.prev_trick.clear();
        state.turn_number = 0;
        state.trick_number = 0;
        state.allowed_suits = None;
        state.allowed_values = None;

        state.trump_suit = match spec.policies.trump_picking {
            TrumpPicking::LastDealt => state.deck.last_dealt().map(|c| c.suit),
            TrumpPicking::Fixed(suit) => Some(suit),
            // `Bid` is resolved when the contract is declared.
            TrumpPicking::Bid | TrumpPicking::NoTrump => None,
        };

        state.first_player = state.dealer;
        if let LeadRule::Fixed(card) = &spec.policies.first_trick_lead {
            state.allowed_suits = Some(vec![card.suit]);
            state.allowed_values = Some(vec![card.rank]);
            if let Some(holder) = state.seats.iter().position(|s| s.holds(card)) {
                state.first_player = holder;
            }
        }
        state.current = state.first_player;
        state.auction_floor = spec.bid_rules.as_ref().map_or(0, |r| r.min_bid);

        debug!(
            "hand {} of game {}: dealer {}, trump {:?}, {} cards each",
            state.hand_number,
            state.game_number,
            state.dealer,
            state.trump_suit,
            state.current_hand_size
        );
    }

    // ---- bid phase ------------------------------------------------------

    /// Run the bid phase, if the rules have one. An ascending auction loops
    /// until a contract is declared; otherwise every seat bids exactly once
    /// in turn order. Either way the hand's leader opens play afterwards.
    pub fn run_bid_phase(&mut self) -> Result<(), EngineError> {
        let ascending = match &self.state.spec.bid_rules {
            Some(rules) => rules.ascending_bid,
            None => return Ok(()),
        };

        if ascending {
            loop {
                let seat = self.state.current;
                self.show_hand(seat);
                self.request_bid(seat)?;
                if can_declare_contract(&self.state) {
                    declare_contract(&mut self.state);
                    break;
                }
                self.state.current = self.state.seat_after(seat);
            }
        } else {
            for _ in 0..self.state.seats.len() {
                let seat = self.state.current;
                self.show_hand(seat);
                self.request_bid(seat)?;
                self.state.current = self.state.seat_after(seat);
            }
        }

        self.state.current = self.state.first_player;
        Ok(())
    }

    /// Display the game state to a seat. A non-remote seat gets its hand in
    /// the display, so its cards count as seen from here on; a bid taken
    /// afterwards is no longer blind.
    fn show_hand(&mut self, seat: usize) {
        if !self.state.seats[seat].remote {
            self.state.seats[seat].seen_cards = true;
        }
        self.seats[seat].send_game_state(&self.state);
    }

    /// Ask one seat for a bid until a legal one arrives. Illegal input from
    /// a remote seat is fatal; accepted bids from non-remote seats are
    /// broadcast to the peers.
    fn request_bid(&mut self, seat: usize) -> Result<Bid, EngineError> {
        loop {
            let bid = self.seats[seat].receive_bid(&self.state, self.net.as_mut())?;
            if make_bid(&mut self.state, seat, bid.clone()) {
                debug!("seat {seat} bid {bid}");
                if self.state.networked && !self.state.seats[seat].remote {
                    if let Some(net) = self.net.as_mut() {
                        net.broadcast(&WireEvent::bid(&bid));
                    }
                }
                return Ok(bid);
            }
            if self.state.seats[seat].remote {
                return Err(EngineError::IllegalBid { seat });
            }
            warn!("seat {seat} made an illegal bid ({bid}); asking again");
        }
    }

    // ---- trick phase ----------------------------------------------------

    /// One turn: ask the current seat for a move until a legal one arrives,
    /// commit it, broadcast it if it was resolved locally, and advance.
    pub fn run_turn(&mut self) -> Result<(), EngineError> {
        let seat = self.state.current;
        self.show_hand(seat);
        loop {
            let card = self.seats[seat].receive_move(&self.state, self.net.as_mut())?;
            if make_move(&mut self.state, seat, card) {
                if self.state.networked && !self.state.seats[seat].remote {
                    let event = WireEvent::play(&card, &self.state.spec.deck.rank_order)
                        .ok_or_else(|| {
                            EngineError::Config(format!(
                                "seat {seat} played a card with no rank-order word"
                            ))
                        })?;
                    if let Some(net) = self.net.as_mut() {
                        net.broadcast(&event);
                    }
                }
                self.advance_turn();
                return Ok(());
            }
            if self.state.seats[seat].remote {
                return Err(EngineError::IllegalMove { seat });
            }
            warn!("seat {seat} played an illegal card; asking again");
        }
    }

    /// Advance to the next seat. The fixed-leading-card constraint is
    /// consumed exactly once, after the opening card of the hand's first
    /// trick.
    pub fn advance_turn(&mut self) {
        let state = &mut self.state;
        state.current = state.seat_after(state.current);

        if matches!(state.spec.policies.first_trick_lead, LeadRule::Fixed(_))
            && state.turn_number == 0
            && state.trick_number == 0
        {
            if let Some(mut values) = state.allowed_values.take() {
                if !values.is_empty() {
                    values.remove(0);
                }
                if !values.is_empty() {
                    state.allowed_values = Some(values);
                }
            }
            if let Some(mut suits) = state.allowed_suits.take() {
                if !suits.is_empty() {
                    suits.remove(0);
                }
                if !suits.is_empty() {
                    state.allowed_suits = Some(suits);
                }
            }
        }

        state.turn_number += 1;
    }

    /// Resolve the finished trick: pick the winner, credit the cards, make
    /// the winner the next leader, and push a summary to every player.
    pub fn advance_trick(&mut self) {
        if self.state.table.is_empty() {
            return;
        }
        let winner_offset = winning_card_index(
            self.state.table.cards(),
            self.state.trump_suit,
            self.state.spec.policies.follow_mode,
        );
        let winning_card = self.state.table.cards()[winner_offset];

        // The card at offset n was played by the seat n steps after the
        // trick's leader, in the direction of play.
        let mut winner = self.state.first_player;
        for _ in 0..winner_offset {
            winner = self.state.seat_after(winner);
        }

        let trick = self.state.table.take();
        self.state.prev_winner = winner;
        {
            let seat = &mut self.state.seats[winner];
            seat.tricks_this_game += 1;
            seat.tricks_this_hand += 1;
            seat.tricks_earned.push(trick.clone());
        }
        self.state.first_player = winner;
        self.state.current = winner;
        if self.state.spec.policies.follow_mode == FollowMode::Trick {
            self.state.allowed_suits = None;
        }
        self.state.turn_number = 0;
        self.state.trick_number += 1;
        self.state.prev_trick = trick;

        let winner_name = self.state.seats[winner].name.clone();
        debug!(
            "trick {} won by seat {winner} ({winner_name})",
            self.state.trick_number - 1
        );
        for io in &mut self.seats {
            io.send_trick_summary(&winning_card, &winner_name, &self.state);
        }
    }

    // ---- hand / game / session advancement ------------------------------

    /// Score the finished hand and set up the next one: hand-size policy,
    /// dealer rotation, counter resets.
    pub fn advance_hand(&mut self) {
        scoring::score_hand(&mut self.state);
        for seat in &mut self.state.seats {
            seat.tricks_this_hand = 0;
            seat.tricks_earned.clear();
        }

        let spec = self.state.spec.clone();
        match spec.policies.hand_size {
            HandSizeRule::Decreasing => {
                if self.state.current_hand_size > 1 {
                    self.state.current_hand_size -= 1;
                }
            }
            HandSizeRule::DecreasingCyclic => {
                self.state.current_hand_size -= 1;
                if self.state.current_hand_size == 0 {
                    self.state.current_hand_size = spec.initial_hand_size;
                }
            }
            HandSizeRule::Static => {}
        }

        self.state.dealer = self.state.seat_after(self.state.dealer);
        self.state.hand_number += 1;
    }

    /// Close out a finished game: record the win, update vulnerability, and
    /// reset per-game state.
    pub fn advance_game(&mut self) {
        let winning_team = scoring::game_winning_team(&self.state);
        let spec = self.state.spec.clone();
        let representative = spec.teams[winning_team][0];
        self.state.seats[representative].games_this_session += 1;
        info!(
            "game {} won by team {winning_team}",
            self.state.game_number
        );

        if let Some(threshold) = spec.bid_rules.as_ref().and_then(|r| r.vulnerability_threshold) {
            if self.state.seats[representative].games_this_session > threshold {
                for seat in &mut self.state.seats {
                    seat.vulnerable = false;
                }
                for &member in &spec.teams[winning_team] {
                    self.state.seats[member].vulnerable = true;
                }
            }
        }

        for seat in &mut self.state.seats {
            seat.points_this_game = 0;
            seat.tricks_this_game = 0;
            seat.hand.clear();
        }
        self.state.hand_number = 0;
        self.state.game_number += 1;
    }

    /// Announce the session winners to every player and reset for a re-run.
    pub fn end_session(&mut self) {
        let winners = scoring::session_winners(&self.state);
        info!("session {} winners: {winners:?}", self.state.session_number);
        for io in &mut self.seats {
            io.send_session_winners(&winners);
        }

        for seat in &mut self.state.seats {
            seat.games_this_session = 0;
            seat.points_this_game = 0;
            seat.tricks_this_game = 0;
            seat.tricks_this_hand = 0;
            seat.tricks_earned.clear();
            seat.hand.clear();
            seat.bid = None;
            seat.seen_cards = false;
            seat.vulnerable = false;
        }
        let state = &mut self.state;
        state.turn_number = 0;
        state.trick_number = 0;
        state.hand_number = 0;
        state.game_number = 0;
        state.dealer = 0;
        state.current = 0;
        state.first_player = 0;
        state.current_hand_size = state.spec.initial_hand_size;
        state.session_number += 1;
    }

    // ---- progression predicates -----------------------------------------

    /// The trick is over once the turn has wrapped back to its leader.
    pub fn trick_has_ended(&self) -> bool {
        self.state.current == self.state.first_player && self.state.turn_number != 0
    }

    /// The hand is over as soon as any seat is down to the minimum size.
    pub fn hand_has_ended(&self) -> bool {
        self.state
            .seats
            .iter()
            .any(|s| s.hand.len() as u32 <= self.state.spec.minimum_hand_size)
    }

    pub fn game_has_ended(&self) -> bool {
        match self.state.spec.policies.game_end {
            GameEnd::Single => self.state.hand_number >= 1,
            GameEnd::HandsPlayed(hands) => self.state.hand_number >= hands,
            GameEnd::ScoreThreshold(points) => self
                .state
                .seats
                .iter()
                .any(|s| s.points_this_game >= points),
        }
    }

    pub fn session_has_ended(&self) -> bool {
        match self.state.spec.policies.session_end {
            SessionEnd::Single => self.state.game_number >= 1,
            SessionEnd::GamesPlayed(games) => self.state.game_number >= games,
            SessionEnd::BestOf(games) => {
                let games = if games % 2 == 0 { games + 1 } else { games };
                self.state
                    .seats
                    .iter()
                    .any(|s| s.games_this_session > games / 2)
            }
        }
    }

    pub fn runs_complete(&self) -> bool {
        self.state.session_number >= self.state.spec.num_reruns
    }
}

// ---- rule validation, free of any I/O ------------------------------------

/// Validate and commit a bid. Returns false when the bid is illegal under
/// the document's bid rules; the caller decides whether that re-prompts
/// or aborts.
pub fn make_bid(state: &mut GameState, seat: usize, bid: Bid) -> bool {
    let spec = state.spec.clone();
    let rules = match &spec.bid_rules {
        Some(rules) => rules,
        None => return false,
    };

    if !rules.ascending_bid {
        // A single simultaneous round: plain bids only, within bounds.
        if bid.kind != BidKind::Bid {
            return false;
        }
        if bid.value < rules.min_bid || bid.value > rules.max_bid {
            return false;
        }
        return accept_bid(state, seat, bid);
    }

    // When every other seat has passed (or not yet spoken), this seat must
    // make a real bid so the auction cannot die without a contract.
    let all_passes = state
        .seats
        .iter()
        .enumerate()
        .all(|(i, s)| i == seat || s.bid.as_ref().map_or(true, |b| b.kind == BidKind::Pass));
    if all_passes && bid.kind != BidKind::Bid {
        return false;
    }

    match bid.kind {
        BidKind::Pass => rules.can_pass && accept_bid(state, seat, bid),
        BidKind::Double => {
            if !rules.can_double {
                return false;
            }
            // Walk backwards over passes and doubles to the standing bid,
            // counting doubles on the way.
            let mut marker = state.seat_before(seat);
            let mut doubles = 0;
            while marker != seat {
                match state.seats[marker].bid.as_ref().map(|b| b.kind) {
                    Some(BidKind::Double) => doubles += 1,
                    Some(BidKind::Pass) => {}
                    _ => break,
                }
                marker = state.seat_before(marker);
            }
            if state.seats[marker].bid.is_none() {
                return false;
            }
            let contract_team = state.same_team(marker, seat);
            if rules.can_redouble && doubles == 1 {
                // A second double is a redouble, restricted to the
                // contract's own side.
                return contract_team && accept_bid(state, seat, bid);
            }
            if doubles >= 1 {
                return false;
            }
            !contract_team && accept_bid(state, seat, bid)
        }
        BidKind::Bid => {
            if bid.value < rules.min_bid || bid.value > rules.max_bid {
                return false;
            }
            // Find the standing bid, if any.
            let mut marker = state.seat_before(seat);
            let mut standing: Option<Bid> = None;
            while marker != seat && standing.is_none() {
                match state.seats[marker].bid.as_ref() {
                    None => break,
                    Some(b) if b.kind == BidKind::Bid => standing = Some(b.clone()),
                    Some(_) => {}
                }
                marker = state.seat_before(marker);
            }
            match standing {
                None => accept_bid(state, seat, bid),
                Some(standing) => {
                    let raises_value = bid.value > standing.value;
                    let raises_suit = bid.value == standing.value
                        && rules
                            .suit_bid_rank
                            .as_ref()
                            .map_or(false, |rank| bid.outranks_suit(&standing, rank));
                    (raises_value || raises_suit) && accept_bid(state, seat, bid)
                }
            }
        }
    }
}

fn accept_bid(state: &mut GameState, seat: usize, bid: Bid) -> bool {
    if bid.kind == BidKind::Bid {
        state.auction_floor = state.auction_floor.max(bid.value);
    }
    state.seats[seat].bid = Some(bid);
    true
}

/// An ascending auction ends when, walking backwards from the seat that
/// just spoke, a real bid sits behind an unbroken run of passes covering
/// everyone else.
pub fn can_declare_contract(state: &GameState) -> bool {
    let mut marker = state.current;
    for step in 0..state.seats.len() {
        match state.seats[marker].bid.as_ref().map(|b| b.kind) {
            Some(BidKind::Bid) => return step == state.seats.len() - 1,
            Some(BidKind::Pass) => {}
            _ => return false,
        }
        marker = state.seat_before(marker);
    }
    false
}

/// Settle the auction: mark the contract doubled/redoubled, resolve the
/// trump suit if bidding picks it, and seat the first leader if the rules
/// give the lead to the contract winner.
pub fn declare_contract(state: &mut GameState) {
    let mut contract_seat = None;
    let mut doubled = false;
    let mut redoubled = false;
    for (i, seat) in state.seats.iter().enumerate() {
        match seat.bid.as_ref().map(|b| b.kind) {
            Some(BidKind::Bid) => contract_seat = Some(i),
            Some(BidKind::Double) => {
                if doubled {
                    redoubled = true;
                } else {
                    doubled = true;
                }
            }
            _ => {}
        }
    }
    let winner = match contract_seat {
        Some(winner) => winner,
        None => return,
    };

    let mut contract_suit = None;
    if let Some(bid) = state.seats[winner].bid.as_mut() {
        bid.doubled = doubled;
        bid.redoubled = redoubled;
        contract_suit = bid.suit;
    }
    info!(
        "contract declared by seat {winner} (doubled: {doubled}, redoubled: {redoubled})"
    );

    if state.spec.policies.trump_picking == TrumpPicking::Bid {
        state.trump_suit = contract_suit;
    }
    if state.spec.policies.first_trick_leader == FirstLeader::ContractWinner {
        state.first_player = winner;
        state.current = winner;
    }
}

/// Validate and commit a move. Ownership first, then the follow
/// constraints; under trick-following a constraint is waived for a seat
/// holding no conforming card. The committed card is the owned copy from
/// the hand, so its point value survives to scoring.
pub fn make_move(state: &mut GameState, seat: usize, card: Card) -> bool {
    if !state.seats[seat].holds(&card) {
        return false;
    }
    let trick_mode = state.spec.policies.follow_mode == FollowMode::Trick;

    if let Some(allowed) = &state.allowed_suits {
        if !allowed.contains(&card.suit) {
            if !trick_mode {
                return false;
            }
            let holds_conforming = state.seats[seat]
                .hand
                .iter()
                .any(|c| allowed.contains(&c.suit));
            if holds_conforming {
                return false;
            }
        }
    }
    if let Some(allowed) = &state.allowed_values {
        if !allowed.contains(&card.rank) {
            if !trick_mode {
                return false;
            }
            let holds_conforming = state.seats[seat]
                .hand
                .iter()
                .any(|c| allowed.contains(&c.rank));
            if holds_conforming {
                return false;
            }
        }
    }

    let owned = match state.seats[seat].take_from_hand(&card) {
        Some(owned) => owned,
        None => return false,
    };
    // The first card of a trick fixes the suit to follow.
    if trick_mode && state.allowed_suits.is_none() {
        state.allowed_suits = Some(vec![owned.suit]);
    }
    state.table.add(owned);
    true
}

/// Index into `cards` of the trick's winner. Strict comparisons throughout,
/// so equal cards resolve to the one played first.
pub fn winning_card_index(cards: &[Card], trump: Option<Suit>, mode: FollowMode) -> usize {
    let is_trump = |card: &Card| trump == Some(card.suit);
    let mut best = 0;
    for (i, card) in cards.iter().enumerate().skip(1) {
        let best_card = &cards[best];
        let beats = match mode {
            // Trump beats non-trump; otherwise a higher rank wins only when
            // following the best card's suit.
            FollowMode::Trick => {
                (is_trump(card) && !is_trump(best_card))
                    || (card.suit == best_card.suit && card.rank > best_card.rank)
            }
            // Trump beats non-trump; otherwise the highest rank wins
            // outright among all-trump or all-plain cards.
            FollowMode::Any => {
                (is_trump(card) && !is_trump(best_card))
                    || (card.rank > best_card.rank && is_trump(card) == is_trump(best_card))
            }
        };
        if beats {
            best = i;
        }
    }
    best
}
