use rand::{seq::SliceRandom, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::{
    fmt,
    hash::{Hash, Hasher},
};

/// The four suits of a French-suited pack. Games that play without trumps
/// simply carry an `Option<Suit>` wherever a trump is expected.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum Suit {
    Clubs,
    Diamonds,
    Hearts,
    Spades,
}

impl Suit {
    /// Parse the specification vocabulary (`"CLUBS"` .. `"SPADES"`).
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "CLUBS" => Some(Self::Clubs),
            "DIAMONDS" => Some(Self::Diamonds),
            "HEARTS" => Some(Self::Hearts),
            "SPADES" => Some(Self::Spades),
            _ => None,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::Clubs => "CLUBS",
            Self::Diamonds => "DIAMONDS",
            Self::Hearts => "HEARTS",
            Self::Spades => "SPADES",
        }
    }

    pub fn glyph(&self) -> char {
        match self {
            Self::Clubs => 'C',
            Self::Diamonds => 'D',
            Self::Hearts => 'H',
            Self::Spades => 'S',
        }
    }
}

impl fmt::Display for Suit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.glyph())
    }
}

/// Rank is an index into the active rank order (lowest first), so ordering
/// comparisons are plain integer comparisons regardless of vocabulary.
pub type RankIndex = u8;

/// The standard low-to-high rank vocabulary used when a deck does not
/// declare its own order.
pub const STANDARD_RANK_ORDER: [&str; 13] = [
    "TWO", "THREE", "FOUR", "FIVE", "SIX", "SEVEN", "EIGHT", "NINE", "TEN", "JACK", "QUEEN",
    "KING", "ACE",
];

/// A playing card. Equality and hashing consider only (rank, suit); the
/// point value is scoring metadata and two copies of the seven of clubs
/// are the same card no matter what they are worth.
#[derive(Clone, Copy, Debug, Deserialize, Serialize)]
pub struct Card {
    pub rank: RankIndex,
    pub suit: Suit,
    pub points: i64,
}

impl Card {
    pub const fn new(rank: RankIndex, suit: Suit) -> Self {
        Self {
            rank,
            suit,
            points: 0,
        }
    }

    pub const fn with_points(rank: RankIndex, suit: Suit, points: i64) -> Self {
        Self { rank, suit, points }
    }

    /// Resolve a rank word against a rank order. `None` when the word is not
    /// part of the vocabulary.
    pub fn rank_from_str(word: &str, rank_order: &[String]) -> Option<RankIndex> {
        rank_order
            .iter()
            .position(|r| r == word)
            .map(|i| i as RankIndex)
    }

    /// The inverse codec: rank index back to its word.
    pub fn rank_to_str(rank: RankIndex, rank_order: &[String]) -> Option<String> {
        rank_order.get(rank as usize).cloned()
    }

    /// Short human-readable label, e.g. `AS` or `10H`.
    pub fn label(&self, rank_order: &[String]) -> String {
        let word = match Self::rank_to_str(self.rank, rank_order) {
            Some(word) => word,
            None => return format!("?{}", self.suit.glyph()),
        };
        let short = match word.as_str() {
            "ACE" | "ONE" => "A",
            "KING" => "K",
            "QUEEN" => "Q",
            "JACK" => "J",
            "TEN" => "10",
            "NINE" => "9",
            "EIGHT" => "8",
            "SEVEN" => "7",
            "SIX" => "6",
            "FIVE" => "5",
            "FOUR" => "4",
            "THREE" => "3",
            "TWO" => "2",
            other => other,
        };
        format!("{}{}", short, self.suit.glyph())
    }
}

impl PartialEq for Card {
    fn eq(&self, other: &Self) -> bool {
        self.rank == other.rank && self.suit == other.suit
    }
}

impl Eq for Card {}

impl Hash for Card {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.rank.hash(state);
        self.suit.hash(state);
    }
}

/// What kind of call a bid is.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum BidKind {
    /// A real bid with a value (and possibly a suit).
    Bid,
    Pass,
    /// A double, or a redouble when one double is already standing.
    Double,
}

/// A call made during the bid phase.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Bid {
    pub kind: BidKind,
    /// Number of tricks promised. Meaningful only for `BidKind::Bid`.
    pub value: u32,
    /// Suit named by the bid; `None` means no-trump.
    pub suit: Option<Suit>,
    /// The bid was made before the bidder looked at their cards.
    pub blind: bool,
    /// Set on the contract when an opponent doubled it.
    pub doubled: bool,
    /// Set on the contract when the contract side redoubled.
    pub redoubled: bool,
}

impl Bid {
    pub fn offer(value: u32, suit: Option<Suit>, blind: bool) -> Self {
        Self {
            kind: BidKind::Bid,
            value,
            suit,
            blind,
            doubled: false,
            redoubled: false,
        }
    }

    pub fn pass() -> Self {
        Self {
            kind: BidKind::Pass,
            value: 0,
            suit: None,
            blind: false,
            doubled: false,
            redoubled: false,
        }
    }

    pub fn double() -> Self {
        Self {
            kind: BidKind::Double,
            value: 0,
            suit: None,
            blind: false,
            doubled: false,
            redoubled: false,
        }
    }

    /// Whether this bid names a higher suit than `other` under the given
    /// suit ranking (lowest first). Suits absent from the ranking (and
    /// no-trump bids) count as the lowest position.
    pub fn outranks_suit(&self, other: &Bid, suit_bid_rank: &[Suit]) -> bool {
        let position = |suit: Option<Suit>| {
            suit.and_then(|s| suit_bid_rank.iter().position(|r| *r == s))
                .unwrap_or(0)
        };
        position(self.suit) > position(other.suit)
    }
}

impl fmt::Display for Bid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.kind {
            BidKind::Pass => write!(f, "pass"),
            BidKind::Double => write!(f, "double"),
            BidKind::Bid => match self.suit {
                Some(suit) => write!(f, "{} {}", self.value, suit.code()),
                None => write!(f, "{} no-trump", self.value),
            },
        }
    }
}

/// A deck of cards, accessed as a stack: the next card to deal is the top.
#[derive(Clone, Debug, Default)]
pub struct Deck {
    cards: Vec<Card>,
}

impl Deck {
    pub fn push(&mut self, card: Card) {
        self.cards.push(card);
    }

    pub fn pop(&mut self) -> Option<Card> {
        self.cards.pop()
    }

    pub fn peek(&self) -> Option<&Card> {
        self.cards.last()
    }

    /// Remove the top card without dealing it to anyone.
    pub fn burn(&mut self) -> Option<Card> {
        self.cards.pop()
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn as_mut_slice(&mut self) -> &mut [Card] {
        &mut self.cards
    }
}

/// Owns the deck plus the seeded RNG used for shuffling. The RNG persists
/// across hands so every peer that starts from the same seed sees the same
/// sequence of shuffles for the whole session.
#[derive(Debug)]
pub struct DeckHandler {
    deck: Deck,
    last_dealt: Option<Card>,
    seed: u64,
    rng: ChaCha8Rng,
    shuffle_count: u32,
}

impl DeckHandler {
    pub fn new(template: &[Card], seed: u64) -> Self {
        let mut handler = Self {
            deck: Deck::default(),
            last_dealt: None,
            seed,
            rng: ChaCha8Rng::seed_from_u64(seed),
            shuffle_count: 0,
        };
        handler.rebuild(template);
        handler
    }

    /// Replace the current deck with a fresh copy of the template, top card
    /// being the template's first entry.
    pub fn rebuild(&mut self, template: &[Card]) {
        self.deck = Deck::default();
        for card in template.iter().rev() {
            self.deck.push(*card);
        }
    }

    pub fn shuffle(&mut self) {
        self.deck.as_mut_slice().shuffle(&mut self.rng);
        self.shuffle_count += 1;
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn shuffle_count(&self) -> u32 {
        self.shuffle_count
    }

    pub fn last_dealt(&self) -> Option<Card> {
        self.last_dealt
    }

    pub fn remaining(&self) -> usize {
        self.deck.len()
    }

    fn draw(&mut self) -> Option<Card> {
        self.last_dealt = self.deck.pop();
        self.last_dealt
    }

    /// Deal `hand_size` cards to every seat in round-robin fashion, starting
    /// with the seat after the dealer in the direction of play.
    pub fn deal(&mut self, seats: &mut [Seat], dealer: usize, ascending: bool, hand_size: u32) {
        let mut idx = step_seat(dealer, seats.len(), ascending);
        for _ in 0..hand_size {
            for _ in 0..seats.len() {
                if let Some(card) = self.draw() {
                    seats[idx].hand.push(card);
                }
                idx = step_seat(idx, seats.len(), ascending);
            }
        }
    }
}

/// Advance one seat in the direction of play, wrapping around the table.
pub fn step_seat(seat: usize, len: usize, ascending: bool) -> usize {
    if ascending {
        (seat + 1) % len
    } else {
        (seat + len - 1) % len
    }
}

/// The inverse of [`step_seat`]: the seat whose turn came before `seat`.
pub fn step_seat_back(seat: usize, len: usize, ascending: bool) -> usize {
    step_seat(seat, len, !ascending)
}

/// The cards played so far in the current trick, in play order.
#[derive(Clone, Debug, Default)]
pub struct Table {
    cards: Vec<Card>,
}

impl Table {
    pub fn add(&mut self, card: Card) {
        self.cards.push(card);
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Clear the table, returning the finished trick.
    pub fn take(&mut self) -> Vec<Card> {
        std::mem::take(&mut self.cards)
    }
}

/// Per-seat mutable player data. The I/O side of a player (how bids and
/// moves actually get produced) lives in the `player` module; this is the
/// state the engine scores and validates against.
#[derive(Clone, Debug)]
pub struct Seat {
    pub number: usize,
    pub name: String,
    pub hand: Vec<Card>,
    pub bid: Option<Bid>,
    pub tricks_this_hand: u32,
    pub tricks_this_game: u32,
    pub points_this_game: i64,
    pub games_this_session: u32,
    pub vulnerable: bool,
    pub seen_cards: bool,
    /// Tricks won this hand, kept whole for bid / trump-point scoring.
    pub tricks_earned: Vec<Vec<Card>>,
    /// Whether this seat is driven by a remote peer. Invalid input from a
    /// remote seat is fatal rather than re-prompted.
    pub remote: bool,
}

impl Seat {
    pub fn new(number: usize, name: String, remote: bool) -> Self {
        Self {
            number,
            name,
            hand: Vec::new(),
            bid: None,
            tricks_this_hand: 0,
            tricks_this_game: 0,
            points_this_game: 0,
            games_this_session: 0,
            vulnerable: false,
            seen_cards: false,
            tricks_earned: Vec::new(),
            remote,
        }
    }

    pub fn holds(&self, card: &Card) -> bool {
        self.hand.contains(card)
    }

    /// Remove the first card equal (by rank and suit) to `card`, returning
    /// the owned copy with its true point value.
    pub fn take_from_hand(&mut self, card: &Card) -> Option<Card> {
        let idx = self.hand.iter().position(|c| c == card)?;
        Some(self.hand.remove(idx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn standard_order() -> Vec<String> {
        STANDARD_RANK_ORDER.iter().map(|s| s.to_string()).collect()
    }

    fn standard_deck() -> Vec<Card> {
        let mut cards = Vec::new();
        for suit in [Suit::Clubs, Suit::Diamonds, Suit::Hearts, Suit::Spades] {
            for rank in 0..13 {
                cards.push(Card::new(rank, suit));
            }
        }
        cards
    }

    #[test]
    fn card_equality_ignores_points() {
        let a = Card::with_points(5, Suit::Hearts, 0);
        let b = Card::with_points(5, Suit::Hearts, 10);
        assert_eq!(a, b);
        assert_ne!(a, Card::new(5, Suit::Spades));
        assert_ne!(a, Card::new(6, Suit::Hearts));
    }

    #[test]
    fn rank_codec_round_trips() {
        let order = standard_order();
        for (i, word) in order.iter().enumerate() {
            let rank = Card::rank_from_str(word, &order).unwrap();
            assert_eq!(rank as usize, i);
            assert_eq!(Card::rank_to_str(rank, &order).unwrap(), *word);
        }
        assert_eq!(Card::rank_from_str("JOKER", &order), None);
        assert_eq!(Card::rank_to_str(42, &order), None);
    }

    #[test]
    fn card_labels() {
        let order = standard_order();
        assert_eq!(Card::new(12, Suit::Spades).label(&order), "AS");
        assert_eq!(Card::new(8, Suit::Hearts).label(&order), "10H");
        assert_eq!(Card::new(0, Suit::Clubs).label(&order), "2C");
    }

    #[test]
    fn suit_codec_round_trips() {
        for suit in [Suit::Clubs, Suit::Diamonds, Suit::Hearts, Suit::Spades] {
            assert_eq!(Suit::from_code(suit.code()), Some(suit));
        }
        assert_eq!(Suit::from_code("WANDS"), None);
    }

    #[test]
    fn bid_suit_ranking() {
        let ranking = [Suit::Clubs, Suit::Diamonds, Suit::Hearts, Suit::Spades];
        let hearts = Bid::offer(3, Some(Suit::Hearts), false);
        let clubs = Bid::offer(3, Some(Suit::Clubs), false);
        assert!(hearts.outranks_suit(&clubs, &ranking));
        assert!(!clubs.outranks_suit(&hearts, &ranking));
        // No-trump sits at the bottom of the ranking.
        let no_trump = Bid::offer(3, None, false);
        assert!(!no_trump.outranks_suit(&clubs, &ranking));
    }

    #[test]
    fn shuffles_are_deterministic_for_a_seed() {
        let template = standard_deck();
        let mut a = DeckHandler::new(&template, 99);
        let mut b = DeckHandler::new(&template, 99);
        for _ in 0..3 {
            a.shuffle();
            b.shuffle();
            let mut da = Vec::new();
            let mut db = Vec::new();
            while let Some(c) = a.draw() {
                da.push(c);
            }
            while let Some(c) = b.draw() {
                db.push(c);
            }
            assert_eq!(da, db);
            a.rebuild(&template);
            b.rebuild(&template);
        }
    }

    #[test]
    fn deal_starts_left_of_dealer_and_is_round_robin() {
        let template = standard_deck();
        let mut handler = DeckHandler::new(&template, 7);
        let mut seats: Vec<Seat> = (0..4)
            .map(|i| Seat::new(i, format!("p{i}"), false))
            .collect();
        handler.deal(&mut seats, 0, true, 3);
        for seat in &seats {
            assert_eq!(seat.hand.len(), 3);
        }
        // Unshuffled deck pops the template front first; seat 1 (left of the
        // dealer) receives the very first card.
        assert_eq!(seats[1].hand[0], template[0]);
        assert_eq!(seats[2].hand[0], template[1]);
        assert_eq!(handler.last_dealt(), Some(template[11]));
        assert_eq!(handler.remaining(), 52 - 12);
    }

    #[test]
    fn seat_stepping_wraps_both_ways() {
        assert_eq!(step_seat(3, 4, true), 0);
        assert_eq!(step_seat(0, 4, false), 3);
        assert_eq!(step_seat_back(0, 4, true), 3);
        assert_eq!(step_seat_back(3, 4, false), 0);
    }

    #[test]
    fn take_from_hand_removes_a_single_copy() {
        let mut seat = Seat::new(0, "p".into(), false);
        seat.hand = vec![
            Card::with_points(4, Suit::Clubs, 5),
            Card::new(4, Suit::Clubs),
        ];
        let taken = seat.take_from_hand(&Card::new(4, Suit::Clubs)).unwrap();
        // The owned copy keeps its real point value even when the probe
        // carried none.
        assert_eq!(taken.points, 5);
        assert_eq!(seat.hand.len(), 1);
    }

    proptest! {
        #[test]
        fn shuffle_is_a_permutation(seed in any::<u64>()) {
            let template = standard_deck();
            let mut handler = DeckHandler::new(&template, seed);
            handler.shuffle();
            let mut drawn = Vec::new();
            while let Some(card) = handler.draw() {
                drawn.push(card);
            }
            prop_assert_eq!(drawn.len(), template.len());
            for card in &template {
                prop_assert!(drawn.contains(card));
            }
        }
    }
}
