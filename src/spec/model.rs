use crate::game::entities::{Card, Suit};

/// A fully resolved game description. Every optional section of the JSON
/// document has already been defaulted by the loader, and every free-form
/// rule string has been resolved into one of the closed policy enums below,
/// so the engine never inspects raw JSON at play time.
#[derive(Clone, Debug)]
pub struct RuleSpec {
    pub name: String,
    pub description: String,
    pub num_players: usize,
    /// How many complete sessions to play back to back.
    pub num_reruns: u32,
    /// Direction of play: `true` is ascending seat order ("clockwise").
    pub ascending_ordering: bool,
    pub can_view_previous_trick: bool,
    pub initial_hand_size: u32,
    /// A hand ends as soon as any seat holds this many cards or fewer.
    pub minimum_hand_size: u32,
    pub deck: DeckSpec,
    /// One entry per team, each listing its seat indices. Defaults to one
    /// singleton team per seat.
    pub teams: Vec<Vec<usize>>,
    /// Present only when the game has a bid phase.
    pub bid_rules: Option<BidRules>,
    pub policies: Policies,
}

impl RuleSpec {
    pub fn is_team_game(&self) -> bool {
        self.teams.iter().any(|t| t.len() > 1)
    }

    /// Index of the team a seat belongs to.
    pub fn team_of(&self, seat: usize) -> usize {
        self.teams
            .iter()
            .position(|t| t.contains(&seat))
            .unwrap_or(seat)
    }
}

/// The pack the game is played with.
#[derive(Clone, Debug)]
pub struct DeckSpec {
    pub cards: Vec<Card>,
    /// Rank vocabulary, lowest first. All rank indices in `cards` refer to
    /// positions in this list.
    pub rank_order: Vec<String>,
    pub cut: bool,
    /// Cards set aside after the deal (parsed for completeness; currently
    /// only meaningful as a smaller effective pack).
    pub stock: u32,
}

/// Everything governing the bid phase and bid-based scoring.
#[derive(Clone, Debug)]
pub struct BidRules {
    /// Bids name a trump suit (as in Bridge).
    pub trump_suit_bid: bool,
    /// `true` is an open auction where bids must keep rising; `false` is a
    /// single simultaneous round of bids.
    pub ascending_bid: bool,
    pub points_per_bid: i64,
    pub overtrick_points: i64,
    pub penalty_points: i64,
    pub points_for_matching: i64,
    pub min_bid: u32,
    pub max_bid: u32,
    /// Ranking of bid suits for the equal-value tiebreak, lowest first.
    pub suit_bid_rank: Option<Vec<Suit>>,
    pub can_pass: bool,
    pub can_double: bool,
    pub can_redouble: bool,
    /// A team becomes vulnerable after winning this many games.
    pub vulnerability_threshold: Option<u32>,
    pub special_bids: Vec<SpecialBid>,
    pub bonus_scores: Vec<BonusScore>,
}

/// A named bid with its own scoring schedule, matched against the contract
/// when the hand is scored.
#[derive(Clone, Debug)]
pub struct SpecialBid {
    /// Contract value this entry applies to; `-1` matches any value.
    pub bid_value: i64,
    /// Trump suit the entry applies to; `None` matches a no-trump contract.
    /// Only consulted when the bid rules use trump-suit bids.
    pub trump_suit: Option<Suit>,
    pub bonus_points: i64,
    pub overtrick_points: i64,
    pub penalty: i64,
    pub undertrick_points: i64,
    /// Escalating per-undertrick penalties; the last entry repeats for any
    /// further undertricks.
    pub undertrick_increment: Option<Vec<i64>>,
    pub undertrick_awarded_to: UndertrickTarget,
    pub blind_bid: bool,
    pub vulnerable: bool,
    pub doubled: bool,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum UndertrickTarget {
    Player,
    Opponent,
}

/// A bonus awarded once per hand when the declaring side's hand score falls
/// inside an exclusive range.
#[derive(Clone, Debug)]
pub struct BonusScore {
    pub hand_score_min: i64,
    pub hand_score_max: i64,
    /// When present, the contract's trick total must equal this exactly.
    pub trick_total: Option<i64>,
    /// When present, the declarer's vulnerability must match.
    pub vulnerable: Option<bool>,
    pub bonus_points: i64,
}

/// The closed set of behaviours the free-form `rules` array can select.
/// Unknown rule names fall back to the documented defaults at load time.
#[derive(Clone, Debug)]
pub struct Policies {
    pub trump_picking: TrumpPicking,
    pub follow_mode: FollowMode,
    pub game_end: GameEnd,
    pub session_end: SessionEnd,
    pub hand_size: HandSizeRule,
    pub scoring: ScorePolicy,
    /// Tricks a seat must win before further tricks start counting (the
    /// "book" in many games).
    pub trick_threshold: u32,
    pub first_trick_leader: FirstLeader,
    pub first_trick_lead: LeadRule,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TrumpPicking {
    /// No trump suit this game.
    NoTrump,
    /// The last card dealt fixes the trump suit for the hand.
    LastDealt,
    /// A fixed trump suit for the whole session.
    Fixed(Suit),
    /// The winning bid names the trump suit.
    Bid,
}

/// How a trick constrains followers and how its winner is decided.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FollowMode {
    /// Followers must follow the led suit when they can; the winner is the
    /// best trump, else the best card of the led suit.
    Trick,
    /// Any card may be played; the winner is the best trump, else the
    /// highest rank outright.
    Any,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum GameEnd {
    /// Every game is a single hand.
    Single,
    HandsPlayed(u32),
    ScoreThreshold(i64),
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SessionEnd {
    /// Every session is a single game.
    Single,
    GamesPlayed(u32),
    /// First side past half of `n` games wins (rounded up to odd).
    BestOf(u32),
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum HandSizeRule {
    Static,
    /// One fewer card each hand, floored at one.
    Decreasing,
    /// One fewer card each hand, wrapping back to the initial size.
    DecreasingCyclic,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ScorePolicy {
    /// One point per trick won past the threshold.
    TricksWon,
    /// Sum of the point values of cards captured in tricks.
    TrumpPointValue,
    /// Contract scoring against the bid.
    Bid,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FirstLeader {
    Dealer,
    ContractWinner,
}

#[derive(Clone, Debug, PartialEq)]
pub enum LeadRule {
    Any,
    /// The first trick of the first hand must be opened with this card by
    /// whoever holds it.
    Fixed(Card),
}
