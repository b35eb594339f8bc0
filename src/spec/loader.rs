//! Turns a JSON game-specification document into a [`RuleSpec`].
//!
//! The loader is deliberately forgiving: every optional field has a
//! documented default, and a field that is present but of the wrong shape
//! is logged and treated as absent. Game authors iterate on documents by
//! hand; a loader that hard-fails on a typo'd field would make that
//! workflow miserable. The only fatal conditions are an unreadable
//! document and a root that is not an object.

use log::warn;
use serde_json::{Map, Value};
use std::collections::HashMap;

use super::model::*;
use super::SpecFormatError;
use crate::game::entities::{Card, Suit, STANDARD_RANK_ORDER};

type JsonObject = Map<String, Value>;

fn read_bool(obj: &JsonObject, key: &str, default: bool) -> bool {
    match obj.get(key) {
        None => default,
        Some(Value::Bool(b)) => *b,
        Some(other) => {
            warn!("field '{key}' should be a boolean, got {other}; using {default}");
            default
        }
    }
}

fn read_i64(obj: &JsonObject, key: &str, default: i64) -> i64 {
    match obj.get(key).and_then(Value::as_i64) {
        Some(n) => n,
        None => {
            if let Some(other) = obj.get(key) {
                warn!("field '{key}' should be an integer, got {other}; using {default}");
            }
            default
        }
    }
}

fn read_u32(obj: &JsonObject, key: &str, default: u32) -> u32 {
    match obj.get(key).and_then(Value::as_u64) {
        Some(n) => n as u32,
        None => {
            if let Some(other) = obj.get(key) {
                warn!("field '{key}' should be a non-negative integer, got {other}; using {default}");
            }
            default
        }
    }
}

fn read_string(obj: &JsonObject, key: &str, default: &str) -> String {
    match obj.get(key) {
        Some(Value::String(s)) => s.clone(),
        None => default.to_string(),
        Some(other) => {
            warn!("field '{key}' should be a string, got {other}; using '{default}'");
            default.to_string()
        }
    }
}

fn read_array<'a>(obj: &'a JsonObject, key: &str) -> Option<&'a Vec<Value>> {
    match obj.get(key) {
        Some(Value::Array(a)) => Some(a),
        None => None,
        Some(other) => {
            warn!("field '{key}' should be an array, got {other}; ignoring");
            None
        }
    }
}

fn read_object<'a>(obj: &'a JsonObject, key: &str) -> Option<&'a JsonObject> {
    match obj.get(key) {
        Some(Value::Object(o)) => Some(o),
        None => None,
        Some(other) => {
            warn!("field '{key}' should be an object, got {other}; ignoring");
            None
        }
    }
}

/// The standard rank vocabulary as owned strings.
pub fn standard_rank_order() -> Vec<String> {
    STANDARD_RANK_ORDER.iter().map(|s| s.to_string()).collect()
}

/// The standard 52-card pack (4 suits x 13 ranks, no point values).
pub fn standard_deck() -> Vec<Card> {
    let mut cards = Vec::with_capacity(52);
    for suit in [Suit::Clubs, Suit::Diamonds, Suit::Hearts, Suit::Spades] {
        for rank in 0..13 {
            cards.push(Card::new(rank, suit));
        }
    }
    cards
}

impl RuleSpec {
    /// Parse a specification document from its JSON text.
    pub fn from_str(document: &str) -> Result<Self, SpecFormatError> {
        let root: Value = serde_json::from_str(document)?;
        Self::from_value(&root)
    }

    /// Build a spec from an already-parsed JSON value. Fails only when the
    /// root is not an object; every field-level problem falls back to its
    /// default.
    pub fn from_value(root: &Value) -> Result<Self, SpecFormatError> {
        let obj = root.as_object().ok_or(SpecFormatError::NotAnObject)?;

        let num_players = read_u32(obj, "players", 4).max(1) as usize;
        let initial_hand_size = read_u32(obj, "initialHandSize", 13);
        let deck = parse_deck(obj);
        let teams = parse_teams(obj, num_players);
        let rules = parse_rules(obj);
        let bid_rules = read_object(obj, "bid").map(|b| parse_bid_rules(b, initial_hand_size));
        let policies = resolve_policies(&rules, &deck, bid_rules.is_some());

        Ok(Self {
            name: read_string(obj, "name", "[No Name]"),
            description: read_string(obj, "description", "..."),
            num_players,
            num_reruns: read_u32(obj, "numReruns", 1),
            ascending_ordering: read_bool(obj, "ascending_ordering", true),
            can_view_previous_trick: read_bool(obj, "can_view_previous_trick", true),
            initial_hand_size,
            minimum_hand_size: read_u32(obj, "minimumHandSize", 0),
            deck,
            teams,
            bid_rules,
            policies,
        })
    }
}

fn parse_deck(obj: &JsonObject) -> DeckSpec {
    let deck_obj = match read_object(obj, "deck") {
        Some(d) => d,
        None => {
            return DeckSpec {
                cards: standard_deck(),
                rank_order: standard_rank_order(),
                cut: false,
                stock: 0,
            }
        }
    };

    let rank_order = match read_array(deck_obj, "rankOrder") {
        Some(arr) => {
            let order: Vec<String> = arr
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect();
            if order.is_empty() {
                warn!("deck.rankOrder contains no usable entries; using the standard order");
                standard_rank_order()
            } else {
                order
            }
        }
        None => standard_rank_order(),
    };

    let cards = match read_array(deck_obj, "cards") {
        Some(arr) => arr
            .iter()
            .filter_map(|v| match v.as_object() {
                Some(card) => Some(parse_card(card, &rank_order)),
                None => {
                    warn!("deck.cards entry is not an object; skipping");
                    None
                }
            })
            .collect(),
        None => standard_deck(),
    };

    DeckSpec {
        cards,
        rank_order,
        cut: read_bool(deck_obj, "cut", false),
        stock: read_u32(deck_obj, "stock", 0),
    }
}

fn parse_card(card: &JsonObject, rank_order: &[String]) -> Card {
    let rank_word = read_string(card, "rank", "ACE");
    let rank = Card::rank_from_str(&rank_word, rank_order).unwrap_or_else(|| {
        warn!("card rank '{rank_word}' is not in the rank order; using the lowest rank");
        0
    });
    let suit_word = read_string(card, "suit", "SPADES");
    let suit = Suit::from_code(&suit_word).unwrap_or_else(|| {
        warn!("card suit '{suit_word}' is not a suit; using SPADES");
        Suit::Spades
    });
    Card::with_points(rank, suit, read_i64(card, "pointValue", 0))
}

fn parse_teams(obj: &JsonObject, num_players: usize) -> Vec<Vec<usize>> {
    let singletons = || (0..num_players).map(|i| vec![i]).collect();
    let arr = match read_array(obj, "teams") {
        Some(arr) => arr,
        None => return singletons(),
    };
    let teams: Vec<Vec<usize>> = arr
        .iter()
        .filter_map(|team| match team.as_array() {
            Some(members) => Some(
                members
                    .iter()
                    .filter_map(|m| m.as_u64().map(|n| n as usize))
                    .filter(|&seat| seat < num_players)
                    .collect::<Vec<_>>(),
            ),
            None => {
                warn!("teams entry is not an array; skipping");
                None
            }
        })
        .filter(|team: &Vec<usize>| !team.is_empty())
        .collect();
    if teams.is_empty() {
        warn!("teams contains no usable entries; using one team per player");
        singletons()
    } else {
        teams
    }
}

/// The free-form `rules` array: entries of `{name, data}` collected into a
/// name -> text map. Numeric data values are stringified so the policy
/// resolver can parse them uniformly.
fn parse_rules(obj: &JsonObject) -> HashMap<String, String> {
    let mut rules = HashMap::new();
    let arr = match read_array(obj, "rules") {
        Some(arr) => arr,
        None => return rules,
    };
    for entry in arr {
        let entry = match entry.as_object() {
            Some(e) => e,
            None => {
                warn!("rules entry is not an object; skipping");
                continue;
            }
        };
        let name = match entry.get("name").and_then(Value::as_str) {
            Some(n) => n.to_string(),
            None => {
                warn!("rules entry has no usable 'name'; skipping");
                continue;
            }
        };
        let data = match entry.get("data") {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            Some(Value::Bool(b)) => b.to_string(),
            _ => {
                warn!("rule '{name}' has no usable 'data'; skipping");
                continue;
            }
        };
        rules.insert(name, data);
    }
    rules
}

fn parse_bid_rules(bid: &JsonObject, initial_hand_size: u32) -> BidRules {
    let suit_bid_rank = read_array(bid, "suitBidRank").map(|arr| {
        arr.iter()
            .filter_map(|v| match v.as_str().and_then(Suit::from_code) {
                Some(suit) => Some(suit),
                None => {
                    warn!("suitBidRank entry {v} is not a suit; skipping");
                    None
                }
            })
            .collect()
    });

    let vulnerability_threshold = match bid.get("vulnerabilityThreshold") {
        None | Some(Value::Null) => None,
        Some(v) => match v.as_u64() {
            Some(n) => Some(n as u32),
            None => {
                warn!("vulnerabilityThreshold should be an integer, got {v}; ignoring");
                None
            }
        },
    };

    let special_bids = read_array(bid, "specialBids")
        .map(|arr| {
            arr.iter()
                .filter_map(|v| match v.as_object() {
                    Some(sb) => Some(parse_special_bid(sb)),
                    None => {
                        warn!("specialBids entry is not an object; skipping");
                        None
                    }
                })
                .collect()
        })
        .unwrap_or_default();

    let bonus_scores = read_array(bid, "bonusScores")
        .map(|arr| {
            arr.iter()
                .filter_map(|v| match v.as_object() {
                    Some(bs) => Some(parse_bonus_score(bs)),
                    None => {
                        warn!("bonusScores entry is not an object; skipping");
                        None
                    }
                })
                .collect()
        })
        .unwrap_or_default();

    BidRules {
        trump_suit_bid: read_bool(bid, "trumpSuitBid", false),
        ascending_bid: read_bool(bid, "ascendingBid", false),
        points_per_bid: read_i64(bid, "pointsPerBid", 1),
        overtrick_points: read_i64(bid, "overtrickPoints", 0),
        penalty_points: read_i64(bid, "penaltyPoints", 0),
        points_for_matching: read_i64(bid, "pointsForMatching", 0),
        min_bid: read_u32(bid, "minBid", 0),
        max_bid: read_u32(bid, "maxBid", initial_hand_size),
        suit_bid_rank,
        can_pass: read_bool(bid, "canPass", false),
        can_double: read_bool(bid, "canDouble", false),
        can_redouble: read_bool(bid, "canRedouble", false),
        vulnerability_threshold,
        special_bids,
        bonus_scores,
    }
}

fn parse_special_bid(sb: &JsonObject) -> SpecialBid {
    let trump_suit = match sb.get("trumpSuit").and_then(Value::as_str) {
        Some(word) => Suit::from_code(word),
        None => None,
    };
    let undertrick_increment = read_array(sb, "undertrickIncrement").map(|arr| {
        arr.iter()
            .filter_map(Value::as_i64)
            .collect::<Vec<_>>()
    });
    let undertrick_awarded_to = match read_string(sb, "undertrickAwardedTo", "opponent").as_str() {
        "player" => UndertrickTarget::Player,
        _ => UndertrickTarget::Opponent,
    };
    SpecialBid {
        bid_value: read_i64(sb, "bidValue", 0),
        trump_suit,
        bonus_points: read_i64(sb, "bonusPoints", 0),
        overtrick_points: read_i64(sb, "overtrickPoints", 0),
        penalty: read_i64(sb, "penalty", 0),
        undertrick_points: read_i64(sb, "undertrickPoints", 0),
        undertrick_increment: undertrick_increment.filter(|v| !v.is_empty()),
        undertrick_awarded_to,
        blind_bid: read_bool(sb, "blindBid", false),
        vulnerable: read_bool(sb, "vulnerable", false),
        doubled: read_bool(sb, "doubled", false),
    }
}

fn parse_bonus_score(bs: &JsonObject) -> BonusScore {
    BonusScore {
        hand_score_min: read_i64(bs, "handScoreMin", 0),
        hand_score_max: read_i64(bs, "handScoreMax", 0),
        trick_total: bs.get("trickTotal").and_then(Value::as_i64),
        vulnerable: bs.get("vulnerable").and_then(Value::as_bool),
        bonus_points: read_i64(bs, "bonusPoints", 0),
    }
}

/// Resolve the free-form rule map into the closed policy set. Unknown rule
/// names and unparseable values fall back to defaults here, once, so the
/// engine never string-matches at play time.
fn resolve_policies(
    rules: &HashMap<String, String>,
    deck: &DeckSpec,
    has_bid_rules: bool,
) -> Policies {
    let rule = |name: &str| rules.get(name).map(String::as_str);

    let trump_picking = match rule("trumpPickingMode") {
        Some("lastDealt") => TrumpPicking::LastDealt,
        Some("fixed") | Some("predefined") => match rule("trumpSuit").and_then(Suit::from_code) {
            Some(suit) => TrumpPicking::Fixed(suit),
            None => {
                warn!("fixed trump picking without a usable 'trumpSuit' rule; playing no-trump");
                TrumpPicking::NoTrump
            }
        },
        Some("bid") if has_bid_rules => TrumpPicking::Bid,
        Some("bid") => {
            warn!("trumpPickingMode 'bid' without bid rules; playing no-trump");
            TrumpPicking::NoTrump
        }
        _ => TrumpPicking::NoTrump,
    };

    let follow_mode = match rule("nextLegalCardMode") {
        Some("trick") => FollowMode::Trick,
        _ => FollowMode::Any,
    };

    let parse_value = |name: &str| rule(name).and_then(|v| v.parse::<i64>().ok());

    let game_end = match rule("gameEnd") {
        Some("handsPlayed") => match parse_value("gameEndValue") {
            Some(n) => GameEnd::HandsPlayed(n.max(0) as u32),
            None => {
                warn!("gameEnd 'handsPlayed' without a numeric 'gameEndValue'; single-hand games");
                GameEnd::Single
            }
        },
        Some("scoreThreshold") => match parse_value("gameEndValue") {
            Some(n) => GameEnd::ScoreThreshold(n),
            None => {
                warn!("gameEnd 'scoreThreshold' without a numeric 'gameEndValue'; single-hand games");
                GameEnd::Single
            }
        },
        _ => GameEnd::Single,
    };

    let session_end = match rule("sessionEnd") {
        Some("gamesPlayed") => match parse_value("sessionEndValue") {
            Some(n) => SessionEnd::GamesPlayed(n.max(0) as u32),
            None => {
                warn!("sessionEnd 'gamesPlayed' without a numeric 'sessionEndValue'; single-game sessions");
                SessionEnd::Single
            }
        },
        Some("bestOf") => match parse_value("sessionEndValue") {
            Some(n) => SessionEnd::BestOf(n.max(0) as u32),
            None => {
                warn!("sessionEnd 'bestOf' without a numeric 'sessionEndValue'; single-game sessions");
                SessionEnd::Single
            }
        },
        _ => SessionEnd::Single,
    };

    let hand_size = match rule("handSize") {
        Some("decreasing") => HandSizeRule::Decreasing,
        Some("decreasingCyclic") => HandSizeRule::DecreasingCyclic,
        _ => HandSizeRule::Static,
    };

    let scoring = match rule("calculateScore") {
        Some("bid") if has_bid_rules => ScorePolicy::Bid,
        Some("bid") => {
            warn!("calculateScore 'bid' without bid rules; scoring tricks won");
            ScorePolicy::TricksWon
        }
        Some("trumpPointValue") => ScorePolicy::TrumpPointValue,
        _ => ScorePolicy::TricksWon,
    };

    let trick_threshold = match rule("trickThreshold") {
        None => 0,
        Some(raw) => match raw.parse::<u32>() {
            Ok(n) => n,
            Err(_) => {
                warn!("trickThreshold '{raw}' is not a number; using 0");
                0
            }
        },
    };

    let first_trick_leader = match rule("firstTrickLeader") {
        Some("bidWinner") | Some("contractWinner") => FirstLeader::ContractWinner,
        _ => FirstLeader::Dealer,
    };

    let first_trick_lead = match rule("validLeadingCardFirstTrick") {
        Some("fixed") => parse_fixed_lead(rule("validLeadingCardFirstTrickCard"), deck),
        _ => LeadRule::Any,
    };

    Policies {
        trump_picking,
        follow_mode,
        game_end,
        session_end,
        hand_size,
        scoring,
        trick_threshold,
        first_trick_leader,
        first_trick_lead,
    }
}

/// The fixed leading card is written `"RANK SUIT"`. Any formatting problem
/// downgrades the rule to `Any` rather than failing the load.
fn parse_fixed_lead(raw: Option<&str>, deck: &DeckSpec) -> LeadRule {
    let raw = match raw {
        Some(raw) => raw,
        None => {
            warn!("fixed leading card rule without 'validLeadingCardFirstTrickCard'; allowing any lead");
            return LeadRule::Any;
        }
    };
    let adapt = || {
        warn!("leading card '{raw}' is not '<RANK> <SUIT>' in the deck vocabulary; allowing any lead");
        LeadRule::Any
    };
    let (rank_word, suit_word) = match raw.split_once(' ') {
        Some(parts) => parts,
        None => return adapt(),
    };
    match (
        Card::rank_from_str(rank_word, &deck.rank_order),
        Suit::from_code(suit_word),
    ) {
        (Some(rank), Some(suit)) => LeadRule::Fixed(Card::new(rank, suit)),
        _ => adapt(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unreadable_document_is_fatal() {
        assert!(matches!(
            RuleSpec::from_str("{nope"),
            Err(SpecFormatError::Unreadable(_))
        ));
        assert!(matches!(
            RuleSpec::from_str("[1, 2]"),
            Err(SpecFormatError::NotAnObject)
        ));
    }

    #[test]
    fn empty_document_gets_all_defaults() {
        let spec = RuleSpec::from_str("{}").unwrap();
        assert_eq!(spec.name, "[No Name]");
        assert_eq!(spec.num_players, 4);
        assert_eq!(spec.num_reruns, 1);
        assert!(spec.ascending_ordering);
        assert_eq!(spec.initial_hand_size, 13);
        assert_eq!(spec.minimum_hand_size, 0);
        assert_eq!(spec.deck.cards.len(), 52);
        assert_eq!(spec.deck.rank_order.len(), 13);
        assert_eq!(spec.teams, vec![vec![0], vec![1], vec![2], vec![3]]);
        assert!(spec.bid_rules.is_none());
        assert!(!spec.is_team_game());
        assert_eq!(spec.policies.trump_picking, TrumpPicking::NoTrump);
        assert_eq!(spec.policies.follow_mode, FollowMode::Any);
        assert_eq!(spec.policies.game_end, GameEnd::Single);
        assert_eq!(spec.policies.session_end, SessionEnd::Single);
        assert_eq!(spec.policies.scoring, ScorePolicy::TricksWon);
        assert_eq!(spec.policies.trick_threshold, 0);
    }

    #[test]
    fn generated_deck_cards_are_distinct_with_zero_points() {
        let spec = RuleSpec::from_str("{}").unwrap();
        for (i, card) in spec.deck.cards.iter().enumerate() {
            assert_eq!(card.points, 0);
            for other in &spec.deck.cards[i + 1..] {
                assert_ne!(card, other);
            }
        }
    }

    #[test]
    fn malformed_optional_fields_fall_back() {
        let doc = json!({
            "players": "four",
            "initialHandSize": 7,
            "ascending_ordering": "yes",
            "teams": "red vs blue",
            "rules": [
                {"name": "trickThreshold", "data": "six"},
                {"name": "gameEnd", "data": "handsPlayed"},
                "not an object"
            ]
        });
        let spec = RuleSpec::from_value(&doc).unwrap();
        assert_eq!(spec.num_players, 4);
        assert_eq!(spec.initial_hand_size, 7);
        assert!(spec.ascending_ordering);
        assert_eq!(spec.teams.len(), 4);
        assert_eq!(spec.policies.trick_threshold, 0);
        // handsPlayed without a usable gameEndValue degrades to single-hand.
        assert_eq!(spec.policies.game_end, GameEnd::Single);
    }

    #[test]
    fn rules_resolve_into_policies() {
        let doc = json!({
            "players": 4,
            "rules": [
                {"name": "trumpPickingMode", "data": "fixed"},
                {"name": "trumpSuit", "data": "HEARTS"},
                {"name": "nextLegalCardMode", "data": "trick"},
                {"name": "gameEnd", "data": "scoreThreshold"},
                {"name": "gameEndValue", "data": 100},
                {"name": "sessionEnd", "data": "bestOf"},
                {"name": "sessionEndValue", "data": "5"},
                {"name": "handSize", "data": "decreasing"},
                {"name": "calculateScore", "data": "trumpPointValue"},
                {"name": "trickThreshold", "data": "6"},
                {"name": "firstTrickLeader", "data": "bidWinner"}
            ]
        });
        let spec = RuleSpec::from_value(&doc).unwrap();
        let p = &spec.policies;
        assert_eq!(p.trump_picking, TrumpPicking::Fixed(Suit::Hearts));
        assert_eq!(p.follow_mode, FollowMode::Trick);
        assert_eq!(p.game_end, GameEnd::ScoreThreshold(100));
        assert_eq!(p.session_end, SessionEnd::BestOf(5));
        assert_eq!(p.hand_size, HandSizeRule::Decreasing);
        assert_eq!(p.scoring, ScorePolicy::TrumpPointValue);
        assert_eq!(p.trick_threshold, 6);
        assert_eq!(p.first_trick_leader, FirstLeader::ContractWinner);
    }

    #[test]
    fn fixed_trump_without_suit_plays_no_trump() {
        let doc = json!({
            "rules": [{"name": "trumpPickingMode", "data": "fixed"}]
        });
        let spec = RuleSpec::from_value(&doc).unwrap();
        assert_eq!(spec.policies.trump_picking, TrumpPicking::NoTrump);
    }

    #[test]
    fn fixed_leading_card_parses_and_degrades() {
        let good = json!({
            "rules": [
                {"name": "validLeadingCardFirstTrick", "data": "fixed"},
                {"name": "validLeadingCardFirstTrickCard", "data": "TWO CLUBS"}
            ]
        });
        let spec = RuleSpec::from_value(&good).unwrap();
        assert_eq!(
            spec.policies.first_trick_lead,
            LeadRule::Fixed(Card::new(0, Suit::Clubs))
        );

        let bad = json!({
            "rules": [
                {"name": "validLeadingCardFirstTrick", "data": "fixed"},
                {"name": "validLeadingCardFirstTrickCard", "data": "TWO-OF-CLUBS"}
            ]
        });
        let spec = RuleSpec::from_value(&bad).unwrap();
        assert_eq!(spec.policies.first_trick_lead, LeadRule::Any);
    }

    #[test]
    fn custom_deck_and_rank_order() {
        let doc = json!({
            "deck": {
                "rankOrder": ["NINE", "TEN", "ACE"],
                "cards": [
                    {"rank": "NINE", "suit": "HEARTS", "pointValue": 0},
                    {"rank": "TEN", "suit": "HEARTS", "pointValue": 10},
                    {"rank": "ACE", "suit": "HEARTS", "pointValue": 11},
                    {"rank": "JOKER", "suit": "MOONS"}
                ]
            }
        });
        let spec = RuleSpec::from_value(&doc).unwrap();
        assert_eq!(spec.deck.rank_order, vec!["NINE", "TEN", "ACE"]);
        assert_eq!(spec.deck.cards.len(), 4);
        assert_eq!(spec.deck.cards[1].points, 10);
        assert_eq!(spec.deck.cards[2].rank, 2);
        // Unknown rank and suit adapt to the lowest rank of spades.
        assert_eq!(spec.deck.cards[3], Card::new(0, Suit::Spades));
    }

    #[test]
    fn bid_rules_parse_with_defaults() {
        let doc = json!({
            "initialHandSize": 13,
            "bid": {
                "ascendingBid": true,
                "trumpSuitBid": true,
                "canPass": true,
                "canDouble": true,
                "minBid": 1,
                "suitBidRank": ["CLUBS", "DIAMONDS", "HEARTS", "SPADES", "BATS"],
                "vulnerabilityThreshold": 1,
                "specialBids": [{
                    "bidValue": -1,
                    "undertrickPoints": 50,
                    "undertrickIncrement": [100, 200, 300],
                    "undertrickAwardedTo": "player",
                    "doubled": true
                }],
                "bonusScores": [{
                    "handScoreMin": 0,
                    "handScoreMax": 100,
                    "trickTotal": 6,
                    "bonusPoints": 50
                }]
            }
        });
        let spec = RuleSpec::from_value(&doc).unwrap();
        let bid = spec.bid_rules.as_ref().unwrap();
        assert!(bid.ascending_bid && bid.trump_suit_bid && bid.can_pass && bid.can_double);
        assert!(!bid.can_redouble);
        assert_eq!(bid.min_bid, 1);
        assert_eq!(bid.max_bid, 13);
        assert_eq!(bid.points_per_bid, 1);
        assert_eq!(bid.overtrick_points, 0);
        assert_eq!(
            bid.suit_bid_rank.as_deref(),
            Some(&[Suit::Clubs, Suit::Diamonds, Suit::Hearts, Suit::Spades][..])
        );
        assert_eq!(bid.vulnerability_threshold, Some(1));
        let sb = &bid.special_bids[0];
        assert_eq!(sb.bid_value, -1);
        assert_eq!(sb.undertrick_increment.as_deref(), Some(&[100, 200, 300][..]));
        assert_eq!(sb.undertrick_awarded_to, UndertrickTarget::Player);
        assert!(sb.doubled && !sb.vulnerable && !sb.blind_bid);
        let bs = &bid.bonus_scores[0];
        assert_eq!((bs.hand_score_min, bs.hand_score_max), (0, 100));
        assert_eq!(bs.trick_total, Some(6));
        assert_eq!(bs.vulnerable, None);
        assert_eq!(bs.bonus_points, 50);
    }

    #[test]
    fn teams_with_multiple_members_make_a_team_game() {
        let doc = json!({
            "players": 4,
            "teams": [[0, 2], [1, 3]]
        });
        let spec = RuleSpec::from_value(&doc).unwrap();
        assert!(spec.is_team_game());
        assert_eq!(spec.team_of(2), 0);
        assert_eq!(spec.team_of(3), 1);
    }
}
