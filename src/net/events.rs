use serde::{Deserialize, Serialize};

use crate::game::entities::{Bid, BidKind, Card};

/// One mesh endpoint as advertised in the session roster.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerAddr {
    pub ip: String,
    pub port: u16,
}

/// Everything a joining peer needs to run the same session as the host:
/// the rule document verbatim, the seat roster in seat order, and the
/// shared shuffle seed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionDescriptor {
    pub spec: String,
    pub players: Vec<PeerAddr>,
    pub seed: u64,
}

/// A framed message on a peer link. `Join` and `Peer` only appear during
/// establishment; the rest of the session is bids, plays, and the ready
/// barrier.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum WireEvent {
    /// First message on a connection to the host: where the sender's own
    /// listener can be reached by the other peers.
    Join { ip: String, port: u16 },
    /// First message on a mesh connection between two non-host peers,
    /// identifying the dialling seat.
    Peer { seat: usize },
    /// A bid by the seat that owns the sending link. A negative value is
    /// a pass; `doubling` marks a double or redouble.
    Bid {
        suit: Option<String>,
        value: i64,
        blind: bool,
        doubling: bool,
    },
    /// A card played by the seat that owns the sending link, named by
    /// rank word and suit code.
    Play { suit: String, rank: String },
    Ready { player_index: usize },
    Descriptor(SessionDescriptor),
}

impl WireEvent {
    pub fn bid(bid: &Bid) -> Self {
        match bid.kind {
            BidKind::Pass => Self::Bid {
                suit: None,
                value: -1,
                blind: false,
                doubling: false,
            },
            BidKind::Double => Self::Bid {
                suit: None,
                value: 0,
                blind: false,
                doubling: true,
            },
            BidKind::Bid => Self::Bid {
                suit: bid.suit.map(|s| s.code().to_string()),
                value: i64::from(bid.value),
                blind: bid.blind,
                doubling: false,
            },
        }
    }

    /// None if the card's rank is not in the deck's rank order, which
    /// cannot happen for a card that came out of the deck.
    pub fn play(card: &Card, rank_order: &[String]) -> Option<Self> {
        Some(Self::Play {
            suit: card.suit.code().to_string(),
            rank: Card::rank_to_str(card.rank, rank_order)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::entities::Suit;
    use crate::spec::loader::standard_rank_order;

    #[test]
    fn pass_goes_out_as_negative_value() {
        assert_eq!(
            WireEvent::bid(&Bid::pass()),
            WireEvent::Bid {
                suit: None,
                value: -1,
                blind: false,
                doubling: false
            }
        );
    }

    #[test]
    fn double_goes_out_as_doubling_flag() {
        assert_eq!(
            WireEvent::bid(&Bid::double()),
            WireEvent::Bid {
                suit: None,
                value: 0,
                blind: false,
                doubling: true
            }
        );
    }

    #[test]
    fn offer_carries_suit_code_and_blindness() {
        let event = WireEvent::bid(&Bid::offer(6, Some(Suit::Hearts), true));
        assert_eq!(
            event,
            WireEvent::Bid {
                suit: Some("HEARTS".to_string()),
                value: 6,
                blind: true,
                doubling: false
            }
        );
    }

    #[test]
    fn play_names_the_card_by_rank_word() {
        let order = standard_rank_order();
        let card = Card::new(12, Suit::Spades);
        assert_eq!(
            WireEvent::play(&card, &order),
            Some(WireEvent::Play {
                suit: "SPADES".to_string(),
                rank: "ACE".to_string()
            })
        );
        assert_eq!(WireEvent::play(&Card::new(40, Suit::Clubs), &order), None);
    }
}
