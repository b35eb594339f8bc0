//! Hand-end scoring and score-derived winner computations.

use crate::game::entities::BidKind;
use crate::game::state::GameState;
use crate::spec::{ScorePolicy, UndertrickTarget};

/// Apply the hand's results to every seat's running game score, per the
/// configured scoring policy.
pub fn score_hand(state: &mut GameState) {
    match state.spec.policies.scoring {
        ScorePolicy::TricksWon => score_tricks_won(state),
        ScorePolicy::TrumpPointValue => score_trump_point_value(state),
        ScorePolicy::Bid => score_bids(state),
    }
}

fn score_tricks_won(state: &mut GameState) {
    let threshold = state.spec.policies.trick_threshold;
    for seat in &mut state.seats {
        let over = seat.tricks_this_hand.saturating_sub(threshold);
        seat.points_this_game += over as i64;
    }
}

fn score_trump_point_value(state: &mut GameState) {
    let trump = state.trump_suit;
    for seat in &mut state.seats {
        let mut points = 0;
        for trick in &seat.tricks_earned {
            for card in trick {
                // With no trump in play every captured card counts.
                if trump.is_none() || trump == Some(card.suit) {
                    points += card.points;
                }
            }
        }
        seat.points_this_game += points;
    }
}

/// Contract scoring. Each seat that made an actual bid (not a pass or a
/// double) is scored against its trick count; special bids override the
/// flat formula when they match, and the single highest matching bonus
/// score is added on top. Undertrick points routed to "opponent" land on
/// one representative seat of each opposing team.
fn score_bids(state: &mut GameState) {
    let spec = state.spec.clone();
    let rules = match &spec.bid_rules {
        Some(rules) => rules,
        None => return,
    };
    let threshold = spec.policies.trick_threshold as i64;

    for seat_idx in 0..state.seats.len() {
        let (bid, tricks, vulnerable) = {
            let seat = &state.seats[seat_idx];
            match &seat.bid {
                Some(bid) if bid.kind == BidKind::Bid => {
                    (bid.clone(), seat.tricks_earned.len() as i64, seat.vulnerable)
                }
                _ => continue,
            }
        };

        // Positive means overtricks, negative undertricks.
        let diff = (tricks - threshold) - bid.value as i64;
        let mut to_give = 0i64;
        let mut to_opponent = 0i64;
        let mut matched = false;

        for special in &rules.special_bids {
            let value_matches = special.bid_value == bid.value as i64 || special.bid_value == -1;
            let suit_matches = !rules.trump_suit_bid || special.trump_suit == state.trump_suit;
            if !(value_matches
                && suit_matches
                && special.doubled == bid.doubled
                && special.vulnerable == vulnerable
                && special.blind_bid == bid.blind)
            {
                continue;
            }
            matched = true;

            if diff > 0 {
                to_give += special.bonus_points;
                to_give += special.overtrick_points * diff;
            }
            if diff < 0 {
                to_give -= special.penalty;
                let undertricks = -diff;
                let total = match &special.undertrick_increment {
                    Some(schedule) => (0..undertricks as usize)
                        .map(|i| schedule[i.min(schedule.len() - 1)])
                        .sum(),
                    None => undertricks * special.undertrick_points,
                };
                match special.undertrick_awarded_to {
                    UndertrickTarget::Player => to_give += total,
                    UndertrickTarget::Opponent => to_opponent += total,
                }
            }
        }

        if !matched {
            if diff > 0 {
                to_give += rules.points_per_bid * bid.value as i64;
                to_give += rules.overtrick_points * diff;
            }
            if diff == 0 {
                to_give += rules.points_per_bid * bid.value as i64;
                to_give += rules.points_for_matching;
            }
            if diff < 0 {
                to_give += rules.penalty_points * diff;
            }
        }

        // Only the single highest matching bonus applies, and only when it
        // improves the score.
        let mut best_bonus = 0i64;
        for bonus in &rules.bonus_scores {
            let in_range = bonus.hand_score_min < to_give && to_give < bonus.hand_score_max;
            let tricks_match = bonus
                .trick_total
                .map_or(true, |t| t == bid.value as i64 - threshold);
            let vulnerable_match = bonus.vulnerable.map_or(true, |v| v == vulnerable);
            if in_range && tricks_match && vulnerable_match {
                best_bonus = best_bonus.max(bonus.bonus_points);
            }
        }
        to_give += best_bonus;

        state.seats[seat_idx].points_this_game += to_give;
        if to_opponent != 0 {
            for team in &spec.teams {
                if !team.contains(&seat_idx) {
                    state.seats[team[0]].points_this_game += to_opponent;
                }
            }
        }
    }
}

/// The team with the highest game score; the first such team on a tie.
pub fn game_winning_team(state: &GameState) -> usize {
    let mut winner = 0;
    let mut best = i64::MIN;
    for team in 0..state.spec.teams.len() {
        let points = state.team_points(team);
        if points > best {
            best = points;
            winner = team;
        }
    }
    winner
}

/// Whether the game's top score is shared (between teams in a team game,
/// between seats otherwise). A tied game forces another hand.
pub fn game_has_tie(state: &GameState) -> bool {
    let scores: Vec<i64> = if state.team_game {
        (0..state.spec.teams.len())
            .map(|t| state.team_points(t))
            .collect()
    } else {
        state.seats.iter().map(|s| s.points_this_game).collect()
    };
    let mut sorted = scores;
    sorted.sort_unstable_by(|a, b| b.cmp(a));
    sorted.len() >= 2 && sorted[0] == sorted[1]
}

/// Names of the session's winners: every member of every top team in a
/// team game, every top seat otherwise.
pub fn session_winners(state: &GameState) -> Vec<String> {
    if state.team_game {
        let wins: Vec<u32> = (0..state.spec.teams.len())
            .map(|t| state.team_games_won(t))
            .collect();
        let best = wins.iter().copied().max().unwrap_or(0);
        let mut winners = Vec::new();
        for (team, &won) in wins.iter().enumerate() {
            if won == best {
                for &seat in &state.spec.teams[team] {
                    winners.push(state.seats[seat].name.clone());
                }
            }
        }
        winners
    } else {
        let best = state
            .seats
            .iter()
            .map(|s| s.games_this_session)
            .max()
            .unwrap_or(0);
        state
            .seats
            .iter()
            .filter(|s| s.games_this_session == best)
            .map(|s| s.name.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::entities::{Bid, Card, Seat, Suit};
    use crate::spec::RuleSpec;
    use serde_json::json;
    use std::sync::Arc;

    fn state_from(doc: serde_json::Value, players: usize) -> GameState {
        let spec = Arc::new(RuleSpec::from_value(&doc).unwrap());
        let seats = (0..players)
            .map(|i| Seat::new(i, format!("p{i}"), false))
            .collect();
        GameState::new(spec, seats, 1, false)
    }

    #[test]
    fn tricks_won_scoring_applies_threshold() {
        let mut state = state_from(
            json!({"players": 2, "rules": [{"name": "trickThreshold", "data": "6"}]}),
            2,
        );
        state.seats[0].tricks_this_hand = 8;
        state.seats[1].tricks_this_hand = 5;
        score_hand(&mut state);
        assert_eq!(state.seats[0].points_this_game, 2);
        // Below the threshold never goes negative.
        assert_eq!(state.seats[1].points_this_game, 0);
    }

    #[test]
    fn trump_point_value_counts_trump_captures_only() {
        let mut state = state_from(
            json!({"players": 2, "rules": [{"name": "calculateScore", "data": "trumpPointValue"}]}),
            2,
        );
        state.trump_suit = Some(Suit::Hearts);
        state.seats[0].tricks_earned = vec![vec![
            Card::with_points(3, Suit::Hearts, 10),
            Card::with_points(4, Suit::Clubs, 99),
        ]];
        score_hand(&mut state);
        assert_eq!(state.seats[0].points_this_game, 10);

        // No trump in play: everything counts.
        state.trump_suit = None;
        state.seats[0].points_this_game = 0;
        score_hand(&mut state);
        assert_eq!(state.seats[0].points_this_game, 109);
    }

    #[test]
    fn flat_bid_scoring_scenario() {
        // Bid 3, win 4 tricks, threshold 0: 10*3 + 30*1 = 60.
        let mut state = state_from(
            json!({
                "players": 2,
                "rules": [{"name": "calculateScore", "data": "bid"}],
                "bid": {"pointsPerBid": 10, "overtrickPoints": 30}
            }),
            2,
        );
        state.seats[0].bid = Some(Bid::offer(3, None, false));
        state.seats[0].tricks_earned = vec![Vec::new(); 4];
        state.seats[1].bid = Some(Bid::pass());
        score_hand(&mut state);
        assert_eq!(state.seats[0].points_this_game, 60);
        // Passing seats are not scored.
        assert_eq!(state.seats[1].points_this_game, 0);
    }

    #[test]
    fn flat_bid_scoring_match_and_undertricks() {
        let doc = json!({
            "players": 2,
            "rules": [{"name": "calculateScore", "data": "bid"}],
            "bid": {"pointsPerBid": 10, "pointsForMatching": 5, "penaltyPoints": 7}
        });
        let mut state = state_from(doc.clone(), 2);
        state.seats[0].bid = Some(Bid::offer(3, None, false));
        state.seats[0].tricks_earned = vec![Vec::new(); 3];
        score_hand(&mut state);
        assert_eq!(state.seats[0].points_this_game, 35);

        let mut state = state_from(doc, 2);
        state.seats[0].bid = Some(Bid::offer(3, None, false));
        state.seats[0].tricks_earned = vec![Vec::new(); 1];
        score_hand(&mut state);
        // Two undertricks at -7 each.
        assert_eq!(state.seats[0].points_this_game, -14);
    }

    #[test]
    fn special_bid_overrides_flat_formula() {
        let mut state = state_from(
            json!({
                "players": 4,
                "teams": [[0, 2], [1, 3]],
                "rules": [{"name": "calculateScore", "data": "bid"}],
                "bid": {
                    "pointsPerBid": 1000,
                    "specialBids": [{
                        "bidValue": 6,
                        "penalty": 50,
                        "undertrickIncrement": [100, 200, 300],
                        "undertrickAwardedTo": "opponent"
                    }]
                }
            }),
            4,
        );
        state.seats[0].bid = Some(Bid::offer(6, None, false));
        state.seats[0].tricks_earned = vec![Vec::new(); 2];
        score_hand(&mut state);
        // Four undertricks: schedule 100, 200, 300, then the last entry
        // repeats. The penalty hits the bidder, the undertrick points go to
        // the opposing team's representative seat.
        assert_eq!(state.seats[0].points_this_game, -50);
        assert_eq!(state.seats[1].points_this_game, 100 + 200 + 300 + 300);
        assert_eq!(state.seats[2].points_this_game, 0);
        assert_eq!(state.seats[3].points_this_game, 0);
    }

    #[test]
    fn special_bid_requires_full_condition_match() {
        let doc = json!({
            "players": 2,
            "rules": [{"name": "calculateScore", "data": "bid"}],
            "bid": {
                "pointsPerBid": 10,
                "specialBids": [{"bidValue": -1, "vulnerable": true, "bonusPoints": 500, "overtrickPoints": 1}]
            }
        });
        let mut state = state_from(doc, 2);
        state.seats[0].bid = Some(Bid::offer(2, None, false));
        state.seats[0].tricks_earned = vec![Vec::new(); 3];
        // Not vulnerable, so the special bid does not match and flat rules
        // apply: 10*2 overtrick path with default overtrickPoints 0.
        score_hand(&mut state);
        assert_eq!(state.seats[0].points_this_game, 20);
    }

    #[test]
    fn highest_matching_bonus_applies_once() {
        let mut state = state_from(
            json!({
                "players": 2,
                "rules": [{"name": "calculateScore", "data": "bid"}],
                "bid": {
                    "pointsPerBid": 10,
                    "bonusScores": [
                        {"handScoreMin": 0, "handScoreMax": 100, "bonusPoints": 25},
                        {"handScoreMin": 0, "handScoreMax": 100, "bonusPoints": 40},
                        {"handScoreMin": 0, "handScoreMax": 100, "trickTotal": 99, "bonusPoints": 1000}
                    ]
                }
            }),
            2,
        );
        state.seats[0].bid = Some(Bid::offer(3, None, false));
        state.seats[0].tricks_earned = vec![Vec::new(); 3];
        score_hand(&mut state);
        assert_eq!(state.seats[0].points_this_game, 30 + 40);
    }

    #[test]
    fn tie_detection_and_winning_team() {
        let mut state = state_from(json!({"players": 3}), 3);
        state.seats[0].points_this_game = 5;
        state.seats[1].points_this_game = 5;
        state.seats[2].points_this_game = 1;
        assert!(game_has_tie(&state));
        state.seats[1].points_this_game = 4;
        assert!(!game_has_tie(&state));
        assert_eq!(game_winning_team(&state), 0);
    }

    #[test]
    fn session_winners_are_tie_aware() {
        let mut state = state_from(json!({"players": 3}), 3);
        state.seats[0].games_this_session = 2;
        state.seats[2].games_this_session = 2;
        assert_eq!(session_winners(&state), vec!["p0", "p2"]);
    }
}
