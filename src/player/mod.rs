//! The three kinds of seat occupants. All of them answer the same four
//! questions; only where the answers come from differs.

pub mod ai;
pub mod local;
pub mod remote;

use enum_dispatch::enum_dispatch;

use crate::game::entities::{Bid, Card};
use crate::game::state::GameState;
use crate::game::EngineError;
use crate::net::session::PeerNetwork;

pub use ai::AiPlayer;
pub use local::LocalPlayer;
pub use remote::RemotePlayer;

/// Seat I/O. `receive_bid`/`receive_move` block until the occupant has an
/// answer (a line of local input, an AI decision, or a wire event); the
/// `send_*` calls are fire-and-forget notifications.
#[enum_dispatch]
pub trait SeatIo {
    fn name(&self) -> &str;

    /// Whether this seat is driven by a remote peer; invalid input from
    /// such a seat is fatal rather than re-prompted.
    fn is_remote(&self) -> bool;

    fn receive_bid(
        &mut self,
        state: &GameState,
        net: Option<&mut PeerNetwork>,
    ) -> Result<Bid, EngineError>;

    fn receive_move(
        &mut self,
        state: &GameState,
        net: Option<&mut PeerNetwork>,
    ) -> Result<Card, EngineError>;

    fn send_game_state(&mut self, state: &GameState);

    fn send_trick_summary(&mut self, winning_card: &Card, winner: &str, state: &GameState);

    fn send_session_winners(&mut self, winners: &[String]);
}

/// A seat occupant of any kind, dispatching [`SeatIo`] without dynamic
/// allocation.
#[enum_dispatch(SeatIo)]
pub enum PlayerIo {
    Local(LocalPlayer),
    Ai(AiPlayer),
    Remote(RemotePlayer),
}
