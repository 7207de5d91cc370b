//! Betting services: stake placement, match settlement, and the
//! facade that runs them inside ledger transactions.

mod betting;
mod placement;
mod settlement;

pub use betting::BettingService;
pub use placement::StakeRequest;
pub use settlement::{DrawPolicy, MatchUpdate};
