//! Storage-agnostic domain logic.

mod account;
mod ids;
mod matches;
mod money;
mod odds;
mod stake;

// Core domain types
pub use account::Account;
pub use ids::{AccountId, MatchId, ParticipantId, StakeId};
pub use matches::{Match, MatchStatus, Outcome, Side};
pub use money::{round_money, Amount, Odds};
pub use stake::{Stake, StakeStatus};

// Odds calculator
pub use odds::{opening_pair, quote, OddsPair, OddsQuote, PricingConfig};
