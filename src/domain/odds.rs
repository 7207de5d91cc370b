//! Pari-mutuel odds quoting.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{round_money, Amount, MatchId, Odds, ParticipantId, Side};

/// Tunables for the odds calculator.
#[derive(Debug, Clone, Deserialize)]
pub struct PricingConfig {
    /// Prior volume added to each side's pool so odds exist before any
    /// stakes (Bayesian smoothing). Larger values damp early swings.
    #[serde(default = "default_prior")]
    pub prior: Decimal,

    /// Margin divisor applied to both raw odds; 1 quotes a fair book.
    #[serde(default = "default_overround")]
    pub overround: Decimal,

    /// Floor for published odds.
    #[serde(default = "default_min_odds")]
    pub min_odds: Decimal,

    /// Ceiling for published odds.
    #[serde(default = "default_max_odds")]
    pub max_odds: Decimal,
}

fn default_prior() -> Decimal {
    Decimal::new(5, 0)
}

fn default_overround() -> Decimal {
    Decimal::ONE
}

fn default_min_odds() -> Decimal {
    Decimal::new(101, 2) // 1.01
}

fn default_max_odds() -> Decimal {
    Decimal::new(100, 0)
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            prior: default_prior(),
            overround: default_overround(),
            min_odds: default_min_odds(),
            max_odds: default_max_odds(),
        }
    }
}

/// Quoted odds for the two sides of one match.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OddsPair {
    pub side_a: Odds,
    pub side_b: Odds,
}

impl OddsPair {
    /// The quote for one side.
    #[must_use]
    pub fn for_side(&self, side: Side) -> Odds {
        match side {
            Side::A => self.side_a,
            Side::B => self.side_b,
        }
    }
}

/// Quote both sides from pooled stake volumes.
///
/// Each side's pool is smoothed with the prior; implied probabilities are
/// the pool shares, raw odds their inverses, divided by the overround,
/// clamped to the configured band and rounded to 2 dp half-up. An empty
/// smoothed pool falls back to the symmetric 2.00 / 2.00.
#[must_use]
pub fn quote(volume_a: Amount, volume_b: Amount, config: &PricingConfig) -> OddsPair {
    let pool_a = volume_a + config.prior;
    let pool_b = volume_b + config.prior;
    let total = pool_a + pool_b;

    if total <= Decimal::ZERO {
        let fallback = Decimal::new(200, 2);
        return OddsPair {
            side_a: fallback,
            side_b: fallback,
        };
    }

    OddsPair {
        side_a: side_odds(pool_a, total, config),
        side_b: side_odds(pool_b, total, config),
    }
}

/// The quotes a match opens with, before any stakes.
#[must_use]
pub fn opening_pair(config: &PricingConfig) -> OddsPair {
    quote(Amount::ZERO, Amount::ZERO, config)
}

fn side_odds(own: Decimal, total: Decimal, config: &PricingConfig) -> Odds {
    // An empty pool implies probability zero; the ceiling caps what we
    // would otherwise quote as infinite.
    let raw = if own <= Decimal::ZERO {
        config.max_odds
    } else {
        total / own / config.overround.max(Decimal::ONE)
    };
    round_money(raw.max(config.min_odds).min(config.max_odds))
}

/// A published odds quote for one participant of one match.
///
/// Exactly one exists per participant while the match is open; placement
/// refreshes it before and after each accepted stake.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OddsQuote {
    match_id: MatchId,
    participant_id: ParticipantId,
    odds: Odds,
    updated_at: DateTime<Utc>,
}

impl OddsQuote {
    /// Create a quote record.
    #[must_use]
    pub fn new(
        match_id: MatchId,
        participant_id: ParticipantId,
        odds: Odds,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            match_id,
            participant_id,
            odds,
            updated_at,
        }
    }

    /// Get the match the quote belongs to.
    #[must_use]
    pub fn match_id(&self) -> &MatchId {
        &self.match_id
    }

    /// Get the quoted participant.
    #[must_use]
    pub fn participant_id(&self) -> &ParticipantId {
        &self.participant_id
    }

    /// Get the decimal odds.
    #[must_use]
    pub fn odds(&self) -> Odds {
        self.odds
    }

    /// When the quote was last refreshed.
    #[must_use]
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}
