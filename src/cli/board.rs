//! Handler for the `board` command.

use serde_json::json;
use tabled::{Table, Tabled};

use crate::app::App;
use crate::cli::command::BoardArgs;
use crate::cli::output;
use crate::domain::{Amount, Match, MatchId, OddsQuote, ParticipantId, Side};

#[derive(Tabled)]
struct BoardRow {
    #[tabled(rename = "Match")]
    id: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Side A")]
    side_a: String,
    #[tabled(rename = "Side B")]
    side_b: String,
    #[tabled(rename = "Pool A")]
    pool_a: String,
    #[tabled(rename = "Pool B")]
    pool_b: String,
    #[tabled(rename = "Winner")]
    winner: String,
}

#[derive(Tabled)]
struct StakeLine {
    #[tabled(rename = "Stake")]
    id: String,
    #[tabled(rename = "Account")]
    account: String,
    #[tabled(rename = "Participant")]
    participant: String,
    #[tabled(rename = "Amount")]
    amount: String,
    #[tabled(rename = "Odds")]
    odds: String,
    #[tabled(rename = "Payout")]
    payout: String,
    #[tabled(rename = "Status")]
    status: String,
}

/// Render the quote board, or one match in detail.
pub fn execute(app: &App, args: &BoardArgs) -> anyhow::Result<()> {
    match &args.match_id {
        Some(id) => detail(app, &MatchId::new(id.clone())),
        None => summary(app),
    }
}

fn summary(app: &App) -> anyhow::Result<()> {
    let registry = app.registry();
    let matches = registry.matches()?;

    if output::is_json() {
        let mut items = Vec::new();
        for mat in &matches {
            let quotes = registry.quotes(mat.id())?;
            let (pool_a, pool_b) = registry.pool_volumes(mat.id())?;
            items.push(json!({
                "match": mat.id().to_string(),
                "status": mat.status().to_string(),
                "side_a": side_json(mat, Side::A, &quotes, pool_a),
                "side_b": side_json(mat, Side::B, &quotes, pool_b),
                "winner": mat.winner().map(ToString::to_string),
            }));
        }
        output::json_output(json!({
            "command": "board",
            "matches": items,
        }));
        return Ok(());
    }

    output::header(env!("CARGO_PKG_VERSION"));
    if matches.is_empty() {
        output::note("no matches yet");
        output::hint(&format!(
            "run {} to create one",
            output::highlight("toteboard seed")
        ));
        return Ok(());
    }

    output::section("Quote board");
    let mut rows = Vec::new();
    for mat in &matches {
        let quotes = registry.quotes(mat.id())?;
        let (pool_a, pool_b) = registry.pool_volumes(mat.id())?;
        rows.push(BoardRow {
            id: mat.id().to_string(),
            status: mat.status().to_string(),
            side_a: side_cell(mat, Side::A, &quotes),
            side_b: side_cell(mat, Side::B, &quotes),
            pool_a: pool_a.to_string(),
            pool_b: pool_b.to_string(),
            winner: mat
                .winner()
                .map_or_else(|| "-".to_string(), ToString::to_string),
        });
    }
    let table = Table::new(rows).to_string();
    output::lines(&table);

    Ok(())
}

fn detail(app: &App, match_id: &MatchId) -> anyhow::Result<()> {
    let registry = app.registry();
    let mat = registry
        .match_by_id(match_id)?
        .ok_or_else(|| anyhow::anyhow!("match {match_id} not found"))?;
    let quotes = registry.quotes(match_id)?;
    let (pool_a, pool_b) = registry.pool_volumes(match_id)?;
    let stakes = registry.stakes_for_match(match_id)?;

    if output::is_json() {
        let stake_items: Vec<_> = stakes
            .iter()
            .map(|stake| {
                json!({
                    "stake_id": stake.id().to_string(),
                    "account": stake.account_id().to_string(),
                    "participant": stake.participant_id().to_string(),
                    "amount": stake.amount().to_string(),
                    "odds": stake.odds().to_string(),
                    "payout": stake.payout().to_string(),
                    "status": stake.status().to_string(),
                })
            })
            .collect();
        output::json_output(json!({
            "command": "board",
            "match": mat.id().to_string(),
            "status": mat.status().to_string(),
            "side_a": side_json(&mat, Side::A, &quotes, pool_a),
            "side_b": side_json(&mat, Side::B, &quotes, pool_b),
            "winner": mat.winner().map(ToString::to_string),
            "stakes": stake_items,
        }));
        return Ok(());
    }

    output::header(env!("CARGO_PKG_VERSION"));
    output::section(&format!(
        "match {}: {} vs {}",
        mat.id(),
        mat.side_a(),
        mat.side_b()
    ));
    output::field("Status", mat.status());
    output::field("Side A", format_side(&mat, Side::A, &quotes, pool_a));
    output::field("Side B", format_side(&mat, Side::B, &quotes, pool_b));
    if let Some(winner) = mat.winner() {
        output::field("Winner", winner);
    }

    if stakes.is_empty() {
        output::note("no stakes placed");
        return Ok(());
    }
    let lines: Vec<StakeLine> = stakes
        .iter()
        .map(|stake| StakeLine {
            id: stake.id().to_string(),
            account: stake.account_id().to_string(),
            participant: stake.participant_id().to_string(),
            amount: stake.amount().to_string(),
            odds: stake.odds().to_string(),
            payout: stake.payout().to_string(),
            status: stake.status().to_string(),
        })
        .collect();
    output::section("Stakes");
    output::lines(&Table::new(lines).to_string());

    Ok(())
}

fn odds_for(quotes: &[OddsQuote], participant: &ParticipantId) -> String {
    quotes
        .iter()
        .find(|quote| quote.participant_id() == participant)
        .map_or_else(|| "-".to_string(), |quote| quote.odds().to_string())
}

fn side_cell(mat: &Match, side: Side, quotes: &[OddsQuote]) -> String {
    let participant = mat.participant(side);
    format!("{} @ {}", participant, odds_for(quotes, participant))
}

fn format_side(mat: &Match, side: Side, quotes: &[OddsQuote], pool: Amount) -> String {
    format!("{} (pool {})", side_cell(mat, side, quotes), pool)
}

fn side_json(mat: &Match, side: Side, quotes: &[OddsQuote], pool: Amount) -> serde_json::Value {
    let participant = mat.participant(side);
    json!({
        "participant": participant.to_string(),
        "odds": odds_for(quotes, participant),
        "pool": pool.to_string(),
    })
}
