//! Handler for the `simulate` command.

use rand::Rng;
use rust_decimal::Decimal;
use serde_json::json;

use crate::app::App;
use crate::cli::command::SimulateArgs;
use crate::cli::output;
use crate::domain::{AccountId, MatchId, OddsQuote, ParticipantId};
use crate::service::StakeRequest;

/// Fire concurrent random placements at one match and report the pools.
pub async fn execute(app: &App, args: &SimulateArgs) -> anyhow::Result<()> {
    anyhow::ensure!(args.max_amount > 0, "--max-amount must be at least 1");

    let registry = app.registry();
    let match_id = MatchId::new(args.match_id.clone());
    let mat = registry.match_by_id(&match_id)?.ok_or_else(|| {
        anyhow::anyhow!("match {} not found, run toteboard seed first", args.match_id)
    })?;

    // Fund one account per bettor so no placement fails on balance.
    let bankroll = Decimal::from(args.stakes * args.max_amount);
    let mut bettors = Vec::new();
    for n in 1..=args.bettors {
        let id = AccountId::new(format!("sim{n}"));
        if registry.account(&id)?.is_none() {
            registry.create_account(&id, bankroll)?;
        } else {
            registry.deposit(&id, bankroll)?;
        }
        bettors.push(id);
    }

    // Draw the whole betting plan up front; the tasks only place.
    let mut rng = rand::thread_rng();
    let mut plans: Vec<Vec<StakeRequest>> = Vec::new();
    for account_id in &bettors {
        let mut requests = Vec::new();
        for _ in 0..args.stakes {
            let participant = if rng.gen_bool(0.5) {
                mat.side_a()
            } else {
                mat.side_b()
            };
            requests.push(StakeRequest {
                account_id: account_id.clone(),
                match_id: match_id.clone(),
                participant_id: participant.clone(),
                amount: Decimal::from(rng.gen_range(1..=args.max_amount)),
            });
        }
        plans.push(requests);
    }

    let total = args.bettors * args.stakes;
    let pb = output::spinner(&format!(
        "placing {total} stakes from {} concurrent bettors",
        args.bettors
    ));

    let mut handles = Vec::new();
    for requests in plans {
        let service = app.service().clone();
        handles.push(tokio::spawn(async move {
            let mut accepted = 0u32;
            let mut rejected = 0u32;
            for request in requests {
                match service.place_stake(request).await {
                    Ok(_) => accepted += 1,
                    Err(_) => rejected += 1,
                }
            }
            (accepted, rejected)
        }));
    }

    let mut accepted = 0u32;
    let mut rejected = 0u32;
    for handle in handles {
        let (task_accepted, task_rejected) = handle.await?;
        accepted += task_accepted;
        rejected += task_rejected;
    }
    output::spinner_success(
        &pb,
        &format!("{accepted} stakes accepted, {rejected} rejected"),
    );

    let (pool_a, pool_b) = registry.pool_volumes(&match_id)?;
    let quotes = registry.quotes(&match_id)?;
    let odds_a = odds_for(&quotes, mat.side_a());
    let odds_b = odds_for(&quotes, mat.side_b());

    if output::is_json() {
        output::json_output(json!({
            "command": "simulate",
            "match": args.match_id,
            "accepted": accepted,
            "rejected": rejected,
            "pool_a": pool_a.to_string(),
            "pool_b": pool_b.to_string(),
            "odds_a": odds_a,
            "odds_b": odds_b,
        }));
        return Ok(());
    }

    output::field("Pool A", format!("{} ({})", pool_a, mat.side_a()));
    output::field("Pool B", format!("{} ({})", pool_b, mat.side_b()));
    output::field(
        "Quotes",
        format!("{} @ {} / {} @ {}", mat.side_a(), odds_a, mat.side_b(), odds_b),
    );
    output::hint(&format!(
        "run {} for the full picture",
        output::highlight(format!("toteboard board --match {}", args.match_id))
    ));

    Ok(())
}

fn odds_for(quotes: &[OddsQuote], participant: &ParticipantId) -> String {
    quotes
        .iter()
        .find(|quote| quote.participant_id() == participant)
        .map_or_else(|| "-".to_string(), |quote| quote.odds().to_string())
}
