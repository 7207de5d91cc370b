//! Handler for the `place` command.

use serde_json::json;

use crate::app::App;
use crate::cli::command::PlaceArgs;
use crate::cli::output;
use crate::domain::{AccountId, MatchId, ParticipantId};
use crate::service::StakeRequest;

/// Place one stake and print the receipt.
pub async fn execute(app: &App, args: &PlaceArgs) -> anyhow::Result<()> {
    let request = StakeRequest {
        account_id: AccountId::new(args.account.clone()),
        match_id: MatchId::new(args.match_id.clone()),
        participant_id: ParticipantId::new(args.participant.clone()),
        amount: args.amount,
    };

    let stake = app.service().place_stake(request).await?;
    let balance = app
        .registry()
        .account(stake.account_id())?
        .map(|account| account.balance().to_string())
        .unwrap_or_default();

    if output::is_json() {
        output::json_output(json!({
            "command": "place",
            "stake_id": stake.id().to_string(),
            "match": stake.match_id().to_string(),
            "participant": stake.participant_id().to_string(),
            "amount": stake.amount().to_string(),
            "odds": stake.odds().to_string(),
            "payout": stake.payout().to_string(),
            "balance": balance,
        }));
        return Ok(());
    }

    output::success(&format!(
        "stake accepted on {} at {}",
        stake.participant_id(),
        stake.odds()
    ));
    output::field("Stake", stake.id());
    output::field("Amount", stake.amount());
    output::field("Odds", stake.odds());
    output::field("Payout", stake.payout());
    output::field("Balance", &balance);

    Ok(())
}
