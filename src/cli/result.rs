//! Handler for the `result` command.

use serde_json::json;

use crate::app::App;
use crate::cli::command::ResultArgs;
use crate::cli::output;
use crate::domain::{MatchId, ParticipantId, StakeStatus};
use crate::service::MatchUpdate;

/// Apply a status update and report what settled.
pub async fn execute(app: &App, args: &ResultArgs) -> anyhow::Result<()> {
    let match_id = MatchId::new(args.match_id.clone());
    let update = MatchUpdate {
        match_id: match_id.clone(),
        status: args.status,
        score: args.score,
        winner: args.winner.clone().map(ParticipantId::new),
    };

    let mat = app.service().update_match_status(update).await?;

    let stakes = app.registry().stakes_for_match(&match_id)?;
    let count = |status: StakeStatus| stakes.iter().filter(|s| s.status() == status).count();
    let (won, lost, voided) = (
        count(StakeStatus::Won),
        count(StakeStatus::Lost),
        count(StakeStatus::Void),
    );

    if output::is_json() {
        output::json_output(json!({
            "command": "result",
            "match": mat.id().to_string(),
            "status": mat.status().to_string(),
            "winner": mat.winner().map(ToString::to_string),
            "stakes_won": won,
            "stakes_lost": lost,
            "stakes_voided": voided,
        }));
        return Ok(());
    }

    output::success(&format!("match {} is now {}", mat.id(), mat.status()));
    if let Some(winner) = mat.winner() {
        output::field("Winner", winner);
    }
    if mat.status().is_completed() {
        output::field("Won", won);
        output::field("Lost", lost);
        if voided > 0 {
            output::field("Voided", voided);
        }
    }

    Ok(())
}
