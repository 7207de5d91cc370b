//! Handler for the `seed` command.

use serde_json::json;

use crate::app::App;
use crate::cli::command::SeedArgs;
use crate::cli::output;
use crate::domain::{AccountId, MatchId, ParticipantId};

/// Ensure demo accounts and a match exist, leaving existing rows alone.
pub fn execute(app: &App, args: &SeedArgs) -> anyhow::Result<()> {
    let registry = app.registry();

    let mut created = 0u32;
    let mut existing = 0u32;
    for n in 1..=args.accounts {
        let id = AccountId::new(format!("u{n}"));
        if registry.account(&id)?.is_some() {
            existing += 1;
            continue;
        }
        registry.create_account(&id, args.balance)?;
        created += 1;
    }

    let match_id = MatchId::new(args.match_id.clone());
    let match_created = match registry.match_by_id(&match_id)? {
        Some(_) => false,
        None => {
            registry.create_match(
                &match_id,
                &ParticipantId::new(args.side_a.clone()),
                &ParticipantId::new(args.side_b.clone()),
                app.pricing(),
            )?;
            true
        }
    };

    if output::is_json() {
        output::json_output(json!({
            "command": "seed",
            "accounts_created": created,
            "accounts_existing": existing,
            "match": args.match_id,
            "match_created": match_created,
        }));
        return Ok(());
    }

    output::header(env!("CARGO_PKG_VERSION"));
    output::section("Seeding ledger");
    output::success(&format!(
        "{created} accounts created, {existing} already present"
    ));
    if match_created {
        output::success(&format!(
            "match {} scheduled: {} vs {}",
            args.match_id, args.side_a, args.side_b
        ));
    } else {
        output::note(&format!("match {} already exists", args.match_id));
    }
    output::hint(&format!(
        "run {} to see the quote board",
        output::highlight("toteboard board")
    ));

    Ok(())
}
