//! Shut the Box with three bots, played through the coordinator.
//!
//! ```text
//! cargo run -p shutbox-demo -- [seed]
//! RUST_LOG=debug cargo run -p shutbox-demo
//! ```
//!
//! The bots flip whatever tiles the coordinator suggests and pass when it
//! has nothing to offer. The same seed always plays the same game.

use shutbox::prelude::*;

const BOTS: [(UserId, &str); 3] = [(UserId(1), "ada"), (UserId(2), "bo"), (UserId(3), "cy")];

// ---------------------------------------------------------------------------
// Bot play
// ---------------------------------------------------------------------------

/// One turn: the creator rolls, then every bot still in acts once.
async fn play_turn(
    coordinator: &SessionCoordinator<MemoryStore>,
    session_id: SessionId,
) -> Result<Session, ShutboxError> {
    let creator = BOTS[0].0;
    let mut session = coordinator.roll(session_id, creator).await?;
    tracing::debug!(round = session.current_round, dice = session.dice_total(), "rolled");

    for (user, name) in BOTS {
        if session.round_phase != RoundPhase::Flipping {
            break;
        }
        if session.player_by_user(user).is_some_and(|p| p.is_out) {
            continue;
        }
        session = match coordinator.hint(session_id, user).await? {
            Some(tiles) => {
                tracing::debug!(bot = name, ?tiles, "flip");
                coordinator.flip(session_id, user, tiles).await?
            }
            None => {
                tracing::debug!(bot = name, "pass");
                coordinator.pass(session_id, user).await?
            }
        };
    }
    Ok(session)
}

/// Plays one seeded game to the end and returns the final state.
async fn play(seed: u64) -> Result<Session, ShutboxError> {
    let config = CoordinatorConfig {
        dice_seed: Some(seed),
        ..CoordinatorConfig::default()
    };
    let coordinator = SessionCoordinator::new(MemoryStore::new(), config);

    let params = NewSession {
        name: format!("demo table #{seed}"),
        max_tiles: 10,
        max_players: BOTS.len() as u8,
    };
    let session_id = coordinator.create(BOTS[0].0, params).await?.id;
    for (user, _) in &BOTS[1..] {
        coordinator.join(session_id, *user).await?;
    }
    coordinator.start(session_id, BOTS[0].0).await?;

    loop {
        let session = play_turn(&coordinator, session_id).await?;
        match session.round_phase {
            RoundPhase::Finished => return Ok(session),
            RoundPhase::RoundEnd => {
                print_round(&session);
                coordinator.advance_round(session_id, BOTS[0].0).await?;
            }
            _ => {}
        }
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

fn bot_name(user: UserId) -> &'static str {
    BOTS.iter()
        .find(|(id, _)| *id == user)
        .map_or("?", |(_, name)| name)
}

fn print_round(session: &Session) {
    let line: Vec<String> = session
        .players
        .iter()
        .map(|p| format!("{} +{} = {}", bot_name(p.user_id), p.round_score, p.score))
        .collect();
    println!("round {:>2}: {}", session.current_round, line.join(", "));
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    shutbox::telemetry::init_with("warn");

    let seed = match std::env::args().nth(1) {
        Some(arg) => arg.parse()?,
        None => 42,
    };
    tracing::info!(seed, "starting demo game");

    let session = play(seed).await?;
    print_round(&session);

    println!();
    for (place, player) in session.standings().iter().enumerate() {
        println!("{}. {:<4} {:>3}", place + 1, bot_name(player.user_id), player.score);
    }
    if let Some(winner) = session.winner() {
        println!("\nwinner: {}", bot_name(winner.user_id));
    }

    let bytes = JsonCodec.encode(&session)?;
    let value: serde_json::Value = serde_json::from_slice(&bytes)?;
    println!("\n{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}
