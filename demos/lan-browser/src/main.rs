//! A minimal session browser against the in-process `"Null"` backend.
//!
//! Hosts a session, discovers it through a search, and joins the first
//! result — the whole Host/Find/Join flow without a game attached. Run
//! with `RUST_LOG=info` (or `debug` for completion bookkeeping) to watch
//! the orchestrator work.

use lobbyforge::{
    BackendRegistry, FindParams, NullTravel, SessionOrchestrator,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut orchestrator =
        SessionOrchestrator::new(BackendRegistry::with_defaults(), NullTravel);
    orchestrator.try_change_backend("Null");
    let nickname = orchestrator.player_nickname();
    println!(
        "backend: {}  player: {}",
        orchestrator.backend_name().unwrap_or("<none>"),
        nickname,
    );

    // Host a session from a tweaked default config.
    {
        let config = orchestrator.config_mut();
        config.server_name = "Null LAN Party".to_string();
        config.public_map_name = "Dusty Crossing".to_string();
        config.is_lan_match = true;
    }
    orchestrator.host_game()?;
    orchestrator.pump(); // create complete, start requested
    orchestrator.pump(); // start complete, host travel
    println!("hosting: {}", orchestrator.is_hosting());

    // Browse. On the Null backend this finds our own advertised session.
    orchestrator.find_sessions(FindParams {
        lan_only: true,
        ..FindParams::default()
    })?;
    orchestrator.pump();

    for (index, result) in orchestrator.search_results().iter().enumerate() {
        println!(
            "[{index}] {}  map {}  {}/{} slots open  {}ms",
            result.server_name().unwrap_or("<unnamed>"),
            result.map_name().unwrap_or("<unknown>"),
            result.open_public_connections,
            result.num_public_connections,
            result.ping_ms,
        );
    }

    if orchestrator.search_results().is_empty() {
        println!("no sessions found");
        return Ok(());
    }

    orchestrator.join_session(0)?;
    orchestrator.pump(); // join complete, client travel
    println!("joined: {}", orchestrator.is_joined());

    Ok(())
}
