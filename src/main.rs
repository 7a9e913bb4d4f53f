//! CROUPIER — deterministic betting advisor for European roulette.
//!
//! Entry point. Loads configuration, initialises structured logging, opens
//! the session store, and runs an interactive advisor loop: the operator
//! types each winning number as the croupier calls it, and the engine
//! answers with the next suggested bet until a stop condition fires.

use anyhow::Result;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info, warn};

use croupier::config::AppConfig;
use croupier::game::GameEngine;
use croupier::methods::{MethodOutput, MethodRegistry};
use croupier::session::SessionService;
use croupier::storage::{JsonFileRepository, SessionRepository};
use croupier::types::{CroupierError, EndReason, MethodId};

const BANNER: &str = r#"
   ____ ____   ___  _   _ ____ ___ _____ ____
  / ___|  _ \ / _ \| | | |  _ \_ _| ____|  _ \
 | |   | |_) | | | | | | | |_) | ||  _| | |_) |
 | |___|  _ <| |_| | |_| |  __/| || |___|  _ <
  \____|_| \_\\___/ \___/|_|  |___|_____|_| \_\

  Deterministic roulette session advisor
  v0.1.0
"#;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (non-fatal if missing)
    let _ = dotenv::dotenv();

    let cfg = AppConfig::load("config.toml")?;

    init_logging();

    println!("{BANNER}");
    info!(
        user = %cfg.advisor.user,
        method = %cfg.advisor.method,
        base_amount = %cfg.session.base_amount,
        stop_loss = %cfg.session.stop_loss,
        "CROUPIER starting up"
    );

    let method: MethodId = cfg.advisor.method.parse()?;
    let repo = Arc::new(JsonFileRepository::open(&cfg.storage.data_dir).await?);
    let service = SessionService::new(
        GameEngine::european(),
        MethodRegistry::standard(),
        repo.clone(),
    );

    // A session left over from a previous run would block a new one.
    if let Some(stale) = repo.find_active(&cfg.advisor.user).await? {
        warn!(session_id = %stale.id, "Closing session left over from a previous run");
        service.end_session(stale.id, EndReason::Manual).await?;
    }

    let (session, mut suggestion) = service
        .create_session(&cfg.advisor.user, method, cfg.session.clone())
        .await?;

    info!(session_id = %session.id, "Session open. Enter each winning number (0-36); q to quit.");
    print_suggestion(&suggestion);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break }; // stdin closed
                let input = line.trim();
                if input.is_empty() {
                    continue;
                }
                if matches!(input, "q" | "quit" | "exit") {
                    break;
                }
                let winning: u8 = match input.parse() {
                    Ok(n) => n,
                    Err(_) => {
                        warn!(input, "Not a number — enter 0-36, or q to quit");
                        continue;
                    }
                };

                match service.place_bet(session.id, &suggestion.bets, winning).await {
                    Ok(report) => {
                        println!(
                            "  spin {} | {} | balance {}",
                            report.record.outcome, report.record.totals, report.record.balance_after
                        );
                        if report.session_ended {
                            if let Some(reason) = &report.next.reason {
                                println!("  session over: {reason}");
                            }
                            break;
                        }
                        suggestion = report.next;
                        print_suggestion(&suggestion);
                    }
                    Err(CroupierError::Engine(e)) => {
                        warn!(error = %e, "Rejected input");
                    }
                    Err(e) => {
                        error!(error = %e, "Round failed");
                        return Err(e.into());
                    }
                }
            }
            _ = &mut shutdown => {
                info!("Shutdown signal received.");
                break;
            }
        }
    }

    // Close out unless a stop condition already ended the session.
    match service.end_session(session.id, EndReason::Manual).await {
        Ok(_) | Err(CroupierError::SessionState { .. }) => {}
        Err(e) => return Err(e.into()),
    }

    let closed = service.session(session.id).await?;
    info!(
        rounds = closed.rounds_played,
        balance = %closed.balance,
        profit = %closed.profit,
        status = %closed.status,
        detail = closed.stop_detail.as_deref().unwrap_or("-"),
        "CROUPIER shut down cleanly."
    );

    Ok(())
}

/// Render the next suggestion for the operator.
fn print_suggestion(suggestion: &MethodOutput) {
    if !suggestion.should_bet {
        println!("> no bet ({})", suggestion.reason.as_deref().unwrap_or("stopped"));
        return;
    }
    let rendered: Vec<String> = suggestion.bets.iter().map(|b| b.to_string()).collect();
    println!(
        "> next bet: {} (total {}) | progression {}",
        rendered.join(" + "),
        suggestion.amount,
        suggestion.progression
    );
}

/// Initialise the `tracing` subscriber.
fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("croupier=info"));

    let json_logging = std::env::var("CROUPIER_LOG_JSON").is_ok();

    if json_logging {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .init();
    } else {
        fmt().with_env_filter(env_filter).with_target(true).init();
    }
}
