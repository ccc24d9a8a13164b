// Courtside scoreboard entry point.
//
// Startup sequence:
// 1. Initialize tracing (log to file, not terminal)
// 2. Load config
// 3. Open database
// 4. Import the configured roster file, if any
// 5. Create the match session
// 6. Create mpsc channels
// 7. Spawn app logic task
// 8. Run the TUI until the operator quits
// 9. Cleanup on exit

use std::path::Path;

use courtside_tui::app;
use courtside_tui::tui;

use courtside_core::config;
use courtside_core::db;
use courtside_core::roster;

use anyhow::Context;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize tracing (log to file, not terminal)
    init_tracing()?;
    info!("Courtside starting up");

    // 2. Load config
    let config = config::load_config().context("failed to load configuration")?;
    info!(
        "Config loaded: {} x {} min periods, foul limit {}, anti-duplicate {}",
        config.game.periods_total,
        config.game.period_length_minutes,
        config.game.foul_limit,
        config.game.anti_duplicate
    );

    // 3. Open database
    let db = db::Database::open(&config.db_path).context("failed to open database")?;
    info!("Database opened at {}", config.db_path);

    // 4. Import rosters. A bad file is logged and skipped; the stored teams
    //    are still usable.
    if let Some(path) = config.roster_import.as_deref() {
        match import_rosters(&db, Path::new(path)) {
            Ok(summary) => info!(
                "Roster import from {}: {} teams, {} players added",
                path, summary.teams_added, summary.players_added
            ),
            Err(e) => warn!("Roster import from {} skipped: {:#}", path, e),
        }
    }

    // 5. Create the match session
    let app_state = app::AppState::new(config, db);

    // 6. Create mpsc channels
    let (cmd_tx, cmd_rx) = mpsc::channel(64);
    let (ui_tx, ui_rx) = mpsc::channel(256);

    // 7. Spawn app logic task
    let app_handle = tokio::spawn(async move {
        if let Err(e) = app::run(cmd_rx, ui_tx, app_state).await {
            error!("Application loop error: {}", e);
        }
    });

    // 8. Run the TUI event loop (blocking until the operator quits)
    info!("Application ready");
    if let Err(e) = tui::run(ui_rx, cmd_tx).await {
        error!("TUI error: {}", e);
    }

    // 9. Cleanup: wait for app task to finish (with timeout)
    let _ = tokio::time::timeout(std::time::Duration::from_secs(5), async {
        let _ = app_handle.await;
    })
    .await;

    info!("Courtside shut down cleanly");
    Ok(())
}

fn import_rosters(db: &db::Database, path: &Path) -> anyhow::Result<db::ImportSummary> {
    if !path.exists() {
        anyhow::bail!("file not found");
    }
    let rows = roster::load_roster_file(path)?;
    db.import_rosters(&rows)
}

/// Initialize tracing to log to a file (not the terminal, which is used by the TUI).
fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let log_dir = std::env::current_dir()?.join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let log_file = std::fs::File::create(log_dir.join("courtside.log"))?;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                EnvFilter::new("courtside_tui=info,courtside_core=info,warn")
            }),
        )
        .with_writer(log_file)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
