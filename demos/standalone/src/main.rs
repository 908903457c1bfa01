use std::path::PathBuf;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use beacon::prelude::*;
use tracing_subscriber::EnvFilter;

// ---------------------------------------------------------------------------
// Host: a pretend game server whose population drifts up and down
// ---------------------------------------------------------------------------

struct SimulatedServer {
    players: AtomicU32,
    max_players: u32,
}

impl SimulatedServer {
    fn new(max_players: u32) -> Self {
        Self {
            players: AtomicU32::new(0),
            max_players,
        }
    }

    /// Someone joins, or everyone leaves once the server is full.
    fn churn(&self) {
        let max = self.max_players;
        let _ = self
            .players
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| {
                Some(if n >= max { 0 } else { n + 1 })
            });
    }
}

impl HostServer for SimulatedServer {
    fn host_name(&self) -> String {
        "Beacon Demo".into()
    }

    fn world_name(&self) -> String {
        "Standalone".into()
    }

    fn version(&self) -> String {
        "1.20.40".into()
    }

    fn protocol(&self) -> u32 {
        622
    }

    fn player_count(&self) -> u32 {
        self.players.load(Ordering::SeqCst)
    }

    fn max_players(&self) -> u32 {
        self.max_players
    }

    fn bind_address(&self) -> String {
        "0.0.0.0".into()
    }

    fn port(&self) -> u16 {
        19132
    }
}

// ---------------------------------------------------------------------------
// Session manager: prints what a real directory client would send
// ---------------------------------------------------------------------------

struct LoggingDirectory;

impl LoggingDirectory {
    fn payload(info: &SessionInfo) -> Result<String, SessionError> {
        serde_json::to_string(info).map_err(|e| SessionError::Update(e.to_string()))
    }
}

impl SessionManager for LoggingDirectory {
    async fn create_session(&self, info: &SessionInfo) -> Result<(), SessionError> {
        let body = Self::payload(info)?;
        tracing::info!(%body, "create session");
        Ok(())
    }

    async fn update_session(&self, info: &SessionInfo) -> Result<(), SessionError> {
        let body = Self::payload(info)?;
        tracing::info!(%body, "update session");
        Ok(())
    }

    async fn check_connection(&self) {
        tracing::debug!("connection ok");
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let data_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("beacon-data"));

    let config = BroadcastConfig::load_or_create(&data_dir).inspect_err(|e| {
        tracing::error!(error = %e, "failed to load config");
    })?;

    let server = Arc::new(SimulatedServer::new(10));
    let controller = BroadcastController::new(
        config,
        Arc::new(LoggingDirectory),
        Arc::clone(&server),
        TokioScheduler::current(),
    );
    controller.start()?;

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    let mut churn = tokio::time::interval(Duration::from_secs(7));
    loop {
        tokio::select! {
            _ = &mut ctrl_c => break,
            _ = churn.tick() => server.churn(),
        }
    }

    controller.shutdown();
    Ok(())
}
