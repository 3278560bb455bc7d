//! Quality Replay Tool
//!
//! Feeds a recorded stream of quality events through the governor and logs
//! every decision it makes.
//!
//! Usage: `replay <events.jsonl> [governor.toml]`
//!
//! Each line is a JSON record:
//! `{"delay_ms": 1000, "event": {"stats": {"packet_loss": 6}}, "context": {"screen_share_active": true}}`

use anyhow::{Context, Result};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use video_quality_governor::{
    effects::{ConferenceSession, LoggingEffects, LoggingSession},
    AppContext, GovernorConfig, QualityEvent, QualityEventHub, QualityGovernor, SharedContext,
};

/// One line of the replay file
#[derive(Debug, Deserialize)]
struct ReplayRecord {
    /// Wait before publishing the event
    #[serde(default)]
    delay_ms: u64,
    event: QualityEvent,
    /// Replace the application context before publishing
    #[serde(default)]
    context: Option<AppContext>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut args = std::env::args().skip(1);
    let events_path = args
        .next()
        .context("usage: replay <events.jsonl> [governor.toml]")?;

    let config = match args.next() {
        Some(path) => GovernorConfig::load(&path).with_context(|| format!("loading {}", path))?,
        None => GovernorConfig::load_or_default()?,
    };

    let input = std::fs::read_to_string(&events_path)
        .with_context(|| format!("reading {}", events_path))?;
    let records = input
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(n, line)| {
            serde_json::from_str::<ReplayRecord>(line)
                .with_context(|| format!("{}:{}: invalid record", events_path, n + 1))
        })
        .collect::<Result<Vec<_>>>()?;

    tracing::info!("Replaying {} quality events from {}", records.len(), events_path);

    let context = Arc::new(SharedContext::default());
    let effects = Arc::new(LoggingEffects::new(context.clone()));
    let governor = QualityGovernor::new(config, context.clone(), effects)?;

    let hub = QualityEventHub::new();
    let session: Arc<dyn ConferenceSession> = Arc::new(LoggingSession::new("replay"));
    let handle = governor.attach(&session, &hub);

    for record in records {
        tokio::time::sleep(Duration::from_millis(record.delay_ms)).await;
        if let Some(overrides) = record.context {
            context.apply_overrides(overrides);
        }
        tracing::debug!(loss = ?record.event.loss_percent(), "Publishing quality event");
        hub.publish(record.event);
    }

    // Let the last tendency settle before tearing down
    let settle = governor.config().levels.max_debounce() + Duration::from_secs(1);
    tracing::info!("Waiting {:?} for pending changes to settle", settle);
    tokio::time::sleep(settle).await;

    let level = handle.detach().await;
    println!("Final quality level: {}", level);

    Ok(())
}
