//! Roster Activity Alerter — Binary Entrypoint
//! Boots the poll pipeline and the Axum card-serving surface.

use std::sync::{Arc, RwLock};
use std::time::Duration;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use roster_activity_alerter::app_config::AppConfig;
use roster_activity_alerter::card::{AssetStore, CardFonts, CardLayout, Compositor};
use roster_activity_alerter::feed::EspnActivityFeed;
use roster_activity_alerter::ledger::SeenLedger;
use roster_activity_alerter::metrics::Metrics;
use roster_activity_alerter::notify::{AlertSink, LogOnlySink, PushcutNotifier};
use roster_activity_alerter::owners::OwnerDirectory;
use roster_activity_alerter::pipeline::Pipeline;
use roster_activity_alerter::{api, Transaction};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("roster_activity_alerter=info,warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cfg = AppConfig::from_env()?;
    let metrics = Metrics::init();

    let layout = match &cfg.card_layout_path {
        Some(path) => CardLayout::from_toml_path(path)?,
        None => CardLayout::default(),
    };
    let fonts = CardFonts::load(&cfg.caption_font_path, &cfg.subject_font_path)?;
    let owners = OwnerDirectory::load(&cfg.owner_map_path);
    if owners.is_empty() {
        tracing::warn!("owner directory is empty; renders will fail until it is populated");
    }

    let feed = EspnActivityFeed::new(cfg.league_id, cfg.season_year, &cfg.espn_s2, &cfg.espn_swid);
    let renderer = Compositor::new(
        layout,
        fonts,
        AssetStore::new(&cfg.template_path, &cfg.owner_image_dir),
        owners,
    );
    let sink: Box<dyn AlertSink> = match &cfg.pushcut_url {
        Some(url) => Box::new(PushcutNotifier::new(url.clone())),
        None => Box::new(LogOnlySink),
    };

    let last_new = Arc::new(RwLock::new(Vec::<Transaction>::new()));
    let ledger = SeenLedger::load(&cfg.seen_state_path);
    tracing::info!(keys = ledger.len(), "dedup ledger loaded");

    let pipeline = Pipeline::new(
        Box::new(feed),
        Box::new(renderer),
        sink,
        ledger,
        &cfg.cards_dir,
        &cfg.latest_card_path,
        cfg.public_base_url.clone(),
        Arc::clone(&last_new),
    )
    .with_activity_window(cfg.activity_window);
    let handle = pipeline.spawn(Duration::from_secs(cfg.poll_secs));

    let state = api::AppState {
        cards_dir: cfg.cards_dir.clone(),
        latest_path: cfg.latest_card_path.clone(),
        last_new,
    };
    let router = api::create_router(state).merge(metrics.router());

    let listener = tokio::net::TcpListener::bind(&cfg.bind_addr).await?;
    tracing::info!(addr = %cfg.bind_addr, "serving");
    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    // Let the in-flight cycle finish so the ledger flush is not cut short.
    handle.shutdown().await;
    Ok(())
}
