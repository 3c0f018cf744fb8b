// =============================================================================
// FX Confluence — Main Entry Point
// =============================================================================
//
// Runs the analysis engine for every configured symbol on a fixed interval
// and prints each report as one JSON line on stdout.  Logs go to stderr.
//
// Environment:
//   FX_CONFIG     path of the JSON config (default: engine_config.json)
//   FX_SYMBOLS    comma-separated symbol override
//   FX_DATA_DIR   candle data directory override
//   FX_RUN_ONCE   run a single cycle and exit
//   RUST_LOG      tracing filter (default: info)
// =============================================================================

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use fx_confluence::market_data::{CachedSource, CandleCache, JsonFileSource};
use fx_confluence::{AnalysisEngine, EngineConfig};

type Engine = AnalysisEngine<CachedSource<JsonFileSource>>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Environment & config ──────────────────────────────────────────
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config_path =
        std::env::var("FX_CONFIG").unwrap_or_else(|_| "engine_config.json".to_string());
    let mut config = EngineConfig::load(&config_path).unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        EngineConfig::default()
    });

    if let Ok(syms) = std::env::var("FX_SYMBOLS") {
        config.symbols = syms
            .split(',')
            .map(|s| s.trim().to_uppercase())
            .filter(|s| !s.is_empty())
            .collect();
    }
    if let Ok(dir) = std::env::var("FX_DATA_DIR") {
        config.data_dir = dir.into();
    }
    let run_once = std::env::var("FX_RUN_ONCE")
        .map(|v| matches!(v.as_str(), "1" | "true" | "yes"))
        .unwrap_or(false);

    info!(
        symbols = ?config.symbols,
        data_dir = %config.data_dir.display(),
        utc_offset_hours = config.utc_offset_hours,
        tfqe = config.enable_tfqe,
        "FX confluence engine starting"
    );

    // ── 2. Build engine ──────────────────────────────────────────────────
    let cache = Arc::new(CandleCache::default());
    let source = CachedSource::new(JsonFileSource::new(config.data_dir.clone()), cache);
    let eval_interval = Duration::from_secs(config.eval_interval_secs.max(1));
    let engine: Arc<Engine> = Arc::new(AnalysisEngine::new(config, source));

    if run_once {
        run_cycle(&engine).await;
        return Ok(());
    }

    // ── 3. Evaluation loop ───────────────────────────────────────────────
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    let mut interval = tokio::time::interval(eval_interval);
    loop {
        tokio::select! {
            _ = interval.tick() => run_cycle(&engine).await,
            res = &mut shutdown => {
                if let Err(e) = res {
                    error!(error = %e, "failed to listen for shutdown signal");
                }
                warn!("Shutdown signal received, stopping");
                break;
            }
        }
    }

    info!("FX confluence engine stopped");
    Ok(())
}

/// One pass over every symbol.  Each analysis runs on the blocking pool
/// under the configured timeout.
async fn run_cycle(engine: &Arc<Engine>) {
    let config = engine.config();
    let timeout = Duration::from_secs(config.analysis_timeout_secs.max(1));

    for symbol in config.symbols.clone() {
        let sym = symbol.clone();
        if let Some(report) = run_blocking(engine, timeout, &symbol, "market report", move |e| {
            e.analyze_symbol(&sym)
        })
        .await
        {
            emit(&report);
        }

        if config.enable_tfqe {
            let sym = symbol.clone();
            if let Some(report) =
                run_blocking(engine, timeout, &symbol, "TFQE", move |e| e.evaluate_tfqe(&sym)).await
            {
                emit(&report);
            }
        }
    }
}

async fn run_blocking<T, F>(
    engine: &Arc<Engine>,
    timeout: Duration,
    symbol: &str,
    what: &str,
    job: F,
) -> Option<T>
where
    T: Send + 'static,
    F: FnOnce(&Engine) -> T + Send + 'static,
{
    let engine = Arc::clone(engine);
    let task = tokio::task::spawn_blocking(move || job(&engine));
    match tokio::time::timeout(timeout, task).await {
        Ok(Ok(value)) => Some(value),
        Ok(Err(e)) => {
            error!(symbol, what, error = %e, "analysis task failed");
            None
        }
        Err(_) => {
            warn!(symbol, what, timeout_secs = timeout.as_secs(), "analysis timed out");
            None
        }
    }
}

fn emit<T: Serialize>(value: &T) {
    match serde_json::to_string(value) {
        Ok(line) => println!("{line}"),
        Err(e) => error!(error = %e, "failed to serialise report"),
    }
}
