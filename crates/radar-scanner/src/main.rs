//! scan-universe: score the whole ticker universe and persist qualifying alerts.
//!
//! Usage:
//!   scan-universe                       # full universe pass (UNIVERSE_FILE)
//!   scan-universe --watchlist           # ranked watchlist table + its alerts
//!   scan-universe --watchlist --all-alerts   # same, without filtering alerts
//!   scan-universe --add GGAL NU ...     # add tickers to the watchlist
//!   scan-universe --remove GGAL ...     # remove tickers from the watchlist
//!   scan-universe --set pe_cap=18 w_val=0.6 ...   # edit and save scoring settings
//!   scan-universe --reset-settings      # restore default scoring settings

use std::sync::Arc;

use anyhow::{Context, Result};
use ivr_scoring::IvrEngine;
use radar_core::{AlertStore, ConfigStore, FundamentalsProvider, ScoringConfig};
use radar_scanner::{
    alerts_view, load_settings, load_universe, rank_watchlist, update_settings, FetchPool,
    SettingsProfile, UniverseScanner,
};
use radar_store::RadarDb;
use yahoo_client::{CachedProvider, YahooConfig, YahooFundamentalsClient};

mod config;

use config::ScannerConfig;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let json_logging = std::env::var("RUST_LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    let filter = || {
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            tracing_subscriber::EnvFilter::new(
                "scan_universe=info,radar_scanner=info,yahoo_client=warn",
            )
        })
    };
    if json_logging {
        tracing_subscriber::fmt().json().with_env_filter(filter()).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter()).init();
    }

    std::panic::set_hook(Box::new(|info| {
        eprintln!("PANIC: {info}");
        tracing::error!("PANIC: {info}");
    }));

    let config = ScannerConfig::from_env()?;
    let args: Vec<String> = std::env::args().collect();

    let db = RadarDb::new(&config.database_url)
        .await
        .with_context(|| format!("opening {}", config.database_url))?;

    if args.iter().any(|a| a == "--reset-settings") {
        db.save(&ScoringConfig::default()).await?;
        tracing::info!("Scoring settings reset to defaults");
        return Ok(());
    }

    if let Some(edits) = tickers_after(&args, "--set") {
        let saved = update_settings(&db, &edits).await.context("updating scoring settings")?;
        tracing::info!(
            "Scoring settings saved: caps {}/{}/{}, thresholds {}/{}, weights {:.2}/{:.2}",
            saved.pe_cap,
            saved.pb_cap,
            saved.eve_cap,
            saved.valuation_threshold,
            saved.quality_threshold,
            saved.weight_valuation,
            saved.weight_quality
        );
        return Ok(());
    }

    if let Some(added) = tickers_after(&args, "--add") {
        for ticker in added {
            if db.add_ticker(&ticker).await? {
                tracing::info!("Added {} to watchlist", ticker.trim().to_uppercase());
            }
        }
        return Ok(());
    }

    if let Some(removed) = tickers_after(&args, "--remove") {
        for ticker in removed {
            if db.remove_ticker(&ticker).await? {
                tracing::info!("Removed {} from watchlist", ticker.trim().to_uppercase());
            }
        }
        return Ok(());
    }

    let yahoo = YahooFundamentalsClient::new(YahooConfig {
        base_url: config.yahoo_base_url.clone(),
        timeout: config.fetch_timeout(),
        ..YahooConfig::default()
    })?;
    let provider: Arc<dyn FundamentalsProvider> = Arc::new(CachedProvider::with_ttl(
        yahoo,
        chrono::Duration::seconds(config.cache_ttl_secs),
    ));
    let pool = FetchPool::new(provider, config.scan_workers, config.fetch_timeout())?;

    if args.iter().any(|a| a == "--watchlist") {
        let scoring = load_settings(&db, SettingsProfile::Dashboard)
            .await
            .context("loading scoring settings")?;
        let only_mine = !args.iter().any(|a| a == "--all-alerts");
        return print_watchlist(&db, &pool, &scoring, only_mine).await;
    }

    let scoring = load_settings(&db, SettingsProfile::Scan)
        .await
        .context("loading scoring settings")?;

    let universe = load_universe(&config.universe_file)
        .with_context(|| format!("reading universe file {}", config.universe_file))?;
    if universe.is_empty() {
        tracing::warn!("Universe {} is empty, nothing to scan", config.universe_file);
        return Ok(());
    }

    tracing::info!(
        "Scoring with caps P/E {} P/B {} EV/EBITDA {}, thresholds {}/{}, weights {}/{}",
        scoring.pe_cap,
        scoring.pb_cap,
        scoring.eve_cap,
        scoring.valuation_threshold,
        scoring.quality_threshold,
        scoring.weight_valuation,
        scoring.weight_quality
    );

    let scanner = UniverseScanner::new(pool, Arc::new(db));
    let summary = scanner.run(&universe, &scoring).await?;

    println!(
        "OK | scanned={} scored={} no_data={} alerts={} | {}",
        summary.universe_size,
        summary.scored,
        summary.no_data,
        summary.alerts.len(),
        summary.finished_at.to_rfc3339()
    );
    Ok(())
}

/// Values following `flag` up to the next `--` option.
fn tickers_after(args: &[String], flag: &str) -> Option<Vec<String>> {
    let idx = args.iter().position(|a| a == flag)?;
    Some(
        args[idx + 1..]
            .iter()
            .take_while(|a| !a.starts_with("--"))
            .cloned()
            .collect(),
    )
}

async fn print_watchlist(
    db: &RadarDb,
    pool: &FetchPool,
    scoring: &ScoringConfig,
    only_mine: bool,
) -> Result<()> {
    let engine = IvrEngine::new(scoring)?;
    let tickers = db.list_tickers().await?;
    if tickers.is_empty() {
        println!("Watchlist is empty. Add tickers with --add.");
        return Ok(());
    }

    let rows = rank_watchlist(pool, &engine, &tickers).await?;
    println!(
        "{:<10} {:<30} {:>8} {:>8} {:>8} {:>8}  {:<22} {}",
        "Ticker", "Company", "Val", "Qual", "Metric", "IVR", "Label", "Signal"
    );
    for row in &rows {
        let fmt = |v: Option<f64>| v.map(|x| format!("{x:.1}")).unwrap_or_else(|| "-".to_string());
        println!(
            "{:<10} {:<30} {:>8} {:>8} {:>8} {:>8}  {:<22} {}",
            row.record.ticker,
            row.record.company_name,
            fmt(row.score.valuation_score),
            fmt(row.score.quality_score),
            row.score.quality_metric.as_str(),
            fmt(row.score.ivr),
            row.score.label.as_str(),
            row.score.signal
        );
    }

    let view = alerts_view(db.list_alerts().await?, &tickers, only_mine);
    match view.last_scan {
        Some(ts) => println!("\nAlerts (last scan {}):", ts.to_rfc3339()),
        None => println!("\nNo alerts yet. Run a universe scan first."),
    }
    for alert in &view.alerts {
        println!("  {:<10} {:>8.2}  {}", alert.ticker, alert.ivr, alert.label);
    }
    Ok(())
}
