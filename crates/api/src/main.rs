//! Smart City Telemetry - Main Entry Point

use anyhow::Context;
use api::{init_logging, run_server, AppConfig, AppState};
use ingest::{run_scheduler, AirQualityClient, Collector, ForecastSlot, SensorSimulator, WeatherClient};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::time::Duration;
use storage::Repository;
use tokio::sync::watch;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = std::env::args().nth(1);
    let config = AppConfig::load(config_path.as_deref()).context("loading configuration")?;
    init_logging(&config.logging)?;

    info!("=== Smart City Telemetry v{} ===", env!("CARGO_PKG_VERSION"));

    let metrics = PrometheusBuilder::new()
        .install_recorder()
        .context("installing metrics recorder")?;

    let repository = Repository::connect(&config.database.url)
        .await
        .with_context(|| format!("opening database {}", config.database.url))?;

    if config.collector.air_quality.token.is_empty() {
        warn!("No air quality token configured, station collection will fail");
    }
    if config.collector.weather.api_key.is_empty() {
        warn!("No weather API key configured, weather collection will fail");
    }

    let forecaster = config.forecaster()?;
    let forecast_slot = ForecastSlot::default();

    let collector = Collector::new(
        repository.clone(),
        AirQualityClient::new(config.collector.air_quality.clone())?,
        WeatherClient::new(config.collector.weather.clone())?,
        SensorSimulator::new(config.collector.sensors.clone(), config.collector.simulator_seed()),
    )
    .with_alerting(
        config.threshold_table()?,
        config.zone_populations(),
        config.collector.station_zone.clone(),
    )
    .with_forecast(forecaster.clone(), forecast_slot.clone());

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let scheduler = tokio::spawn(run_scheduler(
        collector,
        Duration::from_secs(config.collector.interval_secs),
        shutdown_rx,
    ));

    let state = AppState::new(repository)
        .with_populations(config.zone_populations())
        .with_forecast(forecaster, forecast_slot)
        .with_metrics(metrics)
        .into_shared();

    let shutdown = async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Could not listen for shutdown signal: {}", e);
            std::future::pending::<()>().await;
        }
        info!("Shutdown requested");
        let _ = shutdown_tx.send(true);
    };

    run_server(config.server.addr()?, state, &config.rate_limit, shutdown).await?;

    let cycles = scheduler.await?;
    info!("Stopped after {} collection cycles", cycles);
    Ok(())
}
