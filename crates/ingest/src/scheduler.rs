//! Collection Scheduler

use std::future::Future;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use crate::{Collector, CycleReport};

/// One unit of scheduled work
pub trait Cycle: Send {
    fn run_cycle(&mut self) -> impl Future<Output = CycleReport> + Send;
}

impl Cycle for Collector {
    fn run_cycle(&mut self) -> impl Future<Output = CycleReport> + Send {
        Collector::run_cycle(self)
    }
}

/// Run collection cycles on a fixed interval until `shutdown` flips to true.
///
/// The first cycle starts immediately. A cycle that overruns the interval
/// causes the missed ticks to be skipped rather than queued.
pub async fn run_scheduler<C: Cycle>(
    mut collector: C,
    interval: Duration,
    mut shutdown: watch::Receiver<bool>,
) -> u64 {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut cycles = 0u64;

    info!("Collection scheduler started, interval {:?}", interval);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let report = collector.run_cycle().await;
                cycles += 1;
                debug!("Cycle {} report: {:?}", cycles, report);
            }
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }
        }
    }

    info!("Collection scheduler stopped after {} cycles", cycles);
    cycles
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        default_sites, AirQualityClient, AirQualityConfig, SensorSimulator, WeatherClient,
        WeatherConfig,
    };
    use storage::Repository;

    fn offline_collector(repo: Repository) -> Collector {
        let air = AirQualityClient::new(AirQualityConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            timeout_secs: 1,
            ..Default::default()
        })
        .unwrap();
        let weather = WeatherClient::new(WeatherConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            timeout_secs: 1,
            ..Default::default()
        })
        .unwrap();
        Collector::new(repo, air, weather, SensorSimulator::new(default_sites(), 2))
    }

    #[tokio::test]
    async fn test_first_cycle_is_immediate_and_shutdown_stops() {
        let repo = Repository::in_memory().await.unwrap();
        let collector = offline_collector(repo.clone());
        let (tx, rx) = watch::channel(false);

        let handle = tokio::spawn(run_scheduler(collector, Duration::from_secs(3600), rx));
        tokio::time::sleep(Duration::from_millis(300)).await;
        tx.send(true).unwrap();

        let cycles = handle.await.unwrap();
        assert_eq!(cycles, 1);
        assert_eq!(repo.counts().await.unwrap().iot_sensors, 3);
    }

    /// First cycle stalls for `stall`, later ones are instant
    struct StallingCycle {
        stall: Duration,
        runs: u64,
    }

    impl Cycle for StallingCycle {
        async fn run_cycle(&mut self) -> CycleReport {
            if self.runs == 0 {
                tokio::time::sleep(self.stall).await;
            }
            self.runs += 1;
            CycleReport::default()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_missed_ticks_are_skipped_not_queued() {
        let cycle = StallingCycle {
            stall: Duration::from_millis(1000),
            runs: 0,
        };
        let (tx, rx) = watch::channel(false);
        let handle = tokio::spawn(run_scheduler(cycle, Duration::from_millis(100), rx));

        tokio::time::sleep(Duration::from_millis(1450)).await;
        tx.send(true).unwrap();
        let cycles = handle.await.unwrap();

        // 0ms (stalls to 1000ms), one late tick at 1000ms, then 1100..1400ms.
        // Queued ticks would add ten catch-up cycles after the stall.
        assert!((5..=7).contains(&cycles), "ran {} cycles", cycles);
    }

    #[tokio::test]
    async fn test_dropped_sender_stops_scheduler() {
        let repo = Repository::in_memory().await.unwrap();
        let collector = offline_collector(repo);
        let (tx, rx) = watch::channel(false);
        drop(tx);

        let cycles = tokio::time::timeout(
            Duration::from_secs(5),
            run_scheduler(collector, Duration::from_secs(3600), rx),
        )
        .await
        .unwrap();
        assert!(cycles <= 1);
    }
}
