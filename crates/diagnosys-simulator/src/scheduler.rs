//! Simulation scheduler.
//!
//! Owns the fleet for the life of the process. WARMUP fills every window
//! without pacing and publishes once; STEADY then ticks at the configured
//! frequency, publishing the full fleet after every tick. Writes for a tick
//! operate on copies of the windows, so the next tick may mutate them freely.

use crate::config::Config;
use crate::error::{Result, SimError};
use crate::fault::{FaultKind, FaultTransition};
use crate::fleet::{build_fleet, AssetIdentity, AssetRuntimeState};
use crate::physics::TickContext;
use crate::report::{PublishSummary, RunReport, RunStats};
use crate::writer::{FleetStatus, SnapshotWriter};
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tokio::task::{JoinError, JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Scheduler lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Warmup,
    Steady,
}

type WriteOutcome = (AssetIdentity, Result<usize>);

pub struct Scheduler {
    config: Config,
    fleet: Vec<AssetRuntimeState>,
    writer: SnapshotWriter,
    status_path: PathBuf,
    epoch: DateTime<Utc>,
    tick: u64,
    phase: Phase,
    stats: RunStats,
}

impl Scheduler {
    /// Validates the configuration, prepares the output directory and builds
    /// the fleet. Nothing runs if any of this fails.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        config.prepare_output_dir()?;

        let fleet = build_fleet(&config);
        let writer = SnapshotWriter::new(config.output_dir.clone());
        let status_path = config.status_path();
        // first published window ends at "now"
        let epoch = Utc::now() - chrono::Duration::milliseconds((config.window_s * 1000.0) as i64);

        info!(
            motors = config.motors,
            pumps = config.pumps,
            valves = config.valves,
            frequency_hz = config.frequency_hz,
            capacity = config.capacity(),
            seed = config.seed(),
            output_dir = %config.output_dir.display(),
            "Fleet ready"
        );

        Ok(Self {
            config,
            fleet,
            writer,
            status_path,
            epoch,
            tick: 0,
            phase: Phase::Warmup,
            stats: RunStats::new(),
        })
    }

    /// Pins the wall-clock instant that simulated time zero maps to.
    pub fn with_epoch(mut self, epoch: DateTime<Utc>) -> Self {
        self.epoch = epoch;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn fleet(&self) -> &[AssetRuntimeState] {
        &self.fleet
    }

    pub fn writer(&self) -> &SnapshotWriter {
        &self.writer
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn epoch(&self) -> DateTime<Utc> {
        self.epoch
    }

    pub fn stats(&self) -> &RunStats {
        &self.stats
    }

    /// Ticks completed so far, warmup included.
    pub fn ticks(&self) -> u64 {
        self.tick
    }

    /// Simulated-time cursor in seconds.
    pub fn sim_time(&self) -> f64 {
        self.tick as f64 * self.config.dt()
    }

    fn timestamp_at(&self, t: f64) -> DateTime<Utc> {
        self.epoch + chrono::Duration::microseconds((t * 1e6).round() as i64)
    }

    /// Forces `kind` onto the asset `asset_id` for `duration_s` simulated
    /// seconds from the current cursor.
    pub fn inject_fault(&mut self, asset_id: &str, kind: FaultKind, duration_s: f64) -> Result<()> {
        if !duration_s.is_finite() || duration_s <= 0.0 {
            return Err(SimError::InvalidConfig(format!(
                "fault duration must be > 0, got {}",
                duration_s
            )));
        }
        let end_time = self.sim_time() + duration_s;
        let asset = self
            .fleet
            .iter_mut()
            .find(|a| a.identity.id == asset_id)
            .ok_or_else(|| SimError::UnknownAsset(asset_id.to_string()))?;

        if !asset.kind().fault_kinds().contains(&kind) {
            return Err(SimError::InvalidConfig(format!(
                "fault '{}' is not valid for {} assets",
                kind,
                asset.kind()
            )));
        }
        asset.inject_fault(kind, end_time);
        self.stats
            .record_transition(&FaultTransition::Activated { kind, end_time });
        info!(asset = %asset.identity, fault = %kind, until_s = end_time, "Fault injected");
        Ok(())
    }

    /// Advances every asset at the current cursor, then moves the cursor by
    /// one tick.
    pub fn tick(&mut self) {
        let t = self.sim_time();
        let ctx = TickContext {
            t,
            dt: self.config.dt(),
            timestamp: self.timestamp_at(t),
        };
        let model = self.config.fault_model();

        for asset in self.fleet.iter_mut() {
            let enabled = self.config.faults.enabled_for(asset.kind());
            let transition = asset.step(&ctx, &model, enabled);
            match &transition {
                FaultTransition::Activated { kind, end_time } => {
                    info!(asset = %asset.identity, fault = %kind, t, until_s = *end_time, "Fault activated");
                }
                FaultTransition::Cleared { kind } => {
                    info!(asset = %asset.identity, fault = %kind, t, "Fault cleared");
                }
                FaultTransition::None => {}
            }
            self.stats.record_transition(&transition);
        }

        self.tick += 1;
    }

    /// Runs `capacity` unpaced ticks so every window is full.
    pub fn warmup(&mut self) {
        let capacity = self.config.capacity();
        info!(ticks = capacity, "Warming up");
        for _ in 0..capacity {
            self.tick();
            self.stats.warmup_ticks += 1;
        }
    }

    /// Publishes every asset's window and the fleet status document.
    ///
    /// Each window is copied and written on the blocking pool, at most
    /// `max_in_flight` at a time. Failures are logged per asset and never
    /// stop the pass.
    pub async fn publish(&mut self) -> PublishSummary {
        let max_in_flight = self.config.max_in_flight.max(1);
        let mut in_flight: JoinSet<WriteOutcome> = JoinSet::new();
        let mut summary = PublishSummary::default();

        for asset in &self.fleet {
            while in_flight.len() >= max_in_flight {
                match in_flight.join_next().await {
                    Some(res) => tally(&mut summary, res),
                    None => break,
                }
            }

            let writer = self.writer.clone();
            let identity = asset.identity.clone();
            let records = asset.window().snapshot();
            in_flight.spawn_blocking(move || {
                let written = writer.write(&identity, &records);
                (identity, written)
            });
        }

        while let Some(res) = in_flight.join_next().await {
            tally(&mut summary, res);
        }

        let t = self.sim_time();
        let status = FleetStatus::collect(&self.fleet, self.tick, t, self.timestamp_at(t));
        let path = self.status_path.clone();
        let outcome = tokio::task::spawn_blocking(move || status.write_to(&path))
            .await
            .map_err(SimError::from)
            .and_then(|r| r);
        if let Err(e) = outcome {
            warn!(path = %self.status_path.display(), error = %e, "Fleet status publish failed");
            summary.failed += 1;
        }

        self.stats.record_publish(&summary);
        summary
    }

    /// Warmup, first publish, then the paced steady loop until `cancel`
    /// fires or `max_ticks` steady ticks have run.
    pub async fn run(&mut self, cancel: CancellationToken) -> RunReport {
        let started = Instant::now();

        self.warmup();
        let summary = self.publish().await;
        info!(
            written = summary.written,
            failed = summary.failed,
            rows = summary.rows,
            "Warmup published"
        );
        self.phase = Phase::Steady;

        let budget = self.config.tick_interval();
        let progress_every = self.config.capacity() as u64;

        loop {
            if let Some(max) = self.config.max_ticks {
                if self.stats.steady_ticks >= max {
                    info!(ticks = max, "Tick limit reached");
                    break;
                }
            }

            let tick_start = Instant::now();
            self.tick();
            self.publish().await;
            let elapsed = tick_start.elapsed();
            self.stats.record_tick(elapsed, budget);

            if elapsed > budget {
                debug!(
                    tick = self.tick,
                    elapsed_ms = elapsed.as_secs_f64() * 1000.0,
                    "Tick overran its interval"
                );
            }
            if self.stats.steady_ticks % progress_every == 0 {
                let active = self.fleet.iter().filter(|a| a.fault().is_active()).count();
                info!(
                    tick = self.tick,
                    sim_time_s = self.sim_time(),
                    active_faults = active,
                    write_failures = self.stats.write_failures,
                    "Progress"
                );
            }

            // no catch-up: a slow tick just shortens the pause to zero
            let pause = budget.saturating_sub(elapsed);
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    info!("Shutdown requested");
                    break;
                }
                _ = tokio::time::sleep(pause) => {}
            }
        }

        self.report(started.elapsed())
    }

    /// Snapshot of the run so far.
    pub fn report(&self, wall_duration: Duration) -> RunReport {
        RunReport {
            fleet_size: self.fleet.len(),
            frequency_hz: self.config.frequency_hz,
            capacity: self.config.capacity(),
            warmup_ticks: self.stats.warmup_ticks,
            steady_ticks: self.stats.steady_ticks,
            sim_time_s: self.sim_time(),
            wall_duration,
            overruns: self.stats.overruns,
            publishes: self.stats.publishes,
            snapshots_written: self.stats.snapshots_written,
            rows_written: self.stats.rows_written,
            write_failures: self.stats.write_failures,
            fault_activations: self.stats.fault_activations,
            fault_clears: self.stats.fault_clears,
            active_faults: self.fleet.iter().filter(|a| a.fault().is_active()).count(),
            tick_latency: self.stats.tick_latency(),
        }
    }
}

fn tally(summary: &mut PublishSummary, res: std::result::Result<WriteOutcome, JoinError>) {
    match res {
        Ok((_, Ok(rows))) => {
            summary.written += 1;
            summary.rows += rows;
        }
        Ok((identity, Err(e))) => {
            warn!(asset = %identity, error = %e, "Snapshot publish failed");
            summary.failed += 1;
        }
        Err(e) => {
            warn!(error = %SimError::from(e), "Snapshot task failed");
            summary.failed += 1;
        }
    }
}
