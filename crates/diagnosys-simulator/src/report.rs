//! Run statistics and the end-of-run report.

use crate::fault::FaultTransition;
use hdrhistogram::Histogram;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Latency statistics.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LatencyStats {
    pub count: u64,
    pub min_us: u64,
    pub max_us: u64,
    pub mean_us: u64,
    pub p50_us: u64,
    pub p95_us: u64,
    pub p99_us: u64,
}

impl LatencyStats {
    /// Computes latency statistics from a histogram.
    pub fn from_histogram(histogram: &Histogram<u64>) -> Self {
        if histogram.is_empty() {
            return Self::default();
        }

        Self {
            count: histogram.len(),
            min_us: histogram.min(),
            max_us: histogram.max(),
            mean_us: histogram.mean() as u64,
            p50_us: histogram.value_at_quantile(0.50),
            p95_us: histogram.value_at_quantile(0.95),
            p99_us: histogram.value_at_quantile(0.99),
        }
    }

    /// Formats latency as a human-readable string.
    pub fn format_ms(&self) -> String {
        if self.count == 0 {
            "N/A".to_string()
        } else {
            format!(
                "p50={:.2}ms p95={:.2}ms p99={:.2}ms max={:.2}ms",
                self.p50_us as f64 / 1000.0,
                self.p95_us as f64 / 1000.0,
                self.p99_us as f64 / 1000.0,
                self.max_us as f64 / 1000.0
            )
        }
    }
}

/// Outcome of one publish pass over the fleet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PublishSummary {
    /// Snapshots replaced successfully
    pub written: usize,
    /// Snapshots (or the status document) that failed to publish
    pub failed: usize,
    /// Data rows across all written snapshots
    pub rows: usize,
}

/// Counters collected by the scheduler while it runs.
pub struct RunStats {
    tick_latency: Histogram<u64>,
    pub warmup_ticks: u64,
    pub steady_ticks: u64,
    pub overruns: u64,
    pub publishes: u64,
    pub snapshots_written: u64,
    pub rows_written: u64,
    pub write_failures: u64,
    pub fault_activations: u64,
    pub fault_clears: u64,
}

impl Default for RunStats {
    fn default() -> Self {
        Self::new()
    }
}

impl RunStats {
    pub fn new() -> Self {
        Self {
            // 1us .. 60s, 3 significant digits
            tick_latency: Histogram::<u64>::new_with_bounds(1, 60_000_000, 3)
                .expect("static histogram bounds"),
            warmup_ticks: 0,
            steady_ticks: 0,
            overruns: 0,
            publishes: 0,
            snapshots_written: 0,
            rows_written: 0,
            write_failures: 0,
            fault_activations: 0,
            fault_clears: 0,
        }
    }

    /// Records the processing time of one paced tick.
    pub fn record_tick(&mut self, processing: Duration, budget: Duration) {
        self.steady_ticks += 1;
        if processing > budget {
            self.overruns += 1;
        }
        self.tick_latency
            .saturating_record(processing.as_micros().max(1) as u64);
    }

    pub fn record_publish(&mut self, summary: &PublishSummary) {
        self.publishes += 1;
        self.snapshots_written += summary.written as u64;
        self.rows_written += summary.rows as u64;
        self.write_failures += summary.failed as u64;
    }

    pub fn record_transition(&mut self, transition: &FaultTransition) {
        match transition {
            FaultTransition::Activated { .. } => self.fault_activations += 1,
            FaultTransition::Cleared { .. } => self.fault_clears += 1,
            FaultTransition::None => {}
        }
    }

    pub fn tick_latency(&self) -> LatencyStats {
        LatencyStats::from_histogram(&self.tick_latency)
    }
}

/// Complete run report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    // Configuration
    pub fleet_size: usize,
    pub frequency_hz: f64,
    pub capacity: usize,

    // Progress
    pub warmup_ticks: u64,
    pub steady_ticks: u64,
    pub sim_time_s: f64,
    pub wall_duration: Duration,
    pub overruns: u64,

    // Publishing
    pub publishes: u64,
    pub snapshots_written: u64,
    pub rows_written: u64,
    pub write_failures: u64,

    // Faults
    pub fault_activations: u64,
    pub fault_clears: u64,
    pub active_faults: usize,

    pub tick_latency: LatencyStats,
}

impl RunReport {
    /// Effective steady-state tick rate against wall time.
    pub fn ticks_per_second(&self) -> f64 {
        if self.wall_duration.as_secs_f64() > 0.0 {
            self.steady_ticks as f64 / self.wall_duration.as_secs_f64()
        } else {
            0.0
        }
    }

    /// Generates a markdown report.
    pub fn to_markdown(&self) -> String {
        let mut md = String::new();

        md.push_str("# Asset Simulator Report\n\n");

        md.push_str("## Configuration\n\n");
        md.push_str("| Setting | Value |\n");
        md.push_str("|---------|-------|\n");
        md.push_str(&format!("| Assets | {} |\n", self.fleet_size));
        md.push_str(&format!("| Frequency | {:.1} Hz |\n", self.frequency_hz));
        md.push_str(&format!("| Window | {} records |\n", self.capacity));
        md.push('\n');

        md.push_str("## Progress\n\n");
        md.push_str("| Metric | Value |\n");
        md.push_str("|--------|-------|\n");
        md.push_str(&format!("| Warmup Ticks | {} |\n", format_number(self.warmup_ticks)));
        md.push_str(&format!("| Steady Ticks | {} |\n", format_number(self.steady_ticks)));
        md.push_str(&format!("| Simulated Time | {:.1}s |\n", self.sim_time_s));
        md.push_str(&format!(
            "| Wall Time | {:.1}s |\n",
            self.wall_duration.as_secs_f64()
        ));
        md.push_str(&format!(
            "| Tick Rate | {:.2} ticks/s |\n",
            self.ticks_per_second()
        ));
        md.push_str(&format!("| Overruns | {} |\n", self.overruns));
        md.push('\n');

        md.push_str("### Tick Processing Latency\n\n");
        md.push_str("| Percentile | Latency |\n");
        md.push_str("|------------|--------|\n");
        if self.tick_latency.count > 0 {
            for (name, us) in [
                ("p50", self.tick_latency.p50_us),
                ("p95", self.tick_latency.p95_us),
                ("p99", self.tick_latency.p99_us),
                ("max", self.tick_latency.max_us),
            ] {
                md.push_str(&format!("| {} | {:.2}ms |\n", name, us as f64 / 1000.0));
            }
        } else {
            md.push_str("| N/A | No data |\n");
        }
        md.push('\n');

        md.push_str("## Publishing\n\n");
        md.push_str("| Metric | Value |\n");
        md.push_str("|--------|-------|\n");
        md.push_str(&format!("| Publish Passes | {} |\n", format_number(self.publishes)));
        md.push_str(&format!(
            "| Snapshots Written | {} |\n",
            format_number(self.snapshots_written)
        ));
        md.push_str(&format!("| Rows Written | {} |\n", format_number(self.rows_written)));
        md.push_str(&format!("| Write Failures | {} |\n", self.write_failures));
        md.push('\n');

        md.push_str("## Faults\n\n");
        md.push_str("| Metric | Value |\n");
        md.push_str("|--------|-------|\n");
        md.push_str(&format!("| Activations | {} |\n", self.fault_activations));
        md.push_str(&format!("| Cleared | {} |\n", self.fault_clears));
        md.push_str(&format!("| Active at Shutdown | {} |\n", self.active_faults));
        md.push('\n');

        if self.write_failures > 0 {
            md.push_str("**Snapshot write failures occurred during the run**\n");
        } else {
            md.push_str("**All snapshots published without errors**\n");
        }

        md
    }

    /// Generates a JSON report.
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }

    /// Prints a summary to stdout.
    pub fn print_summary(&self) {
        println!("\n{}", "=".repeat(60));
        println!("SIMULATION SUMMARY");
        println!("{}", "=".repeat(60));

        println!(
            "\nAssets: {} | {:.1} Hz | window {} | simulated {:.1}s",
            self.fleet_size, self.frequency_hz, self.capacity, self.sim_time_s
        );
        println!(
            "Ticks: {} warmup + {} steady ({:.2}/s, {} overruns)",
            format_number(self.warmup_ticks),
            format_number(self.steady_ticks),
            self.ticks_per_second(),
            self.overruns
        );
        println!("Tick latency: {}", self.tick_latency.format_ms());
        println!(
            "Snapshots: {} written, {} rows, {} failures",
            format_number(self.snapshots_written),
            format_number(self.rows_written),
            self.write_failures
        );
        println!(
            "Faults: {} activated, {} cleared, {} active",
            self.fault_activations, self.fault_clears, self.active_faults
        );

        println!("\n{}", "=".repeat(60));
    }
}

/// Formats a number with thousand separators.
fn format_number(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::new();
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result.chars().rev().collect()
}
