//! Industrial asset telemetry simulator.
//!
//! Simulates a fleet of motors, pumps and valves at a fixed sampling
//! frequency. Each asset keeps a sliding window of its most recent
//! measurements and republishes it as a CSV snapshot after every tick, with
//! randomly injected fault modes perturbing the readings.
//!
//! # Output
//! - `{kind}_{id}.csv`: one per asset (e.g. `motor_M1.csv`), header plus at
//!   most `round(frequency_hz * window_s)` rows, replaced atomically
//! - `fault_status.json`: active faults and energy counters for the fleet
//!
//! # Usage
//! ```bash
//! # Defaults: 3 motors, 2 pumps, 2 valves at 10 Hz with a 30 s window
//! diagnosys-simulator --output-dir data/assets
//!
//! # Reproducible short run with a report
//! diagnosys-simulator --seed 7 --max-ticks 600 --report run
//! ```

pub mod config;
pub mod error;
pub mod fault;
pub mod fleet;
pub mod noise;
pub mod physics;
pub mod record;
pub mod report;
pub mod scheduler;
pub mod window;
pub mod writer;

pub use config::{Config, FaultSettings, LoggingSettings};
pub use error::{Result, SimError};
pub use fault::{FaultKind, FaultModel, FaultState, FaultTransition};
pub use fleet::{build_fleet, AssetIdentity, AssetKind, AssetRuntimeState};
pub use record::MeasurementRecord;
pub use report::{PublishSummary, RunReport};
pub use scheduler::{Phase, Scheduler};
pub use window::SlidingWindow;
pub use writer::{FleetStatus, SnapshotWriter};
