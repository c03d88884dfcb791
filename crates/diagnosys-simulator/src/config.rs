//! Configuration structs for the asset simulator.

use crate::error::{Result, SimError};
use crate::fault::{FaultKind, FaultModel};
use crate::fleet::AssetKind;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::Level;

/// Seed used when none is configured, so runs are reproducible by default.
pub const DEFAULT_SEED: u64 = 42;

/// Main configuration for the simulator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory receiving one `{kind}_{id}.csv` snapshot per asset
    pub output_dir: PathBuf,

    /// Sampling frequency in Hz
    pub frequency_hz: f64,

    /// Number of motors to simulate
    pub motors: usize,

    /// Number of pumps to simulate
    pub pumps: usize,

    /// Number of valves to simulate
    pub valves: usize,

    /// Window length in seconds
    pub window_s: f64,

    /// Expected fault activations per minute
    pub fault_rate_per_min: f64,

    /// Mean fault duration in seconds
    pub fault_duration_s: f64,

    /// Random seed (falls back to [`DEFAULT_SEED`])
    pub seed: Option<u64>,

    /// Fleet fault status document (defaults to `<output_dir>/fault_status.json`)
    pub status_file: Option<PathBuf>,

    /// Maximum concurrent snapshot writes per publish pass
    pub max_in_flight: usize,

    /// Stop after this many steady-state ticks (runs forever when unset)
    pub max_ticks: Option<u64>,

    /// Fault kinds enabled per asset kind
    pub faults: FaultSettings,

    /// Logging configuration
    pub logging: LoggingSettings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("data/assets"),
            frequency_hz: 10.0,
            motors: 3,
            pumps: 2,
            valves: 2,
            window_s: 30.0,
            fault_rate_per_min: 0.5,
            fault_duration_s: 20.0,
            seed: None,
            status_file: None,
            max_in_flight: 8,
            max_ticks: None,
            faults: FaultSettings::default(),
            logging: LoggingSettings::default(),
        }
    }
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Write default config to a file (for generating example config)
    pub fn write_default(path: impl AsRef<Path>) -> Result<()> {
        let yaml = serde_yaml::to_string(&Self::default())?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    /// Window capacity in records: `round(frequency_hz * window_s)`.
    pub fn capacity(&self) -> usize {
        (self.frequency_hz * self.window_s).round() as usize
    }

    /// Tick length in seconds.
    pub fn dt(&self) -> f64 {
        1.0 / self.frequency_hz
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs_f64(self.dt())
    }

    pub fn seed(&self) -> u64 {
        self.seed.unwrap_or(DEFAULT_SEED)
    }

    pub fn fleet_size(&self) -> usize {
        self.motors + self.pumps + self.valves
    }

    pub fn fault_model(&self) -> FaultModel {
        FaultModel {
            rate_per_min: self.fault_rate_per_min,
            mean_duration_s: self.fault_duration_s,
        }
    }

    pub fn status_path(&self) -> PathBuf {
        self.status_file
            .clone()
            .unwrap_or_else(|| self.output_dir.join("fault_status.json"))
    }

    /// Rejects settings that cannot drive a fleet. Nothing is started when
    /// this fails.
    pub fn validate(&self) -> Result<()> {
        if !self.frequency_hz.is_finite() || self.frequency_hz <= 0.0 {
            return Err(invalid(format!(
                "frequency_hz must be > 0, got {}",
                self.frequency_hz
            )));
        }
        if !self.window_s.is_finite() || self.window_s <= 0.0 {
            return Err(invalid(format!("window_s must be > 0, got {}", self.window_s)));
        }
        if self.capacity() == 0 {
            return Err(invalid(format!(
                "frequency_hz * window_s rounds to an empty window ({} Hz x {} s)",
                self.frequency_hz, self.window_s
            )));
        }
        if !self.fault_rate_per_min.is_finite() || self.fault_rate_per_min < 0.0 {
            return Err(invalid(format!(
                "fault_rate_per_min must be >= 0, got {}",
                self.fault_rate_per_min
            )));
        }
        if !self.fault_duration_s.is_finite() || self.fault_duration_s <= 0.0 {
            return Err(invalid(format!(
                "fault_duration_s must be > 0, got {}",
                self.fault_duration_s
            )));
        }
        if self.fleet_size() == 0 {
            return Err(invalid("fleet is empty: set motors, pumps or valves".to_string()));
        }
        self.faults.validate()
    }

    /// Creates the output directory and proves it is writable by staging a
    /// throwaway file in it.
    pub fn prepare_output_dir(&self) -> Result<()> {
        let dir = &self.output_dir;
        let to_err = |source| SimError::OutputDir {
            path: dir.clone(),
            source,
        };
        std::fs::create_dir_all(dir).map_err(to_err)?;
        tempfile::NamedTempFile::new_in(dir).map_err(to_err)?;

        if let Some(parent) = self.status_path().parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|source| SimError::OutputDir {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }
        Ok(())
    }

    /// Get log level
    pub fn log_level(&self) -> Level {
        match self.logging.level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        }
    }
}

fn invalid(msg: String) -> SimError {
    SimError::InvalidConfig(msg)
}

/// Fault kinds the fault machine may pick, per asset kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FaultSettings {
    pub motor: Vec<FaultKind>,
    pub pump: Vec<FaultKind>,
    pub valve: Vec<FaultKind>,
}

impl Default for FaultSettings {
    fn default() -> Self {
        Self {
            motor: AssetKind::Motor.fault_kinds().to_vec(),
            pump: AssetKind::Pump.fault_kinds().to_vec(),
            valve: AssetKind::Valve.fault_kinds().to_vec(),
        }
    }
}

impl FaultSettings {
    pub fn enabled_for(&self, kind: AssetKind) -> &[FaultKind] {
        match kind {
            AssetKind::Motor => &self.motor,
            AssetKind::Pump => &self.pump,
            AssetKind::Valve => &self.valve,
        }
    }

    /// Every enabled fault must belong to its asset kind's fault set.
    pub fn validate(&self) -> Result<()> {
        for kind in AssetKind::all() {
            let valid = kind.fault_kinds();
            if let Some(bad) = self
                .enabled_for(*kind)
                .iter()
                .find(|f| !valid.contains(f))
            {
                return Err(invalid(format!(
                    "fault '{}' is not valid for {} assets",
                    bad,
                    kind.as_str()
                )));
            }
        }
        Ok(())
    }
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Log level: "trace", "debug", "info", "warn", "error"
    pub level: String,
    /// Include target in logs
    pub show_target: bool,
    /// Include thread IDs in logs
    pub show_thread_ids: bool,
    /// Include file and line numbers
    pub show_location: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            show_target: true,
            show_thread_ids: false,
            show_location: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_capacity_rounding() {
        let config = Config {
            frequency_hz: 10.0,
            window_s: 30.0,
            ..Default::default()
        };
        assert_eq!(config.capacity(), 300);

        let config = Config {
            frequency_hz: 3.0,
            window_s: 2.5,
            ..Default::default()
        };
        assert_eq!(config.capacity(), 8);
        assert!((config.dt() - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        config.validate().unwrap();
        assert_eq!(config.seed(), DEFAULT_SEED);
    }

    #[test]
    fn test_invalid_frequency_and_window() {
        for freq in [0.0, -1.0, f64::NAN] {
            let config = Config {
                frequency_hz: freq,
                ..Default::default()
            };
            assert!(matches!(config.validate(), Err(SimError::InvalidConfig(_))));
        }
        let config = Config {
            window_s: 0.0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(SimError::InvalidConfig(_))));

        let config = Config {
            frequency_hz: 0.1,
            window_s: 1.0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(SimError::InvalidConfig(_))));
    }

    #[test]
    fn test_fault_kind_validated_per_asset_kind() {
        let mut config = Config::default();
        config.faults.valve = vec![FaultKind::Cavitation];
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("cavitation"));

        config.faults.valve = vec![];
        config.validate().unwrap();
    }

    #[test]
    fn test_yaml_round_trip_with_partial_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sim.yml");
        std::fs::write(
            &path,
            "frequency_hz: 5.0\nmotors: 1\nfaults:\n  motor: [overload, phase_loss]\n",
        )
        .unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.frequency_hz, 5.0);
        assert_eq!(config.motors, 1);
        assert_eq!(config.pumps, 2);
        assert_eq!(
            config.faults.motor,
            vec![FaultKind::Overload, FaultKind::PhaseLoss]
        );
        assert_eq!(config.faults.pump, AssetKind::Pump.fault_kinds().to_vec());
    }

    #[test]
    fn test_prepare_output_dir_creates_directory() {
        let dir = TempDir::new().unwrap();
        let config = Config {
            output_dir: dir.path().join("nested").join("assets"),
            ..Default::default()
        };
        config.prepare_output_dir().unwrap();
        assert!(config.output_dir.is_dir());
        assert_eq!(config.status_path(), config.output_dir.join("fault_status.json"));
    }

    #[test]
    fn test_prepare_output_dir_rejects_file_path() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("occupied");
        std::fs::write(&file, b"x").unwrap();
        let config = Config {
            output_dir: file,
            ..Default::default()
        };
        assert!(matches!(
            config.prepare_output_dir(),
            Err(SimError::OutputDir { .. })
        ));
    }
}
