//! Per-asset fault state machine.
//!
//! Two states, INACTIVE and ACTIVE. From INACTIVE a single Bernoulli trial per
//! tick decides onset; ACTIVE lasts until the simulated clock reaches the
//! sampled end time.

use crate::noise;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Shortest fault the machine will ever produce, in simulated seconds.
pub const MIN_FAULT_DURATION_S: f64 = 5.0;

/// Anomaly modes injected into the physics.
///
/// The set valid for each asset kind is given by
/// [`AssetKind::fault_kinds`](crate::fleet::AssetKind::fault_kinds).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FaultKind {
    Overload,
    Imbalance,
    BearingWear,
    PhaseLoss,
    Cavitation,
    Clogging,
    AirEntrainment,
    Stiction,
    Leakage,
    ActuatorFault,
}

impl FaultKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FaultKind::Overload => "overload",
            FaultKind::Imbalance => "imbalance",
            FaultKind::BearingWear => "bearing_wear",
            FaultKind::PhaseLoss => "phase_loss",
            FaultKind::Cavitation => "cavitation",
            FaultKind::Clogging => "clogging",
            FaultKind::AirEntrainment => "air_entrainment",
            FaultKind::Stiction => "stiction",
            FaultKind::Leakage => "leakage",
            FaultKind::ActuatorFault => "actuator_fault",
        }
    }
}

impl fmt::Display for FaultKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Onset rate and mean dwell time shared by the whole fleet.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaultModel {
    /// Expected activations per minute of 1 s ticks
    pub rate_per_min: f64,
    /// Mean fault duration in simulated seconds
    pub mean_duration_s: f64,
}

impl FaultModel {
    /// Per-tick onset probability.
    ///
    /// Assumes one-second ticks whatever the sampling frequency, so onset
    /// statistics depend on the rate alone.
    pub fn onset_probability(&self) -> f64 {
        (self.rate_per_min / 60.0).clamp(0.0, 1.0)
    }

    /// Samples a dwell time, never shorter than [`MIN_FAULT_DURATION_S`].
    pub fn sample_duration(&self, rng: &mut impl Rng) -> f64 {
        let d = self.mean_duration_s;
        noise::gauss(rng, d, 0.3 * d).max(MIN_FAULT_DURATION_S)
    }
}

/// Result of one state machine update, used for logging and counters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FaultTransition {
    None,
    Activated { kind: FaultKind, end_time: f64 },
    Cleared { kind: FaultKind },
}

/// Current fault of one asset. `kind` is `Some` iff the fault is active.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FaultState {
    kind: Option<FaultKind>,
    end_time: f64,
}

impl FaultState {
    pub fn is_active(&self) -> bool {
        self.kind.is_some()
    }

    pub fn kind(&self) -> Option<FaultKind> {
        self.kind
    }

    /// End of the active fault, `None` while inactive.
    pub fn end_time(&self) -> Option<f64> {
        self.kind.map(|_| self.end_time)
    }

    /// Forces a fault regardless of the onset trial.
    pub fn inject(&mut self, kind: FaultKind, end_time: f64) {
        self.kind = Some(kind);
        self.end_time = end_time;
    }

    /// Advances the machine to simulated time `t`.
    ///
    /// An empty `valid_kinds` keeps the asset healthy; no trial is drawn.
    pub fn update(
        &mut self,
        t: f64,
        model: &FaultModel,
        valid_kinds: &[FaultKind],
        rng: &mut impl Rng,
    ) -> FaultTransition {
        match self.kind {
            Some(kind) if t >= self.end_time => {
                self.kind = None;
                self.end_time = 0.0;
                FaultTransition::Cleared { kind }
            }
            Some(_) => FaultTransition::None,
            None => {
                if valid_kinds.is_empty() || !rng.gen_bool(model.onset_probability()) {
                    return FaultTransition::None;
                }
                let Some(&kind) = valid_kinds.choose(rng) else {
                    return FaultTransition::None;
                };
                let end_time = t + model.sample_duration(rng);
                self.inject(kind, end_time);
                FaultTransition::Activated { kind, end_time }
            }
        }
    }
}
