//! Asset fleet: identities and per-asset runtime state.

use crate::config::Config;
use crate::fault::{FaultKind, FaultModel, FaultState, FaultTransition};
use crate::physics::{AssetPhysics, TickContext};
use crate::record::{MOTOR_FIELDS, PUMP_FIELDS, VALVE_FIELDS};
use crate::window::SlidingWindow;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Asset kinds in the fleet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    Motor,
    Pump,
    Valve,
}

impl AssetKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetKind::Motor => "motor",
            AssetKind::Pump => "pump",
            AssetKind::Valve => "valve",
        }
    }

    /// Prefix of the asset ids of this kind (`M1`, `P1`, `V1`).
    pub fn id_prefix(&self) -> &'static str {
        match self {
            AssetKind::Motor => "M",
            AssetKind::Pump => "P",
            AssetKind::Valve => "V",
        }
    }

    /// Returns all asset kinds, in fleet order.
    pub fn all() -> &'static [AssetKind] {
        &[AssetKind::Motor, AssetKind::Pump, AssetKind::Valve]
    }

    /// Fault modes that make physical sense for this kind.
    pub fn fault_kinds(&self) -> &'static [FaultKind] {
        match self {
            AssetKind::Motor => &[
                FaultKind::Overload,
                FaultKind::Imbalance,
                FaultKind::BearingWear,
                FaultKind::PhaseLoss,
            ],
            AssetKind::Pump => &[
                FaultKind::Overload,
                FaultKind::Imbalance,
                FaultKind::BearingWear,
                FaultKind::Cavitation,
                FaultKind::Clogging,
                FaultKind::AirEntrainment,
            ],
            AssetKind::Valve => &[
                FaultKind::Stiction,
                FaultKind::Leakage,
                FaultKind::ActuatorFault,
            ],
        }
    }

    /// Snapshot column header.
    pub fn schema(&self) -> &'static [&'static str] {
        match self {
            AssetKind::Motor => MOTOR_FIELDS,
            AssetKind::Pump => PUMP_FIELDS,
            AssetKind::Valve => VALVE_FIELDS,
        }
    }
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable identity of one asset.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssetIdentity {
    /// Asset identifier (e.g., "M1")
    pub id: String,
    pub kind: AssetKind,
}

impl AssetIdentity {
    pub fn new(kind: AssetKind, ordinal: usize) -> Self {
        Self {
            id: format!("{}{}", kind.id_prefix(), ordinal),
            kind,
        }
    }

    /// Published file stem, `{kind}_{id}`.
    pub fn file_stem(&self) -> String {
        format!("{}_{}", self.kind.as_str(), self.id)
    }
}

impl fmt::Display for AssetIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.kind, self.id)
    }
}

/// Everything one asset owns and mutates. Nothing here is shared with other
/// assets.
#[derive(Debug)]
pub struct AssetRuntimeState {
    pub identity: AssetIdentity,
    fault: FaultState,
    window: SlidingWindow,
    physics: AssetPhysics,
    cumulative_energy_kwh: f64,
    rng: StdRng,
}

impl AssetRuntimeState {
    /// Creates an asset with its own random stream derived from the fleet
    /// seed and the asset's position in the fleet.
    pub fn new(identity: AssetIdentity, capacity: usize, seed: u64, index: usize) -> Self {
        let mut rng = StdRng::seed_from_u64(stream_seed(seed, index));
        let physics = AssetPhysics::for_kind(identity.kind, &mut rng);
        Self {
            identity,
            fault: FaultState::default(),
            window: SlidingWindow::new(capacity),
            physics,
            cumulative_energy_kwh: 0.0,
            rng,
        }
    }

    pub fn kind(&self) -> AssetKind {
        self.identity.kind
    }

    pub fn fault(&self) -> &FaultState {
        &self.fault
    }

    /// Forces a fault on this asset until simulated time `end_time`.
    pub fn inject_fault(&mut self, kind: FaultKind, end_time: f64) {
        self.fault.inject(kind, end_time);
    }

    pub fn window(&self) -> &SlidingWindow {
        &self.window
    }

    pub fn cumulative_energy_kwh(&self) -> f64 {
        self.cumulative_energy_kwh
    }

    /// One tick: fault update, physics step, window append.
    pub fn step(
        &mut self,
        ctx: &TickContext,
        model: &FaultModel,
        enabled_faults: &[FaultKind],
    ) -> FaultTransition {
        let transition = self
            .fault
            .update(ctx.t, model, enabled_faults, &mut self.rng);
        let record = self.physics.step(
            self.fault.kind(),
            ctx,
            &mut self.cumulative_energy_kwh,
            &mut self.rng,
        );
        self.window.push(record);
        transition
    }
}

/// Spreads the fleet seed over per-asset streams.
fn stream_seed(seed: u64, index: usize) -> u64 {
    seed ^ (index as u64 + 1).wrapping_mul(0x9E37_79B9_7F4A_7C15)
}

/// Builds the fleet: motors, then pumps, then valves, each numbered from 1.
pub fn build_fleet(config: &Config) -> Vec<AssetRuntimeState> {
    let capacity = config.capacity();
    let seed = config.seed();
    let counts = [
        (AssetKind::Motor, config.motors),
        (AssetKind::Pump, config.pumps),
        (AssetKind::Valve, config.valves),
    ];

    let mut fleet = Vec::with_capacity(config.fleet_size());
    for (kind, count) in counts {
        for ordinal in 1..=count {
            let index = fleet.len();
            let identity = AssetIdentity::new(kind, ordinal);
            fleet.push(AssetRuntimeState::new(identity, capacity, seed, index));
        }
    }
    fleet
}
