//! Per-kind asset physics.
//!
//! Each asset kind produces its own record shape. Motors and pumps share the
//! electric drive model; pumps add hydraulics; valves run a positioner with
//! persistent state. An active fault perturbs the fault-free draw in a
//! kind-specific direction, and faults that do not apply to the asset are
//! ignored.

pub mod drive;
pub mod pump;
pub mod valve;

use crate::fault::FaultKind;
use crate::fleet::AssetKind;
use crate::record::{DriveReadings, MeasurementRecord, MotorRecord, PumpRecord};
use chrono::{DateTime, Utc};
use rand::Rng;

pub use valve::ValveActuator;

/// Read-only view of the simulated clock for one tick.
#[derive(Debug, Clone, Copy)]
pub struct TickContext {
    /// Simulated seconds since fleet start, before this tick's advance
    pub t: f64,
    /// Tick length in seconds
    pub dt: f64,
    /// Wall-clock stamp written into the record
    pub timestamp: DateTime<Utc>,
}

/// Kind-specific physics state carried between ticks.
#[derive(Debug, Clone)]
pub enum AssetPhysics {
    Motor,
    Pump,
    Valve(ValveActuator),
}

impl AssetPhysics {
    pub fn for_kind(kind: AssetKind, rng: &mut impl Rng) -> Self {
        match kind {
            AssetKind::Motor => AssetPhysics::Motor,
            AssetKind::Pump => AssetPhysics::Pump,
            AssetKind::Valve => AssetPhysics::Valve(ValveActuator::new(rng)),
        }
    }

    pub fn kind(&self) -> AssetKind {
        match self {
            AssetPhysics::Motor => AssetKind::Motor,
            AssetPhysics::Pump => AssetKind::Pump,
            AssetPhysics::Valve(_) => AssetKind::Valve,
        }
    }

    /// Produces one record and integrates drive power into `energy_kwh`.
    ///
    /// A fault outside this kind's fault set is treated as no fault.
    pub fn step(
        &mut self,
        fault: Option<FaultKind>,
        ctx: &TickContext,
        energy_kwh: &mut f64,
        rng: &mut impl Rng,
    ) -> MeasurementRecord {
        let kind = self.kind();
        let fault = fault.filter(|f| kind.fault_kinds().contains(f));
        match self {
            AssetPhysics::Motor => {
                let mut readings = drive::sample(&drive::MOTOR_NOMINAL, fault, rng);
                accumulate_energy(&mut readings, energy_kwh, ctx.dt);
                MeasurementRecord::Motor(MotorRecord {
                    timestamp: ctx.timestamp,
                    drive: readings,
                })
            }
            AssetPhysics::Pump => {
                let (mut readings, hydraulics) = pump::sample(fault, rng);
                accumulate_energy(&mut readings, energy_kwh, ctx.dt);
                MeasurementRecord::Pump(PumpRecord {
                    timestamp: ctx.timestamp,
                    drive: readings,
                    hydraulics,
                })
            }
            AssetPhysics::Valve(actuator) => {
                MeasurementRecord::Valve(actuator.step(fault, ctx, rng))
            }
        }
    }
}

/// Integrates real power over one tick. Negative power never drains the
/// counter.
fn accumulate_energy(readings: &mut DriveReadings, energy_kwh: &mut f64, dt: f64) {
    *energy_kwh += readings.real_power_kw.max(0.0) * dt / 3600.0;
    readings.energy_kwh = *energy_kwh;
}
