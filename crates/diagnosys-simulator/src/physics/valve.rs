//! Pneumatic control valve with a first-order positioner.

use super::TickContext;
use crate::fault::FaultKind;
use crate::noise::{between, gauss, jitter, non_negative};
use crate::record::ValveRecord;
use rand::Rng;

/// Positioner gain in 1/s when healthy.
pub const NOMINAL_GAIN: f64 = 0.9;
/// Chance per tick that the controller moves the set-point.
pub const COMMAND_STEP_PROBABILITY: f64 = 0.05;
/// Largest set-point move, in percent of stroke.
pub const MAX_COMMAND_STEP_PCT: f64 = 20.0;
/// Flow at full opening; flow is proportional to position.
pub const FULL_OPEN_FLOW_M3H: f64 = 40.0;
pub const NOMINAL_TRAVEL_TIME_MS: f64 = 150.0;
pub const NOMINAL_LEAKAGE_LPH: f64 = 0.1;
pub const NOMINAL_SUPPLY_AIR_BAR: f64 = 6.0;

/// Persistent set-point and stem position of one valve.
#[derive(Debug, Clone, PartialEq)]
pub struct ValveActuator {
    command_pct: f64,
    position_pct: f64,
}

impl ValveActuator {
    /// Starts settled at a random opening around mid-stroke.
    pub fn new(rng: &mut impl Rng) -> Self {
        let opening = between(rng, 35.0, 65.0);
        Self::with_state(opening, opening)
    }

    pub fn with_state(command_pct: f64, position_pct: f64) -> Self {
        Self {
            command_pct: command_pct.clamp(0.0, 100.0),
            position_pct: position_pct.clamp(0.0, 100.0),
        }
    }

    pub fn command_pct(&self) -> f64 {
        self.command_pct
    }

    pub fn position_pct(&self) -> f64 {
        self.position_pct
    }

    /// Moves the stem toward the command by `gain * dt` of the remaining gap
    /// and returns the new error. The step fraction is capped at 1 so a
    /// coarse tick never overshoots.
    pub fn track(&mut self, gain: f64, dt: f64) -> f64 {
        let alpha = (gain * dt).clamp(0.0, 1.0);
        self.position_pct += alpha * (self.command_pct - self.position_pct);
        self.command_pct - self.position_pct
    }

    fn maybe_step_command(&mut self, rng: &mut impl Rng) {
        if rng.gen_bool(COMMAND_STEP_PROBABILITY) {
            self.command_pct =
                jitter(rng, self.command_pct, MAX_COMMAND_STEP_PCT).clamp(0.0, 100.0);
        }
    }

    /// One valve sample.
    pub fn step(
        &mut self,
        fault: Option<FaultKind>,
        ctx: &TickContext,
        rng: &mut impl Rng,
    ) -> ValveRecord {
        self.maybe_step_command(rng);

        let mut gain = NOMINAL_GAIN;
        let mut travel_time_ms = jitter(rng, NOMINAL_TRAVEL_TIME_MS, 10.0);
        let mut stem_torque_nm = jitter(rng, 30.0, 1.5);
        let mut leakage_lph = jitter(rng, NOMINAL_LEAKAGE_LPH, 0.05);
        let mut supply_air_bar = jitter(rng, NOMINAL_SUPPLY_AIR_BAR, 0.1);
        let mut noise_db = jitter(rng, 55.0, 2.0);
        let mut extra_flow = 0.0;

        match fault {
            Some(FaultKind::Stiction) => {
                gain *= between(rng, 0.1, 0.3);
                travel_time_ms *= between(rng, 2.0, 3.5);
                stem_torque_nm *= between(rng, 1.5, 2.2);
                noise_db += between(rng, 5.0, 10.0);
            }
            Some(FaultKind::Leakage) => {
                leakage_lph += between(rng, 5.0, 20.0);
                extra_flow = between(rng, 1.0, 4.0);
            }
            Some(FaultKind::ActuatorFault) => {
                gain *= between(rng, 0.02, 0.1);
                supply_air_bar -= between(rng, 1.5, 2.5);
                stem_torque_nm *= between(rng, 0.4, 0.7);
                travel_time_ms *= between(rng, 1.5, 2.5);
            }
            _ => {}
        }

        let error = self.track(gain, ctx.dt);
        let position = self.position_pct;
        let flow = FULL_OPEN_FLOW_M3H * position / 100.0 * jitter(rng, 1.0, 0.02) + extra_flow;

        ValveRecord {
            timestamp: ctx.timestamp,
            command_pct: self.command_pct,
            position_pct: (position + gauss(rng, 0.0, 0.2)).clamp(0.0, 100.0),
            position_error_pct: error,
            travel_time_ms: non_negative(travel_time_ms),
            diff_pressure_bar: non_negative(jitter(rng, 1.5, 0.05)),
            valve_flow_m3h: non_negative(flow),
            stem_torque_nm: non_negative(stem_torque_nm),
            leakage_lph: non_negative(leakage_lph),
            supply_air_bar: non_negative(supply_air_bar),
            ambient_temp_c: jitter(rng, 25.0, 0.5),
            noise_db,
        }
    }
}
