//! Centrifugal pump: a drive plus suction/discharge hydraulics.

use super::drive::{self, PUMP_NOMINAL};
use crate::fault::FaultKind;
use crate::noise::{between, jitter, non_negative};
use crate::record::{DriveReadings, PumpHydraulics};
use rand::Rng;

pub const NOMINAL_SUCTION_BAR: f64 = 1.0;
pub const NOMINAL_DIFF_PRESSURE_BAR: f64 = 2.0;
pub const NOMINAL_FLOW_M3H: f64 = 50.0;
pub const NOMINAL_NPSH_AVAILABLE_M: f64 = 8.0;

fn draw_hydraulics(rng: &mut impl Rng) -> PumpHydraulics {
    let suction = non_negative(jitter(rng, NOMINAL_SUCTION_BAR, 0.05));
    let diff = non_negative(jitter(rng, NOMINAL_DIFF_PRESSURE_BAR, 0.1));
    PumpHydraulics {
        suction_pressure_bar: suction,
        discharge_pressure_bar: suction + diff,
        diff_pressure_bar: diff,
        flow_m3h: non_negative(jitter(rng, NOMINAL_FLOW_M3H, 1.5)),
        npsh_available_m: non_negative(jitter(rng, NOMINAL_NPSH_AVAILABLE_M, 0.3)),
        cavitation_index: non_negative(jitter(rng, 0.05, 0.02)),
    }
}

/// Hydraulic faults. They also load or unload the drive.
fn apply_hydraulic_fault(
    hydraulics: &mut PumpHydraulics,
    readings: &mut DriveReadings,
    fault: FaultKind,
    rng: &mut impl Rng,
) {
    match fault {
        FaultKind::Cavitation => {
            hydraulics.suction_pressure_bar -= between(rng, 0.3, 0.5);
            hydraulics.npsh_available_m = between(rng, 2.0, 3.5);
            hydraulics.cavitation_index += between(rng, 0.5, 0.9);
            hydraulics.flow_m3h *= between(rng, 0.8, 0.9);
            hydraulics.diff_pressure_bar *= between(rng, 0.7, 1.1);
            readings.vibration_hf_rms_mm_s *= between(rng, 2.0, 3.0);
            readings.noise_db += between(rng, 6.0, 10.0);
        }
        FaultKind::Clogging => {
            hydraulics.flow_m3h *= between(rng, 0.5, 0.7);
            hydraulics.diff_pressure_bar += between(rng, 0.5, 1.0);
            let unload = between(rng, 0.9, 0.95);
            for c in readings.current_a.iter_mut() {
                *c *= unload;
            }
            readings.stator_temp_c += between(rng, 2.0, 5.0);
        }
        FaultKind::AirEntrainment => {
            hydraulics.flow_m3h *= between(rng, 0.6, 1.0);
            hydraulics.diff_pressure_bar *= between(rng, 0.6, 0.9);
            hydraulics.cavitation_index += between(rng, 0.1, 0.3);
            let unload = between(rng, 0.85, 1.0);
            for c in readings.current_a.iter_mut() {
                *c *= unload;
            }
            readings.vibration_rms_mm_s += between(rng, 0.3, 0.8);
        }
        _ => {}
    }

    hydraulics.suction_pressure_bar = non_negative(hydraulics.suction_pressure_bar);
    hydraulics.diff_pressure_bar = non_negative(hydraulics.diff_pressure_bar);
    hydraulics.discharge_pressure_bar =
        hydraulics.suction_pressure_bar + hydraulics.diff_pressure_bar;
    hydraulics.flow_m3h = non_negative(hydraulics.flow_m3h);
}

/// One pump sample. Drive faults go to the drive model, hydraulic faults to
/// the pump model; anything else is ignored.
pub fn sample(fault: Option<FaultKind>, rng: &mut impl Rng) -> (DriveReadings, PumpHydraulics) {
    let mut readings = drive::draw_nominal(&PUMP_NOMINAL, rng);
    let mut hydraulics = draw_hydraulics(rng);

    if let Some(kind) = fault {
        drive::apply_fault(&mut readings, kind, rng);
        apply_hydraulic_fault(&mut hydraulics, &mut readings, kind, rng);
    }

    drive::derive_power(&mut readings);
    (readings, hydraulics)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_discharge_is_suction_plus_diff() {
        let mut rng = StdRng::seed_from_u64(1);
        for fault in [None, Some(FaultKind::Cavitation), Some(FaultKind::Clogging)] {
            for _ in 0..50 {
                let (_, h) = sample(fault, &mut rng);
                let expected = h.suction_pressure_bar + h.diff_pressure_bar;
                assert!((h.discharge_pressure_bar - expected).abs() < 1e-12);
                assert!(h.suction_pressure_bar >= 0.0);
                assert!(h.flow_m3h >= 0.0);
            }
        }
    }

    #[test]
    fn test_cavitation_raises_index_and_drops_npsh() {
        let mut rng = StdRng::seed_from_u64(2);
        for _ in 0..100 {
            let (_, h) = sample(Some(FaultKind::Cavitation), &mut rng);
            assert!(h.cavitation_index > 0.5);
            assert!(h.npsh_available_m < NOMINAL_NPSH_AVAILABLE_M - 1.0);
        }
    }

    #[test]
    fn test_clogging_chokes_flow() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..100 {
            let (_, h) = sample(Some(FaultKind::Clogging), &mut rng);
            assert!(h.flow_m3h < NOMINAL_FLOW_M3H * 0.75);
            assert!(h.diff_pressure_bar > NOMINAL_DIFF_PRESSURE_BAR + 0.3);
        }
    }

    #[test]
    fn test_pump_overload_raises_current_and_lowers_pf() {
        let mut rng = StdRng::seed_from_u64(6);
        for _ in 0..100 {
            let (d, h) = sample(Some(FaultKind::Overload), &mut rng);
            assert!(d.mean_current() > PUMP_NOMINAL.current_a + 1.0);
            assert!(d.power_factor < PUMP_NOMINAL.power_factor - 0.02);
            assert!(h.discharge_pressure_bar >= h.suction_pressure_bar);
        }
    }

    #[test]
    fn test_pump_accepts_drive_faults() {
        let mut rng = StdRng::seed_from_u64(4);
        let (d, _) = sample(Some(FaultKind::BearingWear), &mut rng);
        assert!(d.vibration_hf_rms_mm_s > PUMP_NOMINAL.vibration_hf_rms_mm_s + 0.03);
    }
}
