//! Electric drive model shared by motors and pumps.

use crate::fault::FaultKind;
use crate::noise::{between, jitter, non_negative};
use crate::record::DriveReadings;
use rand::Rng;

/// Line-to-line supply voltage.
pub const NOMINAL_VOLTAGE_V: f64 = 400.0;

/// Fault-free operating point of a drive.
#[derive(Debug, Clone, Copy)]
pub struct DriveNominal {
    pub current_a: f64,
    pub power_factor: f64,
    pub thd_i_pct: f64,
    pub vibration_rms_mm_s: f64,
    pub vibration_hf_rms_mm_s: f64,
    pub stator_temp_c: f64,
    pub bearing_temp_c: f64,
    pub noise_db: f64,
    pub speed_rpm: f64,
    pub torque_nm: f64,
}

pub const MOTOR_NOMINAL: DriveNominal = DriveNominal {
    current_a: 40.0,
    power_factor: 0.86,
    thd_i_pct: 5.0,
    vibration_rms_mm_s: 1.2,
    vibration_hf_rms_mm_s: 0.30,
    stator_temp_c: 60.0,
    bearing_temp_c: 55.0,
    noise_db: 72.0,
    speed_rpm: 1480.0,
    torque_nm: 150.0,
};

pub const PUMP_NOMINAL: DriveNominal = DriveNominal {
    current_a: 35.0,
    power_factor: 0.84,
    thd_i_pct: 4.5,
    vibration_rms_mm_s: 1.0,
    vibration_hf_rms_mm_s: 0.25,
    stator_temp_c: 58.0,
    bearing_temp_c: 52.0,
    noise_db: 75.0,
    speed_rpm: 2950.0,
    torque_nm: 65.0,
};

/// Draws one fault-free set of readings. Power columns are left at zero
/// until [`derive_power`] runs.
pub fn draw_nominal(nominal: &DriveNominal, rng: &mut impl Rng) -> DriveReadings {
    let current_a = [
        jitter(rng, nominal.current_a, 0.6),
        jitter(rng, nominal.current_a, 0.6),
        jitter(rng, nominal.current_a, 0.6),
    ];

    DriveReadings {
        current_a,
        voltage_v: jitter(rng, NOMINAL_VOLTAGE_V, 2.0),
        power_factor: jitter(rng, nominal.power_factor, 0.01),
        apparent_power_kva: 0.0,
        real_power_kw: 0.0,
        reactive_power_kvar: 0.0,
        energy_kwh: 0.0,
        thd_i_pct: non_negative(jitter(rng, nominal.thd_i_pct, 0.4)),
        vibration_rms_mm_s: non_negative(jitter(rng, nominal.vibration_rms_mm_s, 0.1)),
        vibration_hf_rms_mm_s: non_negative(jitter(rng, nominal.vibration_hf_rms_mm_s, 0.03)),
        vibration_kurtosis: jitter(rng, 3.0, 0.2),
        bearing_temp_c: jitter(rng, nominal.bearing_temp_c, 1.0),
        stator_temp_c: jitter(rng, nominal.stator_temp_c, 1.5),
        ambient_temp_c: jitter(rng, 25.0, 0.5),
        noise_db: jitter(rng, nominal.noise_db, 1.5),
        speed_rpm: jitter(rng, nominal.speed_rpm, 5.0),
        torque_nm: jitter(rng, nominal.torque_nm, nominal.torque_nm * 0.02),
    }
}

/// Applies an electrical or mechanical fault to the drive readings.
///
/// Hydraulic and valve faults are not drive faults and leave the readings
/// untouched.
pub fn apply_fault(readings: &mut DriveReadings, fault: FaultKind, rng: &mut impl Rng) {
    match fault {
        FaultKind::Overload => {
            let scale = between(rng, 1.2, 1.4);
            for c in readings.current_a.iter_mut() {
                *c *= scale;
            }
            readings.power_factor -= between(rng, 0.05, 0.12);
            readings.stator_temp_c += between(rng, 8.0, 15.0);
            readings.bearing_temp_c += between(rng, 3.0, 8.0);
            readings.vibration_rms_mm_s += between(rng, 0.3, 0.8);
            readings.vibration_hf_rms_mm_s += between(rng, 0.05, 0.15);
            readings.thd_i_pct += between(rng, 1.0, 3.0);
            readings.torque_nm *= scale;
            readings.speed_rpm -= between(rng, 10.0, 30.0);
            readings.noise_db += between(rng, 2.0, 5.0);
        }
        FaultKind::Imbalance => {
            let skew = between(rng, 0.08, 0.2);
            readings.current_a[0] *= 1.0 + skew;
            readings.current_a[1] *= 1.0 - 0.4 * skew;
            readings.current_a[2] *= 1.0 - 0.8 * skew;
            readings.vibration_rms_mm_s += between(rng, 1.0, 2.0);
            readings.vibration_hf_rms_mm_s += between(rng, 0.05, 0.1);
            readings.vibration_kurtosis += between(rng, 0.5, 1.5);
            readings.noise_db += between(rng, 1.0, 3.0);
        }
        FaultKind::BearingWear => {
            readings.vibration_hf_rms_mm_s *= between(rng, 2.5, 4.0);
            readings.vibration_rms_mm_s += between(rng, 0.2, 0.6);
            readings.vibration_kurtosis += between(rng, 2.0, 5.0);
            readings.bearing_temp_c += between(rng, 10.0, 20.0);
            readings.noise_db += between(rng, 4.0, 8.0);
        }
        FaultKind::PhaseLoss => {
            let lost = rng.gen_range(0..3);
            for (phase, c) in readings.current_a.iter_mut().enumerate() {
                if phase == lost {
                    *c *= between(rng, 0.0, 0.1);
                } else {
                    *c *= between(rng, 1.3, 1.5);
                }
            }
            readings.torque_nm *= between(rng, 0.5, 0.7);
            readings.power_factor -= between(rng, 0.05, 0.1);
            readings.stator_temp_c += between(rng, 5.0, 12.0);
            readings.vibration_rms_mm_s += between(rng, 0.4, 1.0);
            readings.speed_rpm -= between(rng, 20.0, 60.0);
        }
        _ => {}
    }
}

/// Fills the power columns from the phase currents and power factor.
///
/// Power is referenced to [`NOMINAL_VOLTAGE_V`]; `voltage_v` is a measured
/// column only.
pub fn derive_power(readings: &mut DriveReadings) {
    readings.power_factor = readings.power_factor.clamp(0.05, 1.0);
    for c in readings.current_a.iter_mut() {
        *c = non_negative(*c);
    }

    let s = 3f64.sqrt() * NOMINAL_VOLTAGE_V * readings.mean_current() / 1000.0;
    let p = s * readings.power_factor;
    readings.apparent_power_kva = s;
    readings.real_power_kw = p;
    readings.reactive_power_kvar = non_negative(s * s - p * p).sqrt();
}

/// Full drive step: nominal draw, optional fault, derived power.
pub fn sample(
    nominal: &DriveNominal,
    fault: Option<FaultKind>,
    rng: &mut impl Rng,
) -> DriveReadings {
    let mut readings = draw_nominal(nominal, rng);
    if let Some(kind) = fault {
        apply_fault(&mut readings, kind, rng);
    }
    derive_power(&mut readings);
    readings
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn mean(values: &[f64]) -> f64 {
        values.iter().sum::<f64>() / values.len() as f64
    }

    #[test]
    fn test_nominal_power_balance() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..500 {
            let r = sample(&MOTOR_NOMINAL, None, &mut rng);
            assert!(r.reactive_power_kvar >= 0.0);
            assert!(r.real_power_kw > 0.0);
            let s2 = r.real_power_kw.powi(2) + r.reactive_power_kvar.powi(2);
            assert!((s2.sqrt() - r.apparent_power_kva).abs() < 1e-6);
        }
    }

    #[test]
    fn test_apparent_power_uses_nominal_voltage() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..200 {
            let r = sample(&MOTOR_NOMINAL, None, &mut rng);
            let expected = 3f64.sqrt() * 400.0 * r.mean_current() / 1000.0;
            assert!((r.apparent_power_kva - expected).abs() < 1e-9);
        }

        // measured voltage does not feed the power triangle
        let mut readings = draw_nominal(&MOTOR_NOMINAL, &mut rng);
        readings.voltage_v = 380.0;
        derive_power(&mut readings);
        let expected = 3f64.sqrt() * NOMINAL_VOLTAGE_V * readings.mean_current() / 1000.0;
        assert!((readings.apparent_power_kva - expected).abs() < 1e-9);
    }

    #[test]
    fn test_overload_raises_current_and_lowers_pf() {
        let mut rng = StdRng::seed_from_u64(42);
        let healthy: Vec<_> = (0..300)
            .map(|_| sample(&MOTOR_NOMINAL, None, &mut rng))
            .collect();
        let loaded: Vec<_> = (0..300)
            .map(|_| sample(&MOTOR_NOMINAL, Some(FaultKind::Overload), &mut rng))
            .collect();

        let i_before = mean(&healthy.iter().map(|r| r.mean_current()).collect::<Vec<_>>());
        let i_after = mean(&loaded.iter().map(|r| r.mean_current()).collect::<Vec<_>>());
        let pf_before = mean(&healthy.iter().map(|r| r.power_factor).collect::<Vec<_>>());
        let pf_after = mean(&loaded.iter().map(|r| r.power_factor).collect::<Vec<_>>());

        assert!(i_after > i_before);
        assert!(pf_after <= pf_before);
    }

    #[test]
    fn test_phase_loss_collapses_one_phase() {
        let mut rng = StdRng::seed_from_u64(9);
        for _ in 0..100 {
            let r = sample(&MOTOR_NOMINAL, Some(FaultKind::PhaseLoss), &mut rng);
            let collapsed = r.current_a.iter().filter(|c| **c < 5.0).count();
            assert_eq!(collapsed, 1);
            assert!(r.torque_nm < MOTOR_NOMINAL.torque_nm);
        }
    }

    #[test]
    fn test_bearing_wear_amplifies_hf_vibration() {
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..100 {
            let r = sample(&MOTOR_NOMINAL, Some(FaultKind::BearingWear), &mut rng);
            assert!(r.vibration_hf_rms_mm_s > MOTOR_NOMINAL.vibration_hf_rms_mm_s + 0.03);
            assert!(r.bearing_temp_c > MOTOR_NOMINAL.bearing_temp_c + 1.0);
        }
    }

    #[test]
    fn test_imbalance_skews_phases() {
        let mut rng = StdRng::seed_from_u64(17);
        for _ in 0..100 {
            let r = sample(&MOTOR_NOMINAL, Some(FaultKind::Imbalance), &mut rng);
            assert!(r.current_a[0] > r.current_a[2]);
        }
    }

    #[test]
    fn test_foreign_fault_is_noop() {
        let mut a = StdRng::seed_from_u64(3);
        let mut b = StdRng::seed_from_u64(3);
        let healthy = sample(&MOTOR_NOMINAL, None, &mut a);
        let stiction = sample(&MOTOR_NOMINAL, Some(FaultKind::Stiction), &mut b);
        assert_eq!(healthy, stiction);
    }
}
