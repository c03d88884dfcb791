//! Measurement records, one fixed schema per asset kind.
//!
//! Every schema starts with `timestamp`; the remaining columns are numeric
//! and [`MeasurementRecord::values`] yields them in header order.

use crate::fleet::AssetKind;
use chrono::{DateTime, SecondsFormat, Utc};

/// Column header for motor snapshots.
pub const MOTOR_FIELDS: &[&str] = &[
    "timestamp",
    "current_A_L1",
    "current_A_L2",
    "current_A_L3",
    "voltage_V",
    "power_factor",
    "apparent_power_kVA",
    "real_power_kW",
    "reactive_power_kVAR",
    "energy_kWh",
    "THD_I_pct",
    "vibration_rms_mm_s",
    "vibration_hf_rms_mm_s",
    "vibration_kurtosis",
    "bearing_temp_C",
    "stator_temp_C",
    "ambient_temp_C",
    "noise_dB",
    "speed_rpm",
    "torque_Nm",
];

/// Column header for pump snapshots: the drive columns plus hydraulics.
pub const PUMP_FIELDS: &[&str] = &[
    "timestamp",
    "current_A_L1",
    "current_A_L2",
    "current_A_L3",
    "voltage_V",
    "power_factor",
    "apparent_power_kVA",
    "real_power_kW",
    "reactive_power_kVAR",
    "energy_kWh",
    "THD_I_pct",
    "vibration_rms_mm_s",
    "vibration_hf_rms_mm_s",
    "vibration_kurtosis",
    "bearing_temp_C",
    "stator_temp_C",
    "ambient_temp_C",
    "noise_dB",
    "speed_rpm",
    "torque_Nm",
    "suction_pressure_bar",
    "discharge_pressure_bar",
    "diff_pressure_bar",
    "flow_m3h",
    "npsh_available_m",
    "cavitation_index",
];

/// Column header for valve snapshots.
pub const VALVE_FIELDS: &[&str] = &[
    "timestamp",
    "command_pct",
    "position_pct",
    "position_error_pct",
    "travel_time_ms",
    "diff_pressure_bar",
    "valve_flow_m3h",
    "stem_torque_Nm",
    "leakage_lph",
    "supply_air_bar",
    "ambient_temp_C",
    "noise_dB",
];

/// Electrical and mechanical readings shared by motors and pumps.
#[derive(Debug, Clone, PartialEq)]
pub struct DriveReadings {
    pub current_a: [f64; 3],
    pub voltage_v: f64,
    pub power_factor: f64,
    pub apparent_power_kva: f64,
    pub real_power_kw: f64,
    pub reactive_power_kvar: f64,
    pub energy_kwh: f64,
    pub thd_i_pct: f64,
    pub vibration_rms_mm_s: f64,
    pub vibration_hf_rms_mm_s: f64,
    pub vibration_kurtosis: f64,
    pub bearing_temp_c: f64,
    pub stator_temp_c: f64,
    pub ambient_temp_c: f64,
    pub noise_db: f64,
    pub speed_rpm: f64,
    pub torque_nm: f64,
}

impl DriveReadings {
    /// Mean of the three phase currents.
    pub fn mean_current(&self) -> f64 {
        self.current_a.iter().sum::<f64>() / 3.0
    }

    fn extend_values(&self, out: &mut Vec<f64>) {
        out.extend_from_slice(&self.current_a);
        out.extend_from_slice(&[
            self.voltage_v,
            self.power_factor,
            self.apparent_power_kva,
            self.real_power_kw,
            self.reactive_power_kvar,
            self.energy_kwh,
            self.thd_i_pct,
            self.vibration_rms_mm_s,
            self.vibration_hf_rms_mm_s,
            self.vibration_kurtosis,
            self.bearing_temp_c,
            self.stator_temp_c,
            self.ambient_temp_c,
            self.noise_db,
            self.speed_rpm,
            self.torque_nm,
        ]);
    }
}

/// Pump-only hydraulic readings.
#[derive(Debug, Clone, PartialEq)]
pub struct PumpHydraulics {
    pub suction_pressure_bar: f64,
    pub discharge_pressure_bar: f64,
    pub diff_pressure_bar: f64,
    pub flow_m3h: f64,
    pub npsh_available_m: f64,
    pub cavitation_index: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MotorRecord {
    pub timestamp: DateTime<Utc>,
    pub drive: DriveReadings,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PumpRecord {
    pub timestamp: DateTime<Utc>,
    pub drive: DriveReadings,
    pub hydraulics: PumpHydraulics,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValveRecord {
    pub timestamp: DateTime<Utc>,
    pub command_pct: f64,
    pub position_pct: f64,
    pub position_error_pct: f64,
    pub travel_time_ms: f64,
    pub diff_pressure_bar: f64,
    pub valve_flow_m3h: f64,
    pub stem_torque_nm: f64,
    pub leakage_lph: f64,
    pub supply_air_bar: f64,
    pub ambient_temp_c: f64,
    pub noise_db: f64,
}

/// One sample of one asset. Immutable once produced.
#[derive(Debug, Clone, PartialEq)]
pub enum MeasurementRecord {
    Motor(MotorRecord),
    Pump(PumpRecord),
    Valve(ValveRecord),
}

impl MeasurementRecord {
    pub fn kind(&self) -> AssetKind {
        match self {
            MeasurementRecord::Motor(_) => AssetKind::Motor,
            MeasurementRecord::Pump(_) => AssetKind::Pump,
            MeasurementRecord::Valve(_) => AssetKind::Valve,
        }
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            MeasurementRecord::Motor(r) => r.timestamp,
            MeasurementRecord::Pump(r) => r.timestamp,
            MeasurementRecord::Valve(r) => r.timestamp,
        }
    }

    /// Drive readings, for the kinds that have a motor.
    pub fn drive(&self) -> Option<&DriveReadings> {
        match self {
            MeasurementRecord::Motor(r) => Some(&r.drive),
            MeasurementRecord::Pump(r) => Some(&r.drive),
            MeasurementRecord::Valve(_) => None,
        }
    }

    /// Numeric columns in header order, without the timestamp.
    pub fn values(&self) -> Vec<f64> {
        let mut out = Vec::with_capacity(self.kind().schema().len() - 1);
        match self {
            MeasurementRecord::Motor(r) => r.drive.extend_values(&mut out),
            MeasurementRecord::Pump(r) => {
                r.drive.extend_values(&mut out);
                let h = &r.hydraulics;
                out.extend_from_slice(&[
                    h.suction_pressure_bar,
                    h.discharge_pressure_bar,
                    h.diff_pressure_bar,
                    h.flow_m3h,
                    h.npsh_available_m,
                    h.cavitation_index,
                ]);
            }
            MeasurementRecord::Valve(r) => out.extend_from_slice(&[
                r.command_pct,
                r.position_pct,
                r.position_error_pct,
                r.travel_time_ms,
                r.diff_pressure_bar,
                r.valve_flow_m3h,
                r.stem_torque_nm,
                r.leakage_lph,
                r.supply_air_bar,
                r.ambient_temp_c,
                r.noise_db,
            ]),
        }
        out
    }

    /// Text cells for one snapshot row.
    pub fn to_row(&self) -> Vec<String> {
        let values = self.values();
        let mut row = Vec::with_capacity(values.len() + 1);
        row.push(self.timestamp().to_rfc3339_opts(SecondsFormat::Millis, true));
        row.extend(values.iter().map(|v| format!("{:.6}", v)));
        row
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn drive() -> DriveReadings {
        DriveReadings {
            current_a: [39.0, 40.0, 41.0],
            voltage_v: 400.0,
            power_factor: 0.86,
            apparent_power_kva: 27.7,
            real_power_kw: 23.8,
            reactive_power_kvar: 14.1,
            energy_kwh: 0.5,
            thd_i_pct: 5.0,
            vibration_rms_mm_s: 1.2,
            vibration_hf_rms_mm_s: 0.3,
            vibration_kurtosis: 3.0,
            bearing_temp_c: 55.0,
            stator_temp_c: 60.0,
            ambient_temp_c: 25.0,
            noise_db: 72.0,
            speed_rpm: 1480.0,
            torque_nm: 150.0,
        }
    }

    fn ts() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_values_match_schema_width() {
        let motor = MeasurementRecord::Motor(MotorRecord {
            timestamp: ts(),
            drive: drive(),
        });
        let pump = MeasurementRecord::Pump(PumpRecord {
            timestamp: ts(),
            drive: drive(),
            hydraulics: PumpHydraulics {
                suction_pressure_bar: 1.0,
                discharge_pressure_bar: 3.0,
                diff_pressure_bar: 2.0,
                flow_m3h: 50.0,
                npsh_available_m: 8.0,
                cavitation_index: 0.1,
            },
        });
        let valve = MeasurementRecord::Valve(ValveRecord {
            timestamp: ts(),
            command_pct: 50.0,
            position_pct: 49.0,
            position_error_pct: 1.0,
            travel_time_ms: 150.0,
            diff_pressure_bar: 1.5,
            valve_flow_m3h: 20.0,
            stem_torque_nm: 30.0,
            leakage_lph: 0.1,
            supply_air_bar: 6.0,
            ambient_temp_c: 25.0,
            noise_db: 65.0,
        });

        for record in [motor, pump, valve] {
            let schema = record.kind().schema();
            assert_eq!(schema[0], "timestamp");
            assert_eq!(record.values().len() + 1, schema.len());
            assert_eq!(record.to_row().len(), schema.len());
        }
    }

    #[test]
    fn test_row_formatting() {
        let record = MeasurementRecord::Motor(MotorRecord {
            timestamp: ts(),
            drive: drive(),
        });
        let row = record.to_row();
        assert_eq!(row[0], "2024-01-01T00:00:00.000Z");
        assert_eq!(row[1], "39.000000");
        let pf_col = MOTOR_FIELDS
            .iter()
            .position(|f| *f == "power_factor")
            .unwrap();
        assert_eq!(row[pf_col], "0.860000");
    }

    #[test]
    fn test_mean_current() {
        assert!((drive().mean_current() - 40.0).abs() < 1e-12);
    }
}
