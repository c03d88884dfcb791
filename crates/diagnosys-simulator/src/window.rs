//! Fixed-capacity sliding window of measurement records.

use crate::record::MeasurementRecord;
use std::collections::VecDeque;

/// Insertion-ordered ring of the most recent records of one asset.
///
/// Capacity is fixed at construction. Pushing into a full window evicts the
/// oldest record.
#[derive(Debug, Clone)]
pub struct SlidingWindow {
    capacity: usize,
    records: VecDeque<MeasurementRecord>,
}

impl SlidingWindow {
    /// Creates an empty window. A zero capacity is raised to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            records: VecDeque::with_capacity(capacity),
        }
    }

    /// Appends a record, returning the evicted one if the window was full.
    pub fn push(&mut self, record: MeasurementRecord) -> Option<MeasurementRecord> {
        let evicted = if self.records.len() == self.capacity {
            self.records.pop_front()
        } else {
            None
        };
        self.records.push_back(record);
        evicted
    }

    /// Copies the current contents, oldest first.
    pub fn snapshot(&self) -> Vec<MeasurementRecord> {
        self.records.iter().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &MeasurementRecord> {
        self.records.iter()
    }

    pub fn latest(&self) -> Option<&MeasurementRecord> {
        self.records.back()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.records.len() == self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::ValveRecord;
    use chrono::{Duration, TimeZone, Utc};

    fn record(seq: i64) -> MeasurementRecord {
        let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        MeasurementRecord::Valve(ValveRecord {
            timestamp: base + Duration::seconds(seq),
            command_pct: seq as f64,
            position_pct: 0.0,
            position_error_pct: 0.0,
            travel_time_ms: 0.0,
            diff_pressure_bar: 0.0,
            valve_flow_m3h: 0.0,
            stem_torque_nm: 0.0,
            leakage_lph: 0.0,
            supply_air_bar: 0.0,
            ambient_temp_c: 0.0,
            noise_db: 0.0,
        })
    }

    fn seq(r: &MeasurementRecord) -> i64 {
        match r {
            MeasurementRecord::Valve(v) => v.command_pct as i64,
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_window_fills_to_capacity() {
        let mut window = SlidingWindow::new(5);
        for i in 0..5 {
            assert!(window.push(record(i)).is_none());
            assert_eq!(window.len(), i as usize + 1);
        }
        assert!(window.is_full());
    }

    #[test]
    fn test_window_evicts_oldest() {
        let mut window = SlidingWindow::new(3);
        for i in 0..3 {
            window.push(record(i));
        }
        for i in 3..20 {
            let evicted = window.push(record(i)).unwrap();
            assert_eq!(seq(&evicted), i - 3);
            assert_eq!(window.len(), 3);
        }
        let contents: Vec<i64> = window.snapshot().iter().map(seq).collect();
        assert_eq!(contents, vec![17, 18, 19]);
        assert_eq!(seq(window.latest().unwrap()), 19);
    }

    #[test]
    fn test_snapshot_does_not_mutate() {
        let mut window = SlidingWindow::new(4);
        window.push(record(1));
        window.push(record(2));
        let snap = window.snapshot();
        window.push(record(3));
        assert_eq!(snap.len(), 2);
        assert_eq!(window.len(), 3);
        assert_eq!(window.iter().map(seq).collect::<Vec<_>>(), vec![1, 2, 3]);
    }

    #[test]
    fn test_zero_capacity_is_raised() {
        let mut window = SlidingWindow::new(0);
        assert_eq!(window.capacity(), 1);
        assert!(window.is_empty());
        window.push(record(1));
        window.push(record(2));
        assert_eq!(window.len(), 1);
    }
}
