//! Snapshot publishing with stage-then-rename.
//!
//! Every publish writes the full window to a temporary file in the target
//! directory, syncs it, and renames it over the published path. Readers see
//! either the previous snapshot or the new one, never a partial file. On
//! failure the staged file is discarded and the previous snapshot stays.

use crate::error::{Result, SimError};
use crate::fleet::{AssetIdentity, AssetKind, AssetRuntimeState};
use crate::record::MeasurementRecord;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Publishes per-asset CSV snapshots under one directory.
#[derive(Debug, Clone)]
pub struct SnapshotWriter {
    dir: PathBuf,
}

impl SnapshotWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Published location of an asset's snapshot.
    pub fn path_for(&self, identity: &AssetIdentity) -> PathBuf {
        self.dir.join(format!("{}.csv", identity.file_stem()))
    }

    /// Replaces the asset's published snapshot with `records`.
    ///
    /// Returns the number of data rows written.
    pub fn write(&self, identity: &AssetIdentity, records: &[MeasurementRecord]) -> Result<usize> {
        let target = self.path_for(identity);
        publish_atomically(&self.dir, &target, |file| {
            write_csv(file, identity.kind, records)
        })?;
        Ok(records.len())
    }
}

fn write_csv(file: &mut NamedTempFile, kind: AssetKind, records: &[MeasurementRecord]) -> Result<()> {
    let mut csv = csv::Writer::from_writer(file);
    csv.write_record(kind.schema())?;
    for record in records {
        csv.write_record(record.to_row())?;
    }
    csv.flush()?;
    Ok(())
}

/// Stages content produced by `fill` next to `target` and renames it into
/// place once it is durable.
fn publish_atomically<F>(dir: &Path, target: &Path, fill: F) -> Result<()>
where
    F: FnOnce(&mut NamedTempFile) -> Result<()>,
{
    let mut staged = NamedTempFile::new_in(dir)?;
    fill(&mut staged)?;
    staged.flush()?;
    staged.as_file().sync_all()?;
    staged.persist(target).map_err(|e| SimError::Persist {
        path: target.to_path_buf(),
        source: e.error,
    })?;
    Ok(())
}

/// One asset's entry in the fleet status document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetStatus {
    pub asset_id: String,
    pub asset_type: AssetKind,
    /// Active fault, if any
    pub fault: Option<String>,
    /// Simulated second at which the active fault ends
    pub fault_ends_at_s: Option<f64>,
    pub energy_kwh: f64,
}

/// Fleet-wide fault overview published alongside the snapshots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FleetStatus {
    pub published_at: DateTime<Utc>,
    pub tick: u64,
    pub sim_time_s: f64,
    pub active_faults: usize,
    pub assets: Vec<AssetStatus>,
}

impl FleetStatus {
    pub fn collect(
        fleet: &[AssetRuntimeState],
        tick: u64,
        sim_time_s: f64,
        published_at: DateTime<Utc>,
    ) -> Self {
        let assets: Vec<AssetStatus> = fleet
            .iter()
            .map(|asset| AssetStatus {
                asset_id: asset.identity.id.clone(),
                asset_type: asset.kind(),
                fault: asset.fault().kind().map(|k| k.as_str().to_string()),
                fault_ends_at_s: asset.fault().end_time(),
                energy_kwh: asset.cumulative_energy_kwh(),
            })
            .collect();
        let active_faults = assets.iter().filter(|a| a.fault.is_some()).count();

        Self {
            published_at,
            tick,
            sim_time_s,
            active_faults,
            assets,
        }
    }

    /// Publishes the document as JSON at `path`, same discipline as the
    /// snapshots.
    pub fn write_to(&self, path: &Path) -> Result<()> {
        let dir = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        publish_atomically(dir, path, |file| {
            serde_json::to_writer_pretty(&mut *file, self)?;
            Ok(())
        })
    }
}
