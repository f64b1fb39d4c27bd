// SPDX-License-Identifier: MIT
//! Artifact writer.
//!
//! Artifacts are rendered in memory, staged in a temporary directory inside the
//! output location, and only then installed by an ordered list of file operations:
//! every stale generated file is retired into the staging area, then every staged
//! file is renamed into place. A failing operation undoes the ones already applied,
//! so the output location holds either the previous artifact set or the new one.
//!
//! A write holds the install guard from staging until its staging directory is gone.
//! Sweeping staging directories takes the same guard, so an interrupt handler waits
//! for the write to finish or roll back instead of deleting retired files mid-install.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{debug, info, warn};

use airdrop_types::constants::{
    parse_shard_file_name, shard_file_name, ADDRESS_FILE, CLAIMS_FILE, PARAMETERS_FILE,
    ROOT_FILE, STAGING_PREFIX,
};
use airdrop_types::error::PlanError;
use airdrop_types::settings::ShardLimits;
use airdrop_types::types::ClaimProofEntry;

use crate::pipeline::PreparedRun;

static INSTALL_LOCK: Mutex<()> = Mutex::new(());

/// Serializes artifact installs against staging sweeps.
pub fn install_guard() -> MutexGuard<'static, ()> {
    INSTALL_LOCK.lock().unwrap_or_else(PoisonError::into_inner)
}

/// One output file, fully rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub name: String,
    pub bytes: Vec<u8>,
}

fn pretty<T: Serialize + ?Sized>(name: &str, value: &T) -> Result<Artifact> {
    let mut bytes = serde_json::to_vec_pretty(value)
        .with_context(|| format!("failed to serialize {name}"))?;
    bytes.push(b'\n');
    Ok(Artifact {
        name: name.to_string(),
        bytes,
    })
}

/// Split `entries` into contiguous shards.
///
/// A shard holds at most `max_items` entries and, serialized as a compact JSON array,
/// at most `max_bytes` bytes. An entry that alone exceeds `max_bytes` gets its own shard.
pub fn shard_entries(
    entries: &[ClaimProofEntry],
    limits: ShardLimits,
) -> Result<Vec<&[ClaimProofEntry]>> {
    let mut shards = Vec::new();
    let mut start = 0;
    // "[" + "]"
    let mut size = 2;

    for (i, entry) in entries.iter().enumerate() {
        let entry_len = serde_json::to_vec(entry)
            .context("failed to serialize claim entry")?
            .len();
        let count = i - start;
        if count > 0 {
            let grown = size + 1 + entry_len;
            if count == limits.max_items || grown > limits.max_bytes {
                shards.push(&entries[start..i]);
                start = i;
                size = 2 + entry_len;
                continue;
            }
            size = grown;
        } else {
            size += entry_len;
        }
    }
    if start < entries.len() {
        shards.push(&entries[start..]);
    }
    Ok(shards)
}

/// Render every artifact of a verified run, in install order.
pub fn render_artifacts(run: &PreparedRun) -> Result<Vec<Artifact>> {
    let entries = &run.commitment.entries;
    let mut artifacts = vec![
        pretty(ADDRESS_FILE, &run.parameters.address.to_checksum(None))?,
        pretty(ROOT_FILE, &run.commitment.root)?,
        pretty(CLAIMS_FILE, entries)?,
    ];

    for (index, shard) in shard_entries(entries, run.shard_limits)?
        .into_iter()
        .enumerate()
    {
        let name = shard_file_name(index);
        let bytes =
            serde_json::to_vec(shard).with_context(|| format!("failed to serialize {name}"))?;
        artifacts.push(Artifact { name, bytes });
    }

    artifacts.push(pretty(PARAMETERS_FILE, &run.parameters)?);
    Ok(artifacts)
}

fn is_generated(name: &str) -> bool {
    matches!(name, ADDRESS_FILE | ROOT_FILE | CLAIMS_FILE | PARAMETERS_FILE)
        || parse_shard_file_name(name).is_some()
}

/// Generated files currently present in `out_dir`, sorted.
pub fn generated_files(out_dir: &Path) -> Result<Vec<PathBuf>> {
    if !out_dir.exists() {
        return Ok(Vec::new());
    }
    let mut found = Vec::new();
    for entry in std::fs::read_dir(out_dir).map_err(|e| PlanError::io(out_dir, e))? {
        let entry = entry.map_err(|e| PlanError::io(out_dir, e))?;
        let path = entry.path();
        let generated = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(is_generated);
        if generated && path.is_file() {
            found.push(path);
        }
    }
    found.sort();
    Ok(found)
}

/// A single reversible step of the install plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOp {
    /// Move an existing generated file out of the way.
    Retire { path: PathBuf },
    /// Rename a staged file into its final location.
    Install { staged: PathBuf, dest: PathBuf },
}

enum Applied {
    Retired { original: PathBuf, backup: PathBuf },
    Installed { dest: PathBuf },
}

/// Retire every stale generated file, then install every staged artifact in order.
fn plan_operations(
    out_dir: &Path,
    staging_dir: &Path,
    artifacts: &[Artifact],
) -> Result<Vec<FileOp>> {
    let mut ops: Vec<FileOp> = generated_files(out_dir)?
        .into_iter()
        .map(|path| FileOp::Retire { path })
        .collect();
    ops.extend(artifacts.iter().map(|artifact| FileOp::Install {
        staged: staging_dir.join(&artifact.name),
        dest: out_dir.join(&artifact.name),
    }));
    Ok(ops)
}

fn apply(op: &FileOp, backup_dir: &Path) -> Result<Applied, PlanError> {
    match op {
        FileOp::Retire { path } => {
            let name = path.file_name().unwrap_or_default();
            let backup = backup_dir.join(name);
            std::fs::rename(path, &backup).map_err(|e| PlanError::io(path, e))?;
            debug!(path = %path.display(), "Retired stale artifact");
            Ok(Applied::Retired {
                original: path.clone(),
                backup,
            })
        }
        FileOp::Install { staged, dest } => {
            std::fs::rename(staged, dest).map_err(|e| PlanError::io(dest, e))?;
            debug!(path = %dest.display(), "Installed artifact");
            Ok(Applied::Installed { dest: dest.clone() })
        }
    }
}

fn rollback(applied: Vec<Applied>) {
    for step in applied.into_iter().rev() {
        match step {
            Applied::Installed { dest } => {
                if let Err(e) = std::fs::remove_file(&dest) {
                    warn!(path = %dest.display(), error = %e, "Rollback could not remove installed file");
                }
            }
            Applied::Retired { original, backup } => {
                if let Err(e) = std::fs::rename(&backup, &original) {
                    warn!(path = %original.display(), error = %e, "Rollback could not restore retired file");
                }
            }
        }
    }
}

/// Apply `ops` in order. On the first failure, undo what was applied and fail.
fn execute(ops: &[FileOp], backup_dir: &Path) -> Result<(), PlanError> {
    let mut applied = Vec::with_capacity(ops.len());
    for op in ops {
        match apply(op, backup_dir) {
            Ok(step) => applied.push(step),
            Err(e) => {
                warn!(error = %e, undo = applied.len(), "Artifact install failed; rolling back");
                rollback(applied);
                return Err(e);
            }
        }
    }
    Ok(())
}

/// What a completed write did to the output location.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteSummary {
    pub installed: Vec<PathBuf>,
    pub retired: Vec<PathBuf>,
}

/// Replace the generated artifact set in `out_dir` with `artifacts`.
pub fn write_artifacts(out_dir: &Path, artifacts: &[Artifact]) -> Result<WriteSummary> {
    std::fs::create_dir_all(out_dir).map_err(|e| PlanError::io(out_dir, e))?;

    // Declared before `staging` so the staging directory is removed while still held.
    let _guard = install_guard();
    let staging = tempfile::Builder::new()
        .prefix(STAGING_PREFIX)
        .tempdir_in(out_dir)
        .map_err(|e| PlanError::io(out_dir, e))?;
    for artifact in artifacts {
        let path = staging.path().join(&artifact.name);
        std::fs::write(&path, &artifact.bytes).map_err(|e| PlanError::io(&path, e))?;
    }
    let backup_dir = staging.path().join("retired");
    std::fs::create_dir(&backup_dir).map_err(|e| PlanError::io(&backup_dir, e))?;

    let ops = plan_operations(out_dir, staging.path(), artifacts)?;
    execute(&ops, &backup_dir)?;

    let mut summary = WriteSummary::default();
    for op in ops {
        match op {
            FileOp::Retire { path } => summary.retired.push(path),
            FileOp::Install { dest, .. } => summary.installed.push(dest),
        }
    }
    info!(
        out_dir = %out_dir.display(),
        installed = summary.installed.len(),
        retired = summary.retired.len(),
        "Artifacts written"
    );
    Ok(summary)
}

/// Remove leftover staging directories (e.g. after an interrupted run).
///
/// Blocks while a write is installing.
pub fn remove_staging_dirs(out_dir: &Path) -> usize {
    let _guard = install_guard();
    let Ok(entries) = std::fs::read_dir(out_dir) else {
        return 0;
    };
    let mut removed = 0;
    for entry in entries.flatten() {
        let path = entry.path();
        let staging = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with(STAGING_PREFIX));
        if staging && path.is_dir() && std::fs::remove_dir_all(&path).is_ok() {
            removed += 1;
        }
    }
    removed
}

/// Delete every generated artifact and staging directory in `out_dir`.
pub fn clean_artifacts(out_dir: &Path) -> Result<Vec<PathBuf>> {
    let files = generated_files(out_dir)?;
    for path in &files {
        std::fs::remove_file(path).map_err(|e| PlanError::io(path, e))?;
    }
    remove_staging_dirs(out_dir);
    Ok(files)
}
