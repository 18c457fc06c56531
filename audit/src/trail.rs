//! Append-only audit trail with hash chaining and size-based rotation.
//!
//! Adapted persistence discipline: one JSON record per line, each record
//! carrying the hash of its predecessor, rotation once the active file
//! crosses the configured size, oldest rotations pruned beyond the
//! retention count. There is deliberately no query API here — consuming
//! audit history is an external reporting concern; the only read path is
//! [`AuditTrail::verify_chain`], which exists for integrity checks.

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::error::{AuditError, Result};
use crate::record::{AuditRecord, GENESIS_HASH};

/// Configuration for the audit trail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditTrailConfig {
    /// Path to the active audit file.
    pub log_path: PathBuf,
    /// Maximum size of the active file before rotation (in MB).
    pub max_size_mb: u64,
    /// Number of rotated files to keep.
    pub max_rotations: u32,
}

impl Default for AuditTrailConfig {
    fn default() -> Self {
        Self {
            log_path: PathBuf::from("data/audit/audit.log"),
            max_size_mb: 100,
            max_rotations: 10,
        }
    }
}

/// The audit trail. One lock guards the whole append — rotation check,
/// predecessor hash, file write, hash update — so concurrent appends
/// chain strictly one after another. The authorization decision that
/// triggered an append is already final before the write is attempted,
/// so contention here never delays a decision outcome for other
/// requests.
///
/// Each active file carries its own chain starting from the genesis
/// hash; rotation closes the old chain with the file it moves aside.
pub struct AuditTrail {
    config: AuditTrailConfig,
    last_hash: Mutex<String>,
}

impl AuditTrail {
    /// Open (or create) the trail at the configured path, resuming the
    /// hash chain from the last existing record.
    pub fn new(config: AuditTrailConfig) -> Result<Self> {
        if let Some(parent) = config.log_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let last_hash = if config.log_path.exists() {
            Self::read_last_hash(&config.log_path)?
        } else {
            GENESIS_HASH.to_string()
        };

        Ok(Self {
            config,
            last_hash: Mutex::new(last_hash),
        })
    }

    /// Append one record built from the given fields.
    pub fn append_record(
        &self,
        principal_id: &str,
        action: &str,
        resource_type: &str,
        resource_id: Option<&str>,
        details: Option<&str>,
    ) -> Result<()> {
        let mut last_hash = self
            .last_hash
            .lock()
            .map_err(|_| AuditError::Trail("audit lock poisoned".to_string()))?;

        if self.rotate_if_needed()? {
            // The rotated file closed its chain; the new one starts fresh.
            *last_hash = GENESIS_HASH.to_string();
        }

        let record = AuditRecord::new(
            principal_id.to_string(),
            action.to_string(),
            resource_type.to_string(),
            resource_id.map(str::to_string),
            details.map(str::to_string),
            last_hash.clone(),
        );

        self.write_record(&record)?;
        *last_hash = record.entry_hash.clone();

        info!(
            action = %record.action,
            principal = %record.principal_id,
            resource = %record.resource_type,
            "audit record appended"
        );
        Ok(())
    }

    fn write_record(&self, record: &AuditRecord) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.config.log_path)?;

        let json = serde_json::to_string(record)?;
        writeln!(file, "{}", json)?;
        file.flush()?;

        Ok(())
    }

    fn rotate_if_needed(&self) -> Result<bool> {
        if !self.config.log_path.exists() {
            return Ok(false);
        }

        let metadata = std::fs::metadata(&self.config.log_path)?;
        let size_mb = metadata.len() / (1024 * 1024);

        if size_mb >= self.config.max_size_mb {
            self.rotate()?;
            return Ok(true);
        }

        Ok(false)
    }

    fn rotate(&self) -> Result<()> {
        let timestamp = Utc::now().format("%Y%m%d_%H%M%S");
        let rotated_path = self
            .config
            .log_path
            .with_extension(format!("{}.log", timestamp));

        std::fs::rename(&self.config.log_path, &rotated_path)?;
        info!("Rotated audit trail to: {:?}", rotated_path);

        self.cleanup_old_rotations()?;
        Ok(())
    }

    fn cleanup_old_rotations(&self) -> Result<()> {
        let Some(parent) = self.config.log_path.parent() else {
            return Ok(());
        };

        let base_name = self
            .config
            .log_path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("audit");
        let active_name = self
            .config
            .log_path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("audit.log")
            .to_string();

        let mut rotated: Vec<_> = std::fs::read_dir(parent)?
            .filter_map(|entry| entry.ok())
            .filter(|entry| {
                entry
                    .file_name()
                    .to_str()
                    .map(|name| name.starts_with(base_name) && name != active_name)
                    .unwrap_or(false)
            })
            .collect();

        rotated.sort_by_key(|entry| {
            entry
                .metadata()
                .and_then(|m| m.modified())
                .unwrap_or(std::time::SystemTime::UNIX_EPOCH)
        });

        while rotated.len() > self.config.max_rotations as usize {
            let old = rotated.remove(0);
            std::fs::remove_file(old.path())?;
            info!("Removed old audit rotation: {:?}", old.path());
        }

        Ok(())
    }

    fn read_last_hash(path: &Path) -> Result<String> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);

        let mut last_hash = GENESIS_HASH.to_string();
        for line in reader.lines().map_while(|r| r.ok()) {
            if let Ok(record) = serde_json::from_str::<AuditRecord>(&line) {
                last_hash = record.entry_hash;
            }
        }

        Ok(last_hash)
    }

    /// Walk the active file and verify every record's hash and the chain
    /// between consecutive records.
    pub fn verify_chain(&self) -> Result<bool> {
        if !self.config.log_path.exists() {
            return Ok(true);
        }

        let file = File::open(&self.config.log_path)?;
        let reader = BufReader::new(file);

        let mut expected_previous = GENESIS_HASH.to_string();
        let mut line_number = 0u64;

        for line in reader.lines() {
            line_number += 1;
            let line = line?;

            let record: AuditRecord = serde_json::from_str(&line).map_err(|e| {
                AuditError::Trail(format!("failed to parse line {}: {}", line_number, e))
            })?;

            if !record.verify_hash() {
                error!(
                    "audit hash verification failed at line {}: record_id={}",
                    line_number, record.id
                );
                return Ok(false);
            }

            if record.previous_hash != expected_previous {
                error!(
                    "audit chain broken at line {}: expected previous {}, got {}",
                    line_number, expected_previous, record.previous_hash
                );
                return Ok(false);
            }

            expected_previous = record.entry_hash;
        }

        info!("audit chain verified: {} records", line_number);
        Ok(true)
    }
}

impl authz::AuditSink for AuditTrail {
    fn append(
        &self,
        event: authz::AuditEvent,
    ) -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.append_record(
            &event.principal_id,
            &event.action,
            &event.resource_type,
            event.resource_id.as_deref(),
            event.details.as_deref(),
        )?;
        Ok(())
    }
}
