//! Disk persistence for [`MemoryStore`] using bincode serialization.
//!
//! A store is serialized to `<table>.hss` as
//! `[bincode payload][magic "HSS1"][u32 CRC32 BE]`. Writes go to a temp file
//! that is renamed into place, so a crash never leaves a half-written snapshot.

use super::memory::{MemoryStore, StoreData};
use crate::config::SNAPSHOT_EXTENSION;
use crate::error::{Error, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Magic bytes written before the CRC32 footer.
const SNAPSHOT_MAGIC: &[u8; 4] = b"HSS1";

const FOOTER_LEN: usize = 8;

/// Snapshot file for `table` inside `dir`.
pub fn snapshot_path(dir: &Path, table: &str) -> PathBuf {
    dir.join(format!("{}.{}", table, SNAPSHOT_EXTENSION))
}

/// Save a store to `dir`, returning the snapshot path.
///
/// The store must have a schema; its table name names the file.
pub fn save_store(store: &MemoryStore, dir: &Path) -> Result<PathBuf> {
    let data = store.data.read();
    let table = data
        .schema
        .as_ref()
        .map(|s| s.table.clone())
        .ok_or(Error::SchemaMissing)?;
    let bytes = bincode::serialize(&*data).map_err(|e| Error::Snapshot(e.to_string()))?;
    let crc = crc32fast::hash(&bytes);

    fs::create_dir_all(dir)?;
    let path = snapshot_path(dir, &table);
    let tmp_path = path.with_extension(format!("{}.tmp", SNAPSHOT_EXTENSION));

    let mut output = Vec::with_capacity(bytes.len() + FOOTER_LEN);
    output.extend_from_slice(&bytes);
    output.extend_from_slice(SNAPSHOT_MAGIC);
    output.extend_from_slice(&crc.to_be_bytes());

    fs::write(&tmp_path, &output)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(&tmp_path, fs::Permissions::from_mode(0o600))?;
    }
    fs::rename(&tmp_path, &path)?;

    tracing::info!(
        "Saved store '{}' ({} documents, {} bytes, CRC32={:#010x})",
        table,
        data.documents.len(),
        bytes.len(),
        crc
    );
    Ok(path)
}

/// Load a store snapshot, verifying its CRC32 footer and internal consistency.
pub fn load_store(path: &Path) -> Result<MemoryStore> {
    let raw = fs::read(path)?;
    if raw.len() < FOOTER_LEN || &raw[raw.len() - 8..raw.len() - 4] != SNAPSHOT_MAGIC {
        return Err(Error::Snapshot(format!(
            "{:?} is truncated or not a store snapshot",
            path
        )));
    }

    let payload = &raw[..raw.len() - FOOTER_LEN];
    let stored_crc = u32::from_be_bytes([
        raw[raw.len() - 4],
        raw[raw.len() - 3],
        raw[raw.len() - 2],
        raw[raw.len() - 1],
    ]);
    let computed_crc = crc32fast::hash(payload);
    if computed_crc != stored_crc {
        return Err(Error::Snapshot(format!(
            "CRC32 mismatch: expected {:#010x}, got {:#010x}. File may be corrupted: {:?}",
            stored_crc, computed_crc, path
        )));
    }
    tracing::debug!("Snapshot CRC32 verified: {:#010x}", stored_crc);

    let data: StoreData =
        bincode::deserialize(payload).map_err(|e| Error::Snapshot(e.to_string()))?;
    data.validate()
        .map_err(|e| Error::Snapshot(format!("validation failed: {}", e)))?;

    tracing::info!(
        "Loaded store '{}' ({} documents)",
        data.schema.as_ref().map(|s| s.table.as_str()).unwrap_or_default(),
        data.documents.len()
    );
    Ok(MemoryStore::from_data(data))
}
