//! Append-only operation log backing a durable collection.
//!
//! Frame layout: `[len: u32 LE][crc32: u32 LE][payload]`, payload is a bincode (serde mode)
//! encoded [`WalRecord`]. Record bodies travel as canonical extended JSON so that BSON types
//! survive replay unchanged.

use crate::errors::AppError;
use crate::types::RecordId;
use bincode::config::standard;
use bincode::serde::{decode_from_slice, encode_to_vec};
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

const HEADER_LEN: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum WalOp {
    Insert { id: RecordId, created_ms: i64, updated_ms: i64, body_json: Vec<u8> },
    Delete { id: RecordId },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalRecord {
    pub op: WalOp,
    pub ts_ms: i64,
}

impl WalRecord {
    #[must_use]
    pub fn now(op: WalOp) -> Self {
        Self { op, ts_ms: chrono::Utc::now().timestamp_millis() }
    }
}

pub struct Wal {
    path: PathBuf,
    file: File,
}

impl std::fmt::Debug for Wal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Wal").field("path", &self.path).finish_non_exhaustive()
    }
}

impl Wal {
    /// Opens (or creates) the log at `path` for appending.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, AppError> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self { path, file })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends one record and flushes it to disk.
    pub fn append(&mut self, rec: &WalRecord) -> Result<(), AppError> {
        self.append_batch(std::slice::from_ref(rec))
    }

    /// Appends several records with a single sync at the end.
    pub fn append_batch(&mut self, recs: &[WalRecord]) -> Result<(), AppError> {
        let mut buf = Vec::new();
        for rec in recs {
            encode_frame(rec, &mut buf)?;
        }
        self.file.write_all(&buf)?;
        self.file.sync_data()?;
        Ok(())
    }

    /// Drops every record in the log.
    pub fn truncate(&mut self) -> Result<(), AppError> {
        self.file.set_len(0)?;
        self.file.sync_data()?;
        Ok(())
    }

    /// Reads every complete record in the log at `path`.
    ///
    /// A torn final frame (from a crash mid-append) ends the replay with a warning;
    /// a checksum mismatch on a complete frame is reported as corruption.
    pub fn read_all<P: AsRef<Path>>(path: P) -> Result<Vec<WalRecord>, AppError> {
        Ok(scan(path.as_ref())?.0)
    }

    /// Replays the log at `path`, cuts off a torn tail, then opens it for appending.
    ///
    /// New frames must follow the last complete one, or the next replay would stop at the
    /// leftover bytes and drop them.
    pub fn recover<P: AsRef<Path>>(path: P) -> Result<(Self, Vec<WalRecord>), AppError> {
        let path = path.as_ref();
        let (records, valid_len) = scan(path)?;
        if path.exists() {
            let file = OpenOptions::new().write(true).open(path)?;
            let len = file.metadata()?.len();
            if len > valid_len {
                log::warn!("wal {}: dropping {} torn bytes", path.display(), len - valid_len);
                file.set_len(valid_len)?;
                file.sync_data()?;
            }
        }
        Ok((Self::open(path)?, records))
    }
}

/// Complete records and the byte length they span.
fn scan(path: &Path) -> Result<(Vec<WalRecord>, u64), AppError> {
    if !path.exists() {
        return Ok((Vec::new(), 0));
    }
    let mut buf = Vec::new();
    File::open(path)?.read_to_end(&mut buf)?;
    let mut out = Vec::new();
    let mut offset = 0usize;
    while offset < buf.len() {
        if offset + HEADER_LEN > buf.len() {
            log::warn!("wal {}: torn header at offset {offset}", path.display());
            break;
        }
        let len = u32::from_le_bytes([buf[offset], buf[offset + 1], buf[offset + 2], buf[offset + 3]])
            as usize;
        let crc = u32::from_le_bytes([
            buf[offset + 4],
            buf[offset + 5],
            buf[offset + 6],
            buf[offset + 7],
        ]);
        let start = offset + HEADER_LEN;
        let Some(end) = start.checked_add(len).filter(|e| *e <= buf.len()) else {
            log::warn!("wal {}: torn frame at offset {offset}", path.display());
            break;
        };
        let payload = &buf[start..end];
        if crc32fast::hash(payload) != crc {
            return Err(AppError::WalCorrupt {
                offset: offset as u64,
                reason: "checksum mismatch".into(),
            });
        }
        let (rec, _) = decode_from_slice::<WalRecord, _>(payload, standard())?;
        out.push(rec);
        offset = end;
    }
    Ok((out, offset as u64))
}

fn encode_frame(rec: &WalRecord, out: &mut Vec<u8>) -> Result<(), AppError> {
    let payload = encode_to_vec(rec, standard())?;
    let len = u32::try_from(payload.len())
        .map_err(|_| AppError::Storage(format!("wal record too large: {} bytes", payload.len())))?;
    out.extend_from_slice(&len.to_le_bytes());
    out.extend_from_slice(&crc32fast::hash(&payload).to_le_bytes());
    out.extend_from_slice(&payload);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn insert_rec(body: &str) -> WalRecord {
        WalRecord::now(WalOp::Insert {
            id: RecordId::new(),
            created_ms: 1,
            updated_ms: 2,
            body_json: body.as_bytes().to_vec(),
        })
    }

    #[test]
    fn append_then_replay_preserves_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("v.wal");
        let a = insert_rec("{\"a\":1}");
        let b = WalRecord::now(WalOp::Delete { id: RecordId::new() });
        {
            let mut wal = Wal::open(&path).unwrap();
            wal.append(&a).unwrap();
            wal.append(&b).unwrap();
        }
        let recs = Wal::read_all(&path).unwrap();
        assert_eq!(recs, vec![a, b]);
    }

    #[test]
    fn torn_tail_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("v.wal");
        let a = insert_rec("{}");
        Wal::open(&path).unwrap().append(&a).unwrap();
        let mut f = OpenOptions::new().append(true).open(&path).unwrap();
        f.write_all(&[9, 0, 0, 0, 1]).unwrap();
        assert_eq!(Wal::read_all(&path).unwrap(), vec![a]);
    }

    #[test]
    fn recover_cuts_the_torn_tail_before_appending() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("v.wal");
        let a = insert_rec("{}");
        Wal::open(&path).unwrap().append(&a).unwrap();
        let good_len = std::fs::metadata(&path).unwrap().len();
        let mut f = OpenOptions::new().append(true).open(&path).unwrap();
        f.write_all(&[200, 0, 0, 0, 1, 2]).unwrap();
        drop(f);

        let (mut wal, recs) = Wal::recover(&path).unwrap();
        assert_eq!(recs, vec![a.clone()]);
        assert_eq!(std::fs::metadata(&path).unwrap().len(), good_len);
        let b = insert_rec("{\"b\":2}");
        wal.append(&b).unwrap();
        assert_eq!(Wal::read_all(&path).unwrap(), vec![a, b]);
    }

    #[test]
    fn flipped_byte_is_reported_as_corruption() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("v.wal");
        Wal::open(&path).unwrap().append(&insert_rec("{\"k\":\"v\"}")).unwrap();
        let mut bytes = std::fs::read(&path).unwrap();
        let last = bytes.len() - 1;
        bytes[last] ^= 0xFF;
        std::fs::write(&path, bytes).unwrap();
        assert!(matches!(Wal::read_all(&path), Err(AppError::WalCorrupt { offset: 0, .. })));
    }

    #[test]
    fn truncate_empties_the_log() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("v.wal");
        let mut wal = Wal::open(&path).unwrap();
        wal.append(&insert_rec("{}")).unwrap();
        wal.truncate().unwrap();
        wal.append(&insert_rec("{\"after\":true}")).unwrap();
        assert_eq!(Wal::read_all(&path).unwrap().len(), 1);
    }
}
