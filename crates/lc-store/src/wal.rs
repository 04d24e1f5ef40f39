//! Write-ahead log behind [`FileLedger`](crate::FileLedger).
//!
//! One frame per committed transaction:
//!
//! ```text
//! [4 bytes: magic "LCTX"]
//! [4 bytes: payload length, u32 LE]
//! [4 bytes: CRC32 over the length bytes and the payload, u32 LE]
//! [N bytes: bincode-encoded CommittedTx]
//! ```
//!
//! Opening the log recovers it. Every frame that verifies is kept. A damaged
//! frame between intact ones is skipped by resynchronizing on the next magic
//! marker that starts a verifiable frame. Whatever follows the last intact
//! frame is a torn tail and is cut off before the log accepts appends, so new
//! frames always start on a frame boundary.

use std::fs::{self, File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{StoreError, StoreResult};
use crate::record::CommittedTx;

/// Flush/sync strategy for the WAL.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncMode {
    /// `fsync` the data after every committed transaction.
    EveryWrite,
    /// Leave flushing to the OS page cache.
    #[default]
    OsDefault,
}

#[derive(Clone, Debug, Default)]
pub struct WalConfig {
    pub sync_mode: SyncMode,
}

const FRAME_MAGIC: [u8; 4] = *b"LCTX";
const FRAME_HEADER: usize = 12;
/// Upper bound on one transaction's encoded size; larger lengths are damage.
const MAX_FRAME_PAYLOAD: u32 = 64 * 1024 * 1024;

/// What opening the log found on disk.
#[derive(Debug, Default)]
pub struct Recovery {
    /// Intact transactions, in commit order.
    pub transactions: Vec<CommittedTx>,
    /// Damaged regions skipped between intact frames.
    pub skipped_regions: usize,
    /// Bytes cut from the end of the file.
    pub truncated_bytes: u64,
}

struct LogFile {
    file: File,
    /// End of the last intact frame; the next frame starts here.
    len: u64,
    /// A failed append could not be rolled back; cut the file before writing again.
    dirty: bool,
}

impl LogFile {
    fn write_frame(&mut self, frame: &[u8], sync_mode: SyncMode) -> StoreResult<()> {
        if self.dirty {
            self.rollback()?;
        }
        self.file.seek(SeekFrom::Start(self.len))?;
        self.file.write_all(frame)?;
        if sync_mode == SyncMode::EveryWrite {
            self.file.sync_data()?;
        }
        Ok(())
    }

    /// Drop anything written past the last intact frame.
    fn rollback(&mut self) -> StoreResult<()> {
        self.file.set_len(self.len)?;
        self.file.seek(SeekFrom::Start(self.len))?;
        self.dirty = false;
        Ok(())
    }
}

/// Append-only, self-healing log of committed transactions.
pub struct WriteAheadLog {
    path: PathBuf,
    log: Mutex<LogFile>,
    sync_mode: SyncMode,
}

impl WriteAheadLog {
    /// Open (or create) the log at `path` and recover its contents.
    ///
    /// A torn tail is truncated on disk before this returns.
    pub fn open(path: &Path, config: WalConfig) -> StoreResult<(Self, Recovery)> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(path)?;
        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes)?;

        let scan = scan(&bytes);
        let truncated_bytes = bytes.len() as u64 - scan.valid_len;
        if truncated_bytes > 0 {
            warn!(
                path = %path.display(),
                valid_len = scan.valid_len,
                truncated_bytes,
                "cutting torn WAL tail"
            );
            file.set_len(scan.valid_len)?;
            file.sync_all()?;
        }
        file.seek(SeekFrom::Start(scan.valid_len))?;

        let recovery = Recovery {
            transactions: scan.transactions,
            skipped_regions: scan.skipped_regions,
            truncated_bytes,
        };
        info!(
            path = %path.display(),
            transactions = recovery.transactions.len(),
            skipped = recovery.skipped_regions,
            truncated_bytes,
            "WAL recovered"
        );

        let wal = Self {
            path: path.to_path_buf(),
            log: Mutex::new(LogFile {
                file,
                len: scan.valid_len,
                dirty: false,
            }),
            sync_mode: config.sync_mode,
        };
        Ok((wal, recovery))
    }

    /// Append one committed transaction. Returns the byte offset of its frame.
    ///
    /// On failure nothing of the frame remains in the log.
    pub fn append(&self, tx: &CommittedTx) -> StoreResult<u64> {
        let frame = encode_frame(tx)?;
        let mut log = self
            .log
            .lock()
            .map_err(|_| StoreError::LockPoisoned("wal"))?;
        let start = log.len;

        if let Err(e) = log.write_frame(&frame, self.sync_mode) {
            if let Err(rollback) = log.rollback() {
                warn!(offset = start, error = %rollback, "WAL rollback failed; retrying before next append");
                log.dirty = true;
            }
            return Err(e);
        }
        log.len += frame.len() as u64;

        debug!(offset = start, len = frame.len(), tx_id = %tx.tx_id, "WAL append");
        Ok(start)
    }

    /// Length of the intact log in bytes.
    pub fn len(&self) -> StoreResult<u64> {
        self.log
            .lock()
            .map(|log| log.len)
            .map_err(|_| StoreError::LockPoisoned("wal"))
    }

    pub fn is_empty(&self) -> StoreResult<bool> {
        Ok(self.len()? == 0)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn encode_frame(tx: &CommittedTx) -> StoreResult<Vec<u8>> {
    let payload = bincode::serialize(tx).map_err(|e| StoreError::Serialization(e.to_string()))?;
    let length = u32::try_from(payload.len())
        .ok()
        .filter(|len| *len <= MAX_FRAME_PAYLOAD)
        .ok_or_else(|| {
            StoreError::Serialization(format!("transaction too large: {} bytes", payload.len()))
        })?;
    let length_bytes = length.to_le_bytes();

    let mut hasher = crc32fast::Hasher::new();
    hasher.update(&length_bytes);
    hasher.update(&payload);

    let mut frame = Vec::with_capacity(FRAME_HEADER + payload.len());
    frame.extend_from_slice(&FRAME_MAGIC);
    frame.extend_from_slice(&length_bytes);
    frame.extend_from_slice(&hasher.finalize().to_le_bytes());
    frame.extend_from_slice(&payload);
    Ok(frame)
}

enum Frame {
    Intact { tx: CommittedTx, len: usize },
    /// Runs past the end of the buffer.
    Torn,
    Damaged,
}

fn le_u32(bytes: &[u8]) -> u32 {
    let mut word = [0u8; 4];
    word.copy_from_slice(&bytes[..4]);
    u32::from_le_bytes(word)
}

fn read_frame(buf: &[u8]) -> Frame {
    if buf.len() < FRAME_HEADER {
        return Frame::Torn;
    }
    if buf[..4] != FRAME_MAGIC {
        return Frame::Damaged;
    }
    let length = le_u32(&buf[4..8]);
    if length == 0 || length > MAX_FRAME_PAYLOAD {
        return Frame::Damaged;
    }
    let end = FRAME_HEADER + length as usize;
    if buf.len() < end {
        return Frame::Torn;
    }

    let mut hasher = crc32fast::Hasher::new();
    hasher.update(&buf[4..8]);
    hasher.update(&buf[FRAME_HEADER..end]);
    if hasher.finalize() != le_u32(&buf[8..12]) {
        return Frame::Damaged;
    }

    match bincode::deserialize::<CommittedTx>(&buf[FRAME_HEADER..end]) {
        Ok(tx) => Frame::Intact { tx, len: end },
        Err(_) => Frame::Damaged,
    }
}

/// First offset at or after `from` where an intact frame starts.
fn resync(bytes: &[u8], from: usize) -> Option<usize> {
    (from..bytes.len())
        .filter(|&i| bytes[i..].starts_with(&FRAME_MAGIC))
        .find(|&i| matches!(read_frame(&bytes[i..]), Frame::Intact { .. }))
}

struct Scan {
    transactions: Vec<CommittedTx>,
    valid_len: u64,
    skipped_regions: usize,
}

fn scan(bytes: &[u8]) -> Scan {
    let mut transactions = Vec::new();
    let mut skipped_regions = 0;
    let mut valid_len = 0;
    let mut pos = 0;

    while pos < bytes.len() {
        match read_frame(&bytes[pos..]) {
            Frame::Intact { tx, len } => {
                transactions.push(tx);
                pos += len;
                valid_len = pos;
            }
            Frame::Torn | Frame::Damaged => match resync(bytes, pos + 1) {
                Some(next) => {
                    warn!(offset = pos, resumed_at = next, "skipping damaged WAL region");
                    skipped_regions += 1;
                    pos = next;
                }
                None => break,
            },
        }
    }

    Scan {
        transactions,
        valid_len: valid_len as u64,
        skipped_regions,
    }
}
