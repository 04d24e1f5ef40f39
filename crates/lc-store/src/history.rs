use std::collections::VecDeque;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tracing::warn;

use crate::error::{StoreError, StoreResult};
use crate::record::VersionedRecord;

/// Substrate-side cursor over the versions of one key.
///
/// Cursors hold substrate resources until `close` is called. Callers should
/// not use a cursor directly; wrap it in a [`HistoryIter`], which guarantees
/// release.
pub trait HistoryCursor {
    /// Advance the cursor. `Ok(None)` marks the end of history.
    fn next_version(&mut self) -> StoreResult<Option<VersionedRecord>>;

    /// Release substrate resources held by the cursor.
    fn close(&mut self) -> StoreResult<()>;
}

/// Scoped, forward-only iterator over a key's history.
///
/// The underlying cursor is closed exactly once: by [`HistoryIter::finish`],
/// which reports a close failure, or on drop, which logs it. The iterator is
/// fused after the end of history or after the first error.
pub struct HistoryIter<'a> {
    cursor: Box<dyn HistoryCursor + 'a>,
    exhausted: bool,
    released: bool,
}

impl<'a> HistoryIter<'a> {
    pub fn new(cursor: impl HistoryCursor + 'a) -> Self {
        Self {
            cursor: Box::new(cursor),
            exhausted: false,
            released: false,
        }
    }

    /// Release the cursor now and surface any close failure.
    pub fn finish(mut self) -> StoreResult<()> {
        self.release()
    }

    fn release(&mut self) -> StoreResult<()> {
        if self.released {
            return Ok(());
        }
        self.released = true;
        self.cursor.close()
    }
}

impl Iterator for HistoryIter<'_> {
    type Item = StoreResult<VersionedRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.exhausted || self.released {
            return None;
        }
        match self.cursor.next_version() {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => {
                self.exhausted = true;
                None
            }
            Err(e) => {
                self.exhausted = true;
                Some(Err(e))
            }
        }
    }
}

impl Drop for HistoryIter<'_> {
    fn drop(&mut self) {
        if let Err(e) = self.release() {
            warn!(error = %e, "failed to release history cursor");
        }
    }
}

impl fmt::Debug for HistoryIter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HistoryIter")
            .field("exhausted", &self.exhausted)
            .field("released", &self.released)
            .finish()
    }
}

/// Cursor over a point-in-time copy of a key's versions.
///
/// Counts itself in the substrate's open-cursor gauge until closed.
pub struct SnapshotCursor {
    versions: VecDeque<VersionedRecord>,
    open: Option<Arc<AtomicUsize>>,
}

impl SnapshotCursor {
    pub fn new(versions: Vec<VersionedRecord>, gauge: Arc<AtomicUsize>) -> Self {
        gauge.fetch_add(1, Ordering::SeqCst);
        Self {
            versions: versions.into(),
            open: Some(gauge),
        }
    }
}

impl HistoryCursor for SnapshotCursor {
    fn next_version(&mut self) -> StoreResult<Option<VersionedRecord>> {
        if self.open.is_none() {
            return Err(StoreError::CursorClosed);
        }
        Ok(self.versions.pop_front())
    }

    fn close(&mut self) -> StoreResult<()> {
        if let Some(gauge) = self.open.take() {
            gauge.fetch_sub(1, Ordering::SeqCst);
        }
        self.versions.clear();
        Ok(())
    }
}
