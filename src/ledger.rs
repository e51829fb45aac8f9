//! The restoration ledger: an ordered, bounded log of blocks broken
//! outside every build area, drained in small batches by the host-driven
//! scheduler tick.

use std::collections::VecDeque;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use crate::area::BlockPos;
use crate::store::AreaStore;

/// A block broken outside every area, waiting to be put back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OreRecord {
    pub world: String,
    pub pos: BlockPos,
    /// Registry identifier of the broken block, e.g. `minecraft:iron_ore`.
    /// The core never interprets it; it is stored and written back as-is.
    pub material: String,
    /// Wall-clock millis at the time of the break, supplied by the host.
    pub broken_at_ms: u64,
}

/// Read/write access to live world blocks, resolved at restoration time.
///
/// The ledger holds positions, never block references: the world may have
/// changed since a record was made, so every restore re-checks the spot.
pub trait BlockAccess {
    /// Whether the block at the position is currently air-equivalent.
    /// Unknown or unloaded worlds should report `false`.
    fn is_empty(&self, world: &str, pos: BlockPos) -> bool;

    /// Write a material back. Only called on empty, unprotected positions.
    fn set_block(&self, world: &str, pos: BlockPos, material: &str);
}

/// Ordered, bounded log of pending restorations.
///
/// Insertion is append-only, so the log stays chronological with the
/// oldest record at the head. Internally synchronized: the persistence
/// worker snapshots while the main context appends and drains.
pub struct OreLedger {
    records: Mutex<VecDeque<OreRecord>>,
}

impl OreLedger {
    #[must_use]
    pub fn new() -> Self {
        Self {
            records: Mutex::new(VecDeque::new()),
        }
    }

    /// Append a break record. If the push takes the ledger over `cap`,
    /// evict from the head until the size is back at the cap: the oldest
    /// pending restorations are forgotten without being restored.
    pub fn record_break(&self, world: &str, pos: BlockPos, material: &str, now_ms: u64, cap: usize) {
        let mut records = self.records.lock().unwrap();
        records.push_back(OreRecord {
            world: world.to_string(),
            pos,
            material: material.to_string(),
            broken_at_ms: now_ms,
        });
        while records.len() > cap {
            records.pop_front();
        }
    }

    /// One scheduler tick: visit at most `batch` records from the head.
    ///
    /// An eligible record (age >= `delay_ms`) is removed whether or not
    /// its block can be written back; the material is only written when
    /// the position is outside every current area and the spot is still
    /// empty. Records younger than the delay stay in place but consume a
    /// visit, so the head-to-tail scan order is load-bearing: in normal
    /// operation the log is chronological and the head is always the
    /// oldest record.
    ///
    /// Returns the number of blocks actually restored.
    pub fn tick(
        &self,
        now_ms: u64,
        batch: usize,
        delay_ms: u64,
        areas: &AreaStore,
        world: &dyn BlockAccess,
    ) -> usize {
        let mut records = self.records.lock().unwrap();
        let mut restored = 0;
        let mut visited = 0;
        let mut idx = 0;
        while idx < records.len() && visited < batch {
            visited += 1;
            if now_ms.saturating_sub(records[idx].broken_at_ms) >= delay_ms {
                if let Some(rec) = records.remove(idx) {
                    if restore(&rec, areas, world) {
                        restored += 1;
                    }
                }
            } else {
                idx += 1;
            }
        }
        restored
    }

    /// Admin bulk restore: visits every record matching the predicate,
    /// with no batch cap. Same rule as [`tick`](Self::tick), so the
    /// record is removed either way. Returns the number of blocks
    /// restored.
    pub fn force_restore_all(
        &self,
        areas: &AreaStore,
        world: &dyn BlockAccess,
        predicate: impl Fn(&OreRecord) -> bool,
    ) -> usize {
        let mut records = self.records.lock().unwrap();
        let mut restored = 0;
        let mut idx = 0;
        while idx < records.len() {
            if !predicate(&records[idx]) {
                idx += 1;
                continue;
            }
            if let Some(rec) = records.remove(idx) {
                if restore(&rec, areas, world) {
                    restored += 1;
                }
            }
        }
        restored
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.lock().map_or(0, |r| r.len())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy of every pending record, head first, for copy-before-serialize
    /// saves.
    #[must_use]
    pub fn snapshot(&self) -> Vec<OreRecord> {
        self.records
            .lock()
            .map_or_else(|_| Vec::new(), |r| r.iter().cloned().collect())
    }

    /// Swap in loaded state, replacing whatever is held.
    pub fn replace(&self, records: Vec<OreRecord>) {
        *self.records.lock().unwrap() = records.into();
    }
}

impl Default for OreLedger {
    fn default() -> Self {
        Self::new()
    }
}

/// Apply the restoration rule to a record already removed from the log.
/// Returns true if the material was written back.
fn restore(rec: &OreRecord, areas: &AreaStore, world: &dyn BlockAccess) -> bool {
    if areas.any_contains(rec.pos) {
        // The spot has been claimed since the break; leave it alone.
        return false;
    }
    if !world.is_empty(&rec.world, rec.pos) {
        return false;
    }
    world.set_block(&rec.world, rec.pos, &rec.material);
    true
}
