//! Service facade: the inbound ports a host plugin drives.
//!
//! The host owns event dispatch, scheduling, and permission resolution;
//! the core is driven entirely through these methods. All state sits
//! behind interior locks, so the service is shared as a plain
//! `Arc<RegenService>` between the main context and whatever wires the
//! host's timers to [`tick`](RegenService::tick) and
//! [`maintenance`](RegenService::maintenance).

use std::sync::{Arc, Mutex, RwLock};

use uuid::Uuid;

use crate::area::{Area, BlockPos};
use crate::config::{MAX_AREAS_CAP, MAX_BATCH_SIZE, RegenConfig};
use crate::error::RegenError;
use crate::ledger::{BlockAccess, OreLedger, OreRecord};
use crate::persist::{DataFile, SavedState};
use crate::presence::{PresenceEvent, PresenceTracker};
use crate::store::{AreaStore, Corner};

/// Outcome of a block-break attempt, decided by the core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BreakOutcome {
    /// Inside an area the actor may build in; the break proceeds untracked.
    Allowed,
    /// Inside someone else's area; the host should cancel the break.
    Denied { area: String },
    /// Outside every area; the break proceeds and is tracked for
    /// restoration.
    Recorded,
}

/// Counters for the debug surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegenStats {
    pub areas: usize,
    pub tracked_blocks: usize,
    pub tracked_actors: usize,
}

pub struct RegenService {
    config: RwLock<RegenConfig>,
    areas: AreaStore,
    ledger: OreLedger,
    presence: Mutex<PresenceTracker>,
    data: Arc<DataFile>,
}

impl RegenService {
    #[must_use]
    pub fn new(config: RegenConfig, data: DataFile) -> Self {
        Self {
            config: RwLock::new(config),
            areas: AreaStore::new(),
            ledger: OreLedger::new(),
            presence: Mutex::new(PresenceTracker::new()),
            data: Arc::new(data),
        }
    }

    // ───────────────────────────── Inbound events ─────────────────────────────

    /// A block was broken. Decides protection and tracking in one pass:
    /// inside an area the actor is trusted in (or the caller resolved as
    /// admin) the break is allowed untracked; inside anyone else's area it
    /// is denied; outside every area it is recorded for restoration.
    pub fn on_block_broken(
        &self,
        actor: Uuid,
        admin: bool,
        world: &str,
        pos: BlockPos,
        material: &str,
        now_ms: u64,
    ) -> BreakOutcome {
        if let Some(area) = self.areas.find_containing(pos) {
            if admin || area.is_trusted(actor) {
                return BreakOutcome::Allowed;
            }
            return BreakOutcome::Denied { area: area.name };
        }
        let cap = self.config.read().unwrap().regeneration.max_tracked_blocks;
        self.ledger.record_break(world, pos, material, now_ms, cap);
        BreakOutcome::Recorded
    }

    /// A tracked actor moved. Returns edge-triggered boundary crossings,
    /// at most one enter/exit per area per crossing.
    pub fn on_actor_moved(&self, actor: Uuid, pos: BlockPos) -> Vec<PresenceEvent> {
        let owner_only = self.config.read().unwrap().presence.owner_only;
        self.presence
            .lock()
            .unwrap()
            .sample(actor, pos, &self.areas, owner_only)
    }

    /// An actor disconnected: presence state is discarded (rebuilt from
    /// scratch on the next movement sample) and a snapshot save is queued.
    pub fn on_actor_disconnected(&self, actor: Uuid) {
        self.presence.lock().unwrap().forget(&actor);
        self.queue_save();
    }

    // ───────────────────────────── Area operations ─────────────────────────────

    pub fn create_area(
        &self,
        owner: Uuid,
        name: &str,
        corner1: BlockPos,
        corner2: BlockPos,
    ) -> Result<Area, RegenError> {
        let max = self.config.read().unwrap().area.max_areas_per_player;
        let area = self.areas.create(owner, name, corner1, corner2, max)?;
        log::info!("oreregen: Area '{}' created for {owner}", area.name);
        self.queue_save();
        Ok(area)
    }

    /// Delete an area. The removed area is returned; that return is the
    /// deletion signal for any presentation session still referencing it.
    pub fn delete_area(&self, id: Uuid) -> Result<Area, RegenError> {
        let area = self.areas.delete(id)?;
        self.presence.lock().unwrap().drop_area(id);
        log::info!("oreregen: Area '{}' deleted", area.name);
        self.queue_save();
        Ok(area)
    }

    pub fn rename_area(&self, id: Uuid, name: &str) -> Result<(), RegenError> {
        self.areas.rename(id, name)?;
        self.queue_save();
        Ok(())
    }

    pub fn set_area_corner(
        &self,
        id: Uuid,
        corner: Corner,
        pos: BlockPos,
    ) -> Result<(), RegenError> {
        self.areas.set_corner(id, corner, pos)?;
        self.queue_save();
        Ok(())
    }

    pub fn trust_actor(&self, id: Uuid, actor: Uuid) -> Result<(), RegenError> {
        self.areas.trust(id, actor)?;
        self.queue_save();
        Ok(())
    }

    pub fn untrust_actor(&self, id: Uuid, actor: Uuid) -> Result<(), RegenError> {
        self.areas.untrust(id, actor)?;
        self.queue_save();
        Ok(())
    }

    pub fn transfer_area(&self, id: Uuid, new_owner: Uuid) -> Result<(), RegenError> {
        self.areas.transfer(id, new_owner)?;
        self.queue_save();
        Ok(())
    }

    /// All areas owned by `owner`, insertion order.
    #[must_use]
    pub fn areas_of(&self, owner: Uuid) -> Vec<Area> {
        self.areas.areas_of(owner)
    }

    /// The area containing a position, first declared wins.
    #[must_use]
    pub fn area_at(&self, pos: BlockPos) -> Option<Area> {
        self.areas.find_containing(pos)
    }

    /// Copy of every area, for admin listings.
    #[must_use]
    pub fn all_areas(&self) -> Vec<Area> {
        self.areas.snapshot()
    }

    // ───────────────────────────── Scheduler ─────────────────────────────

    /// One restoration tick, invoked by the host scheduler. Visits at most
    /// the configured batch of ledger records; per-tick work stays bounded
    /// no matter how deep the backlog is. Returns the number of blocks
    /// restored.
    pub fn tick(&self, now_ms: u64, world: &dyn BlockAccess) -> usize {
        let (batch, delay_ms) = {
            let cfg = self.config.read().unwrap();
            (cfg.regeneration.batch_size, cfg.regeneration.delay_ms)
        };
        self.ledger.tick(now_ms, batch, delay_ms, &self.areas, world)
    }

    /// Admin bulk restore over every record matching the predicate, no
    /// batch cap. Returns the number of blocks restored.
    pub fn force_restore_all(
        &self,
        world: &dyn BlockAccess,
        predicate: impl Fn(&OreRecord) -> bool,
    ) -> usize {
        let restored = self.ledger.force_restore_all(&self.areas, world, predicate);
        log::info!("oreregen: Force restore wrote back {restored} blocks");
        self.queue_save();
        restored
    }

    /// The periodic save-interval job: snapshot save, then drop live state
    /// for absent owners. The save runs on the snapshot taken *before* the
    /// prune, which is what keeps pruned areas recoverable when their
    /// owner reconnects and state is reloaded.
    pub fn maintenance(&self, is_online: impl Fn(&Uuid) -> bool) {
        self.queue_save();
        let removed = self.areas.prune_absent_owners(&is_online);
        if removed > 0 {
            log::info!("oreregen: Pruned {removed} areas of offline owners");
        }
        self.presence.lock().unwrap().retain_actors(is_online);
    }

    // ───────────────────────────── Config surface ─────────────────────────────

    /// Raise the per-tick batch by one, saturating at the hard cap.
    /// Returns the new value.
    pub fn raise_batch_size(&self) -> usize {
        let mut cfg = self.config.write().unwrap();
        cfg.regeneration.batch_size = (cfg.regeneration.batch_size + 1).min(MAX_BATCH_SIZE);
        cfg.regeneration.batch_size
    }

    /// Adjust the per-player area quota, clamped to `1..=10`. Returns the
    /// applied value.
    pub fn set_max_areas_per_player(&self, max: u32) -> u32 {
        let mut cfg = self.config.write().unwrap();
        cfg.area.max_areas_per_player = max.clamp(1, MAX_AREAS_CAP);
        cfg.area.max_areas_per_player
    }

    /// Flip the owner-only presence policy. Returns the new value.
    pub fn toggle_owner_only_presence(&self) -> bool {
        let mut cfg = self.config.write().unwrap();
        cfg.presence.owner_only = !cfg.presence.owner_only;
        cfg.presence.owner_only
    }

    #[must_use]
    pub fn config(&self) -> RegenConfig {
        self.config.read().unwrap().clone()
    }

    // ───────────────────────────── Persistence ─────────────────────────────

    /// Swap in persisted state. Meant for startup (possibly from a worker
    /// thread, with the core simply empty until it lands) or an explicit
    /// admin reload. On failure the current (empty at startup) state is
    /// kept and the error is returned for the host to surface; the core
    /// keeps running either way.
    pub fn reload(&self) -> Result<(usize, usize), RegenError> {
        match self.data.load() {
            Ok(state) => {
                let counts = (state.areas.len(), state.records.len());
                self.areas.replace(state.areas);
                self.ledger.replace(state.records);
                log::info!(
                    "oreregen: Loaded {} areas and {} pending restorations",
                    counts.0,
                    counts.1
                );
                Ok(counts)
            }
            Err(e) => {
                log::warn!("oreregen: Data load failed, continuing with empty state: {e}");
                Err(e)
            }
        }
    }

    /// Synchronous save for clean shutdown; the process may terminate
    /// immediately after this returns.
    pub fn save_now(&self) -> Result<(), RegenError> {
        self.data.save(&self.snapshot_state())
    }

    /// Fire-and-forget snapshot save, used after every mutating owner or
    /// admin action. Copy-before-serialize: the locks are released before
    /// any I/O happens.
    fn queue_save(&self) {
        self.data.save_in_background(self.snapshot_state());
    }

    fn snapshot_state(&self) -> SavedState {
        SavedState {
            areas: self.areas.snapshot(),
            records: self.ledger.snapshot(),
        }
    }

    // ───────────────────────────── Debug ─────────────────────────────

    #[must_use]
    pub fn debug_stats(&self) -> RegenStats {
        RegenStats {
            areas: self.areas.count(),
            tracked_blocks: self.ledger.len(),
            tracked_actors: self.presence.lock().unwrap().tracked_actors(),
        }
    }
}
