//! Area storage: quota-checked creation, containment lookup, owner and
//! admin mutations.

use std::sync::RwLock;

use uuid::Uuid;

use crate::area::{Area, BlockPos};
use crate::error::RegenError;

/// Which corner of an area to move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Corner {
    First,
    Second,
}

/// In-memory store of all build areas.
///
/// A flat declaration-ordered list, not an owner-keyed map: containment
/// scans resolve overlapping areas by first-declared-wins, and that order
/// must survive every mutation. Protected by `RwLock` so the persistence
/// worker can snapshot while the main context mutates.
pub struct AreaStore {
    areas: RwLock<Vec<Area>>,
}

impl AreaStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            areas: RwLock::new(Vec::new()),
        }
    }

    /// Create a new area for `owner`, enforcing the per-player quota.
    /// Names are display-only; no uniqueness check.
    pub fn create(
        &self,
        owner: Uuid,
        name: &str,
        corner1: BlockPos,
        corner2: BlockPos,
        max_per_owner: u32,
    ) -> Result<Area, RegenError> {
        let mut areas = self.areas.write().unwrap();
        let held = areas.iter().filter(|a| a.owner == owner).count();
        if held >= max_per_owner as usize {
            return Err(RegenError::QuotaExceeded { max: max_per_owner });
        }
        let area = Area::new(owner, name.to_string(), corner1, corner2);
        areas.push(area.clone());
        Ok(area)
    }

    /// Find the area containing a position. First match wins in
    /// declaration order; overlaps carry no priority rule beyond that.
    #[must_use]
    pub fn find_containing(&self, pos: BlockPos) -> Option<Area> {
        self.areas
            .read()
            .unwrap()
            .iter()
            .find(|a| a.contains(pos))
            .cloned()
    }

    /// Whether any area contains the position. The hot path for break
    /// tracking and restoration checks.
    #[must_use]
    pub fn any_contains(&self, pos: BlockPos) -> bool {
        self.areas
            .read()
            .map_or(false, |areas| areas.iter().any(|a| a.contains(pos)))
    }

    /// Every area containing the position, in declaration order.
    #[must_use]
    pub fn containing(&self, pos: BlockPos) -> Vec<Area> {
        self.areas
            .read()
            .map_or_else(|_| Vec::new(), |areas| {
                areas.iter().filter(|a| a.contains(pos)).cloned().collect()
            })
    }

    /// All areas owned by `owner`, in insertion order.
    #[must_use]
    pub fn areas_of(&self, owner: Uuid) -> Vec<Area> {
        self.areas
            .read()
            .map_or_else(|_| Vec::new(), |areas| {
                areas.iter().filter(|a| a.owner == owner).cloned().collect()
            })
    }

    #[must_use]
    pub fn get(&self, id: Uuid) -> Option<Area> {
        self.areas
            .read()
            .unwrap()
            .iter()
            .find(|a| a.id == id)
            .cloned()
    }

    /// Remove an area. The removed area is returned so the caller can
    /// signal the deletion to any presentation session referencing it.
    pub fn delete(&self, id: Uuid) -> Result<Area, RegenError> {
        let mut areas = self.areas.write().unwrap();
        let idx = areas
            .iter()
            .position(|a| a.id == id)
            .ok_or(RegenError::NotFound)?;
        Ok(areas.remove(idx))
    }

    pub fn rename(&self, id: Uuid, name: &str) -> Result<(), RegenError> {
        self.mutate(id, |a| a.name = name.to_string())
    }

    pub fn set_corner(&self, id: Uuid, corner: Corner, pos: BlockPos) -> Result<(), RegenError> {
        self.mutate(id, |a| match corner {
            Corner::First => a.corner1 = pos,
            Corner::Second => a.corner2 = pos,
        })
    }

    pub fn trust(&self, id: Uuid, actor: Uuid) -> Result<(), RegenError> {
        self.mutate(id, |a| {
            a.trusted.insert(actor);
        })
    }

    pub fn untrust(&self, id: Uuid, actor: Uuid) -> Result<(), RegenError> {
        self.mutate(id, |a| {
            a.trusted.remove(&actor);
        })
    }

    /// Hand the area to a new owner. The trusted set is kept; the new
    /// owner is trusted by ownership.
    pub fn transfer(&self, id: Uuid, new_owner: Uuid) -> Result<(), RegenError> {
        self.mutate(id, |a| a.owner = new_owner)
    }

    fn mutate(&self, id: Uuid, f: impl FnOnce(&mut Area)) -> Result<(), RegenError> {
        let mut areas = self.areas.write().unwrap();
        let area = areas
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or(RegenError::NotFound)?;
        f(area);
        Ok(())
    }

    /// Drop every area whose owner fails the predicate. Returns how many
    /// were removed.
    ///
    /// Deliberately aggressive, inherited from the original design: areas
    /// of offline owners leave the live registry entirely, so their
    /// protection lapses until the owner reconnects and persisted state is
    /// reloaded. The periodic snapshot save runs before this prune, which
    /// is what keeps the areas recoverable.
    pub fn prune_absent_owners(&self, is_online: impl Fn(&Uuid) -> bool) -> usize {
        let mut areas = self.areas.write().unwrap();
        let before = areas.len();
        areas.retain(|a| is_online(&a.owner));
        before - areas.len()
    }

    #[must_use]
    pub fn count(&self) -> usize {
        self.areas.read().map_or(0, |a| a.len())
    }

    /// Copy of every area, for listing and copy-before-serialize saves.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Area> {
        self.areas
            .read()
            .map_or_else(|_| Vec::new(), |a| a.clone())
    }

    /// Swap in loaded state, replacing whatever is held.
    pub fn replace(&self, areas: Vec<Area>) {
        *self.areas.write().unwrap() = areas;
    }
}

impl Default for AreaStore {
    fn default() -> Self {
        Self::new()
    }
}
