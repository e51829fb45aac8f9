//! Area type and bounding-box geometry.
//!
//! Decoupled from storage and event logic so the containment rules can be
//! tested on their own.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lowest block Y the world allows. Areas always protect down to here.
pub const WORLD_MIN_Y: i32 = -63;
/// Highest block Y the world allows. Areas always protect up to here.
pub const WORLD_MAX_Y: i32 = 320;

/// An integer block position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl BlockPos {
    #[must_use]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }
}

impl std::fmt::Display for BlockPos {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}, {}, {}", self.x, self.y, self.z)
    }
}

/// A named, owned build area.
///
/// Corners are kept in the order they were set; bounds are normalized at
/// query time, so either corner may hold the smaller coordinates. The
/// vertical extent is always the full world column
/// ([`WORLD_MIN_Y`]..=[`WORLD_MAX_Y`]) irrespective of corner Y values:
/// areas protect columns, not boxes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Area {
    pub id: Uuid,
    pub owner: Uuid,
    pub name: String,
    pub corner1: BlockPos,
    pub corner2: BlockPos,
    /// Actors allowed to break blocks inside, besides the owner.
    pub trusted: HashSet<Uuid>,
}

impl Area {
    #[must_use]
    pub fn new(owner: Uuid, name: String, corner1: BlockPos, corner2: BlockPos) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner,
            name,
            corner1,
            corner2,
            trusted: HashSet::new(),
        }
    }

    /// Returns true if the position is inside this area. X and Z bounds
    /// come from the corners; Y is the fixed world range.
    #[must_use]
    pub fn contains(&self, pos: BlockPos) -> bool {
        let min_x = self.corner1.x.min(self.corner2.x);
        let max_x = self.corner1.x.max(self.corner2.x);
        let min_z = self.corner1.z.min(self.corner2.z);
        let max_z = self.corner1.z.max(self.corner2.z);
        pos.x >= min_x
            && pos.x <= max_x
            && pos.y >= WORLD_MIN_Y
            && pos.y <= WORLD_MAX_Y
            && pos.z >= min_z
            && pos.z <= max_z
    }

    /// Returns true if the position is inside the area and within
    /// `distance` blocks of any of its six faces.
    #[must_use]
    pub fn near_boundary(&self, pos: BlockPos, distance: i32) -> bool {
        if !self.contains(pos) {
            return false;
        }
        let min_x = self.corner1.x.min(self.corner2.x);
        let max_x = self.corner1.x.max(self.corner2.x);
        let min_z = self.corner1.z.min(self.corner2.z);
        let max_z = self.corner1.z.max(self.corner2.z);
        pos.x - min_x <= distance
            || max_x - pos.x <= distance
            || pos.y - WORLD_MIN_Y <= distance
            || WORLD_MAX_Y - pos.y <= distance
            || pos.z - min_z <= distance
            || max_z - pos.z <= distance
    }

    /// Whether the actor may break blocks inside this area.
    #[must_use]
    pub fn is_trusted(&self, actor: Uuid) -> bool {
        actor == self.owner || self.trusted.contains(&actor)
    }
}
