//! Presence tracking: which actors currently stand inside which areas.
//!
//! Derived state, never persisted. An actor's entry is discarded on
//! disconnect and rebuilt from scratch on the next movement sample.

use std::collections::HashMap;

use uuid::Uuid;

use crate::area::BlockPos;
use crate::store::AreaStore;

/// A boundary crossing, emitted exactly once per transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PresenceEvent {
    Entered { area: Uuid, name: String },
    Exited { area: Uuid, name: String },
}

/// Edge-triggered tracker of actor-in-area state.
#[derive(Default)]
pub struct PresenceTracker {
    /// Per actor: the areas they currently stand in, with the name each
    /// area had at entry so an exit can still be named after a delete or
    /// rename.
    inside: HashMap<Uuid, HashMap<Uuid, String>>,
}

impl PresenceTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Process one movement sample. Recomputes the set of areas the actor
    /// is associated with (owned only, or any area, per `owner_only`) and
    /// containing the position, then emits the difference against the
    /// previous sample: exits first, then entries.
    pub fn sample(
        &mut self,
        actor: Uuid,
        pos: BlockPos,
        areas: &AreaStore,
        owner_only: bool,
    ) -> Vec<PresenceEvent> {
        let current: HashMap<Uuid, String> = areas
            .containing(pos)
            .into_iter()
            .filter(|a| !owner_only || a.owner == actor)
            .map(|a| (a.id, a.name))
            .collect();

        let previous = self.inside.entry(actor).or_default();
        let mut events = Vec::new();
        for (id, name) in previous.iter() {
            if !current.contains_key(id) {
                events.push(PresenceEvent::Exited {
                    area: *id,
                    name: name.clone(),
                });
            }
        }
        for (id, name) in &current {
            if !previous.contains_key(id) {
                events.push(PresenceEvent::Entered {
                    area: *id,
                    name: name.clone(),
                });
            }
        }
        *previous = current;
        events
    }

    /// Discard all state for an actor (disconnect).
    pub fn forget(&mut self, actor: &Uuid) {
        self.inside.remove(actor);
    }

    /// Drop a deleted area from every actor's state without emitting an
    /// exit; the deletion itself is already signaled to the caller.
    pub fn drop_area(&mut self, area: Uuid) {
        for held in self.inside.values_mut() {
            held.remove(&area);
        }
    }

    /// Discard state for every actor failing the predicate.
    pub fn retain_actors(&mut self, is_online: impl Fn(&Uuid) -> bool) {
        self.inside.retain(|actor, _| is_online(actor));
    }

    #[must_use]
    pub fn tracked_actors(&self) -> usize {
        self.inside.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos(x: i32, z: i32) -> BlockPos {
        BlockPos::new(x, 64, z)
    }

    fn store_with_area(owner: Uuid) -> (AreaStore, Uuid) {
        let store = AreaStore::new();
        let area = store
            .create(owner, "camp", pos(0, 0), pos(10, 10), 3)
            .unwrap();
        (store, area.id)
    }

    #[test]
    fn enter_and_exit_fire_once_per_crossing() {
        let owner = Uuid::new_v4();
        let (store, area_id) = store_with_area(owner);
        let mut tracker = PresenceTracker::new();

        let events = tracker.sample(owner, pos(5, 5), &store, true);
        assert_eq!(
            events,
            vec![PresenceEvent::Entered {
                area: area_id,
                name: "camp".into()
            }]
        );
        // Moving around inside is silent.
        assert!(tracker.sample(owner, pos(6, 6), &store, true).is_empty());

        let events = tracker.sample(owner, pos(50, 50), &store, true);
        assert_eq!(
            events,
            vec![PresenceEvent::Exited {
                area: area_id,
                name: "camp".into()
            }]
        );
        // Staying outside is silent too.
        assert!(tracker.sample(owner, pos(51, 50), &store, true).is_empty());
    }

    #[test]
    fn owner_only_policy_ignores_foreign_areas() {
        let owner = Uuid::new_v4();
        let visitor = Uuid::new_v4();
        let (store, _) = store_with_area(owner);
        let mut tracker = PresenceTracker::new();

        assert!(tracker.sample(visitor, pos(5, 5), &store, true).is_empty());
        // With the policy off, anyone's crossing is reported.
        let events = tracker.sample(visitor, pos(5, 5), &store, false);
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn state_rebuilds_after_forget() {
        let owner = Uuid::new_v4();
        let (store, _) = store_with_area(owner);
        let mut tracker = PresenceTracker::new();

        assert_eq!(tracker.sample(owner, pos(5, 5), &store, true).len(), 1);
        tracker.forget(&owner);
        // First sample after reconnect re-enters from scratch.
        assert_eq!(tracker.sample(owner, pos(5, 5), &store, true).len(), 1);
    }

    #[test]
    fn exit_after_rename_uses_the_entry_name() {
        let owner = Uuid::new_v4();
        let (store, area_id) = store_with_area(owner);
        let mut tracker = PresenceTracker::new();

        tracker.sample(owner, pos(5, 5), &store, true);
        store.rename(area_id, "renamed").unwrap();
        store.delete(area_id).unwrap();
        let events = tracker.sample(owner, pos(5, 5), &store, true);
        assert_eq!(
            events,
            vec![PresenceEvent::Exited {
                area: area_id,
                name: "camp".into()
            }]
        );
    }
}
