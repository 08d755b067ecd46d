//! Influencing gravity-source set
//!
//! Tracks which attractors currently pull on the orbiter. Entries are added
//! and removed by proximity-zone events from the embedder; every step the
//! set is purged of attractors that despawned or were deactivated.
//!
//! Removal is special-cased for the captured attractor: leaving its zone
//! must not drop it from the set, it starts a detach instead. The caller
//! acts on the returned `RemoveOutcome`.

use crate::simulation::states::{AttractorId, AttractorKind, System};

/// What `GravityRegistry::remove` decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveOutcome {
    /// The source was dropped from the set.
    Removed,
    /// The source is the captured attractor: keep it and begin detaching.
    BeginDetach,
    /// The source was not in the set.
    NotPresent,
}

#[derive(Debug, Clone)]
pub struct GravityRegistry {
    sources: Vec<AttractorId>, // unique entries, order irrelevant
}

impl GravityRegistry {
    pub fn new() -> Self {
        GravityRegistry {
            sources: Vec::new(),
        }
    }

    /// Register a source. Unknown ids and unclassified kinds are rejected.
    /// Returns true when the source is usable (newly added or already known),
    /// so the caller can go on to attempt a capture.
    pub fn add(&mut self, system: &System, id: AttractorId) -> bool {
        let Some(data) = system.get(id) else {
            log::warn!("ignoring unknown gravity source {:?}", id);
            return false;
        };
        if data.kind == AttractorKind::Unclassified {
            log::warn!("attractor {:?} has no registered kind, ignoring", id);
            return false;
        }
        if !self.sources.contains(&id) {
            self.sources.push(id);
        }
        true
    }

    /// Deregister a source on zone exit.
    pub fn remove(&mut self, id: AttractorId, captured: Option<AttractorId>) -> RemoveOutcome {
        if captured == Some(id) {
            return RemoveOutcome::BeginDetach;
        }
        match self.sources.iter().position(|&s| s == id) {
            Some(at) => {
                self.sources.remove(at);
                RemoveOutcome::Removed
            }
            None => RemoveOutcome::NotPresent,
        }
    }

    /// Drop the source unconditionally, bypassing the detach special case.
    /// Used when a detach completes.
    pub fn remove_outright(&mut self, id: AttractorId) {
        self.sources.retain(|&s| s != id);
    }

    /// Drop sources that despawned or were deactivated since the last step.
    /// Returns true when the captured attractor was among them, in which
    /// case the caller must force a release.
    pub fn purge(&mut self, system: &System, captured: Option<AttractorId>) -> bool {
        let mut captured_lost = false;
        self.sources.retain(|&id| {
            if system.is_valid(id) {
                true
            } else {
                if captured == Some(id) {
                    captured_lost = true;
                }
                log::debug!("purging stale gravity source {:?}", id);
                false
            }
        });
        captured_lost
    }

    pub fn contains(&self, id: AttractorId) -> bool {
        self.sources.contains(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = AttractorId> + '_ {
        self.sources.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    pub fn clear(&mut self) {
        self.sources.clear();
    }
}
