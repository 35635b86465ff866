//! Free-list pool of square edges.
//!
//! Slots are either live (`Some`) or idle (`None`, listed in `free`).
//! Storage grows to the largest number of simultaneously live edges and is
//! never shrunk, so a graph rebuilt every frame stops allocating once warm.

use crate::node::{EdgeId, SquareEdge};

#[derive(Clone, Debug, Default)]
pub struct EdgePool {
    slots: Vec<Option<SquareEdge>>,
    free: Vec<EdgeId>,
}

impl EdgePool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `edge` in a recycled slot, or a new one if none is idle.
    pub fn acquire(&mut self, edge: SquareEdge) -> EdgeId {
        match self.free.pop() {
            Some(id) => {
                debug_assert!(self.slots[id.0].is_none());
                self.slots[id.0] = Some(edge);
                id
            }
            None => {
                self.slots.push(Some(edge));
                EdgeId(self.slots.len() - 1)
            }
        }
    }

    /// Clear a live slot and return it to the free list. Returns the
    /// contents the edge had.
    ///
    /// # Panics
    /// If `id` is idle or was never handed out.
    pub fn release(&mut self, id: EdgeId) -> SquareEdge {
        let slot = self
            .slots
            .get_mut(id.0)
            .unwrap_or_else(|| panic!("edge {} was never allocated", id.0));
        let edge = slot
            .take()
            .unwrap_or_else(|| panic!("edge {} released while idle", id.0));
        self.free.push(id);
        edge
    }

    /// Return every live edge to the free list without allocating.
    pub fn release_all(&mut self) {
        for (i, slot) in self.slots.iter_mut().enumerate() {
            if slot.take().is_some() {
                self.free.push(EdgeId(i));
            }
        }
    }

    pub fn get(&self, id: EdgeId) -> Option<&SquareEdge> {
        self.slots.get(id.0).and_then(Option::as_ref)
    }

    pub fn is_live(&self, id: EdgeId) -> bool {
        self.get(id).is_some()
    }

    /// Number of edge slots ever allocated (high-water mark).
    pub fn allocated(&self) -> usize {
        self.slots.len()
    }

    pub fn live(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    pub fn idle(&self) -> usize {
        self.free.len()
    }

    pub fn iter_live(&self) -> impl Iterator<Item = (EdgeId, &SquareEdge)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|edge| (EdgeId(i), edge)))
    }
}
