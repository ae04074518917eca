//! The local shape collection of one page.
//!
//! Holds the optimistic value of every shape together with what the
//! backend last acknowledged. Only the synchronizer mutates it; everything
//! else reads.

use ov_core::id::ShapeId;
use ov_core::model::{Shape, ShapeFamily, TextRegion};
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub(crate) struct Entry {
    /// What the user sees, including unconfirmed edits and previews.
    pub shape: Shape,
    /// Backend id once the record exists.
    pub remote: Option<String>,
    /// Last server-acknowledged version. `None` until a create succeeds.
    pub confirmed: Option<Shape>,
    /// Bumped on every local change; stale responses compare against it.
    pub generation: u64,
}

impl Entry {
    pub fn loaded(shape: Shape, remote: String, generation: u64) -> Self {
        Self {
            confirmed: Some(shape.clone()),
            shape,
            remote: Some(remote),
            generation,
        }
    }

    pub fn pending(shape: Shape, generation: u64) -> Self {
        Self {
            shape,
            remote: None,
            confirmed: None,
            generation,
        }
    }
}

#[derive(Debug, Default)]
pub struct ShapeStore {
    entries: HashMap<ShapeId, Entry>,
    /// List order per family: load order, then creation order.
    regions: Vec<ShapeId>,
    drawings: Vec<ShapeId>,
}

impl ShapeStore {
    fn list(&self, family: ShapeFamily) -> &Vec<ShapeId> {
        match family {
            ShapeFamily::Region => &self.regions,
            ShapeFamily::Drawing => &self.drawings,
        }
    }

    fn list_mut(&mut self, family: ShapeFamily) -> &mut Vec<ShapeId> {
        match family {
            ShapeFamily::Region => &mut self.regions,
            ShapeFamily::Drawing => &mut self.drawings,
        }
    }

    pub fn get(&self, id: ShapeId) -> Option<&Shape> {
        self.entries.get(&id).map(|e| &e.shape)
    }

    pub fn contains(&self, id: ShapeId) -> bool {
        self.entries.contains_key(&id)
    }

    /// The backend id of a shape, once its create has been acknowledged.
    pub fn remote_id(&self, id: ShapeId) -> Option<&str> {
        self.entries.get(&id).and_then(|e| e.remote.as_deref())
    }

    /// The last version the backend acknowledged.
    pub fn confirmed(&self, id: ShapeId) -> Option<&Shape> {
        self.entries.get(&id).and_then(|e| e.confirmed.as_ref())
    }

    pub fn len(&self, family: ShapeFamily) -> usize {
        self.list(family).len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Ids in list order.
    pub fn ids(&self, family: ShapeFamily) -> &[ShapeId] {
        self.list(family)
    }

    /// Shapes in paint order, bottom first.
    ///
    /// Regions sort by `render_order`, ties keep list order. Drawings paint
    /// in creation order.
    pub fn ordered(&self, family: ShapeFamily) -> Vec<&Shape> {
        let mut shapes: Vec<&Shape> = self
            .list(family)
            .iter()
            .filter_map(|id| self.get(*id))
            .collect();
        if family == ShapeFamily::Region {
            shapes.sort_by_key(|s| s.as_region().map_or(0, |r| r.render_order));
        }
        shapes
    }

    /// Text regions in list order.
    pub fn regions(&self) -> impl Iterator<Item = &TextRegion> + '_ {
        self.regions
            .iter()
            .filter_map(|id| self.get(*id))
            .filter_map(Shape::as_region)
    }

    /// A `render_order` that paints above every current region.
    pub fn next_render_order(&self) -> i32 {
        self.regions()
            .map(|r| r.render_order)
            .max()
            .map_or(0, |top| top.saturating_add(1))
    }

    pub(crate) fn entry(&self, id: ShapeId) -> Option<&Entry> {
        self.entries.get(&id)
    }

    pub(crate) fn entry_mut(&mut self, id: ShapeId) -> Option<&mut Entry> {
        self.entries.get_mut(&id)
    }

    /// Insert at `index` in the family list (clamped), or at the end.
    /// Returns `false` if the id is already present.
    pub(crate) fn insert(&mut self, entry: Entry, index: Option<usize>) -> bool {
        let id = entry.shape.id();
        if self.entries.contains_key(&id) {
            return false;
        }
        let list = self.list_mut(entry.shape.family());
        let at = index.unwrap_or(list.len()).min(list.len());
        list.insert(at, id);
        self.entries.insert(id, entry);
        true
    }

    /// Remove a shape, returning it with its list index.
    pub(crate) fn remove(&mut self, id: ShapeId) -> Option<(Entry, usize)> {
        let entry = self.entries.remove(&id)?;
        let list = self.list_mut(entry.shape.family());
        let index = list.iter().position(|s| *s == id).unwrap_or(list.len());
        list.retain(|s| *s != id);
        Some((entry, index))
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
        self.regions.clear();
        self.drawings.clear();
    }
}
