//! Selection sets, one per family.
//!
//! A selection is an ordered set of ids. It never mixes families: the
//! region set and the drawing set are kept apart, and every operation goes
//! through the set of the active surface.

use ov_core::id::ShapeId;
use ov_core::model::ShapeFamily;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    ids: Vec<ShapeId>,
}

impl Selection {
    pub fn as_slice(&self) -> &[ShapeId] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn contains(&self, id: ShapeId) -> bool {
        self.ids.contains(&id)
    }

    /// The only selected id, if exactly one is selected.
    pub fn single(&self) -> Option<ShapeId> {
        match self.ids.as_slice() {
            [id] => Some(*id),
            _ => None,
        }
    }

    pub fn replace(&mut self, id: ShapeId) {
        self.ids.clear();
        self.ids.push(id);
    }

    pub fn set(&mut self, ids: impl IntoIterator<Item = ShapeId>) {
        self.ids.clear();
        self.union(ids);
    }

    pub fn toggle(&mut self, id: ShapeId) {
        if let Some(pos) = self.ids.iter().position(|s| *s == id) {
            self.ids.remove(pos);
        } else {
            self.ids.push(id);
        }
    }

    /// Add every id not already present. Never removes.
    pub fn union(&mut self, ids: impl IntoIterator<Item = ShapeId>) {
        for id in ids {
            if !self.ids.contains(&id) {
                self.ids.push(id);
            }
        }
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn retain(&mut self, keep: impl FnMut(&ShapeId) -> bool) {
        self.ids.retain(keep);
    }
}

/// The two independent selection sets.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selections {
    pub regions: Selection,
    pub drawings: Selection,
}

impl Selections {
    pub fn get(&self, family: ShapeFamily) -> &Selection {
        match family {
            ShapeFamily::Region => &self.regions,
            ShapeFamily::Drawing => &self.drawings,
        }
    }

    pub fn get_mut(&mut self, family: ShapeFamily) -> &mut Selection {
        match family {
            ShapeFamily::Region => &mut self.regions,
            ShapeFamily::Drawing => &mut self.drawings,
        }
    }

    /// Drop ids from both sets.
    pub fn forget(&mut self, ids: &[ShapeId]) {
        self.regions.retain(|id| !ids.contains(id));
        self.drawings.retain(|id| !ids.contains(id));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> ShapeId {
        ShapeId::intern(s)
    }

    #[test]
    fn toggle_and_union() {
        let mut sel = Selection::default();
        sel.replace(id("a"));
        sel.toggle(id("b"));
        assert_eq!(sel.as_slice(), &[id("a"), id("b")]);
        sel.toggle(id("a"));
        assert_eq!(sel.single(), Some(id("b")));
        sel.union([id("b"), id("c")]);
        assert_eq!(sel.len(), 2);
    }

    #[test]
    fn families_stay_apart() {
        let mut sets = Selections::default();
        sets.get_mut(ShapeFamily::Region).replace(id("r"));
        assert!(sets.get(ShapeFamily::Drawing).is_empty());
        sets.get_mut(ShapeFamily::Drawing).replace(id("d"));
        sets.forget(&[id("r")]);
        assert!(sets.regions.is_empty());
        assert_eq!(sets.drawings.single(), Some(id("d")));
    }
}
