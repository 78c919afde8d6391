use crate::core::{BlockKey, DevelopmentId, Unit, UnitId};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

/// `(selected, total)` for one scope of the hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SelectionCount {
    pub selected: usize,
    pub total: usize,
}

impl SelectionCount {
    pub fn is_complete(&self) -> bool {
        self.total > 0 && self.selected == self.total
    }

    pub fn is_partial(&self) -> bool {
        self.selected > 0 && self.selected < self.total
    }
}

impl fmt::Display for SelectionCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}/{})", self.selected, self.total)
    }
}

/// Owned-unit set of one editing session.
///
/// Every operation works against the full loaded list. Search filtering is a
/// display concern and never narrows a bulk operation.
#[derive(Debug, Clone)]
pub struct SelectionState {
    units: Arc<Vec<Unit>>,
    known: HashSet<UnitId>,
    owned: HashSet<UnitId>,
    revision: u64,
}

impl SelectionState {
    /// Seeds the set with every unit the server already marks as owned.
    pub fn from_units(units: Arc<Vec<Unit>>) -> Self {
        let known = units.iter().map(|u| u.id).collect();
        let owned = units.iter().filter(|u| u.is_owned).map(|u| u.id).collect();
        Self {
            units,
            known,
            owned,
            revision: 0,
        }
    }

    pub fn units(&self) -> &Arc<Vec<Unit>> {
        &self.units
    }

    /// Bumped on every call that actually changed membership.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn is_selected(&self, id: UnitId) -> bool {
        self.owned.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.owned.len()
    }

    pub fn is_empty(&self) -> bool {
        self.owned.is_empty()
    }

    pub fn owned(&self) -> &HashSet<UnitId> {
        &self.owned
    }

    /// Selected ids in ascending order, ready for submission.
    pub fn selected_ids(&self) -> Vec<UnitId> {
        let mut ids: Vec<UnitId> = self.owned.iter().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Flips one unit. Returns the new membership; ids outside the loaded list
    /// are ignored and report `false`.
    pub fn toggle_unit(&mut self, id: UnitId) -> bool {
        if !self.known.contains(&id) {
            tracing::warn!("Ignoring toggle of unknown unit {}", id);
            return false;
        }
        let selected = if self.owned.remove(&id) {
            false
        } else {
            self.owned.insert(id);
            true
        };
        self.revision += 1;
        selected
    }

    pub fn select_all(&mut self) {
        self.apply(|_| true, true);
    }

    pub fn deselect_all(&mut self) {
        if !self.owned.is_empty() {
            self.owned.clear();
            self.revision += 1;
        }
    }

    pub fn select_development(&mut self, development_id: DevelopmentId) {
        self.apply(|u| u.development_id == development_id, true);
    }

    pub fn deselect_development(&mut self, development_id: DevelopmentId) {
        self.apply(|u| u.development_id == development_id, false);
    }

    pub fn select_block(&mut self, key: &BlockKey) {
        self.apply(|u| key.matches(u), true);
    }

    pub fn deselect_block(&mut self, key: &BlockKey) {
        self.apply(|u| key.matches(u), false);
    }

    pub fn development_count(&self, development_id: DevelopmentId) -> SelectionCount {
        self.count(|u| u.development_id == development_id)
    }

    pub fn block_count(&self, key: &BlockKey) -> SelectionCount {
        self.count(|u| key.matches(u))
    }

    pub fn total_count(&self) -> SelectionCount {
        SelectionCount {
            selected: self.owned.len(),
            total: self.units.len(),
        }
    }

    fn apply(&mut self, scope: impl Fn(&Unit) -> bool, select: bool) {
        let mut changed = false;
        for unit in self.units.iter().filter(|u| scope(u)) {
            changed |= if select {
                self.owned.insert(unit.id)
            } else {
                self.owned.remove(&unit.id)
            };
        }
        if changed {
            self.revision += 1;
        }
    }

    fn count(&self, scope: impl Fn(&Unit) -> bool) -> SelectionCount {
        self.units
            .iter()
            .filter(|u| scope(u))
            .fold(SelectionCount::default(), |mut acc, unit| {
                acc.total += 1;
                if self.owned.contains(&unit.id) {
                    acc.selected += 1;
                }
                acc
            })
    }
}
