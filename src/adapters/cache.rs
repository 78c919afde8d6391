use crate::core::loader::UnitLoader;
use crate::core::{GroupId, OwnershipViews, Result, Unit, UnitsApi};
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Ownership aggregates shown on the dashboard for one group.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DashboardTotals {
    pub units: usize,
    pub owned_units: usize,
    pub owned_value: f64,
}

impl DashboardTotals {
    pub fn from_units(units: &[Unit]) -> Self {
        units.iter().fold(Self::default(), |mut acc, unit| {
            acc.units += 1;
            if unit.is_owned {
                acc.owned_units += 1;
                acc.owned_value += unit.value.unwrap_or(0.0);
            }
            acc
        })
    }
}

/// Per-group dashboard totals, dropped whenever a group's ownership is saved.
#[derive(Debug, Default)]
pub struct DashboardCache {
    totals: RwLock<HashMap<GroupId, DashboardTotals>>,
}

impl DashboardCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, group: GroupId) -> Option<DashboardTotals> {
        self.read().get(&group).copied()
    }

    pub fn store(&self, group: GroupId, totals: DashboardTotals) {
        self.write().insert(group, totals);
    }

    // A writer panicked mid-update; entries are plain values, so the map is
    // still usable.
    fn read(&self) -> RwLockReadGuard<'_, HashMap<GroupId, DashboardTotals>> {
        self.totals.read().unwrap_or_else(|poisoned| {
            tracing::warn!("⚠️ Dashboard cache lock was poisoned, recovering");
            PoisonError::into_inner(poisoned)
        })
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<GroupId, DashboardTotals>> {
        self.totals.write().unwrap_or_else(|poisoned| {
            tracing::warn!("⚠️ Dashboard cache lock was poisoned, recovering");
            PoisonError::into_inner(poisoned)
        })
    }

    /// Cached totals, or a full reload of the group when none are cached.
    pub async fn get_or_load<A: UnitsApi>(
        &self,
        loader: &UnitLoader<A>,
        group: GroupId,
    ) -> Result<DashboardTotals> {
        if let Some(totals) = self.get(group) {
            return Ok(totals);
        }
        let loaded = loader.load_all(group).await?;
        let totals = DashboardTotals::from_units(&loaded.units);
        self.store(group, totals);
        Ok(totals)
    }
}

impl OwnershipViews for DashboardCache {
    fn invalidate_ownership(&self, group: GroupId) {
        if self.write().remove(&group).is_some() {
            tracing::debug!("Invalidated dashboard totals for group {}", group);
        }
    }
}

/// For callers without cached views.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopViews;

impl OwnershipViews for NoopViews {
    fn invalidate_ownership(&self, _group: GroupId) {}
}
