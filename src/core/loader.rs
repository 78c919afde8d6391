use crate::core::{GroupId, LoadedUnits, Result, Unit, UnitId, UnitsApi};
use crate::utils::error::SelectorError;
use std::collections::HashSet;
use std::sync::Arc;

pub const DEFAULT_PAGE_SIZE: usize = 500;

/// Accumulates every page of a group's units into one list.
///
/// Pages are fetched one after the other; the first failing page aborts the
/// whole load, so callers either get the full set or an error.
pub struct UnitLoader<A: UnitsApi> {
    api: A,
    page_size: usize,
}

impl<A: UnitsApi> UnitLoader<A> {
    pub fn new(api: A) -> Self {
        Self::with_page_size(api, DEFAULT_PAGE_SIZE)
    }

    pub fn with_page_size(api: A, page_size: usize) -> Self {
        Self {
            api,
            page_size: page_size.max(1),
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub async fn load_all(&self, group: GroupId) -> Result<LoadedUnits> {
        tracing::debug!("Loading units for group {} (page size {})", group, self.page_size);

        let first = self.api.list_units_page(group, 0, self.page_size).await?;
        let total = first.total;
        let mut units = Vec::with_capacity(total.max(first.items.len()));
        let mut seen = HashSet::with_capacity(total);
        let mut pages = 1usize;

        append_page(group, 0, first.items, &mut units, &mut seen)?;

        while units.len() < total {
            let offset = units.len();
            let page = self.api.list_units_page(group, offset, self.page_size).await?;
            pages += 1;

            if page.items.is_empty() {
                return Err(SelectorError::InconsistentPageError {
                    group,
                    offset,
                    message: format!("empty page before reaching total of {}", total),
                });
            }

            append_page(group, offset, page.items, &mut units, &mut seen)?;
        }

        tracing::info!(
            "Loaded {} units for group {} in {} page(s)",
            units.len(),
            group,
            pages
        );

        Ok(LoadedUnits {
            group,
            total,
            units: Arc::new(units),
        })
    }
}

fn append_page(
    group: GroupId,
    offset: usize,
    items: Vec<Unit>,
    units: &mut Vec<Unit>,
    seen: &mut HashSet<UnitId>,
) -> Result<()> {
    tracing::debug!("Group {} page at offset {}: {} item(s)", group, offset, items.len());

    for unit in items {
        if !seen.insert(unit.id) {
            return Err(SelectorError::InconsistentPageError {
                group,
                offset,
                message: format!("unit {} returned twice", unit.id),
            });
        }
        units.push(unit);
    }
    Ok(())
}
