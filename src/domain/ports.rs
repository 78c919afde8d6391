use crate::domain::model::{GroupId, SubmitResponse, UnitId, UnitPage};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Remote operations the selection engine consumes.
#[async_trait]
pub trait UnitsApi: Send + Sync {
    /// One page of a group's units. Ordering must be stable across calls of a
    /// loading session.
    async fn list_units_page(&self, group: GroupId, offset: usize, limit: usize)
        -> Result<UnitPage>;

    /// Replaces the group's full ownership set.
    async fn submit_ownership(&self, group: GroupId, unit_ids: &[UnitId])
        -> Result<SubmitResponse>;
}

#[async_trait]
impl<T: UnitsApi + ?Sized> UnitsApi for Arc<T> {
    async fn list_units_page(
        &self,
        group: GroupId,
        offset: usize,
        limit: usize,
    ) -> Result<UnitPage> {
        (**self).list_units_page(group, offset, limit).await
    }

    async fn submit_ownership(
        &self,
        group: GroupId,
        unit_ids: &[UnitId],
    ) -> Result<SubmitResponse> {
        (**self).submit_ownership(group, unit_ids).await
    }
}

/// Cached aggregate views (dashboard totals) that depend on ownership.
pub trait OwnershipViews: Send + Sync {
    fn invalidate_ownership(&self, group: GroupId);
}

impl<T: OwnershipViews + ?Sized> OwnershipViews for Arc<T> {
    fn invalidate_ownership(&self, group: GroupId) {
        (**self).invalidate_ownership(group)
    }
}

pub trait ConfigProvider: Send + Sync {
    fn api_base_url(&self) -> &str;
    fn api_token(&self) -> Option<&str>;
    fn page_size(&self) -> usize;
    fn timeout_seconds(&self) -> u64;
}
