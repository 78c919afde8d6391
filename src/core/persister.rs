use crate::core::selection::SelectionState;
use crate::core::{GroupId, OwnershipViews, Result, UnitsApi};
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, PartialEq)]
pub struct SaveOutcome {
    pub group: GroupId,
    pub message: String,
    pub submitted: usize,
    pub saved_at: DateTime<Utc>,
}

/// Submits a group's owned-unit set and invalidates views derived from it.
pub struct Persister<A: UnitsApi, V: OwnershipViews> {
    api: A,
    views: V,
}

impl<A: UnitsApi, V: OwnershipViews> Persister<A, V> {
    pub fn new(api: A, views: V) -> Self {
        Self { api, views }
    }

    pub fn views(&self) -> &V {
        &self.views
    }

    /// The selection is only read; on failure the caller still holds it
    /// exactly as it was.
    pub async fn save(&self, group: GroupId, selection: &SelectionState) -> Result<SaveOutcome> {
        let ids = selection.selected_ids();
        tracing::debug!("Submitting {} owned unit(s) for group {}", ids.len(), group);

        let response = match self.api.submit_ownership(group, &ids).await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("Ownership submission for group {} failed: {}", group, e);
                return Err(e);
            }
        };

        self.views.invalidate_ownership(group);
        tracing::info!("Saved ownership for group {}: {}", group, response.message);

        Ok(SaveOutcome {
            group,
            message: response.message,
            submitted: ids.len(),
            saved_at: Utc::now(),
        })
    }
}
