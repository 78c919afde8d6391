use crate::core::loader::UnitLoader;
use crate::core::persister::{Persister, SaveOutcome};
use crate::core::session::{ContentState, Session};
use crate::core::{GroupId, LoadedUnits, OwnershipViews, Result, UnitsApi};
use crate::utils::error::SelectorError;

/// What to do with unsaved edits when another load would replace them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnUnsaved {
    /// Refuse the switch and report the pending edits.
    Refuse,
    /// The user confirmed losing them.
    Discard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    pub group: GroupId,
    generation: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaveTicket {
    pub group: GroupId,
    generation: u64,
}

#[derive(Debug)]
enum Phase {
    Closed,
    Loading { group: GroupId },
    LoadFailed { group: GroupId, error: String },
    Ready(Box<Session>),
    Saving(Box<Session>),
}

impl Phase {
    fn name(&self) -> &'static str {
        match self {
            Phase::Closed => "closed",
            Phase::Loading { .. } => "loading",
            Phase::LoadFailed { .. } => "load-failed",
            Phase::Ready(_) => "ready",
            Phase::Saving(_) => "saving",
        }
    }
}

/// Ownership editor for one group at a time:
/// `Closed → Loading → Ready → Saving → (Closed | Ready with error)`.
///
/// Async work is split into `begin_*`/`finish_*` pairs. Each `begin_*` hands
/// out a ticket; a `finish_*` whose ticket no longer matches the current
/// generation (editor closed or moved to another group meanwhile) is dropped.
pub struct SelectionEditor<A: UnitsApi + Clone, V: OwnershipViews> {
    loader: UnitLoader<A>,
    persister: Persister<A, V>,
    phase: Phase,
    generation: u64,
}

impl<A: UnitsApi + Clone, V: OwnershipViews> SelectionEditor<A, V> {
    pub fn new(api: A, views: V) -> Self {
        Self::from_parts(UnitLoader::new(api.clone()), Persister::new(api, views))
    }

    pub fn with_page_size(api: A, views: V, page_size: usize) -> Self {
        Self::from_parts(
            UnitLoader::with_page_size(api.clone(), page_size),
            Persister::new(api, views),
        )
    }

    fn from_parts(loader: UnitLoader<A>, persister: Persister<A, V>) -> Self {
        Self {
            loader,
            persister,
            phase: Phase::Closed,
            generation: 0,
        }
    }

    pub fn loader(&self) -> &UnitLoader<A> {
        &self.loader
    }

    pub fn persister(&self) -> &Persister<A, V> {
        &self.persister
    }

    pub fn state_name(&self) -> &'static str {
        self.phase.name()
    }

    pub fn group(&self) -> Option<GroupId> {
        match &self.phase {
            Phase::Closed => None,
            Phase::Loading { group } | Phase::LoadFailed { group, .. } => Some(*group),
            Phase::Ready(session) | Phase::Saving(session) => Some(session.group()),
        }
    }

    pub fn is_open(&self) -> bool {
        !matches!(self.phase, Phase::Closed)
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.phase, Phase::Loading { .. })
    }

    pub fn is_saving(&self) -> bool {
        matches!(self.phase, Phase::Saving(_))
    }

    pub fn load_error(&self) -> Option<&str> {
        match &self.phase {
            Phase::LoadFailed { error, .. } => Some(error.as_str()),
            _ => None,
        }
    }

    /// Loaded session, readable while ready or saving.
    pub fn session(&self) -> Option<&Session> {
        match &self.phase {
            Phase::Ready(session) | Phase::Saving(session) => Some(&**session),
            _ => None,
        }
    }

    /// Editable only while ready; a save in flight freezes the selection.
    pub fn session_mut(&mut self) -> Option<&mut Session> {
        match &mut self.phase {
            Phase::Ready(session) => Some(&mut **session),
            _ => None,
        }
    }

    pub fn content_state(&mut self) -> ContentState {
        match &mut self.phase {
            Phase::Closed => ContentState::Closed,
            Phase::Loading { .. } => ContentState::Loading,
            Phase::LoadFailed { .. } => ContentState::LoadFailed,
            Phase::Ready(session) | Phase::Saving(session) => session.content_state(),
        }
    }

    pub fn begin_load(&mut self, group: GroupId, on_unsaved: OnUnsaved) -> Result<LoadTicket> {
        match &self.phase {
            Phase::Saving(_) => return Err(self.invalid("load a group")),
            Phase::Ready(session) if session.is_dirty() && on_unsaved == OnUnsaved::Refuse => {
                return Err(SelectorError::UnsavedChanges {
                    group: session.group(),
                    pending: session.pending_changes().len(),
                });
            }
            Phase::Ready(session) if session.is_dirty() => {
                tracing::info!(
                    "Discarding {} unsaved change(s) for group {}",
                    session.pending_changes().len(),
                    session.group()
                );
            }
            _ => {}
        }

        self.generation += 1;
        self.phase = Phase::Loading { group };
        tracing::debug!("Loading group {} (generation {})", group, self.generation);
        Ok(LoadTicket {
            group,
            generation: self.generation,
        })
    }

    /// Applies a load result. `Ok(false)` means the result was stale and
    /// dropped; a failed load moves the editor to `load-failed`.
    pub fn finish_load(&mut self, ticket: LoadTicket, result: Result<LoadedUnits>) -> Result<bool> {
        if !self.is_current(ticket.generation) || !self.is_loading() {
            tracing::debug!("Dropping stale load result for group {}", ticket.group);
            return Ok(false);
        }

        match result {
            Ok(loaded) => {
                tracing::debug!("Group {} ready with {} unit(s)", ticket.group, loaded.units.len());
                self.phase = Phase::Ready(Box::new(Session::new(loaded)));
                Ok(true)
            }
            Err(e) => {
                tracing::warn!("Loading group {} failed: {}", ticket.group, e);
                self.phase = Phase::LoadFailed {
                    group: ticket.group,
                    error: e.user_friendly_message(),
                };
                Err(e)
            }
        }
    }

    /// Loads `group` and moves to ready, or to load-failed on error.
    pub async fn open(&mut self, group: GroupId, on_unsaved: OnUnsaved) -> Result<()> {
        let ticket = self.begin_load(group, on_unsaved)?;
        let result = self.loader.load_all(group).await;
        self.finish_load(ticket, result).map(|_| ())
    }

    /// Retries a failed load of the same group.
    pub async fn retry(&mut self) -> Result<()> {
        let Phase::LoadFailed { group, .. } = &self.phase else {
            return Err(self.invalid("retry"));
        };
        let group = *group;
        self.open(group, OnUnsaved::Discard).await
    }

    pub fn begin_save(&mut self) -> Result<SaveTicket> {
        let session = match std::mem::replace(&mut self.phase, Phase::Closed) {
            Phase::Ready(session) => session,
            Phase::Saving(session) => {
                let group = session.group();
                self.phase = Phase::Saving(session);
                return Err(SelectorError::SaveInFlight { group });
            }
            other => {
                self.phase = other;
                return Err(self.invalid("save"));
            }
        };

        self.generation += 1;
        let ticket = SaveTicket {
            group: session.group(),
            generation: self.generation,
        };
        self.phase = Phase::Saving(session);
        Ok(ticket)
    }

    /// Applies a save result. Success closes the editor; failure returns to
    /// ready with the selection untouched and the error recorded on the
    /// session. `Ok(None)` means the result arrived after the editor was torn
    /// down and was dropped.
    pub fn finish_save(
        &mut self,
        ticket: SaveTicket,
        result: Result<SaveOutcome>,
    ) -> Result<Option<SaveOutcome>> {
        if !self.is_current(ticket.generation) || !self.is_saving() {
            tracing::debug!("Dropping stale save result for group {}", ticket.group);
            return Ok(None);
        }

        let Phase::Saving(mut session) = std::mem::replace(&mut self.phase, Phase::Closed) else {
            return Ok(None);
        };

        match result {
            Ok(outcome) => Ok(Some(outcome)),
            Err(e) => {
                session.set_last_error(Some(e.user_friendly_message()));
                self.phase = Phase::Ready(session);
                Err(e)
            }
        }
    }

    /// Submits the current selection; at most one save runs at a time.
    pub async fn save(&mut self) -> Result<SaveOutcome> {
        let ticket = self.begin_save()?;
        let result = match &self.phase {
            Phase::Saving(session) => self.persister.save(ticket.group, session.selection()).await,
            _ => Err(self.invalid("save")),
        };
        match self.finish_save(ticket, result)? {
            Some(outcome) => Ok(outcome),
            None => Err(self.invalid("finish save")),
        }
    }

    /// User-initiated close; refused while a save is in flight.
    pub fn close(&mut self) -> Result<()> {
        if let Phase::Saving(session) = &self.phase {
            return Err(SelectorError::SaveInFlight {
                group: session.group(),
            });
        }
        self.teardown();
        Ok(())
    }

    /// Unconditional teardown (the editor went away). Anything still in
    /// flight will be dropped on arrival.
    pub fn teardown(&mut self) {
        self.generation += 1;
        self.phase = Phase::Closed;
    }

    fn is_current(&self, generation: u64) -> bool {
        generation == self.generation
    }

    fn invalid(&self, action: &str) -> SelectorError {
        SelectorError::InvalidTransition {
            action: action.to_string(),
            state: self.phase.name().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{SubmitResponse, Unit, UnitId, UnitPage};
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};

    struct FakeApi {
        units: Vec<Unit>,
        fail_load: Mutex<bool>,
        reject_submit: Mutex<bool>,
        submitted: Mutex<Vec<Vec<UnitId>>>,
    }

    impl FakeApi {
        fn new(count: i64) -> Arc<Self> {
            let units = (1..=count)
                .map(|id| Unit {
                    id,
                    name: format!("{}", id),
                    development_id: 1,
                    development_name: "Dev".to_string(),
                    block_code: None,
                    block_name: None,
                    status: String::new(),
                    value: None,
                    typology: None,
                    is_owned: id == 1,
                })
                .collect();
            Arc::new(Self {
                units,
                fail_load: Mutex::new(false),
                reject_submit: Mutex::new(false),
                submitted: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl UnitsApi for FakeApi {
        async fn list_units_page(&self, _: GroupId, offset: usize, limit: usize) -> Result<UnitPage> {
            if *self.fail_load.lock().unwrap() {
                return Err(SelectorError::HttpStatusError {
                    status: 502,
                    body: String::new(),
                });
            }
            let end = (offset + limit).min(self.units.len());
            Ok(UnitPage {
                total: self.units.len(),
                items: self.units[offset..end].to_vec(),
            })
        }

        async fn submit_ownership(&self, _: GroupId, ids: &[UnitId]) -> Result<SubmitResponse> {
            self.submitted.lock().unwrap().push(ids.to_vec());
            if *self.reject_submit.lock().unwrap() {
                return Err(SelectorError::HttpStatusError {
                    status: 500,
                    body: String::new(),
                });
            }
            Ok(SubmitResponse {
                message: "ok".to_string(),
            })
        }
    }

    struct NoViews;

    impl OwnershipViews for NoViews {
        fn invalidate_ownership(&self, _group: GroupId) {}
    }

    fn editor(api: &Arc<FakeApi>) -> SelectionEditor<Arc<FakeApi>, NoViews> {
        SelectionEditor::new(api.clone(), NoViews)
    }

    #[tokio::test]
    async fn test_open_seeds_session() {
        let api = FakeApi::new(3);
        let mut editor = editor(&api);
        assert_eq!(editor.content_state(), ContentState::Closed);

        editor.open(1, OnUnsaved::Refuse).await.unwrap();

        assert_eq!(editor.state_name(), "ready");
        assert_eq!(editor.session().unwrap().selection().selected_ids(), vec![1]);
        assert_eq!(editor.content_state(), ContentState::Tree);
    }

    #[tokio::test]
    async fn test_load_failure_leaves_no_session_and_retry_recovers() {
        let api = FakeApi::new(3);
        *api.fail_load.lock().unwrap() = true;
        let mut editor = editor(&api);

        assert!(editor.open(1, OnUnsaved::Refuse).await.is_err());
        assert_eq!(editor.content_state(), ContentState::LoadFailed);
        assert!(editor.session().is_none());
        assert!(editor.load_error().is_some());

        *api.fail_load.lock().unwrap() = false;
        editor.retry().await.unwrap();
        assert_eq!(editor.state_name(), "ready");
    }

    #[tokio::test]
    async fn test_switching_group_requires_discard_decision() {
        let api = FakeApi::new(3);
        let mut editor = editor(&api);
        editor.open(1, OnUnsaved::Refuse).await.unwrap();
        editor.session_mut().unwrap().selection_mut().toggle_unit(2);

        let refused = editor.open(2, OnUnsaved::Refuse).await;
        assert!(matches!(
            refused,
            Err(SelectorError::UnsavedChanges { group: 1, pending: 1 })
        ));
        assert_eq!(editor.group(), Some(1));

        editor.open(2, OnUnsaved::Discard).await.unwrap();
        assert_eq!(editor.group(), Some(2));
        assert!(!editor.session().unwrap().is_dirty());
    }

    #[tokio::test]
    async fn test_stale_load_dropped_after_close() {
        let api = FakeApi::new(3);
        let mut editor = editor(&api);

        let ticket = editor.begin_load(1, OnUnsaved::Refuse).unwrap();
        let result = editor.loader().load_all(1).await;
        editor.close().unwrap();

        assert_eq!(editor.finish_load(ticket, result).unwrap(), false);
        assert!(!editor.is_open());
    }

    #[tokio::test]
    async fn test_stale_load_dropped_after_group_switch() {
        let api = FakeApi::new(3);
        let mut editor = editor(&api);

        let first = editor.begin_load(1, OnUnsaved::Refuse).unwrap();
        let second = editor.begin_load(2, OnUnsaved::Refuse).unwrap();
        let first_result = editor.loader().load_all(1).await;
        let second_result = editor.loader().load_all(2).await;

        assert!(!editor.finish_load(first, first_result).unwrap());
        assert!(editor.finish_load(second, second_result).unwrap());
        assert_eq!(editor.group(), Some(2));
    }

    #[tokio::test]
    async fn test_second_save_and_close_rejected_while_in_flight() {
        let api = FakeApi::new(3);
        let mut editor = editor(&api);
        editor.open(1, OnUnsaved::Refuse).await.unwrap();

        let ticket = editor.begin_save().unwrap();
        assert!(editor.is_saving());
        assert!(matches!(editor.begin_save(), Err(SelectorError::SaveInFlight { group: 1 })));
        assert!(matches!(editor.close(), Err(SelectorError::SaveInFlight { .. })));
        assert!(editor.session_mut().is_none());
        assert!(editor.begin_load(2, OnUnsaved::Discard).is_err());

        let outcome = SaveOutcome {
            group: 1,
            message: "ok".to_string(),
            submitted: 1,
            saved_at: chrono::Utc::now(),
        };
        let finished = editor.finish_save(ticket, Ok(outcome)).unwrap();
        assert!(finished.is_some());
        assert!(!editor.is_open());
    }

    #[tokio::test]
    async fn test_failed_save_keeps_selection_and_stays_open() {
        let api = FakeApi::new(4);
        *api.reject_submit.lock().unwrap() = true;
        let mut editor = editor(&api);
        editor.open(1, OnUnsaved::Refuse).await.unwrap();
        editor.session_mut().unwrap().selection_mut().select_all();
        let before = editor.session().unwrap().selection().owned().clone();

        assert!(editor.save().await.is_err());

        let session = editor.session().unwrap();
        assert_eq!(editor.state_name(), "ready");
        assert_eq!(session.selection().owned(), &before);
        assert!(session.last_error().is_some());

        *api.reject_submit.lock().unwrap() = false;
        let outcome = editor.save().await.unwrap();
        assert_eq!(outcome.submitted, 4);
        assert!(!editor.is_open());
        assert_eq!(api.submitted.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_save_result_dropped_after_teardown() {
        let api = FakeApi::new(2);
        let mut editor = editor(&api);
        editor.open(1, OnUnsaved::Refuse).await.unwrap();

        let ticket = editor.begin_save().unwrap();
        editor.teardown();
        let late = editor.finish_save(
            ticket,
            Err(SelectorError::HttpStatusError {
                status: 500,
                body: String::new(),
            }),
        );

        assert!(matches!(late, Ok(None)));
        assert!(!editor.is_open());
    }

    #[tokio::test]
    async fn test_save_requires_ready_state() {
        let api = FakeApi::new(2);
        let mut editor = editor(&api);

        assert!(matches!(
            editor.begin_save(),
            Err(SelectorError::InvalidTransition { .. })
        ));
        assert!(editor.retry().await.is_err());
    }
}
