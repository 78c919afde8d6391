use crate::adapters::cache::{DashboardCache, DashboardTotals};
use crate::core::editor::{OnUnsaved, SelectionEditor};
use crate::core::persister::SaveOutcome;
use crate::core::selection::SelectionState;
use crate::core::session::{ContentState, PendingChanges, TreeRow};
use crate::core::{BlockKey, DevelopmentId, GroupId, OwnershipViews, Result, UnitId, UnitsApi};
use crate::utils::error::SelectorError;
use std::fmt::Write as _;

/// Selection changes requested in one `assign` run.
#[derive(Debug, Clone, Default)]
pub struct AssignOps {
    pub select_all: bool,
    pub deselect_all: bool,
    pub select_development: Vec<DevelopmentId>,
    pub deselect_development: Vec<DevelopmentId>,
    pub select_block: Vec<BlockKey>,
    pub deselect_block: Vec<BlockKey>,
    pub toggle: Vec<UnitId>,
}

impl AssignOps {
    /// Applies broadest scope first so narrower operations can refine it.
    pub fn apply(&self, selection: &mut SelectionState) {
        if self.deselect_all {
            selection.deselect_all();
        }
        if self.select_all {
            selection.select_all();
        }
        for dev in &self.select_development {
            selection.select_development(*dev);
        }
        for dev in &self.deselect_development {
            selection.deselect_development(*dev);
        }
        for key in &self.select_block {
            selection.select_block(key);
        }
        for key in &self.deselect_block {
            selection.deselect_block(key);
        }
        for id in &self.toggle {
            selection.toggle_unit(*id);
        }
    }
}

#[derive(Debug, Clone)]
pub struct AssignReport {
    pub changes: PendingChanges,
    pub selected: usize,
    pub total: usize,
    pub saved: Option<SaveOutcome>,
}

pub fn render_text(rows: &[TreeRow]) -> String {
    let mut out = String::new();
    for row in rows {
        let _ = match row {
            TreeRow::Development {
                name,
                count,
                expanded,
                ..
            } => writeln!(out, "{} {} {}", marker(*expanded), name, count),
            TreeRow::Block {
                key,
                name,
                count,
                expanded,
            } => {
                let label = if name.is_empty() {
                    key.block.to_string()
                } else {
                    name.clone()
                };
                writeln!(out, "  {} {} {}", marker(*expanded), label, count)
            }
            TreeRow::Unit {
                id,
                name,
                status,
                value,
                typology,
                checked,
            } => writeln!(
                out,
                "    [{}] {} #{} {} {}{}",
                if *checked { "x" } else { " " },
                name,
                id,
                status,
                typology.as_deref().unwrap_or("-"),
                value.map(|v| format!(" {:.2}", v)).unwrap_or_default()
            ),
        };
    }
    out
}

fn marker(expanded: bool) -> &'static str {
    if expanded {
        "▾"
    } else {
        "▸"
    }
}

/// Loads a group and renders its tree, or the matching empty-state message.
pub async fn show<A, V>(
    editor: &mut SelectionEditor<A, V>,
    group: GroupId,
    query: &str,
    collapsed: bool,
) -> Result<String>
where
    A: UnitsApi + Clone,
    V: OwnershipViews,
{
    editor.open(group, OnUnsaved::Discard).await?;
    let session = editor
        .session_mut()
        .ok_or_else(|| SelectorError::InvalidTransition {
            action: "show".to_string(),
            state: "closed".to_string(),
        })?;
    session.set_query(query);
    if collapsed {
        session.expansion_mut().collapse_all();
    }

    let text = match session.content_state() {
        ContentState::NoUnits => format!("Group {} has no units\n", group),
        ContentState::NoMatches => format!("No units match '{}'\n", query.trim()),
        _ => {
            let total = session.selection().total_count();
            let mut text = render_text(&session.render());
            let _ = writeln!(text, "Selected {}", total);
            text
        }
    };
    Ok(text)
}

/// Applies `ops` to a freshly loaded group and submits unless `dry_run`.
pub async fn assign<A, V>(
    editor: &mut SelectionEditor<A, V>,
    group: GroupId,
    ops: &AssignOps,
    dry_run: bool,
) -> Result<AssignReport>
where
    A: UnitsApi + Clone,
    V: OwnershipViews,
{
    editor.open(group, OnUnsaved::Discard).await?;
    let session = editor
        .session_mut()
        .ok_or_else(|| SelectorError::InvalidTransition {
            action: "assign".to_string(),
            state: "closed".to_string(),
        })?;
    ops.apply(session.selection_mut());

    let changes = session.pending_changes();
    let count = session.selection().total_count();
    tracing::info!(
        "Group {}: +{} / -{} pending, {} selected",
        group,
        changes.added.len(),
        changes.removed.len(),
        count
    );

    let saved = if dry_run {
        editor.close()?;
        None
    } else {
        Some(editor.save().await?)
    };

    Ok(AssignReport {
        changes,
        selected: count.selected,
        total: count.total,
        saved,
    })
}

pub async fn export<A, V>(
    editor: &mut SelectionEditor<A, V>,
    group: GroupId,
    query: &str,
    output: &str,
) -> Result<usize>
where
    A: UnitsApi + Clone,
    V: OwnershipViews,
{
    editor.open(group, OnUnsaved::Discard).await?;
    let session = editor
        .session_mut()
        .ok_or_else(|| SelectorError::InvalidTransition {
            action: "export".to_string(),
            state: "closed".to_string(),
        })?;
    session.set_query(query);
    let written = super::export::export_to_path(output, session)?;
    editor.close()?;
    Ok(written)
}

pub async fn totals<A, V>(
    editor: &SelectionEditor<A, V>,
    cache: &DashboardCache,
    group: GroupId,
) -> Result<DashboardTotals>
where
    A: UnitsApi + Clone,
    V: OwnershipViews,
{
    cache.get_or_load(editor.loader(), group).await
}
