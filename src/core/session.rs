use crate::core::expansion::ExpansionState;
use crate::core::grouping::UnitTree;
use crate::core::search::{filter_tree, SearchQuery};
use crate::core::selection::{SelectionCount, SelectionState};
use crate::core::{BlockKey, DevelopmentId, GroupId, LoadedUnits, Unit, UnitId};
use std::collections::HashSet;
use std::sync::Arc;

/// What the tree area shows. The three empty cases stay distinct.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentState {
    Closed,
    Loading,
    LoadFailed,
    NoUnits,
    NoMatches,
    Tree,
}

/// One visible line of the rendered tree.
#[derive(Debug, Clone, PartialEq)]
pub enum TreeRow {
    Development {
        id: DevelopmentId,
        name: String,
        count: SelectionCount,
        expanded: bool,
    },
    Block {
        key: BlockKey,
        name: String,
        count: SelectionCount,
        expanded: bool,
    },
    Unit {
        id: UnitId,
        name: String,
        status: String,
        value: Option<f64>,
        typology: Option<String>,
        checked: bool,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PendingChanges {
    pub added: Vec<UnitId>,
    pub removed: Vec<UnitId>,
}

impl PendingChanges {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }

    pub fn len(&self) -> usize {
        self.added.len() + self.removed.len()
    }
}

type FilterKey = (usize, SearchQuery);

/// Editable state of one group once its units are loaded.
#[derive(Debug, Clone)]
pub struct Session {
    group: GroupId,
    tree: UnitTree,
    selection: SelectionState,
    loaded_owned: HashSet<UnitId>,
    expansion: ExpansionState,
    query: SearchQuery,
    filtered: Option<(FilterKey, UnitTree)>,
    last_error: Option<String>,
}

impl Session {
    pub fn new(loaded: LoadedUnits) -> Self {
        let tree = UnitTree::build(&loaded.units);
        let expansion = ExpansionState::fully_expanded(&tree);
        let selection = SelectionState::from_units(loaded.units);
        let loaded_owned = selection.owned().clone();
        Self {
            group: loaded.group,
            tree,
            selection,
            loaded_owned,
            expansion,
            query: SearchQuery::parse(""),
            filtered: None,
            last_error: None,
        }
    }

    pub fn group(&self) -> GroupId {
        self.group
    }

    pub fn units(&self) -> &Arc<Vec<Unit>> {
        self.selection.units()
    }

    /// Full, unfiltered hierarchy.
    pub fn tree(&self) -> &UnitTree {
        &self.tree
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn selection_mut(&mut self) -> &mut SelectionState {
        &mut self.selection
    }

    pub fn expansion(&self) -> &ExpansionState {
        &self.expansion
    }

    pub fn expansion_mut(&mut self) -> &mut ExpansionState {
        &mut self.expansion
    }

    pub fn expand_all(&mut self) {
        self.expansion.expand_all(&self.tree);
    }

    pub fn query(&self) -> &SearchQuery {
        &self.query
    }

    pub fn set_query(&mut self, raw: &str) {
        self.query = SearchQuery::parse(raw);
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub(crate) fn set_last_error(&mut self, error: Option<String>) {
        self.last_error = error;
    }

    /// Tree after the current search query, memoized on the unit list
    /// identity and the query.
    pub fn visible_tree(&mut self) -> &UnitTree {
        self.refresh_filter();
        self.current_tree()
    }

    /// Visible tree together with the selection, for callers that need both.
    pub fn view(&mut self) -> (&UnitTree, &SelectionState) {
        self.refresh_filter();
        (self.current_tree(), &self.selection)
    }

    pub fn content_state(&mut self) -> ContentState {
        if self.tree.is_empty() {
            ContentState::NoUnits
        } else if self.visible_tree().is_empty() {
            ContentState::NoMatches
        } else {
            ContentState::Tree
        }
    }

    /// Flattens the visible tree; children of collapsed nodes are skipped.
    /// Counts always cover the full unit list, not the filtered view.
    pub fn render(&mut self) -> Vec<TreeRow> {
        self.refresh_filter();
        let tree = self.current_tree();
        let mut rows = Vec::new();

        for development in &tree.developments {
            let expanded = self.expansion.is_development_expanded(development.id);
            rows.push(TreeRow::Development {
                id: development.id,
                name: development.name.clone(),
                count: self.selection.development_count(development.id),
                expanded,
            });
            if !expanded {
                continue;
            }

            for block in &development.blocks {
                let expanded = self.expansion.is_block_expanded(&block.key);
                rows.push(TreeRow::Block {
                    key: block.key.clone(),
                    name: block.name.clone(),
                    count: self.selection.block_count(&block.key),
                    expanded,
                });
                if !expanded {
                    continue;
                }

                rows.extend(block.units.iter().map(|unit| TreeRow::Unit {
                    id: unit.id,
                    name: unit.name.clone(),
                    status: unit.status.clone(),
                    value: unit.value,
                    typology: unit.typology.clone(),
                    checked: self.selection.is_selected(unit.id),
                }));
            }
        }
        rows
    }

    pub fn pending_changes(&self) -> PendingChanges {
        let owned = self.selection.owned();
        let mut added: Vec<UnitId> = owned.difference(&self.loaded_owned).copied().collect();
        let mut removed: Vec<UnitId> = self.loaded_owned.difference(owned).copied().collect();
        added.sort_unstable();
        removed.sort_unstable();
        PendingChanges { added, removed }
    }

    pub fn is_dirty(&self) -> bool {
        self.selection.owned() != &self.loaded_owned
    }

    fn refresh_filter(&mut self) {
        if self.query.is_blank() {
            return;
        }
        let key = (Arc::as_ptr(self.selection.units()) as usize, self.query.clone());
        let fresh = matches!(&self.filtered, Some((cached, _)) if *cached == key);
        if !fresh {
            let filtered = filter_tree(&self.tree, &self.query).into_owned();
            self.filtered = Some((key, filtered));
        }
    }

    fn current_tree(&self) -> &UnitTree {
        match &self.filtered {
            Some((_, filtered)) if !self.query.is_blank() => filtered,
            _ => &self.tree,
        }
    }
}
