use crate::core::grouping::UnitTree;
use crate::core::{BlockKey, DevelopmentId};
use std::collections::HashSet;

/// Which developments and blocks are open in the tree. Never persisted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExpansionState {
    developments: HashSet<DevelopmentId>,
    blocks: HashSet<BlockKey>,
}

impl ExpansionState {
    /// Everything present in `tree` starts expanded.
    pub fn fully_expanded(tree: &UnitTree) -> Self {
        Self {
            developments: tree.development_ids().collect(),
            blocks: tree.block_keys().cloned().collect(),
        }
    }

    pub fn is_development_expanded(&self, id: DevelopmentId) -> bool {
        self.developments.contains(&id)
    }

    pub fn is_block_expanded(&self, key: &BlockKey) -> bool {
        self.blocks.contains(key)
    }

    /// Returns whether the development is expanded afterwards.
    pub fn toggle_development(&mut self, id: DevelopmentId) -> bool {
        if self.developments.remove(&id) {
            false
        } else {
            self.developments.insert(id);
            true
        }
    }

    pub fn toggle_block(&mut self, key: &BlockKey) -> bool {
        if self.blocks.remove(key) {
            false
        } else {
            self.blocks.insert(key.clone());
            true
        }
    }

    pub fn expand_all(&mut self, tree: &UnitTree) {
        *self = Self::fully_expanded(tree);
    }

    pub fn collapse_all(&mut self) {
        self.developments.clear();
        self.blocks.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{BlockCode, Unit};

    fn unit(id: i64, dev: i64, block: Option<&str>) -> Unit {
        Unit {
            id,
            name: id.to_string(),
            development_id: dev,
            development_name: format!("Dev {}", dev),
            block_code: block.map(str::to_string),
            block_name: None,
            status: String::new(),
            value: None,
            typology: None,
            is_owned: false,
        }
    }

    fn tree() -> UnitTree {
        UnitTree::build(&[unit(1, 1, Some("A")), unit(2, 1, None), unit(3, 2, Some("A"))])
    }

    #[test]
    fn test_seeded_fully_expanded() {
        let state = ExpansionState::fully_expanded(&tree());

        assert!(state.is_development_expanded(1));
        assert!(state.is_development_expanded(2));
        assert!(state.is_block_expanded(&BlockKey::new(1, BlockCode::NoBlock)));
        assert!(state.is_block_expanded(&BlockKey::new(2, BlockCode::Code("A".into()))));
        assert!(!state.is_block_expanded(&BlockKey::new(2, BlockCode::NoBlock)));
    }

    #[test]
    fn test_development_and_block_toggles_are_independent() {
        let mut state = ExpansionState::fully_expanded(&tree());
        let block = BlockKey::new(1, BlockCode::Code("A".into()));

        assert!(!state.toggle_development(1));
        assert!(state.is_block_expanded(&block));

        assert!(!state.toggle_block(&block));
        assert!(state.toggle_development(1));
        assert!(!state.is_block_expanded(&block));
        assert!(state.toggle_block(&block));
    }

    #[test]
    fn test_collapse_then_expand_all() {
        let tree = tree();
        let mut state = ExpansionState::fully_expanded(&tree);

        state.collapse_all();
        assert!(!state.is_development_expanded(1));

        state.expand_all(&tree);
        assert_eq!(state, ExpansionState::fully_expanded(&tree));
    }
}
