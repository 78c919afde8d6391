use crate::core::grouping::{BlockGroup, DevelopmentGroup, UnitTree};
use crate::core::Unit;
use std::borrow::Cow;

/// Lowercased search needle. `None` for blank input, which means "no filter".
/// Non-blank input is kept as typed, surrounding spaces included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery(Option<String>);

impl SearchQuery {
    pub fn parse(raw: &str) -> Self {
        if raw.trim().is_empty() {
            Self(None)
        } else {
            Self(Some(raw.to_lowercase()))
        }
    }

    pub fn is_blank(&self) -> bool {
        self.0.is_none()
    }

    pub fn needle(&self) -> Option<&str> {
        self.0.as_deref()
    }

    /// A unit matches when the needle occurs in its name, block name,
    /// development name or typology.
    pub fn matches(&self, unit: &Unit) -> bool {
        let Some(needle) = self.needle() else {
            return true;
        };
        [
            Some(unit.name.as_str()),
            unit.block_name.as_deref(),
            Some(unit.development_name.as_str()),
            unit.typology.as_deref(),
        ]
        .into_iter()
        .flatten()
        .any(|field| field.to_lowercase().contains(needle))
    }
}

/// Prunes the tree to blocks with at least one matching unit and developments
/// with at least one kept block. A blank query hands back the input untouched.
pub fn filter_tree<'a>(tree: &'a UnitTree, query: &SearchQuery) -> Cow<'a, UnitTree> {
    if query.is_blank() {
        return Cow::Borrowed(tree);
    }

    let developments = tree
        .developments
        .iter()
        .filter_map(|development| {
            let blocks: Vec<BlockGroup> = development
                .blocks
                .iter()
                .filter_map(|block| {
                    let units: Vec<Unit> = block
                        .units
                        .iter()
                        .filter(|unit| query.matches(unit))
                        .cloned()
                        .collect();
                    (!units.is_empty()).then(|| BlockGroup {
                        key: block.key.clone(),
                        name: block.name.clone(),
                        units,
                    })
                })
                .collect();
            (!blocks.is_empty()).then(|| DevelopmentGroup {
                id: development.id,
                name: development.name.clone(),
                blocks,
            })
        })
        .collect();

    Cow::Owned(UnitTree { developments })
}
