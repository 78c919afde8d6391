use crate::core::{BlockKey, DevelopmentId, Unit};
use std::cmp::Ordering;
use std::collections::HashMap;

/// Units of one block, sorted by name.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockGroup {
    pub key: BlockKey,
    pub name: String,
    pub units: Vec<Unit>,
}

/// Blocks of one development, sorted by block name.
#[derive(Debug, Clone, PartialEq)]
pub struct DevelopmentGroup {
    pub id: DevelopmentId,
    pub name: String,
    pub blocks: Vec<BlockGroup>,
}

impl DevelopmentGroup {
    pub fn units(&self) -> impl Iterator<Item = &Unit> {
        self.blocks.iter().flat_map(|block| block.units.iter())
    }

    pub fn unit_count(&self) -> usize {
        self.blocks.iter().map(|block| block.units.len()).sum()
    }
}

/// Development → block → unit hierarchy built from a flat unit list.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct UnitTree {
    pub developments: Vec<DevelopmentGroup>,
}

impl UnitTree {
    pub fn build(units: &[Unit]) -> Self {
        let mut developments: Vec<DevelopmentGroup> = Vec::new();
        let mut development_index: HashMap<DevelopmentId, usize> = HashMap::new();
        let mut block_index: HashMap<BlockKey, usize> = HashMap::new();

        for unit in units {
            let dev_pos = *development_index
                .entry(unit.development_id)
                .or_insert_with(|| {
                    developments.push(DevelopmentGroup {
                        id: unit.development_id,
                        name: unit.development_name.clone(),
                        blocks: Vec::new(),
                    });
                    developments.len() - 1
                });
            let development = &mut developments[dev_pos];

            let key = unit.block_key();
            let block_pos = match block_index.get(&key) {
                Some(pos) => *pos,
                None => {
                    development.blocks.push(BlockGroup {
                        key: key.clone(),
                        name: unit.block_label().to_string(),
                        units: Vec::new(),
                    });
                    let pos = development.blocks.len() - 1;
                    block_index.insert(key, pos);
                    pos
                }
            };
            development.blocks[block_pos].units.push(unit.clone());
        }

        for development in &mut developments {
            development
                .blocks
                .sort_by(|a, b| compare_labels(&a.name, &b.name));
            for block in &mut development.blocks {
                block.units.sort_by(|a, b| compare_labels(&a.name, &b.name));
            }
        }
        developments.sort_by(|a, b| compare_labels(&a.name, &b.name));

        Self { developments }
    }

    pub fn is_empty(&self) -> bool {
        self.developments.is_empty()
    }

    pub fn unit_count(&self) -> usize {
        self.developments.iter().map(DevelopmentGroup::unit_count).sum()
    }

    pub fn development(&self, id: DevelopmentId) -> Option<&DevelopmentGroup> {
        self.developments.iter().find(|dev| dev.id == id)
    }

    pub fn development_ids(&self) -> impl Iterator<Item = DevelopmentId> + '_ {
        self.developments.iter().map(|dev| dev.id)
    }

    pub fn block_keys(&self) -> impl Iterator<Item = &BlockKey> {
        self.developments
            .iter()
            .flat_map(|dev| dev.blocks.iter().map(|block| &block.key))
    }
}

/// Case-insensitive label ordering; equal labels keep their input order
/// because every caller sorts stably.
pub fn compare_labels(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase())
}
