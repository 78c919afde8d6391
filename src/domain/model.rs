use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

pub type GroupId = i64;
pub type UnitId = i64;
pub type DevelopmentId = i64;

/// One sellable unit (apartment, lot) as returned by the units API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Unit {
    pub id: UnitId,
    pub name: String,
    pub development_id: DevelopmentId,
    #[serde(default)]
    pub development_name: String,
    #[serde(default)]
    pub block_code: Option<String>,
    #[serde(default)]
    pub block_name: Option<String>,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub value: Option<f64>,
    #[serde(default)]
    pub typology: Option<String>,
    #[serde(default)]
    pub is_owned: bool,
}

impl Unit {
    pub fn block_key(&self) -> BlockKey {
        BlockKey::new(self.development_id, BlockCode::normalize(self.block_code.as_deref()))
    }

    pub fn block_label(&self) -> &str {
        self.block_name.as_deref().unwrap_or("")
    }
}

/// Normalized block code. Units without a code (or with an empty one) all share
/// `NoBlock`, which can never collide with a real code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BlockCode {
    NoBlock,
    Code(String),
}

impl BlockCode {
    pub fn normalize(raw: Option<&str>) -> Self {
        match raw {
            Some(code) if !code.is_empty() => Self::Code(code.to_string()),
            _ => Self::NoBlock,
        }
    }

    pub fn as_code(&self) -> Option<&str> {
        match self {
            Self::NoBlock => None,
            Self::Code(code) => Some(code),
        }
    }
}

impl fmt::Display for BlockCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoBlock => f.write_str("(no block)"),
            Self::Code(code) => f.write_str(code),
        }
    }
}

/// Identity of a block: the development it lives in plus its normalized code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockKey {
    pub development_id: DevelopmentId,
    pub block: BlockCode,
}

impl BlockKey {
    pub fn new(development_id: DevelopmentId, block: BlockCode) -> Self {
        Self {
            development_id,
            block,
        }
    }

    pub fn matches(&self, unit: &Unit) -> bool {
        unit.development_id == self.development_id
            && BlockCode::normalize(unit.block_code.as_deref()) == self.block
    }
}

impl fmt::Display for BlockKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.development_id, self.block)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitPage {
    pub total: usize,
    #[serde(default)]
    pub items: Vec<Unit>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnershipSubmission {
    pub unit_ids: Vec<UnitId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmitResponse {
    #[serde(default)]
    pub message: String,
}

/// Complete unit list of one group. The `Arc` identity doubles as the memo key
/// for derived views.
#[derive(Debug, Clone)]
pub struct LoadedUnits {
    pub group: GroupId,
    pub total: usize,
    pub units: Arc<Vec<Unit>>,
}

impl LoadedUnits {
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}
