pub mod editor;
pub mod expansion;
pub mod grouping;
pub mod loader;
pub mod persister;
pub mod search;
pub mod selection;
pub mod session;

pub use crate::domain::model::{
    BlockCode, BlockKey, DevelopmentId, GroupId, LoadedUnits, OwnershipSubmission, SubmitResponse,
    Unit, UnitId, UnitPage,
};
pub use crate::domain::ports::{ConfigProvider, OwnershipViews, UnitsApi};
pub use crate::utils::error::Result;
