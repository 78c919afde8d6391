pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::{CliConfig, Command};
pub use config::{Settings, TomlConfig};

pub use adapters::{cache::DashboardCache, http::HttpUnitsApi};
pub use core::editor::{OnUnsaved, SelectionEditor};
pub use core::loader::UnitLoader;
pub use core::persister::Persister;
pub use core::session::Session;
pub use utils::error::{Result, SelectorError};
