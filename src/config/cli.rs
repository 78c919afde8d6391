use super::{Settings, TomlConfig};
use crate::core::{BlockCode, BlockKey, DevelopmentId, GroupId, UnitId};
use crate::utils::error::Result;
use clap::{Parser, Subcommand};

#[derive(Debug, Clone, Parser)]
#[command(name = "unit-selector")]
#[command(about = "Review and assign unit ownership for a real-estate group")]
pub struct CliConfig {
    #[arg(long, global = true, help = "TOML configuration file")]
    pub config: Option<String>,

    #[arg(long, global = true)]
    pub api_base_url: Option<String>,

    #[arg(long, global = true)]
    pub api_token: Option<String>,

    #[arg(long, global = true)]
    pub page_size: Option<usize>,

    #[arg(long, global = true)]
    pub timeout_seconds: Option<u64>,

    #[arg(long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Emit logs as JSON lines")]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Print the development/block/unit tree with selection counts
    Show {
        #[arg(long)]
        group: GroupId,

        #[arg(long, default_value = "")]
        query: String,

        #[arg(long, help = "Start with every development collapsed")]
        collapsed: bool,
    },

    /// Apply selection changes and submit them.
    ///
    /// Order: deselect-all, select-all, developments, blocks, toggles.
    Assign {
        #[arg(long)]
        group: GroupId,

        #[arg(long)]
        select_all: bool,

        #[arg(long)]
        deselect_all: bool,

        #[arg(long, value_delimiter = ',')]
        select_development: Vec<DevelopmentId>,

        #[arg(long, value_delimiter = ',')]
        deselect_development: Vec<DevelopmentId>,

        #[arg(long, value_parser = parse_block_key, help = "DEVELOPMENT:BLOCK, empty BLOCK for no block")]
        select_block: Vec<BlockKey>,

        #[arg(long, value_parser = parse_block_key, help = "DEVELOPMENT:BLOCK, empty BLOCK for no block")]
        deselect_block: Vec<BlockKey>,

        #[arg(long, value_delimiter = ',')]
        toggle: Vec<UnitId>,

        #[arg(long, help = "Show the pending changes without submitting")]
        dry_run: bool,
    },

    /// Write the group's units with their ownership to a CSV file
    Export {
        #[arg(long)]
        group: GroupId,

        #[arg(long)]
        output: String,

        #[arg(long, default_value = "")]
        query: String,
    },

    /// Print dashboard ownership totals for a group
    Totals {
        #[arg(long)]
        group: GroupId,
    },
}

impl CliConfig {
    /// Config file first (when given), then command line overrides.
    pub fn resolve(&self) -> Result<Settings> {
        let mut settings = match &self.config {
            Some(path) => Settings::from(&TomlConfig::from_file(path)?),
            None => Settings::default(),
        };

        if let Some(url) = &self.api_base_url {
            settings.api_base_url = url.clone();
        }
        if let Some(token) = &self.api_token {
            settings.api_token = Some(token.clone());
        }
        if let Some(page_size) = self.page_size {
            settings.page_size = page_size;
        }
        if let Some(timeout) = self.timeout_seconds {
            settings.timeout_seconds = timeout;
        }
        if self.verbose {
            settings.log_level = "debug".to_string();
        }
        if self.json_logs {
            settings.json_logs = true;
        }
        Ok(settings)
    }
}

/// Parses `DEVELOPMENT:BLOCK`; an empty block part means "no block".
pub fn parse_block_key(raw: &str) -> std::result::Result<BlockKey, String> {
    let (development, block) = raw
        .split_once(':')
        .ok_or_else(|| format!("expected DEVELOPMENT:BLOCK, got '{}'", raw))?;
    let development_id = development
        .trim()
        .parse::<DevelopmentId>()
        .map_err(|e| format!("invalid development id '{}': {}", development, e))?;
    Ok(BlockKey::new(
        development_id,
        BlockCode::normalize(Some(block)),
    ))
}
