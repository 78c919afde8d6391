// Application layer: command handlers shared by the CLI binary and tests.

pub mod commands;
pub mod export;
