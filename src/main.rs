use clap::Parser;
use std::sync::Arc;
use unit_selector::app::commands::{self, AssignOps};
use unit_selector::utils::error::ErrorSeverity;
use unit_selector::utils::{logger, validation::Validate};
use unit_selector::{CliConfig, Command, DashboardCache, HttpUnitsApi, SelectionEditor};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = CliConfig::parse();

    let settings = match cli.resolve() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(1);
        }
    };

    if settings.json_logs {
        logger::init_json_logger(&settings.log_level);
    } else {
        logger::init_cli_logger(&settings.log_level);
    }
    tracing::debug!("Effective settings: {:?}", settings);

    if let Err(e) = settings.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());
        std::process::exit(1);
    }

    let api = HttpUnitsApi::from_config(&settings)?;
    let cache = Arc::new(DashboardCache::new());
    let mut editor = SelectionEditor::with_page_size(api, cache.clone(), settings.page_size);

    let outcome = match &cli.command {
        Command::Show {
            group,
            query,
            collapsed,
        } => commands::show(&mut editor, *group, query, *collapsed)
            .await
            .map(|text| print!("{}", text)),
        Command::Assign {
            group,
            select_all,
            deselect_all,
            select_development,
            deselect_development,
            select_block,
            deselect_block,
            toggle,
            dry_run,
        } => {
            let ops = AssignOps {
                select_all: *select_all,
                deselect_all: *deselect_all,
                select_development: select_development.clone(),
                deselect_development: deselect_development.clone(),
                select_block: select_block.clone(),
                deselect_block: deselect_block.clone(),
                toggle: toggle.clone(),
            };
            commands::assign(&mut editor, *group, &ops, *dry_run)
                .await
                .map(|report| {
                    println!(
                        "Selected {}/{} (+{} / -{})",
                        report.selected,
                        report.total,
                        report.changes.added.len(),
                        report.changes.removed.len()
                    );
                    match report.saved {
                        Some(saved) => println!("✅ {}", saved.message),
                        None => println!("Dry run, nothing submitted"),
                    }
                })
        }
        Command::Export {
            group,
            output,
            query,
        } => commands::export(&mut editor, *group, query, output)
            .await
            .map(|written| println!("📁 Exported {} unit(s) to {}", written, output)),
        Command::Totals { group } => commands::totals(&editor, &cache, *group)
            .await
            .map(|totals| {
                println!(
                    "Units: {}  Owned: {}  Owned value: {:.2}",
                    totals.units, totals.owned_units, totals.owned_value
                )
            }),
    };

    if let Err(e) = outcome {
        tracing::error!(
            "❌ Command failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());
        if e.is_retryable() {
            eprintln!("🔁 The failure looks temporary; running the command again may succeed");
        }

        let exit_code = match e.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        };
        if exit_code > 0 {
            std::process::exit(exit_code);
        }
    }

    Ok(())
}
