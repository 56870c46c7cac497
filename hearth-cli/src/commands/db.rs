//! Database management commands.

use clap::Subcommand;
use console::style;
use dialoguer::Confirm;

use hearth_core::config::ConfigHandle;
use hearth_core::error::{HearthError, HearthResult};
use hearth_models::Database;
use hearth_services::ServiceRegistry;
use crate::OutputFormat;

#[derive(Subcommand)]
pub enum DbAction {
    /// Show document and blob counts.
    Stats,
    /// Run an integrity check.
    Check,
    /// Reset the database (WARNING: destroys all data).
    Reset {
        /// Skip the confirmation prompt.
        #[arg(short, long)]
        yes: bool,
    },
}

pub async fn run(config: ConfigHandle, action: DbAction, format: OutputFormat) -> HearthResult<()> {
    let db_path = config.read().await.effective_db_path()?;
    let registry = ServiceRegistry::from_config(config).await?;
    let db = sqlite_database(&registry)?;

    match action {
        DbAction::Stats => {
            let stats = db.stats()?;
            let file_size = std::fs::metadata(&db_path).ok().map(|m| m.len());

            let conn = db.conn()?;
            let journal_mode: String = conn
                .query_row("PRAGMA journal_mode", [], |row| row.get(0))
                .unwrap_or_else(|_| "unknown".to_string());

            match format {
                OutputFormat::Json => {
                    super::print_json(&serde_json::json!({
                        "path": db_path.display().to_string(),
                        "documents": {
                            "families": stats.families,
                            "residences": stats.residences,
                            "vehicles": stats.vehicles,
                            "profiles": stats.profiles,
                        },
                        "blobs": stats.blobs,
                        "file_size_bytes": file_size,
                        "journal_mode": journal_mode,
                    }))?;
                }
                OutputFormat::Text => {
                    println!("{}", style("Database Statistics").bold().underlined());
                    println!("  Path:          {}", db_path.display());
                    println!("  Journal mode:  {journal_mode}");
                    if let Some(size) = file_size {
                        println!("  File size:     {}", super::format_bytes(size));
                    }
                    println!();

                    let mut table = super::new_table();
                    table.set_header(vec!["Collection", "Count"]);
                    table.add_row(vec!["families".to_string(), stats.families.to_string()]);
                    table.add_row(vec!["residences".to_string(), stats.residences.to_string()]);
                    table.add_row(vec!["vehicles".to_string(), stats.vehicles.to_string()]);
                    table.add_row(vec!["profiles".to_string(), stats.profiles.to_string()]);
                    table.add_row(vec!["blobs".to_string(), stats.blobs.to_string()]);
                    println!("{table}");
                }
            }
        }
        DbAction::Check => {
            let conn = db.conn()?;
            let quick: String = conn
                .query_row("PRAGMA quick_check", [], |row| row.get(0))
                .map_err(|e| HearthError::Database(e.to_string()))?;
            drop(conn);
            let full = db.run_integrity_check();

            match format {
                OutputFormat::Json => {
                    super::print_json(&serde_json::json!({
                        "quick_check": quick,
                        "integrity_check": full.as_ref().map(|_| "ok".to_string()).unwrap_or_else(|e| e.to_string()),
                    }))?;
                }
                OutputFormat::Text => {
                    println!("  Quick check:     {}", pass_or_fail(quick == "ok", &quick));
                    match &full {
                        Ok(()) => println!("  Integrity check: {}", style("PASS").green().bold()),
                        Err(e) => println!("  Integrity check: {} ({e})", style("FAIL").red().bold()),
                    }
                }
            }
            full?;
        }
        DbAction::Reset { yes } => {
            let confirmed = yes
                || Confirm::new()
                    .with_prompt(format!("Delete every document and blob in {}?", db_path.display()))
                    .default(false)
                    .interact()
                    .map_err(|e| HearthError::Internal(format!("prompt failed: {e}")))?;

            if !confirmed {
                println!("  {}", style("reset cancelled").yellow());
                return Ok(());
            }
            db.reset()?;
            super::print_ok("database reset");
        }
    }

    Ok(())
}

fn sqlite_database(registry: &ServiceRegistry) -> HearthResult<&Database> {
    registry.store().database().ok_or_else(|| {
        HearthError::Validation("database commands need the sqlite backend; drop --memory".into())
    })
}

fn pass_or_fail(ok: bool, detail: &str) -> String {
    if ok {
        style("PASS").green().bold().to_string()
    } else {
        format!("{} ({detail})", style("FAIL").red().bold())
    }
}
