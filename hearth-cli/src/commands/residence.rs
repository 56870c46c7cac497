//! Residence commands.

use std::path::PathBuf;

use clap::Subcommand;

use hearth_core::config::ConfigHandle;
use hearth_core::error::HearthResult;
use hearth_models::{ChildKind, EntityId, ResidenceDraft, ServiceLogEntry};
use crate::OutputFormat;

#[derive(Subcommand)]
pub enum ResidenceAction {
    /// Add a residence to a family.
    Add {
        /// Family id.
        family: String,
        /// Residence name ("Main house").
        #[arg(short, long)]
        name: String,
        /// Street address.
        #[arg(short, long)]
        address: Option<String>,
        /// Year the building was built.
        #[arg(long)]
        year_built: Option<u16>,
        /// Living area in square feet.
        #[arg(long)]
        square_feet: Option<u32>,
        /// Photo to upload with the residence.
        #[arg(long)]
        image: Option<PathBuf>,
    },
    /// Remove a residence from a family.
    Remove {
        /// Family id.
        family: String,
        /// Residence id.
        id: String,
    },
    /// Append an entry to a residence's service log.
    Log {
        /// Residence id.
        id: String,
        /// What was done.
        #[arg(short, long)]
        note: String,
        /// Date of the work (YYYY-MM-DD, default today).
        #[arg(short, long)]
        date: Option<String>,
    },
}

pub async fn run(config: ConfigHandle, action: ResidenceAction, format: OutputFormat) -> HearthResult<()> {
    let (_registry, household) = super::init_household(&config).await?;

    match action {
        ResidenceAction::Add { family, name, address, year_built, square_feet, image } => {
            let family = super::load_family(&household, &family).await?;
            let mut draft = ResidenceDraft::new(name);
            draft.address = address;
            draft.year_built = year_built;
            draft.square_feet = square_feet;
            draft.image = image.as_deref().map(super::read_image).transpose()?;

            let id = household.add_residence(&family, draft).await?;
            match format {
                OutputFormat::Json => super::print_json(&serde_json::json!({ "id": id }))?,
                OutputFormat::Text => super::print_ok(format!("added residence {id} to {}", family.name)),
            }
        }
        ResidenceAction::Remove { family, id } => {
            let family = super::load_family(&household, &family).await?;
            household.remove_residence(&family, &EntityId::from(id.as_str())).await?;
            super::print_ok(format!("removed residence {id}"));
        }
        ResidenceAction::Log { id, note, date } => {
            let entry = ServiceLogEntry::new(super::parse_date(date.as_deref())?, note);
            let entries = household
                .log_service(ChildKind::Residence, &EntityId::from(id), entry)
                .await?;
            match format {
                OutputFormat::Json => super::print_json(&entries)?,
                OutputFormat::Text => {
                    let mut table = super::new_table();
                    table.set_header(vec!["Date", "Note"]);
                    for entry in &entries {
                        table.add_row(vec![entry.date.to_string(), entry.note.clone()]);
                    }
                    println!("{table}");
                }
            }
        }
    }

    Ok(())
}
