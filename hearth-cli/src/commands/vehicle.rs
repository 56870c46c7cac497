//! Vehicle commands.

use std::path::PathBuf;

use clap::Subcommand;
use console::style;

use hearth_core::config::ConfigHandle;
use hearth_core::error::HearthResult;
use hearth_models::{ChildKind, EntityId, MaintenanceMarker, ServiceLogEntry, VehicleDraft};
use crate::OutputFormat;

#[derive(Subcommand)]
pub enum VehicleAction {
    /// Add a vehicle to a family.
    Add {
        /// Family id.
        family: String,
        /// Manufacturer.
        #[arg(long)]
        make: String,
        /// Model name.
        #[arg(long)]
        model: String,
        /// Model year.
        #[arg(long)]
        year: u16,
        /// Friendly name shown instead of make and model.
        #[arg(long)]
        nickname: Option<String>,
        /// 17 character VIN.
        #[arg(long)]
        vin: Option<String>,
        /// Current odometer reading in miles.
        #[arg(long)]
        odometer: Option<u64>,
        /// Photo to upload with the vehicle.
        #[arg(long)]
        image: Option<PathBuf>,
    },
    /// Remove a vehicle from a family.
    Remove {
        /// Family id.
        family: String,
        /// Vehicle id.
        id: String,
    },
    /// Append an entry to a vehicle's service log.
    Log {
        /// Vehicle id.
        id: String,
        /// What was done.
        #[arg(short, long)]
        note: String,
        /// Date of the work (YYYY-MM-DD, default today).
        #[arg(short, long)]
        date: Option<String>,
    },
    /// Add a recurring maintenance marker.
    Marker {
        /// Vehicle id.
        id: String,
        /// What the marker tracks ("Oil change").
        #[arg(short, long)]
        label: String,
        /// Due every N months.
        #[arg(long)]
        every_months: Option<u32>,
        /// Due every N miles.
        #[arg(long)]
        every_miles: Option<u64>,
        /// When it was last done (YYYY-MM-DD).
        #[arg(long)]
        last_done_on: Option<String>,
        /// Odometer reading when it was last done.
        #[arg(long)]
        last_done_miles: Option<u64>,
    },
    /// List maintenance markers that are due.
    Due {
        /// Vehicle id.
        id: String,
        /// Check as of this date (YYYY-MM-DD, default today).
        #[arg(long)]
        on: Option<String>,
    },
}

pub async fn run(config: ConfigHandle, action: VehicleAction, format: OutputFormat) -> HearthResult<()> {
    let (_registry, household) = super::init_household(&config).await?;

    match action {
        VehicleAction::Add { family, make, model, year, nickname, vin, odometer, image } => {
            let family = super::load_family(&household, &family).await?;
            let mut draft = VehicleDraft::new(make, model, year);
            draft.nickname = nickname;
            draft.vin = vin;
            draft.odometer_miles = odometer;
            draft.image = image.as_deref().map(super::read_image).transpose()?;

            let id = household.add_vehicle(&family, draft).await?;
            match format {
                OutputFormat::Json => super::print_json(&serde_json::json!({ "id": id }))?,
                OutputFormat::Text => super::print_ok(format!("added vehicle {id} to {}", family.name)),
            }
        }
        VehicleAction::Remove { family, id } => {
            let family = super::load_family(&household, &family).await?;
            household.remove_vehicle(&family, &EntityId::from(id.as_str())).await?;
            super::print_ok(format!("removed vehicle {id}"));
        }
        VehicleAction::Log { id, note, date } => {
            let entry = ServiceLogEntry::new(super::parse_date(date.as_deref())?, note);
            let entries = household
                .log_service(ChildKind::Vehicle, &EntityId::from(id), entry)
                .await?;
            match format {
                OutputFormat::Json => super::print_json(&entries)?,
                OutputFormat::Text => super::print_ok(format!("{} log entries", entries.len())),
            }
        }
        VehicleAction::Marker { id, label, every_months, every_miles, last_done_on, last_done_miles } => {
            let last_done_on = match last_done_on.as_deref() {
                Some(date) => Some(super::parse_date(Some(date))?),
                None => None,
            };
            let marker = MaintenanceMarker { label, every_months, every_miles, last_done_on, last_done_miles };
            let markers = household
                .add_maintenance_marker(ChildKind::Vehicle, &EntityId::from(id), marker)
                .await?;
            print_markers(&markers, format)?;
        }
        VehicleAction::Due { id, on } => {
            let today = super::parse_date(on.as_deref())?;
            let due = household
                .due_markers(ChildKind::Vehicle, &EntityId::from(id), today)
                .await?;
            if due.is_empty() && matches!(format, OutputFormat::Text) {
                println!("  {}", style(format!("nothing due as of {today}")).dim());
                return Ok(());
            }
            print_markers(&due, format)?;
        }
    }

    Ok(())
}

fn print_markers(markers: &[MaintenanceMarker], format: OutputFormat) -> HearthResult<()> {
    match format {
        OutputFormat::Json => super::print_json(&markers)?,
        OutputFormat::Text => {
            let mut table = super::new_table();
            table.set_header(vec!["Label", "Every (months)", "Every (miles)", "Last done", "At miles"]);
            for marker in markers {
                table.add_row(vec![
                    marker.label.clone(),
                    super::or_dash(marker.every_months),
                    super::or_dash(marker.every_miles),
                    super::or_dash(marker.last_done_on),
                    super::or_dash(marker.last_done_miles),
                ]);
            }
            println!("{table}");
        }
    }
    Ok(())
}
