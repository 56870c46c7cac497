//! User profile commands.

use clap::Subcommand;
use console::style;

use hearth_core::config::ConfigHandle;
use hearth_core::error::{HearthError, HearthResult};
use hearth_models::{EntityId, UserProfile};
use crate::OutputFormat;

#[derive(Subcommand)]
pub enum ProfileAction {
    /// Register a profile for an authenticated user id.
    Create {
        /// User id from the identity provider.
        #[arg(long)]
        id: String,
        /// Display name.
        #[arg(short, long)]
        name: String,
        /// Contact email.
        #[arg(short, long)]
        email: Option<String>,
    },
    /// Show a profile.
    Show {
        /// User id.
        id: String,
    },
}

pub async fn run(config: ConfigHandle, action: ProfileAction, format: OutputFormat) -> HearthResult<()> {
    let (_registry, household) = super::init_household(&config).await?;

    match action {
        ProfileAction::Create { id, name, email } => {
            let mut profile = UserProfile::new(id, name);
            profile.email = email;
            household.register_profile(&profile).await?;

            match format {
                OutputFormat::Json => super::print_json(&profile)?,
                OutputFormat::Text => super::print_ok(format!("registered profile {}", profile.id)),
            }
        }
        ProfileAction::Show { id } => {
            let id = EntityId::from(id);
            let profile = household.load_profile(&id).await?.ok_or_else(|| HearthError::NotFound {
                collection: "profiles".into(),
                id: id.to_string(),
            })?;

            match format {
                OutputFormat::Json => super::print_json(&profile)?,
                OutputFormat::Text => {
                    println!("{}", style(&profile.display_name).bold());
                    println!("  Id:      {}", profile.id);
                    println!("  Email:   {}", super::or_dash(profile.email.as_deref()));
                    match &profile.family_id {
                        Some(family) => println!("  Family:  {family}"),
                        None => println!("  Family:  {}", style("none").dim()),
                    }
                }
            }
        }
    }

    Ok(())
}
