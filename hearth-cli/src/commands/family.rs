//! Family commands.

use clap::Subcommand;
use console::style;

use hearth_core::config::ConfigHandle;
use hearth_core::error::HearthResult;
use hearth_models::{EntityId, Family};
use hearth_services::HouseholdService;
use crate::OutputFormat;

#[derive(Subcommand)]
pub enum FamilyAction {
    /// Found a family headed by a profile.
    Create {
        /// Profile id of the head of family.
        #[arg(short, long)]
        profile: String,
        /// Family name.
        #[arg(short, long)]
        name: String,
    },
    /// Show a family with its members, residences and vehicles.
    Show {
        /// Family id.
        id: String,
    },
    /// Add a profile to an existing family.
    Join {
        /// Family id.
        id: String,
        /// Profile id joining the family.
        #[arg(short, long)]
        profile: String,
    },
    /// Replace the family message board text.
    Board {
        /// Family id.
        id: String,
        /// Markdown text.
        markdown: String,
    },
    /// Append an item to the grocery list.
    #[command(name = "grocery-add")]
    GroceryAdd {
        /// Family id.
        id: String,
        /// Item to add.
        item: String,
    },
    /// Remove the first matching item from the grocery list.
    #[command(name = "grocery-remove")]
    GroceryRemove {
        /// Family id.
        id: String,
        /// Item to remove.
        item: String,
    },
}

pub async fn run(config: ConfigHandle, action: FamilyAction, format: OutputFormat) -> HearthResult<()> {
    let (_registry, household) = super::init_household(&config).await?;

    match action {
        FamilyAction::Create { profile, name } => {
            let template = household.family_template(name);
            let family = household.create_family(&EntityId::from(profile), template).await?;
            match format {
                OutputFormat::Json => super::print_json(&family)?,
                OutputFormat::Text => super::print_ok(format!("created family {} ({})", family.name, family.id)),
            }
        }
        FamilyAction::Show { id } => {
            let family = super::load_family(&household, &id).await?;
            match format {
                OutputFormat::Json => super::print_json(&family)?,
                OutputFormat::Text => print_family(&household, &family).await?,
            }
        }
        FamilyAction::Join { id, profile } => {
            let family = super::load_family(&household, &id).await?;
            household.join_family(&EntityId::from(profile.as_str()), &family).await?;
            super::print_ok(format!("{profile} joined {}", family.name));
        }
        FamilyAction::Board { id, markdown } => {
            let family = super::load_family(&household, &id).await?;
            household.set_board_markdown(&family, &markdown).await?;
            super::print_ok("board updated");
        }
        FamilyAction::GroceryAdd { id, item } => {
            let family = super::load_family(&household, &id).await?;
            let list = household.add_grocery_item(&family, &item).await?;
            print_grocery_list(&list, format)?;
        }
        FamilyAction::GroceryRemove { id, item } => {
            let family = super::load_family(&household, &id).await?;
            let list = household.remove_grocery_item(&family, &item).await?;
            print_grocery_list(&list, format)?;
        }
    }

    Ok(())
}

async fn print_family(household: &HouseholdService, family: &Family) -> HearthResult<()> {
    println!("{}", style(&family.name).bold().underlined());
    println!("  Id:        {}", family.id);
    println!("  Head:      {}", family.head_of_family_id);
    println!("  Members:   {}", family.members.len());
    println!("  Units:     {:?}", family.settings.units);
    if let Some(location) = &family.settings.weather_location {
        println!("  Weather:   {location}");
    }
    println!();

    let mut table = super::new_table();
    table.set_header(vec!["Kind", "Id", "Name"]);
    for id in &family.residences {
        let name = match household.load_residence(id).await? {
            Some(residence) => residence.name,
            None => style("(missing)").red().to_string(),
        };
        table.add_row(vec!["residence".to_string(), id.to_string(), name]);
    }
    for id in &family.vehicles {
        let name = match household.load_vehicle(id).await? {
            Some(vehicle) => vehicle.title(),
            None => style("(missing)").red().to_string(),
        };
        table.add_row(vec!["vehicle".to_string(), id.to_string(), name]);
    }
    println!("{table}");

    if !family.grocery_list.is_empty() {
        println!();
        println!("{}", style("Groceries").bold());
        for item in &family.grocery_list {
            println!("  - {item}");
        }
    }
    if !family.board_markdown.is_empty() {
        println!();
        println!("{}", style("Board").bold());
        println!("{}", family.board_markdown);
    }
    Ok(())
}

fn print_grocery_list(list: &[String], format: OutputFormat) -> HearthResult<()> {
    match format {
        OutputFormat::Json => super::print_json(&list)?,
        OutputFormat::Text => {
            if list.is_empty() {
                println!("  {}", style("grocery list is empty").dim());
            }
            for (i, item) in list.iter().enumerate() {
                println!("  {:>2}. {item}", i + 1);
            }
        }
    }
    Ok(())
}
