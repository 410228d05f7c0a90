//! MotoMinder CLI - motorcycle fleet and maintenance tracker

use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use motominder_core::api::{self, ApiResponse, SearchParams, health};
use motominder_core::commands::{
    Bike, BikeRepository, Garage, GarageRepository, MaintenanceEntry, MaintenanceRepository,
    NewBike, NewGarage, NewMaintenance, NewPart, NewSection, Part, PartRepository, Section,
    SectionRepository,
};
use motominder_core::config::Config;
use motominder_core::domain::search::SearchHit;
use motominder_core::domain::tags::{NewTag, Tag, TagAssignment, TagIndex, TagRepository};
use motominder_core::storage::Database;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "motominder")]
#[command(author, version, about = "Motorcycle fleet and maintenance tracker", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format (text or json)
    #[arg(long, global = true, default_value = "text")]
    format: OutputFormat,

    /// Quiet mode (minimal output)
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Database file (overrides config and MOTOMINDER_DB)
    #[arg(long, global = true, value_name = "PATH")]
    database: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage garages
    Garages {
        #[command(subcommand)]
        action: GarageAction,
    },

    /// Manage bikes
    Bikes {
        #[command(subcommand)]
        action: BikeAction,
    },

    /// Manage bike sections
    Sections {
        #[command(subcommand)]
        action: SectionAction,
    },

    /// Manage parts
    Parts {
        #[command(subcommand)]
        action: PartAction,
    },

    /// Manage tags and tag assignments
    Tags {
        #[command(subcommand)]
        action: TagAction,
    },

    /// Maintenance log and schedule
    Maintenance {
        #[command(subcommand)]
        action: MaintenanceAction,
    },

    /// Search garages, bikes, sections and parts
    Search {
        /// Text to look for (empty matches everything)
        query: Option<String>,
        /// Require a tag (repeat for AND)
        #[arg(long = "tag", value_name = "TAG")]
        tags: Vec<String>,
        /// Restrict to one kind (garage, bike, section, part)
        #[arg(long = "type", value_name = "KIND")]
        entity_type: Option<String>,
    },

    /// Run health check
    Doctor,

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum GarageAction {
    /// List all garages
    List,
    /// Show a garage with its bikes and tags
    Show { id: i64 },
    /// Add a garage
    Add {
        name: String,
        #[arg(long)]
        location: Option<String>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Edit a garage
    Edit {
        id: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        location: Option<String>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Delete a garage and everything in it
    Delete { id: i64 },
}

#[derive(Subcommand)]
enum BikeAction {
    /// List bikes
    List {
        #[arg(long)]
        garage: Option<i64>,
    },
    /// Show a bike with its sections, maintenance and tags
    Show { id: i64 },
    /// Add a bike
    Add {
        /// Garage ID
        #[arg(long)]
        garage: i64,
        make: String,
        model: String,
        #[arg(long)]
        year: Option<i64>,
        #[arg(long)]
        vin: Option<String>,
        /// Purchase date (YYYY-MM-DD)
        #[arg(long)]
        purchased: Option<NaiveDate>,
        #[arg(long)]
        mileage: Option<i64>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Edit a bike
    Edit {
        id: i64,
        /// Move to another garage
        #[arg(long)]
        garage: Option<i64>,
        #[arg(long)]
        make: Option<String>,
        #[arg(long)]
        model: Option<String>,
        #[arg(long)]
        year: Option<i64>,
        #[arg(long)]
        vin: Option<String>,
        #[arg(long)]
        mileage: Option<i64>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Delete a bike and everything on it
    Delete { id: i64 },
}

#[derive(Subcommand)]
enum SectionAction {
    /// List sections
    List {
        #[arg(long)]
        bike: Option<i64>,
    },
    /// Show a section with its parts and tags
    Show { id: i64 },
    /// Add a section
    Add {
        /// Bike ID
        #[arg(long)]
        bike: i64,
        name: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Edit a section
    Edit {
        id: i64,
        #[arg(long)]
        bike: Option<i64>,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Delete a section and its parts
    Delete { id: i64 },
}

#[derive(Subcommand)]
enum PartAction {
    /// List parts
    List {
        #[arg(long)]
        section: Option<i64>,
    },
    /// Show a part with its tags
    Show { id: i64 },
    /// Add a part
    Add {
        /// Section ID
        #[arg(long)]
        section: i64,
        name: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        part_number: Option<String>,
        #[arg(long)]
        supplier: Option<String>,
        #[arg(long)]
        url: Option<String>,
        #[arg(long)]
        cost: Option<f64>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Edit a part
    Edit {
        id: i64,
        #[arg(long)]
        section: Option<i64>,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        part_number: Option<String>,
        #[arg(long)]
        supplier: Option<String>,
        #[arg(long)]
        url: Option<String>,
        #[arg(long)]
        cost: Option<f64>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Delete a part
    Delete { id: i64 },
}

#[derive(Subcommand)]
enum TagAction {
    /// List all tags
    List,
    /// Show a tag and how often it is used
    Show { id: i64 },
    /// Create a tag
    Add {
        name: String,
        /// Hex color, e.g. #e74c3c
        #[arg(long)]
        color: Option<String>,
    },
    /// Rename or recolor a tag
    Edit {
        id: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        color: Option<String>,
    },
    /// Delete a tag and all its assignments
    Delete { id: i64 },
    /// Attach a tag to an item
    Assign {
        tag_id: i64,
        /// garage, bike, section or part
        item_type: String,
        item_id: i64,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Detach a tag from an item
    Remove {
        tag_id: i64,
        item_type: String,
        item_id: i64,
    },
    /// List everything a tag is attached to
    Items { tag_id: i64 },
}

#[derive(Subcommand)]
enum MaintenanceAction {
    /// List maintenance records, newest first
    List {
        #[arg(long)]
        bike: Option<i64>,
    },
    /// Show a maintenance record
    Show { id: i64 },
    /// Log completed work, or schedule work with --due
    Add {
        /// Bike ID
        #[arg(long)]
        bike: i64,
        description: String,
        /// Date of the work (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        date: Option<NaiveDate>,
        /// Schedule instead of log: due date (YYYY-MM-DD)
        #[arg(long)]
        due: Option<NaiveDate>,
        #[arg(long)]
        part: Option<i64>,
        #[arg(long)]
        mileage: Option<i64>,
        #[arg(long)]
        cost: Option<f64>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Edit a maintenance record
    Edit {
        id: i64,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        date: Option<NaiveDate>,
        #[arg(long)]
        due: Option<NaiveDate>,
        #[arg(long)]
        part: Option<i64>,
        #[arg(long)]
        mileage: Option<i64>,
        #[arg(long)]
        cost: Option<f64>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Delete a maintenance record
    Delete { id: i64 },
    /// Scheduled work coming due
    Upcoming {
        #[arg(long, default_value_t = 30)]
        days: u32,
    },
    /// Mark scheduled work as done
    Complete {
        id: i64,
        /// Completion date (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        date: Option<NaiveDate>,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show all configuration values
    Show,
    /// Show config file path
    Path,
    /// Get a configuration value
    Get { key: String },
    /// Set a configuration value
    Set { key: String, value: String },
    /// Reset configuration to defaults
    Reset,
}

/// Where command results go: plain text or the JSON envelope
#[derive(Clone, Copy)]
struct Output {
    format: OutputFormat,
    quiet: bool,
}

impl Output {
    fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
        println!("{}", serde_json::to_string_pretty(value)?);
        Ok(())
    }

    /// Show `data`: enveloped in JSON mode, through `render` otherwise
    fn data<T: Serialize>(&self, data: T, render: impl FnOnce(&T)) -> anyhow::Result<()> {
        match self.format {
            OutputFormat::Json => Self::print_json(&ApiResponse::ok(data)),
            OutputFormat::Text => {
                render(&data);
                Ok(())
            }
        }
    }

    /// Report a write that returned the written record
    fn saved<T: Serialize>(&self, data: T, message: String) -> anyhow::Result<()> {
        match self.format {
            OutputFormat::Json => Self::print_json(&ApiResponse::ok(data).with_message(message)),
            OutputFormat::Text => {
                if !self.quiet {
                    println!("{}", message);
                }
                Ok(())
            }
        }
    }

    fn done(&self, message: &str) -> anyhow::Result<()> {
        match self.format {
            OutputFormat::Json => Self::print_json(&ApiResponse::message(message)),
            OutputFormat::Text => {
                if !self.quiet {
                    println!("{}", message);
                }
                Ok(())
            }
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Logs go to stderr so JSON output stays parseable
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("motominder=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let out = Output {
        format: cli.format,
        quiet: cli.quiet,
    };

    let result = run(cli, out).await;
    if let Err(e) = &result {
        if out.format == OutputFormat::Json {
            let message = match e.downcast_ref::<motominder_core::Error>() {
                Some(err) => err.public_message(true),
                None => format!("{:#}", e),
            };
            Output::print_json(&ApiResponse::failure(message))?;
            std::process::exit(1);
        }
    }
    result
}

async fn run(cli: Cli, out: Output) -> anyhow::Result<()> {
    let database = cli.database;

    match cli.command {
        Commands::Config { action } => cmd_config(action, out),
        command => {
            let db = open_database(database).await?;
            let result = dispatch(&db, command, out).await;
            db.close().await;
            result
        }
    }
}

async fn dispatch(db: &Database, command: Commands, out: Output) -> anyhow::Result<()> {
    match command {
        Commands::Garages { action } => cmd_garages(db, action, out).await,
        Commands::Bikes { action } => cmd_bikes(db, action, out).await,
        Commands::Sections { action } => cmd_sections(db, action, out).await,
        Commands::Parts { action } => cmd_parts(db, action, out).await,
        Commands::Tags { action } => cmd_tags(db, action, out).await,
        Commands::Maintenance { action } => cmd_maintenance(db, action, out).await,
        Commands::Search {
            query,
            tags,
            entity_type,
        } => cmd_search(db, query, tags, entity_type, out).await,
        Commands::Doctor => cmd_doctor(db, out).await,
        Commands::Config { action } => cmd_config(action, out),
    }
}

/// Open the database named by `--database`, `MOTOMINDER_DB` or the config file
async fn open_database(path: Option<PathBuf>) -> anyhow::Result<Database> {
    let config = Config::load()?.with_env_overrides()?;
    let mut db_config = config.database_config();
    if let Some(path) = path {
        db_config.path = path;
    }
    Database::new(db_config).await
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

// ============================================================================
// Text rendering
// ============================================================================

fn or_dash(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("-")
}

fn print_tags(tags: &[Tag]) {
    if !tags.is_empty() {
        let names: Vec<&str> = tags.iter().map(|t| t.name.as_str()).collect();
        println!("  Tags: {}", names.join(", "));
    }
}

fn print_hits<H: SearchHit>(title: &str, hits: &[H], render: impl Fn(&H)) {
    if hits.is_empty() {
        return;
    }
    println!("{title}:");
    for hit in hits {
        render(hit);
        print_tags(hit.tags());
    }
}

fn print_garage(g: &Garage) {
    match &g.location {
        Some(location) => println!("  [{}] {} ({})", g.id, g.name, location),
        None => println!("  [{}] {}", g.id, g.name),
    }
}

fn print_bike(b: &Bike) {
    println!(
        "  [{}] {} - {} mi, {}",
        b.id,
        b.display_name(),
        b.current_mileage,
        b.garage_name
    );
}

fn print_section(s: &Section) {
    match &s.description {
        Some(description) => println!("  [{}] {} - {}", s.id, s.name, description),
        None => println!("  [{}] {}", s.id, s.name),
    }
}

fn print_part(p: &Part) {
    let number = p
        .part_number
        .as_deref()
        .map(|n| format!(" #{}", n))
        .unwrap_or_default();
    let cost = p.cost.map(|c| format!(" ${:.2}", c)).unwrap_or_default();
    println!("  [{}] {}{}{}", p.id, p.name, number, cost);
}

fn print_maintenance(m: &MaintenanceEntry) {
    let record = &m.record;
    let when = match record.due_date {
        Some(due) if record.status == motominder_core::commands::MaintenanceStatus::Scheduled => {
            format!("due {}", due)
        }
        _ => record.date.to_string(),
    };
    let part = m
        .part_name
        .as_deref()
        .map(|n| format!(" [{}]", n))
        .unwrap_or_default();
    println!(
        "  [{}] {} {} {} - {}{} ({})",
        record.id, when, m.make, m.model, record.description, part, record.status
    );
}

fn print_tag(t: &Tag) {
    println!("  [{}] {} {}", t.id, t.name, t.color);
}

fn print_list<T>(title: &str, empty: &str, items: &[T], print: fn(&T)) {
    if items.is_empty() {
        println!("{}", empty);
    } else {
        println!("{}:", title);
        for item in items {
            print(item);
        }
    }
}

// ============================================================================
// Command Implementations
// ============================================================================

async fn cmd_garages(db: &Database, action: GarageAction, out: Output) -> anyhow::Result<()> {
    let repo = GarageRepository::new(db);

    match action {
        GarageAction::List => {
            let garages = repo.list().await?;
            out.data(garages, |garages| {
                print_list(
                    "Garages",
                    "No garages found.\n\nCreate one with: motominder garages add <name>",
                    garages,
                    print_garage,
                )
            })
        }
        GarageAction::Show { id } => {
            let detail = api::details::garage(db, id).await?;
            out.data(detail, |d| {
                println!("Garage: {}", d.garage.name);
                println!("  ID: {}", d.garage.id);
                println!("  Location: {}", or_dash(&d.garage.location));
                println!("  Notes: {}", or_dash(&d.garage.notes));
                print_tags(&d.tags);
                print_list("Bikes", "  No bikes.", &d.bikes, print_bike);
            })
        }
        GarageAction::Add {
            name,
            location,
            notes,
        } => {
            let input = NewGarage {
                location,
                notes,
                ..NewGarage::new(name)
            };
            let garage = repo.create(&input).await?;
            let message = format!("Garage created: {} (ID {})", garage.name, garage.id);
            out.saved(garage, message)
        }
        GarageAction::Edit {
            id,
            name,
            location,
            notes,
        } => {
            let mut input = NewGarage::from(&repo.require(id).await?);
            if let Some(name) = name {
                input.name = name;
            }
            if location.is_some() {
                input.location = location;
            }
            if notes.is_some() {
                input.notes = notes;
            }
            let garage = repo.update(id, &input).await?;
            out.saved(garage, format!("Garage {} updated.", id))
        }
        GarageAction::Delete { id } => {
            repo.delete(id).await?;
            out.done("Garage deleted successfully")
        }
    }
}

async fn cmd_bikes(db: &Database, action: BikeAction, out: Output) -> anyhow::Result<()> {
    let repo = BikeRepository::new(db);

    match action {
        BikeAction::List { garage } => {
            let bikes = repo.list(garage).await?;
            out.data(bikes, |bikes| {
                print_list(
                    "Bikes",
                    "No bikes found.\n\nAdd one with: motominder bikes add --garage <id> <make> <model>",
                    bikes,
                    print_bike,
                )
            })
        }
        BikeAction::Show { id } => {
            let detail = api::details::bike(db, id).await?;
            out.data(detail, |d| {
                println!("Bike: {}", d.bike.display_name());
                println!("  ID: {}", d.bike.id);
                println!("  Garage: {} (ID {})", d.bike.garage_name, d.bike.garage_id);
                println!("  VIN: {}", or_dash(&d.bike.vin));
                println!("  Mileage: {}", d.bike.current_mileage);
                if let Some(purchased) = d.bike.purchase_date {
                    println!("  Purchased: {}", purchased);
                }
                println!("  Notes: {}", or_dash(&d.bike.notes));
                print_tags(&d.tags);
                print_list("Sections", "  No sections.", &d.sections, print_section);
                print_list(
                    "Maintenance",
                    "  No maintenance logged.",
                    &d.maintenance,
                    print_maintenance,
                );
            })
        }
        BikeAction::Add {
            garage,
            make,
            model,
            year,
            vin,
            purchased,
            mileage,
            notes,
        } => {
            let input = NewBike {
                year,
                vin,
                purchase_date: purchased,
                current_mileage: mileage,
                notes,
                ..NewBike::new(garage, make, model)
            };
            let bike = repo.create(&input).await?;
            let message = format!("Bike created: {} (ID {})", bike.display_name(), bike.id);
            out.saved(bike, message)
        }
        BikeAction::Edit {
            id,
            garage,
            make,
            model,
            year,
            vin,
            mileage,
            notes,
        } => {
            let mut input = NewBike::from(&repo.require(id).await?);
            if garage.is_some() {
                input.garage_id = garage;
            }
            if let Some(make) = make {
                input.make = make;
            }
            if let Some(model) = model {
                input.model = model;
            }
            if year.is_some() {
                input.year = year;
            }
            if vin.is_some() {
                input.vin = vin;
            }
            if mileage.is_some() {
                input.current_mileage = mileage;
            }
            if notes.is_some() {
                input.notes = notes;
            }
            let bike = repo.update(id, &input).await?;
            out.saved(bike, format!("Bike {} updated.", id))
        }
        BikeAction::Delete { id } => {
            repo.delete(id).await?;
            out.done("Bike deleted successfully")
        }
    }
}

async fn cmd_sections(db: &Database, action: SectionAction, out: Output) -> anyhow::Result<()> {
    let repo = SectionRepository::new(db);

    match action {
        SectionAction::List { bike } => {
            let sections = repo.list(bike).await?;
            out.data(sections, |sections| {
                print_list("Sections", "No sections found.", sections, print_section)
            })
        }
        SectionAction::Show { id } => {
            let detail = api::details::section(db, id).await?;
            out.data(detail, |d| {
                println!("Section: {}", d.section.name);
                println!("  ID: {}", d.section.id);
                println!("  Bike ID: {}", d.section.bike_id);
                println!("  Description: {}", or_dash(&d.section.description));
                println!("  Notes: {}", or_dash(&d.section.notes));
                print_tags(&d.tags);
                print_list("Parts", "  No parts.", &d.parts, print_part);
            })
        }
        SectionAction::Add {
            bike,
            name,
            description,
            notes,
        } => {
            let input = NewSection {
                description,
                notes,
                ..NewSection::new(bike, name)
            };
            let section = repo.create(&input).await?;
            let message = format!("Section created: {} (ID {})", section.name, section.id);
            out.saved(section, message)
        }
        SectionAction::Edit {
            id,
            bike,
            name,
            description,
            notes,
        } => {
            let mut input = NewSection::from(&repo.require(id).await?);
            if bike.is_some() {
                input.bike_id = bike;
            }
            if let Some(name) = name {
                input.name = name;
            }
            if description.is_some() {
                input.description = description;
            }
            if notes.is_some() {
                input.notes = notes;
            }
            let section = repo.update(id, &input).await?;
            out.saved(section, format!("Section {} updated.", id))
        }
        SectionAction::Delete { id } => {
            repo.delete(id).await?;
            out.done("Section deleted successfully")
        }
    }
}

async fn cmd_parts(db: &Database, action: PartAction, out: Output) -> anyhow::Result<()> {
    let repo = PartRepository::new(db);

    match action {
        PartAction::List { section } => {
            let parts = repo.list(section).await?;
            out.data(parts, |parts| {
                print_list("Parts", "No parts found.", parts, print_part)
            })
        }
        PartAction::Show { id } => {
            let detail = api::details::part(db, id).await?;
            out.data(detail, |d| {
                let p = &d.part;
                println!("Part: {}", p.name);
                println!("  ID: {}", p.id);
                println!("  Section ID: {}", p.section_id);
                println!("  Part number: {}", or_dash(&p.part_number));
                println!("  Supplier: {}", or_dash(&p.supplier_info));
                println!("  Replacement: {}", or_dash(&p.replacement_url));
                if let Some(cost) = p.cost {
                    println!("  Cost: ${:.2}", cost);
                }
                if let Some(installed) = p.installation_date {
                    println!("  Installed: {}", installed);
                }
                println!("  Notes: {}", or_dash(&p.notes));
                print_tags(&d.tags);
            })
        }
        PartAction::Add {
            section,
            name,
            description,
            part_number,
            supplier,
            url,
            cost,
            notes,
        } => {
            let input = NewPart {
                description,
                part_number,
                supplier_info: supplier,
                replacement_url: url,
                cost,
                notes,
                ..NewPart::new(section, name)
            };
            let part = repo.create(&input).await?;
            let message = format!("Part created: {} (ID {})", part.name, part.id);
            out.saved(part, message)
        }
        PartAction::Edit {
            id,
            section,
            name,
            description,
            part_number,
            supplier,
            url,
            cost,
            notes,
        } => {
            let mut input = NewPart::from(&repo.require(id).await?);
            if section.is_some() {
                input.section_id = section;
            }
            if let Some(name) = name {
                input.name = name;
            }
            if description.is_some() {
                input.description = description;
            }
            if part_number.is_some() {
                input.part_number = part_number;
            }
            if supplier.is_some() {
                input.supplier_info = supplier;
            }
            if url.is_some() {
                input.replacement_url = url;
            }
            if cost.is_some() {
                input.cost = cost;
            }
            if notes.is_some() {
                input.notes = notes;
            }
            let part = repo.update(id, &input).await?;
            out.saved(part, format!("Part {} updated.", id))
        }
        PartAction::Delete { id } => {
            repo.delete(id).await?;
            out.done("Part deleted successfully")
        }
    }
}

async fn cmd_tags(db: &Database, action: TagAction, out: Output) -> anyhow::Result<()> {
    let repo = TagRepository::new(db);
    let index = TagIndex::new(db);

    match action {
        TagAction::List => {
            let tags = repo.list().await?;
            out.data(tags, |tags| {
                print_list(
                    "Tags",
                    "No tags found.\n\nCreate one with: motominder tags add <name>",
                    tags,
                    print_tag,
                )
            })
        }
        TagAction::Show { id } => {
            let tag = repo.require(id).await?;
            let count = index.assignment_count(id).await?;
            out.data(tag, |t| {
                println!("Tag: {}", t.name);
                println!("  ID: {}", t.id);
                println!("  Color: {}", t.color);
                println!("  Assigned to: {} item(s)", count);
            })
        }
        TagAction::Add { name, color } => {
            let tag = repo.create(&NewTag { name, color }).await?;
            let message = format!("Tag created: {} (ID {})", tag.name, tag.id);
            out.saved(tag, message)
        }
        TagAction::Edit { id, name, color } => {
            let current = repo.require(id).await?;
            let input = NewTag {
                name: name.unwrap_or(current.name),
                color,
            };
            let tag = repo.update(id, &input).await?;
            out.saved(tag, format!("Tag {} updated.", id))
        }
        TagAction::Delete { id } => {
            repo.delete(id).await?;
            out.done("Tag deleted successfully")
        }
        TagAction::Assign {
            tag_id,
            item_type,
            item_id,
            notes,
        } => {
            let request = TagAssignment {
                tag_id: Some(tag_id),
                item_type: Some(item_type),
                item_id: Some(item_id),
                notes,
            };
            let (tag_id, item) = request.target()?;
            let assignment = index.assign(tag_id, item, request.notes.clone()).await?;
            out.saved(assignment, "Tag assigned successfully".to_string())
        }
        TagAction::Remove {
            tag_id,
            item_type,
            item_id,
        } => {
            let request = TagAssignment {
                tag_id: Some(tag_id),
                item_type: Some(item_type),
                item_id: Some(item_id),
                notes: None,
            };
            let (tag_id, item) = request.target()?;
            index.remove(tag_id, item).await?;
            out.done("Tag removed successfully")
        }
        TagAction::Items { tag_id } => {
            let tagged = index.items_for_tag(tag_id).await?;
            out.data(tagged, |t| {
                println!("Tag: {} ({} item(s))", t.tag.name, t.items.len());
                print_list("Garages", "  No garages.", &t.items.garages, print_garage);
                print_list("Bikes", "  No bikes.", &t.items.bikes, print_bike);
                print_list("Sections", "  No sections.", &t.items.sections, print_section);
                print_list("Parts", "  No parts.", &t.items.parts, print_part);
            })
        }
    }
}

async fn cmd_maintenance(
    db: &Database,
    action: MaintenanceAction,
    out: Output,
) -> anyhow::Result<()> {
    let repo = MaintenanceRepository::new(db);

    match action {
        MaintenanceAction::List { bike } => {
            let entries = repo.list(bike).await?;
            out.data(entries, |entries| {
                print_list(
                    "Maintenance",
                    "No maintenance records found.",
                    entries,
                    print_maintenance,
                )
            })
        }
        MaintenanceAction::Show { id } => {
            let entry = repo.require(id).await?;
            out.data(entry, |m| {
                let r = &m.record;
                println!("Maintenance: {}", r.description);
                println!("  ID: {}", r.id);
                println!("  Bike: {} {} (ID {})", m.make, m.model, r.bike_id);
                if let Some(part) = &m.part_name {
                    println!("  Part: {}", part);
                }
                println!("  Status: {}", r.status);
                println!("  Date: {}", r.date);
                if let Some(due) = r.due_date {
                    println!("  Due: {}", due);
                }
                if let Some(mileage) = r.mileage {
                    println!("  Mileage: {}", mileage);
                }
                if let Some(cost) = r.cost {
                    println!("  Cost: ${:.2}", cost);
                }
                println!("  Notes: {}", or_dash(&r.notes));
            })
        }
        MaintenanceAction::Add {
            bike,
            description,
            date,
            due,
            part,
            mileage,
            cost,
            notes,
        } => {
            let date = date.unwrap_or_else(today);
            let base = match due {
                Some(due) => NewMaintenance::scheduled(bike, date, due, description),
                None => NewMaintenance::new(bike, date, description),
            };
            let input = NewMaintenance {
                part_id: part,
                mileage,
                cost,
                notes,
                ..base
            };
            let entry = repo.create(&input).await?;
            let message = format!(
                "Maintenance {} for {} {} (ID {})",
                entry.record.status, entry.make, entry.model, entry.record.id
            );
            out.saved(entry, message)
        }
        MaintenanceAction::Edit {
            id,
            description,
            date,
            due,
            part,
            mileage,
            cost,
            notes,
        } => {
            let mut input = NewMaintenance::from(&repo.require(id).await?.record);
            if let Some(description) = description {
                input.description = description;
            }
            if date.is_some() {
                input.date = date;
            }
            if due.is_some() {
                input.due_date = due;
            }
            if part.is_some() {
                input.part_id = part;
            }
            if mileage.is_some() {
                input.mileage = mileage;
            }
            if cost.is_some() {
                input.cost = cost;
            }
            if notes.is_some() {
                input.notes = notes;
            }
            let entry = repo.update(id, &input).await?;
            out.saved(entry, format!("Maintenance {} updated.", id))
        }
        MaintenanceAction::Delete { id } => {
            repo.delete(id).await?;
            out.done("Maintenance record deleted successfully")
        }
        MaintenanceAction::Upcoming { days } => {
            let entries = repo.upcoming(today(), days).await?;
            out.data(entries, |entries| {
                print_list(
                    &format!("Due in the next {} days", days),
                    "Nothing scheduled.",
                    entries,
                    print_maintenance,
                )
            })
        }
        MaintenanceAction::Complete { id, date } => {
            let entry = repo.complete(id, date.unwrap_or_else(today)).await?;
            out.saved(entry, format!("Maintenance {} completed.", id))
        }
    }
}

async fn cmd_search(
    db: &Database,
    query: Option<String>,
    tags: Vec<String>,
    entity_type: Option<String>,
    out: Output,
) -> anyhow::Result<()> {
    let params = SearchParams {
        query,
        tags: (!tags.is_empty()).then(|| tags.join(",")),
        entity_type,
    };
    let response = api::search::search(db, &params).await?;

    if out.format == OutputFormat::Json {
        return Output::print_json(&response);
    }

    let (Some(results), Some(meta)) = (response.data, response.meta) else {
        return Ok(());
    };

    if !out.quiet {
        println!("{} result(s)", meta.total_results);
    }
    print_hits("Garages", &results.garages, |hit| print_garage(&hit.garage));
    print_hits("Bikes", &results.bikes, |hit| print_bike(&hit.bike));
    print_hits("Sections", &results.sections, |hit| {
        println!(
            "  [{}] {} - {} {} ({})",
            hit.section.id, hit.section.name, hit.make, hit.model, hit.garage_name
        )
    });
    print_hits("Parts", &results.parts, |hit| {
        println!(
            "  [{}] {} - {} on {} {} ({})",
            hit.part.id, hit.part.name, hit.section_name, hit.make, hit.model, hit.garage_name
        )
    });
    Ok(())
}

async fn cmd_doctor(db: &Database, out: Output) -> anyhow::Result<()> {
    let config_path = Config::config_path().ok();
    let report = health::doctor(db, config_path.as_deref()).await;
    let healthy = report.is_healthy();

    out.data(report, |report| {
        println!("MotoMinder Health Check");
        println!("=======================");
        println!();
        for check in &report.checks {
            let marker = match check.status {
                health::HealthStatus::Ok => "[OK]",
                health::HealthStatus::Warning => "[--]",
                health::HealthStatus::Error => "[!!]",
            };
            println!(
                "{} {}: {}",
                marker,
                check.name,
                check.message.as_deref().unwrap_or("")
            );
        }
        println!();
        if report.is_healthy() {
            println!("All checks passed!");
        } else {
            println!("Some checks failed. See above for details.");
        }
    })?;

    if !healthy {
        return Err(anyhow::anyhow!("Health check failed"));
    }
    Ok(())
}

fn cmd_config(action: ConfigAction, out: Output) -> anyhow::Result<()> {
    match action {
        ConfigAction::Show => {
            let config = Config::load()?;
            out.data(config, |config| {
                if let Ok(items) = config.list() {
                    for (key, value) in items {
                        println!("{} = {}", key, value);
                    }
                }
            })
        }
        ConfigAction::Path => {
            let path = Config::config_path()?;
            out.data(path.display().to_string(), |path| println!("{}", path))
        }
        ConfigAction::Get { key } => {
            let value = Config::load()?.get(&key)?;
            out.data(value, |value| println!("{}", value))
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load()?;
            config.set(&key, &value)?;
            config.save()?;
            out.done(&format!("Set {} = {}", key, value))
        }
        ConfigAction::Reset => {
            Config::reset()?;
            out.done("Configuration reset to defaults.")
        }
    }
}
