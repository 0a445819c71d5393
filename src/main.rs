use anyhow::Result;
use clap::{Parser, Subcommand};

use costbook::cli::{
    handle_backstop_command, handle_item_command, handle_project_command, handle_record_command,
    handle_report_command,
};
use costbook::config::{paths::CostbookPaths, settings::Settings};
use costbook::storage::Storage;

#[derive(Parser)]
#[command(
    name = "costbook",
    version,
    about = "Terminal-based project cost tracking and reconciliation",
    long_about = "costbook tracks construction-style projects as a hierarchy of \
                  cost codes, records the invoices, bills, and payments that move \
                  against them, and watches backstop threshold rules over the \
                  live ledger."
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Project registry commands
    #[command(subcommand, alias = "proj")]
    Project(costbook::cli::ProjectCommands),

    /// Cost hierarchy commands
    #[command(subcommand)]
    Item(costbook::cli::ItemCommands),

    /// Record invoices, bills, and payments
    #[command(subcommand, alias = "rec")]
    Record(costbook::cli::RecordCommands),

    /// Backstop threshold rules
    #[command(subcommand)]
    Backstop(costbook::cli::BackstopCommands),

    /// Reports and CSV export
    #[command(subcommand)]
    Report(costbook::cli::ReportCommands),

    /// Initialize the data directory
    Init,

    /// Show resolved paths and settings
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let paths = CostbookPaths::new()?;
    let settings = Settings::load_or_create(&paths)?;

    let mut storage = Storage::new(paths.clone())?;
    storage.load_all()?;

    match cli.command {
        Some(Commands::Project(cmd)) => {
            handle_project_command(&storage, cmd)?;
        }
        Some(Commands::Item(cmd)) => {
            handle_item_command(&storage, cmd)?;
        }
        Some(Commands::Record(cmd)) => {
            handle_record_command(&storage, cmd)?;
        }
        Some(Commands::Backstop(cmd)) => {
            handle_backstop_command(&storage, cmd)?;
        }
        Some(Commands::Report(cmd)) => {
            handle_report_command(&storage, cmd)?;
        }
        Some(Commands::Init) => {
            println!("Initializing costbook at: {}", paths.data_dir().display());
            costbook::storage::init::initialize_storage(&paths)?;
            settings.save(&paths)?;
            println!("Initialization complete!");
            println!();
            println!("Get started:");
            println!("  costbook project add \"Riverside Office Park\"");
            println!("  costbook item add-category \"Riverside Office Park\" \"Groundwork\"");
            println!("  costbook item add-line \"Riverside Office Park\" 1 \"Excavation\" --cost 6000");
        }
        Some(Commands::Config) => {
            println!("costbook Configuration");
            println!("======================");
            println!("Base directory: {}", paths.base_dir().display());
            println!("Data directory: {}", paths.data_dir().display());
            println!("Audit log:      {}", paths.audit_log().display());
            println!();
            println!("Settings:");
            println!("  Currency symbol: {}", settings.currency_symbol);
            println!("  Date format:     {}", settings.date_format);
        }
        None => {
            println!("costbook - Terminal-based project cost tracking");
            println!();
            println!("Run 'costbook --help' for usage information.");
            println!("Run 'costbook init' to set up the data directory.");
        }
    }

    Ok(())
}
