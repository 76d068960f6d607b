use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::level_filters::LevelFilter;

use crate::{
    registry::{ActivityRegistry, DuplicatePolicy},
    report::{chart::render_chart, document::generate_report},
    store::SessionStore,
    tui,
    utils::{dir::create_application_default_path, logging::enable_logging},
};

#[derive(Parser, Debug)]
#[command(name = "Timecard", version, long_about = None)]
#[command(about = "Personal activity time tracker", long_about = None)]
struct Args {
    #[command(subcommand)]
    commands: Commands,
    #[arg(long, help = "Enable logging")]
    log: bool,
    #[arg(
        long,
        help = "Application directory. By default tries to save into $XDG_STATE_HOME or $HOME/.local/state"
    )]
    dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
#[command(version, about, long_about = None)]
enum Commands {
    #[command(about = "Open the interactive tracker")]
    Run {
        #[arg(long, help = "Allow registering the same activity name twice")]
        allow_duplicates: bool,
    },
    #[command(about = "Manage the list of selectable activities")]
    Activity {
        #[command(subcommand)]
        command: ActivityCommand,
    },
    #[command(about = "Write the stacked daily bar chart of recorded hours")]
    Analyze {},
    #[command(about = "Write a PDF report of sessions between two dates")]
    Report {
        #[arg(help = "Start of the range, YYYY-MM-DD")]
        start: String,
        #[arg(help = "End of the range (inclusive), YYYY-MM-DD")]
        end: String,
    },
}

#[derive(Subcommand, Debug)]
enum ActivityCommand {
    #[command(about = "Append a new activity name")]
    Add {
        name: String,
        #[arg(long, help = "Allow registering the same activity name twice")]
        allow_duplicates: bool,
    },
    #[command(about = "Remove an activity name")]
    Remove { name: String },
    #[command(about = "Print all activity names in display order")]
    List {},
}

pub async fn run_cli() -> Result<()> {
    let args = Args::parse();

    let dir = match args.dir {
        Some(dir) => {
            std::fs::create_dir_all(&dir)?;
            dir
        }
        None => create_application_default_path()?,
    };

    let logging_level = if args.log {
        Some(LevelFilter::TRACE)
    } else {
        None
    };
    enable_logging(&dir, logging_level, args.log)?;

    match args.commands {
        Commands::Run { allow_duplicates } => {
            tui::run(&dir, duplicate_policy(allow_duplicates)).await
        }
        Commands::Activity { command } => process_activity_command(&dir, command),
        Commands::Analyze {} => {
            let store = SessionStore::load(&dir)?;
            let path = render_chart(store.all(), &dir)?;
            println!("Activity analysis saved as {}", path.display());
            Ok(())
        }
        Commands::Report { start, end } => {
            let store = SessionStore::load(&dir)?;
            let path = generate_report(store.all(), &start, &end, &dir)?;
            println!("Report saved as {}", path.display());
            Ok(())
        }
    }
}

fn process_activity_command(dir: &std::path::Path, command: ActivityCommand) -> Result<()> {
    match command {
        ActivityCommand::Add {
            name,
            allow_duplicates,
        } => {
            let mut registry = ActivityRegistry::load(dir, duplicate_policy(allow_duplicates))?;
            registry.add(&name)?;
            println!("Added: {}", name.trim());
            Ok(())
        }
        ActivityCommand::Remove { name } => {
            let mut registry = ActivityRegistry::load(dir, DuplicatePolicy::Reject)?;
            registry.remove(&name)?;
            println!("Deleted: {name}");
            Ok(())
        }
        ActivityCommand::List {} => {
            let registry = ActivityRegistry::load(dir, DuplicatePolicy::Reject)?;
            for name in registry.names() {
                println!("{name}");
            }
            Ok(())
        }
    }
}

fn duplicate_policy(allow_duplicates: bool) -> DuplicatePolicy {
    if allow_duplicates {
        DuplicatePolicy::Allow
    } else {
        DuplicatePolicy::Reject
    }
}
