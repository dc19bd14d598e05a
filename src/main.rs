use std::process::ExitCode;

use clap::{ArgAction, Parser, Subcommand, ValueHint};
use gwtree::Result;
use gwtree::commands::clean::{self, CleanOptions};
use gwtree::commands::config::{self, ConfigAction};
use gwtree::commands::create::{self, CreateOptions};
use gwtree::commands::{Session, list, merge, remove, status};
use gwtree::config::FileConfigStore;
use gwtree::error::GwtError;
use gwtree::git::SystemRunner;
use gwtree::output;
use gwtree::selection::InquirePrompter;
use gwtree::storage::JsonRecordStore;

const BANNER: &str = "
╔═╗╦ ╦╔╦╗
║ ╦║║║ ║
╚═╝╚╩╝ ╩
";

#[derive(Parser)]
#[command(name = "gwt")]
#[command(about = "Git worktree manager for parallel development")]
#[command(version, disable_version_flag = true)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    /// Name(s) for worktree and branch (`gwt foo bar` creates multiple worktrees)
    #[arg(value_hint = ValueHint::Other)]
    names: Vec<String>,
    /// Use saved defaults, skip prompts
    #[arg(short, long)]
    yes: bool,
    /// Skip opening editor
    #[arg(short = 'x', long)]
    no_editor: bool,
    /// Output the version number
    #[arg(short = 'v', long, action = ArgAction::Version)]
    #[allow(dead_code)]
    version: Option<bool>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Remove worktrees for current repo
    #[command(name = "rm", visible_alias = "remove")]
    Remove,
    /// List worktrees for current repo
    #[command(name = "ls", visible_alias = "list")]
    List,
    /// Show status of all worktrees (changes, commits ahead/behind)
    #[command(visible_alias = "st")]
    Status,
    /// Remove worktrees that have been merged to main
    #[command(visible_alias = "c")]
    Clean {
        /// Remove all worktrees (not just merged)
        #[arg(short, long)]
        all: bool,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Merge worktree branch to main and remove worktree
    #[command(visible_alias = "m")]
    Merge {
        /// Branch, worktree directory, or the name given at creation
        #[arg(value_hint = ValueHint::Other)]
        name: String,
    },
    /// Open config file, or manage settings
    Config {
        #[command(subcommand)]
        action: Option<ConfigCommand>,
    },
    /// Show version number
    Version,
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Reset settings to defaults
    Reset,
    /// Change one setting (editor, installDeps, lastPm)
    Set { key: String, value: String },
    /// Print the effective settings
    Show,
    /// Print the config file location
    Path,
}

fn config_action(command: Option<ConfigCommand>) -> ConfigAction {
    match command {
        None => ConfigAction::Open,
        Some(ConfigCommand::Reset) => ConfigAction::Reset,
        Some(ConfigCommand::Set { key, value }) => ConfigAction::Set { key, value },
        Some(ConfigCommand::Show) => ConfigAction::Show,
        Some(ConfigCommand::Path) => ConfigAction::Path,
    }
}

impl Cli {
    /// The banner is left out when the output is meant for scripts or the
    /// run is non-interactive.
    fn shows_banner(&self) -> bool {
        match &self.command {
            None => self.names.is_empty() || !self.yes,
            Some(Commands::Version | Commands::Config { .. }) => false,
            Some(_) => true,
        }
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().filter_or("GWT_LOG", "warn")).init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let message = e
                .downcast_ref::<GwtError>()
                .map_or_else(|| e.to_string(), GwtError::summary);
            output::cancel(&message);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    if cli.shows_banner() {
        println!("{BANNER}");
    }

    if matches!(cli.command, Some(Commands::Version)) {
        println!("{}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let runner = SystemRunner;
    let prompter = InquirePrompter;
    let config_store = FileConfigStore::new()?;
    let records = JsonRecordStore::new()?;
    let session = Session {
        runner: &runner,
        config: &config_store,
        records: &records,
        prompter: &prompter,
        cwd: std::env::current_dir()?,
        env_editor: std::env::var("EDITOR").ok(),
    };

    match cli.command {
        None => {
            let opts = CreateOptions {
                yes: cli.yes,
                no_editor: cli.no_editor,
            };
            match cli.names.as_slice() {
                [] => create::create_worktree(&session, None, opts)?,
                [name] => create::create_worktree(&session, Some(name.as_str()), opts)?,
                names => create::create_worktrees(&session, names, opts)?,
            }
        }
        Some(Commands::Remove) => remove::remove_worktrees(&session)?,
        Some(Commands::List) => list::list_worktrees(&session)?,
        Some(Commands::Status) => {
            status::status_worktrees(&session)?;
        }
        Some(Commands::Clean { all, yes }) => {
            clean::clean_worktrees(&session, CleanOptions { all, yes })?;
        }
        Some(Commands::Merge { name }) => merge::merge_worktree(&session, &name)?,
        Some(Commands::Config { action }) => config::run_config(&session, config_action(action))?,
        // Printed before the stores are opened.
        Some(Commands::Version) => {}
    }

    Ok(())
}
