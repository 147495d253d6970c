//! Command-line interface for td
//!
//! This module defines the CLI structure using clap derive macros.
//! Command implementations live in the submodules.

use clap::{Parser, Subcommand};

use crate::error::Result;

mod init;
mod owner;
mod task;

/// td - Personal Task Tracking
///
/// A CLI for owner-scoped task tracking with filtered, sorted, and
/// paginated listings plus dashboard statistics.
#[derive(Parser, Debug)]
#[command(name = "td")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Data directory (defaults to the platform data dir)
    #[arg(long, global = true, env = "TD_DATA_DIR")]
    pub data_dir: Option<std::path::PathBuf>,

    /// Owner identity for every task operation
    #[arg(long, global = true, env = "TD_OWNER")]
    pub owner: Option<String>,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize the data directory
    Init,

    /// Add a task
    Add {
        /// Task title
        title: String,

        /// Longer description
        #[arg(short, long)]
        description: Option<String>,

        /// Priority: low, medium, high
        #[arg(short, long, default_value = "medium")]
        priority: String,

        /// Deadline (RFC 3339 or YYYY-MM-DD)
        #[arg(long)]
        deadline: String,

        /// Categories (repeatable)
        #[arg(short, long)]
        category: Vec<String>,

        /// Tags (repeatable)
        #[arg(short, long)]
        tag: Vec<String>,
    },

    /// List tasks with filters, sorting, pagination, and statistics
    List {
        /// Case-insensitive substring match on title or description
        #[arg(short, long)]
        search: Option<String>,

        /// Filter by priority: low, medium, high
        #[arg(short, long)]
        priority: Option<String>,

        /// Only completed tasks
        #[arg(long, conflicts_with = "pending")]
        completed: bool,

        /// Only incomplete tasks
        #[arg(long)]
        pending: bool,

        /// Filter by category
        #[arg(short, long)]
        category: Option<String>,

        /// Filter by tag
        #[arg(short, long)]
        tag: Option<String>,

        /// Deadline at or after this bound (RFC 3339 or YYYY-MM-DD)
        #[arg(long)]
        from: Option<String>,

        /// Deadline at or before this bound (RFC 3339 or YYYY-MM-DD)
        #[arg(long)]
        to: Option<String>,

        /// Sort spec: deadline, priority, createdAt, or title,
        /// optionally with :asc / :desc
        #[arg(long)]
        sort: Option<String>,

        /// Page number (1-based)
        #[arg(long, default_value_t = 1)]
        page: u64,

        /// Page size
        #[arg(short, long)]
        limit: Option<u64>,
    },

    /// Show one task
    Show {
        /// Task id or unique id prefix
        id: String,
    },

    /// Edit a task
    Edit {
        /// Task id or unique id prefix
        id: String,

        /// New title
        #[arg(long)]
        title: Option<String>,

        /// New description
        #[arg(short, long)]
        description: Option<String>,

        /// New priority: low, medium, high
        #[arg(short, long)]
        priority: Option<String>,

        /// New deadline (RFC 3339 or YYYY-MM-DD)
        #[arg(long)]
        deadline: Option<String>,

        /// Replace categories (repeatable)
        #[arg(short, long)]
        category: Option<Vec<String>>,

        /// Replace tags (repeatable)
        #[arg(short, long)]
        tag: Option<Vec<String>>,
    },

    /// Mark a task completed
    Done {
        /// Task id or unique id prefix
        id: String,
    },

    /// Mark a completed task as pending again
    Reopen {
        /// Task id or unique id prefix
        id: String,
    },

    /// Delete a task
    Rm {
        /// Task id or unique id prefix
        id: String,
    },

    /// Show dashboard statistics for the owner's full task set
    Stats,

    /// Owner identity management
    #[command(subcommand)]
    Owner(OwnerCommands),
}

/// Owner subcommands
#[derive(Subcommand, Debug)]
pub enum OwnerCommands {
    /// Persist the default owner identity
    Set {
        /// Owner name
        name: String,
    },

    /// Show the resolved owner identity
    Show,
}

impl Cli {
    /// Execute the CLI command
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Init => init::run(self.data_dir, self.json, self.quiet),
            Commands::Add {
                title,
                description,
                priority,
                deadline,
                category,
                tag,
            } => task::run_add(task::AddOptions {
                title,
                description,
                priority,
                deadline,
                categories: category,
                tags: tag,
                owner: self.owner,
                data_dir: self.data_dir,
                json: self.json,
                quiet: self.quiet,
            }),
            Commands::List {
                search,
                priority,
                completed,
                pending,
                category,
                tag,
                from,
                to,
                sort,
                page,
                limit,
            } => task::run_list(task::ListOptions {
                search,
                priority,
                completed,
                pending,
                category,
                tag,
                from,
                to,
                sort,
                page,
                limit,
                owner: self.owner,
                data_dir: self.data_dir,
                json: self.json,
                quiet: self.quiet,
            }),
            Commands::Show { id } => task::run_show(task::ShowOptions {
                id,
                owner: self.owner,
                data_dir: self.data_dir,
                json: self.json,
                quiet: self.quiet,
            }),
            Commands::Edit {
                id,
                title,
                description,
                priority,
                deadline,
                category,
                tag,
            } => task::run_edit(task::EditOptions {
                id,
                title,
                description,
                priority,
                deadline,
                categories: category,
                tags: tag,
                owner: self.owner,
                data_dir: self.data_dir,
                json: self.json,
                quiet: self.quiet,
            }),
            Commands::Done { id } => task::run_set_completed(task::CompleteOptions {
                id,
                completed: true,
                owner: self.owner,
                data_dir: self.data_dir,
                json: self.json,
                quiet: self.quiet,
            }),
            Commands::Reopen { id } => task::run_set_completed(task::CompleteOptions {
                id,
                completed: false,
                owner: self.owner,
                data_dir: self.data_dir,
                json: self.json,
                quiet: self.quiet,
            }),
            Commands::Rm { id } => task::run_rm(task::RmOptions {
                id,
                owner: self.owner,
                data_dir: self.data_dir,
                json: self.json,
                quiet: self.quiet,
            }),
            Commands::Stats => task::run_stats(task::StatsOptions {
                owner: self.owner,
                data_dir: self.data_dir,
                json: self.json,
                quiet: self.quiet,
            }),
            Commands::Owner(cmd) => match cmd {
                OwnerCommands::Set { name } => owner::run_set(owner::SetOptions {
                    name,
                    data_dir: self.data_dir,
                    json: self.json,
                    quiet: self.quiet,
                }),
                OwnerCommands::Show => owner::run_show(owner::ShowOptions {
                    owner: self.owner,
                    data_dir: self.data_dir,
                    json: self.json,
                    quiet: self.quiet,
                }),
            },
        }
    }
}
