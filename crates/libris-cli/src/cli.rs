//! CLI argument definitions for libris.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;
use libris_model::EntityId;

#[derive(Parser)]
#[command(
    name = "libris",
    version,
    about = "Manage your personal library from the terminal",
    long_about = "Manage books, collections and locations stored on a libris server.\n\n\
                  Log in once with `libris login`; the access token is kept in the\n\
                  platform config directory until you log out or it expires."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// API base URL (overrides the settings file and LIBRIS_API_HOST).
    #[arg(long = "api-host", value_name = "URL", global = true)]
    pub api_host: Option<String>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Log in and store the access token.
    Login(LoginArgs),

    /// Forget the stored access token.
    Logout,

    /// Show who the stored token belongs to.
    Whoami,

    /// List, show, add, edit and remove books.
    #[command(subcommand)]
    Books(BooksCommand),

    /// Manage collections.
    #[command(subcommand)]
    Collections(NamedCommand),

    /// Manage locations.
    #[command(subcommand)]
    Locations(NamedCommand),

    /// Inspect or create the settings file.
    #[command(subcommand)]
    Settings(SettingsCommand),
}

#[derive(Args)]
pub struct LoginArgs {
    #[arg(long)]
    pub email: String,

    #[arg(long)]
    pub password: String,
}

#[derive(Subcommand)]
pub enum BooksCommand {
    /// List one page of books.
    List(BookListArgs),

    /// Show a single book.
    Show {
        id: EntityId,
    },

    /// Add a book from a JSON draft.
    Add(DraftFileArgs),

    /// Update a book from a JSON draft carrying its id.
    Edit(DraftFileArgs),

    /// Remove a book.
    Remove {
        id: EntityId,
    },
}

#[derive(Args, Default)]
pub struct BookListArgs {
    /// Page to show, starting at 1.
    #[arg(long, default_value_t = 1)]
    pub page: u32,

    /// Books per page (defaults to the settings file).
    #[arg(long = "page-size")]
    pub page_size: Option<u32>,

    /// Search text.
    #[arg(long)]
    pub query: Option<String>,

    /// Only books in this collection.
    #[arg(long, value_name = "ID")]
    pub collection: Option<EntityId>,

    /// Only books in this location.
    #[arg(long, value_name = "ID")]
    pub location: Option<EntityId>,
}

#[derive(Args)]
pub struct DraftFileArgs {
    /// JSON file holding the book draft.
    #[arg(long, value_name = "PATH")]
    pub file: PathBuf,
}

/// Commands shared by collections and locations.
#[derive(Subcommand)]
pub enum NamedCommand {
    /// List one page, optionally filtered by name.
    List(NamedListArgs),

    Add {
        #[arg(long)]
        name: String,
    },

    Rename {
        id: EntityId,
        #[arg(long)]
        name: String,
    },

    Remove {
        id: EntityId,
    },
}

#[derive(Args, Default)]
pub struct NamedListArgs {
    /// Page to show, starting at 1.
    #[arg(long, default_value_t = 1)]
    pub page: u32,

    /// Entries per page (defaults to the settings file).
    #[arg(long = "page-size")]
    pub page_size: Option<u32>,

    /// Only names containing this text, ignoring case.
    #[arg(long)]
    pub query: Option<String>,
}

#[derive(Subcommand)]
pub enum SettingsCommand {
    /// Print the effective settings.
    Show,

    /// Print where the settings file lives.
    Path,

    /// Write the effective settings to the settings file.
    Init {
        /// Replace an existing settings file.
        #[arg(long)]
        force: bool,
    },
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
