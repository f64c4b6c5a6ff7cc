//! CLI argument definitions for reposcout.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `resolve` | Resolve artifacts through the ordered repository list |
//! | `repos` | Show the effective resolution order |
//! | `check` | Validate both repository scopes of the settings |
//!
//! # Global Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--config` | built-in list | Settings file (also `REPOSCOUT_CONFIG`) |
//! | `--scope` | `dependencies` | Repository list to use |
//! | `--timeout-ms` | settings | Per-attempt timeout override |
//! | `--format` | `json` | Output format (json, table) |
//! | `--pretty` | `false` | Pretty-print JSON output |
//! | `-v` | warn | Log verbosity on stderr (`-v` info, `-vv` debug) |
//!
//! # Examples
//!
//! ```bash
//! reposcout resolve com.squareup.okhttp3:okhttp:4.12.0
//! reposcout resolve --plugin com.android.application:8.7.0 --format table
//! reposcout --config repositories.json repos --scope plugins
//! ```

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use reposcout_core::RepositoryScope;

/// Resolve build artifacts through an ordered list of repository mirrors.
#[derive(Debug, Parser)]
#[command(name = "reposcout", author, version, about)]
pub struct Cli {
    /// Repository settings file (JSON). Built-in repository list when omitted.
    #[arg(long, global = true, env = "REPOSCOUT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Repository list to resolve against.
    ///
    /// Defaults to `plugins` for `resolve --plugin`, `dependencies` otherwise.
    #[arg(long, global = true, value_enum)]
    pub scope: Option<ScopeSelector>,

    /// Per-endpoint attempt timeout in milliseconds.
    #[arg(long, global = true)]
    pub timeout_ms: Option<u64>,

    /// Output format for results.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    /// Increase log verbosity (repeatable).
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable summary.
    Table,
    /// Single JSON object.
    Json,
}

/// Repository scope selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ScopeSelector {
    /// Plugin-management repositories.
    Plugins,
    /// Dependency-resolution repositories.
    Dependencies,
}

impl From<ScopeSelector> for RepositoryScope {
    fn from(value: ScopeSelector) -> Self {
        match value {
            ScopeSelector::Plugins => Self::Plugins,
            ScopeSelector::Dependencies => Self::Dependencies,
        }
    }
}

/// Available CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Resolve one or more artifacts, first matching repository wins.
    ///
    /// # Examples
    ///
    ///   reposcout resolve com.google.code.gson:gson:2.10.1
    ///   reposcout resolve org.jetbrains.kotlin:kotlin-stdlib:1.8.22 --output-dir libs
    ///   reposcout resolve --plugin dev.flutter.flutter-plugin-loader:1.0.0
    Resolve(ResolveArgs),

    /// Show repositories in the order they are tried.
    Repos,

    /// Validate the plugin and dependency repository lists.
    Check,
}

/// Arguments for the `resolve` command.
#[derive(Debug, Args)]
pub struct ResolveArgs {
    /// Coordinates (`group:artifact:version[:classifier][@ext]` or a relative path).
    #[arg(required = true, num_args = 1..)]
    pub coordinates: Vec<String>,

    /// Treat arguments as `plugin.id:version` and resolve their plugin markers.
    #[arg(long, default_value_t = false)]
    pub plugin: bool,

    /// Write fetched artifacts into this directory.
    #[arg(long)]
    pub output_dir: Option<PathBuf>,
}

impl Cli {
    /// Scope requested explicitly, or implied by the command.
    pub fn effective_scope(&self) -> RepositoryScope {
        if let Some(scope) = self.scope {
            return scope.into();
        }
        match &self.command {
            Command::Resolve(args) if args.plugin => RepositoryScope::Plugins,
            _ => RepositoryScope::Dependencies,
        }
    }
}
