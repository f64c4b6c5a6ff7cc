mod check;
mod repos;
mod resolve;

use reposcout_core::{RepositoryScope, SchemeFetcher, Settings};
use serde::Serialize;
use serde_json::Value;

use crate::cli::{Cli, Command};
use crate::error::CliError;

/// Exit code used when at least one lookup or check failed.
pub const EXIT_FAILED: u8 = 3;

/// Error entry carried in a report.
#[derive(Debug, Clone, Serialize)]
pub struct ReportError {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
}

/// Everything a command produces, ready for rendering.
#[derive(Debug, Serialize)]
pub struct Report {
    pub scope: RepositoryScope,
    pub data: Value,
    pub warnings: Vec<String>,
    pub errors: Vec<ReportError>,
    pub latency_ms: u64,
}

impl Report {
    pub fn exit_code(&self) -> u8 {
        if self.errors.is_empty() {
            0
        } else {
            EXIT_FAILED
        }
    }
}

pub struct CommandResult {
    pub data: Value,
    pub warnings: Vec<String>,
    pub errors: Vec<ReportError>,
    pub latency_ms: u64,
}

impl CommandResult {
    pub fn ok(data: Value) -> Self {
        Self {
            data,
            warnings: Vec::new(),
            errors: Vec::new(),
            latency_ms: 0,
        }
    }

    pub fn with_warnings(mut self, warnings: Vec<String>) -> Self {
        self.warnings.extend(warnings);
        self
    }

    pub fn with_errors(mut self, errors: Vec<ReportError>) -> Self {
        self.errors.extend(errors);
        self
    }

    pub fn with_latency(mut self, latency_ms: u64) -> Self {
        self.latency_ms = latency_ms;
        self
    }

    fn into_report(self, scope: RepositoryScope) -> Report {
        Report {
            scope,
            data: self.data,
            warnings: self.warnings,
            errors: self.errors,
            latency_ms: self.latency_ms,
        }
    }
}

pub async fn run(cli: &Cli) -> Result<Report, CliError> {
    let settings = load_settings(cli)?;
    let scope = cli.effective_scope();

    let command_result = match &cli.command {
        Command::Resolve(args) => {
            let resolver = settings.resolver(scope)?;
            resolve::run(args, &resolver, &SchemeFetcher::default()).await?
        }
        Command::Repos => repos::run(&settings.resolver(scope)?)?,
        Command::Check => check::run(&settings)?,
    };

    Ok(command_result.into_report(scope))
}

fn load_settings(cli: &Cli) -> Result<Settings, CliError> {
    let mut settings = match &cli.config {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };
    settings.apply_overrides(|name| std::env::var(name).ok())?;
    if let Some(timeout_ms) = cli.timeout_ms {
        settings.attempt_timeout_ms = Some(timeout_ms);
    }
    Ok(settings)
}
