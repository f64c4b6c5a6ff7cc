use reposcout_core::{RepositoryScope, Settings};
use serde::Serialize;
use tracing::warn;

use crate::error::CliError;

use super::{CommandResult, ReportError};

#[derive(Debug, Serialize)]
struct ScopeCheck {
    scope: RepositoryScope,
    valid: bool,
    repositories: usize,
}

/// Validates every scope, reporting each invalid one instead of stopping at the first.
pub fn run(settings: &Settings) -> Result<CommandResult, CliError> {
    let mut checks = Vec::with_capacity(RepositoryScope::ALL.len());
    let mut errors = Vec::new();

    for scope in RepositoryScope::ALL {
        match settings.resolver(scope) {
            Ok(resolver) => checks.push(ScopeCheck {
                scope,
                valid: true,
                repositories: resolver.endpoints().len(),
            }),
            Err(error) => {
                warn!(%scope, %error, "invalid repository list");
                errors.push(ReportError {
                    code: "config.invalid".to_owned(),
                    message: format!("{scope}: {error}"),
                    endpoint: None,
                });
                checks.push(ScopeCheck {
                    scope,
                    valid: false,
                    repositories: settings.entries(scope).len(),
                });
            }
        }
    }

    let data = serde_json::to_value(checks)?;
    Ok(CommandResult::ok(data).with_errors(errors))
}
