use reposcout_core::{Endpoint, RepositoryResolver};
use serde::Serialize;

use crate::error::CliError;

use super::CommandResult;

#[derive(Debug, Serialize)]
struct ReposResponseData<'a> {
    attempt_timeout_ms: u64,
    max_retries: u32,
    repositories: &'a [Endpoint],
}

pub fn run(resolver: &RepositoryResolver) -> Result<CommandResult, CliError> {
    let config = resolver.config();
    let max_retries = if config.retry.enabled {
        config.retry.max_retries
    } else {
        0
    };

    let data = serde_json::to_value(ReposResponseData {
        attempt_timeout_ms: config
            .attempt_timeout
            .as_millis()
            .min(u128::from(u64::MAX)) as u64,
        max_retries,
        repositories: resolver.endpoints(),
    })?;

    Ok(CommandResult::ok(data))
}

#[cfg(test)]
mod tests {
    use super::*;
    use reposcout_core::{RepositoryScope, Settings};

    #[test]
    fn lists_plugin_repositories_in_resolution_order() {
        let resolver = Settings::default()
            .resolver(RepositoryScope::Plugins)
            .expect("defaults are valid");

        let result = run(&resolver).expect("command runs");

        let repositories = result.data["repositories"]
            .as_array()
            .expect("repositories array");
        assert_eq!(repositories[0]["identifier"], "mavenCentral");
        assert!(repositories
            .iter()
            .any(|repo| repo["identifier"] == "gradlePluginPortal"));
        assert_eq!(result.data["max_retries"], 0);
        assert_eq!(result.data["attempt_timeout_ms"], 10_000);
    }
}
