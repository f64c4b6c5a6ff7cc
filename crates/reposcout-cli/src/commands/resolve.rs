use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Instant;

use reposcout_core::{
    artifact_file_name, ArtifactFetcher, ArtifactRequest, RepositoryResolver, ResolutionResult,
};
use serde::Serialize;
use tracing::{info, warn};

use crate::cli::ResolveArgs;
use crate::error::CliError;

use super::{CommandResult, ReportError};

#[derive(Debug, Serialize)]
struct ResolveResponseData {
    artifacts: Vec<ArtifactOutcome>,
}

#[derive(Debug, Serialize)]
struct ArtifactOutcome {
    coordinate: String,
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    endpoint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    size_bytes: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    saved_to: Option<String>,
    attempted: Vec<String>,
}

pub async fn run<F>(
    args: &ResolveArgs,
    resolver: &RepositoryResolver,
    fetcher: &F,
) -> Result<CommandResult, CliError>
where
    F: ArtifactFetcher + ?Sized,
{
    let started = Instant::now();
    let requests = args
        .coordinates
        .iter()
        .map(|raw| build_request(raw, args.plugin))
        .collect::<Result<Vec<_>, _>>()?;

    if let Some(dir) = &args.output_dir {
        tokio::fs::create_dir_all(dir).await?;
    }

    let mut artifacts = Vec::with_capacity(requests.len());
    let mut log = RunLog::default();

    for request in &requests {
        let outcome = resolver.resolve(request, fetcher).await;
        artifacts.push(record(request, outcome, args.output_dir.as_deref(), &mut log).await?);
    }

    let data = serde_json::to_value(ResolveResponseData { artifacts })?;
    Ok(CommandResult::ok(data)
        .with_warnings(log.warnings)
        .with_errors(log.errors)
        .with_latency(started.elapsed().as_millis().min(u128::from(u64::MAX)) as u64))
}

fn build_request(raw: &str, plugin: bool) -> Result<ArtifactRequest, CliError> {
    if !plugin {
        return Ok(ArtifactRequest::new(raw)?);
    }
    match raw.trim().rsplit_once(':') {
        Some((plugin_id, version)) if !plugin_id.is_empty() && !version.is_empty() => {
            Ok(ArtifactRequest::plugin(plugin_id, version)?)
        }
        _ => Err(CliError::Usage(format!(
            "plugin '{raw}' must be given as plugin.id:version"
        ))),
    }
}

#[derive(Default)]
struct RunLog {
    warnings: Vec<String>,
    errors: Vec<ReportError>,
    /// Files already written during this run.
    written: HashSet<PathBuf>,
}

async fn record(
    request: &ArtifactRequest,
    outcome: ResolutionResult,
    output_dir: Option<&Path>,
    log: &mut RunLog,
) -> Result<ArtifactOutcome, CliError> {
    match outcome {
        Ok(resolved) => {
            if !resolved.failures.is_empty() {
                log.warnings.push(format!(
                    "'{}' resolved from '{}' after {} failed attempt(s)",
                    request.coordinate,
                    resolved.endpoint_identifier,
                    resolved.failures.len()
                ));
            }

            let saved_to = match output_dir {
                Some(dir) => save(dir, request, &resolved.artifact.bytes, log).await?,
                None => None,
            };

            Ok(ArtifactOutcome {
                coordinate: request.coordinate.clone(),
                status: "resolved",
                endpoint: Some(resolved.endpoint_identifier),
                location: Some(resolved.artifact.location.clone()),
                size_bytes: Some(resolved.artifact.size()),
                saved_to,
                attempted: resolved.attempted,
            })
        }
        Err(failure) => {
            log.warnings.push(failure.to_string());
            log.errors.push(ReportError {
                code: failure.last_error.error.code().to_owned(),
                message: failure.last_error.error.message().to_owned(),
                endpoint: Some(failure.last_error.endpoint_identifier.clone()),
            });

            Ok(ArtifactOutcome {
                coordinate: request.coordinate.clone(),
                status: "failed",
                endpoint: None,
                location: None,
                size_bytes: None,
                saved_to: None,
                attempted: failure.attempted,
            })
        }
    }
}

/// Writes one artifact, refusing to overwrite a file saved earlier in the same run.
async fn save(
    dir: &Path,
    request: &ArtifactRequest,
    bytes: &[u8],
    log: &mut RunLog,
) -> Result<Option<String>, CliError> {
    let path = dir.join(artifact_file_name(&request.coordinate));
    if !log.written.insert(path.clone()) {
        warn!(path = %path.display(), coordinate = %request.coordinate, "output file already written");
        log.errors.push(ReportError {
            code: "output.collision".to_owned(),
            message: format!(
                "'{}' maps to {} which was already written in this run; not saved",
                request.coordinate,
                path.display()
            ),
            endpoint: None,
        });
        return Ok(None);
    }

    tokio::fs::write(&path, bytes).await?;
    info!(path = %path.display(), "artifact saved");
    Ok(Some(path.display().to_string()))
}
