use std::collections::HashSet;
use std::time::{Duration, Instant};

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::fetch::{Artifact, ArtifactFetcher, AttemptFailed, FetchError};
use crate::request::ArtifactRequest;
use crate::retry::RetryConfig;
use crate::{ConfigError, Endpoint};

/// Per-resolver tuning that applies to every attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolverConfig {
    /// Upper bound for a single fetch attempt against one endpoint.
    pub attempt_timeout: Duration,
    pub retry: RetryConfig,
}

impl ResolverConfig {
    pub const DEFAULT_ATTEMPT_TIMEOUT: Duration = Duration::from_secs(10);

    pub fn with_attempt_timeout(mut self, attempt_timeout: Duration) -> Self {
        self.attempt_timeout = attempt_timeout;
        self
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            attempt_timeout: Self::DEFAULT_ATTEMPT_TIMEOUT,
            retry: RetryConfig::no_retry(),
        }
    }
}

/// Successful resolution.
#[derive(Debug, Clone, Serialize)]
pub struct Resolved {
    pub endpoint_identifier: String,
    pub artifact: Artifact,
    /// Endpoints tried, in order, ending with the one that succeeded.
    pub attempted: Vec<String>,
    /// Failures from the endpoints tried before the winner.
    pub failures: Vec<AttemptFailed>,
    pub latency_ms: u64,
}

/// Every endpoint failed for one request.
#[derive(Debug, Clone, Serialize, Error)]
#[error(
    "could not resolve '{coordinate}' from {} endpoint(s); last error: {last_error}",
    .attempted.len()
)]
pub struct ResolutionFailure {
    pub coordinate: String,
    /// All endpoint identifiers, in the order they were tried.
    pub attempted: Vec<String>,
    /// Most recent failure, usually the most useful for diagnosis.
    pub last_error: AttemptFailed,
    pub failures: Vec<AttemptFailed>,
    pub latency_ms: u64,
}

pub type ResolutionResult = Result<Resolved, ResolutionFailure>;

/// Ordered, first-success-wins resolution over a fixed endpoint list.
///
/// The endpoint list is validated and ordered once at construction and never
/// changes afterwards, so a resolver can be shared freely between tasks.
///
/// ```rust,ignore
/// use reposcout_core::{ArtifactRequest, Endpoint, RepositoryResolver, SchemeFetcher};
///
/// let resolver = RepositoryResolver::new(vec![
///     Endpoint::new("mavenCentral", "https://repo.maven.apache.org/maven2/", 0),
///     Endpoint::new("aliyunGoogle", "https://maven.aliyun.com/repository/google", 1),
/// ])?;
/// let request = ArtifactRequest::new("com.squareup.okio:okio:3.9.0")?;
/// match resolver.resolve(&request, &SchemeFetcher::default()).await {
///     Ok(resolved) => println!("found at {}", resolved.artifact.location),
///     Err(failure) => eprintln!("{failure}"),
/// }
/// ```
#[derive(Debug, Clone)]
pub struct RepositoryResolver {
    endpoints: Vec<Endpoint>,
    config: ResolverConfig,
}

impl RepositoryResolver {
    pub fn new(endpoints: impl IntoIterator<Item = Endpoint>) -> Result<Self, ConfigError> {
        Self::with_config(endpoints, ResolverConfig::default())
    }

    pub fn with_config(
        endpoints: impl IntoIterator<Item = Endpoint>,
        config: ResolverConfig,
    ) -> Result<Self, ConfigError> {
        let mut endpoints = endpoints.into_iter().collect::<Vec<_>>();
        if endpoints.is_empty() {
            return Err(ConfigError::NoEndpoints);
        }
        if config.attempt_timeout.is_zero() {
            return Err(ConfigError::ZeroAttemptTimeout);
        }

        let mut seen = HashSet::with_capacity(endpoints.len());
        for endpoint in &endpoints {
            if endpoint.identifier.trim().is_empty() {
                return Err(ConfigError::EmptyIdentifier);
            }
            if endpoint.base_url.trim().is_empty() {
                return Err(ConfigError::EmptyBaseUrl {
                    identifier: endpoint.identifier.clone(),
                });
            }
            if !seen.insert(endpoint.identifier.as_str()) {
                return Err(ConfigError::DuplicateIdentifier {
                    identifier: endpoint.identifier.clone(),
                });
            }
        }

        // Stable: equal priorities keep insertion order.
        endpoints.sort_by_key(|endpoint| endpoint.priority);

        debug!(
            endpoints = endpoints.len(),
            order = %join_identifiers(&endpoints),
            "repository resolver configured"
        );

        Ok(Self { endpoints, config })
    }

    /// Endpoints in resolution order.
    pub fn endpoints(&self) -> &[Endpoint] {
        &self.endpoints
    }

    pub fn endpoint(&self, identifier: &str) -> Option<&Endpoint> {
        self.endpoints
            .iter()
            .find(|endpoint| endpoint.identifier == identifier)
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    pub async fn resolve<F>(&self, request: &ArtifactRequest, fetcher: &F) -> ResolutionResult
    where
        F: ArtifactFetcher + ?Sized,
    {
        let started = Instant::now();
        let mut attempted = Vec::with_capacity(self.endpoints.len());
        let mut failures = Vec::new();

        for endpoint in &self.endpoints {
            attempted.push(endpoint.identifier.clone());

            match self.attempt(endpoint, &request.coordinate, fetcher).await {
                Ok(artifact) => {
                    if !failures.is_empty() {
                        info!(
                            coordinate = %request.coordinate,
                            endpoint = %endpoint.identifier,
                            failed_attempts = failures.len(),
                            "resolved after falling back"
                        );
                    }
                    return Ok(Resolved {
                        endpoint_identifier: endpoint.identifier.clone(),
                        artifact,
                        attempted,
                        failures,
                        latency_ms: elapsed_ms(started),
                    });
                }
                Err(error) => {
                    warn!(
                        coordinate = %request.coordinate,
                        endpoint = %endpoint.identifier,
                        code = error.code(),
                        "attempt failed: {}",
                        error.message()
                    );
                    failures.push(AttemptFailed::new(endpoint.identifier.clone(), error));
                }
            }
        }

        let last_error = failures
            .last()
            .cloned()
            .expect("resolver always holds at least one endpoint");

        Err(ResolutionFailure {
            coordinate: request.coordinate.clone(),
            attempted,
            last_error,
            failures,
            latency_ms: elapsed_ms(started),
        })
    }

    async fn attempt<F>(
        &self,
        endpoint: &Endpoint,
        coordinate: &str,
        fetcher: &F,
    ) -> Result<Artifact, FetchError>
    where
        F: ArtifactFetcher + ?Sized,
    {
        let mut retries = 0;
        loop {
            debug!(endpoint = %endpoint.identifier, coordinate, retries, "fetching");

            let outcome = match tokio::time::timeout(
                self.config.attempt_timeout,
                fetcher.fetch(&endpoint.base_url, coordinate),
            )
            .await
            {
                Ok(outcome) => outcome,
                Err(_) => Err(FetchError::timeout(format!(
                    "attempt exceeded {} ms",
                    self.config.attempt_timeout.as_millis()
                ))),
            };

            match outcome {
                Ok(artifact) => return Ok(artifact),
                Err(error) if self.config.retry.should_retry(&error, retries) => {
                    let delay = self.config.retry.delay_for_attempt(retries);
                    debug!(
                        endpoint = %endpoint.identifier,
                        delay_ms = delay.as_millis() as u64,
                        "retrying after {}",
                        error
                    );
                    tokio::time::sleep(delay).await;
                    retries += 1;
                }
                Err(error) => return Err(error),
            }
        }
    }
}

fn join_identifiers(endpoints: &[Endpoint]) -> String {
    endpoints
        .iter()
        .map(|endpoint| endpoint.identifier.as_str())
        .collect::<Vec<_>>()
        .join(" > ")
}

fn elapsed_ms(started: Instant) -> u64 {
    started.elapsed().as_millis().min(u128::from(u64::MAX)) as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::FetchFuture;
    use crate::FetchErrorKind;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    /// Serves the configured outcome per base url and records every call.
    #[derive(Default)]
    struct ScriptedFetcher {
        outcomes: HashMap<String, Vec<Result<Vec<u8>, FetchError>>>,
        delays: HashMap<String, Duration>,
        calls: Mutex<Vec<String>>,
    }

    impl ScriptedFetcher {
        fn respond(mut self, base_url: &str, outcome: Result<&[u8], FetchError>) -> Self {
            self.outcomes
                .entry(base_url.to_owned())
                .or_default()
                .push(outcome.map(<[u8]>::to_vec));
            self
        }

        fn delay(mut self, base_url: &str, delay: Duration) -> Self {
            self.delays.insert(base_url.to_owned(), delay);
            self
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().expect("calls lock").clone()
        }
    }

    impl ArtifactFetcher for ScriptedFetcher {
        fn fetch<'a>(&'a self, base_url: &'a str, coordinate: &'a str) -> FetchFuture<'a> {
            Box::pin(async move {
                let call_index = {
                    let mut calls = self.calls.lock().expect("calls lock");
                    calls.push(base_url.to_owned());
                    calls.iter().filter(|url| url.as_str() == base_url).count() - 1
                };
                if let Some(delay) = self.delays.get(base_url) {
                    tokio::time::sleep(*delay).await;
                }
                let scripted = self
                    .outcomes
                    .get(base_url)
                    .and_then(|outcomes| outcomes.get(call_index).or(outcomes.last()))
                    .cloned()
                    .unwrap_or_else(|| Err(FetchError::not_found("no script")));
                scripted.map(|bytes| Artifact::new(format!("{base_url}{coordinate}"), bytes))
            })
        }
    }

    fn endpoints(specs: &[(&str, i64)]) -> Vec<Endpoint> {
        specs
            .iter()
            .map(|(id, priority)| Endpoint::new(*id, format!("mem://{id}/"), *priority))
            .collect()
    }

    fn request() -> ArtifactRequest {
        ArtifactRequest::new("com.example:lib:1.0").expect("valid request")
    }

    #[test]
    fn equal_priorities_keep_insertion_order() {
        let resolver = RepositoryResolver::new(endpoints(&[
            ("c", 5),
            ("a", 1),
            ("b", 5),
            ("d", 1),
        ]))
        .expect("valid endpoints");

        let order = resolver
            .endpoints()
            .iter()
            .map(|endpoint| endpoint.identifier.as_str())
            .collect::<Vec<_>>();
        assert_eq!(order, vec!["a", "d", "c", "b"]);
    }

    #[test]
    fn blank_identifier_and_url_are_rejected() {
        assert_eq!(
            RepositoryResolver::new(vec![Endpoint::new(" ", "mem://x/", 0)]).err(),
            Some(ConfigError::EmptyIdentifier)
        );
        assert_eq!(
            RepositoryResolver::new(vec![Endpoint::new("x", "", 0)]).err(),
            Some(ConfigError::EmptyBaseUrl {
                identifier: String::from("x")
            })
        );
    }

    #[test]
    fn zero_attempt_timeout_is_rejected() {
        let config = ResolverConfig::default().with_attempt_timeout(Duration::ZERO);
        assert_eq!(
            RepositoryResolver::with_config(endpoints(&[("a", 0)]), config).err(),
            Some(ConfigError::ZeroAttemptTimeout)
        );
    }

    #[tokio::test]
    async fn stops_at_first_success() {
        let resolver =
            RepositoryResolver::new(endpoints(&[("a", 0), ("b", 1), ("c", 2), ("d", 3)]))
                .expect("valid endpoints");
        let fetcher = ScriptedFetcher::default()
            .respond("mem://a/", Err(FetchError::transport("reset")))
            .respond("mem://b/", Err(FetchError::not_found("missing")))
            .respond("mem://c/", Ok(b"jar"))
            .respond("mem://d/", Ok(b"other"));

        let resolved = resolver
            .resolve(&request(), &fetcher)
            .await
            .expect("third endpoint succeeds");

        assert_eq!(resolved.endpoint_identifier, "c");
        assert_eq!(resolved.artifact.bytes, b"jar");
        assert_eq!(resolved.attempted, vec!["a", "b", "c"]);
        assert_eq!(resolved.failures.len(), 2);
        assert_eq!(fetcher.calls(), vec!["mem://a/", "mem://b/", "mem://c/"]);
    }

    #[tokio::test]
    async fn exhaustion_reports_every_endpoint_and_last_error() {
        let resolver = RepositoryResolver::new(endpoints(&[("b", 1), ("a", 0)]))
            .expect("valid endpoints");
        let fetcher = ScriptedFetcher::default()
            .respond("mem://a/", Err(FetchError::transport("reset")))
            .respond("mem://b/", Err(FetchError::not_found("status 404")));

        let failure = resolver
            .resolve(&request(), &fetcher)
            .await
            .expect_err("all endpoints fail");

        assert_eq!(failure.attempted, vec!["a", "b"]);
        assert_eq!(failure.last_error.endpoint_identifier, "b");
        assert_eq!(failure.last_error.error.kind(), FetchErrorKind::NotFound);
        assert_eq!(failure.failures.len(), 2);
        assert_eq!(failure.coordinate, "com.example:lib:1.0");
    }

    #[tokio::test]
    async fn slow_endpoint_times_out_and_falls_back() {
        let config = ResolverConfig::default().with_attempt_timeout(Duration::from_millis(50));
        let resolver =
            RepositoryResolver::with_config(endpoints(&[("slow", 0), ("fast", 1)]), config)
                .expect("valid endpoints");
        let fetcher = ScriptedFetcher::default()
            .respond("mem://slow/", Ok(b"late"))
            .delay("mem://slow/", Duration::from_secs(30))
            .respond("mem://fast/", Ok(b"on time"));

        let started = Instant::now();
        let resolved = resolver
            .resolve(&request(), &fetcher)
            .await
            .expect("fallback succeeds");

        assert_eq!(resolved.endpoint_identifier, "fast");
        assert_eq!(resolved.failures[0].error.kind(), FetchErrorKind::Timeout);
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn retryable_failures_are_retried_on_the_same_endpoint() {
        let config = ResolverConfig::default()
            .with_retry(RetryConfig::fixed(Duration::from_millis(1), 2));
        let resolver = RepositoryResolver::with_config(endpoints(&[("a", 0), ("b", 1)]), config)
            .expect("valid endpoints");
        let fetcher = ScriptedFetcher::default()
            .respond("mem://a/", Err(FetchError::transport("reset")))
            .respond("mem://a/", Ok(b"second try"))
            .respond("mem://b/", Ok(b"unused"));

        let resolved = resolver
            .resolve(&request(), &fetcher)
            .await
            .expect("retry succeeds");

        assert_eq!(resolved.endpoint_identifier, "a");
        assert_eq!(resolved.artifact.bytes, b"second try");
        assert!(resolved.failures.is_empty());
        assert_eq!(fetcher.calls(), vec!["mem://a/", "mem://a/"]);
    }

    #[tokio::test]
    async fn not_found_is_never_retried() {
        let config = ResolverConfig::default()
            .with_retry(RetryConfig::fixed(Duration::from_millis(1), 3));
        let resolver = RepositoryResolver::with_config(endpoints(&[("a", 0), ("b", 1)]), config)
            .expect("valid endpoints");
        let fetcher = ScriptedFetcher::default()
            .respond("mem://a/", Err(FetchError::not_found("status 404")))
            .respond("mem://b/", Ok(b"jar"));

        let resolved = resolver
            .resolve(&request(), &fetcher)
            .await
            .expect("fallback succeeds");

        assert_eq!(resolved.endpoint_identifier, "b");
        assert_eq!(fetcher.calls(), vec!["mem://a/", "mem://b/"]);
    }

    #[tokio::test]
    async fn concurrent_resolutions_see_the_same_order() {
        let resolver = Arc::new(
            RepositoryResolver::new(endpoints(&[("z", 0), ("y", 0), ("x", 1)]))
                .expect("valid endpoints"),
        );
        let fetcher = Arc::new(
            ScriptedFetcher::default()
                .respond("mem://z/", Err(FetchError::transport("reset")))
                .respond("mem://y/", Err(FetchError::transport("reset")))
                .respond("mem://x/", Err(FetchError::transport("reset"))),
        );
        let completed = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let resolver = Arc::clone(&resolver);
            let fetcher = Arc::clone(&fetcher);
            let completed = Arc::clone(&completed);
            handles.push(tokio::spawn(async move {
                let failure = resolver
                    .resolve(&request(), fetcher.as_ref())
                    .await
                    .expect_err("all endpoints fail");
                completed.fetch_add(1, Ordering::SeqCst);
                failure.attempted
            }));
        }

        for handle in handles {
            let attempted = handle.await.expect("task completes");
            assert_eq!(attempted, vec!["z", "y", "x"]);
        }
        assert_eq!(completed.load(Ordering::SeqCst), 8);
    }
}
