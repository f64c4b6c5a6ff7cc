//! Repository settings: which endpoints each scope searches, and in what order.
//!
//! Settings are a JSON document:
//!
//! ```json
//! {
//!   "plugin_repositories": [
//!     { "preset": "gradlePluginPortal" },
//!     { "id": "aliyunPublic", "url": "https://maven.aliyun.com/repository/public" }
//!   ],
//!   "dependency_repositories": [
//!     { "preset": "mavenCentral" },
//!     { "preset": "google", "priority": -1 }
//!   ],
//!   "attempt_timeout_ms": 5000,
//!   "retry": { "max_retries": 2, "backoff_ms": 250 }
//! }
//! ```
//!
//! An entry without `priority` gets its position in the list, so plain
//! declaration order is the resolution order.
//!
//! # Environment Variables
//!
//! | Variable | Effect |
//! |----------|--------|
//! | `REPOSCOUT_CONFIG` | path of the settings file; built-in defaults when unset |
//! | `REPOSCOUT_ATTEMPT_TIMEOUT_MS` | overrides `attempt_timeout_ms` |

use std::fmt::{Display, Formatter};
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::resolver::{RepositoryResolver, ResolverConfig};
use crate::retry::{Backoff, RetryConfig};
use crate::{Endpoint, RepositoryPreset, SettingsError};

pub const CONFIG_ENV: &str = "REPOSCOUT_CONFIG";
pub const ATTEMPT_TIMEOUT_ENV: &str = "REPOSCOUT_ATTEMPT_TIMEOUT_MS";

/// Which repository list a lookup goes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepositoryScope {
    /// Build plugins and plugin markers.
    Plugins,
    /// Regular library dependencies.
    Dependencies,
}

impl RepositoryScope {
    pub const ALL: [Self; 2] = [Self::Plugins, Self::Dependencies];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Plugins => "plugins",
            Self::Dependencies => "dependencies",
        }
    }
}

impl Display for RepositoryScope {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One declared repository.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RepositoryEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preset: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<i64>,
}

impl RepositoryEntry {
    pub fn preset(preset: RepositoryPreset) -> Self {
        Self {
            preset: Some(preset.as_str().to_owned()),
            ..Self::default()
        }
    }

    pub fn maven(id: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            url: Some(url.into()),
            ..Self::default()
        }
    }

    fn to_endpoint(&self, index: usize) -> Result<Endpoint, SettingsError> {
        let priority = self.priority.unwrap_or(index as i64);

        if let Some(preset) = &self.preset {
            let preset = preset.parse::<RepositoryPreset>()?;
            let mut endpoint = Endpoint::from_preset(preset, priority);
            if let Some(id) = &self.id {
                endpoint.identifier = id.clone();
            }
            if let Some(url) = &self.url {
                endpoint.base_url = url.clone();
            }
            return Ok(endpoint);
        }

        match (&self.id, &self.url) {
            (Some(id), Some(url)) => Ok(Endpoint::new(id.clone(), url.clone(), priority)),
            _ => Err(SettingsError::IncompleteEntry { index }),
        }
    }
}

/// Same-endpoint retry knobs as they appear in the settings file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RetrySettings {
    pub max_retries: u32,
    #[serde(default = "RetrySettings::default_backoff_ms")]
    pub backoff_ms: u64,
    /// Doubles the delay on every retry (with jitter) instead of keeping it fixed.
    #[serde(default)]
    pub exponential: bool,
}

impl RetrySettings {
    fn default_backoff_ms() -> u64 {
        200
    }

    fn to_retry_config(&self) -> RetryConfig {
        let delay = Duration::from_millis(self.backoff_ms);
        if self.exponential {
            RetryConfig {
                backoff: Backoff::Exponential {
                    base: delay,
                    factor: 2.0,
                    max: Duration::from_secs(3).max(delay),
                    jitter: true,
                },
                ..RetryConfig::exponential(self.max_retries)
            }
        } else {
            RetryConfig::fixed(delay, self.max_retries)
        }
    }
}

/// Repository lists for both scopes plus resolver tuning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    #[serde(default)]
    pub plugin_repositories: Vec<RepositoryEntry>,
    #[serde(default)]
    pub dependency_repositories: Vec<RepositoryEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attempt_timeout_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry: Option<RetrySettings>,
}

impl Default for Settings {
    /// Maven Central first, then the Aliyun mirrors and JitPack, then the
    /// upstream Google and Gradle repositories.
    fn default() -> Self {
        let head = vec![
            RepositoryEntry::preset(RepositoryPreset::MavenCentral),
            RepositoryEntry::maven("aliyunGoogle", "https://maven.aliyun.com/repository/google"),
            RepositoryEntry::maven("aliyunJcenter", "https://maven.aliyun.com/repository/jcenter"),
            RepositoryEntry::maven("aliyunPublic", "https://maven.aliyun.com/repository/public"),
            RepositoryEntry::maven("jitpack", "https://jitpack.io"),
            RepositoryEntry::preset(RepositoryPreset::Google),
        ];
        let tail = [
            RepositoryEntry::maven("apacheMaven", "https://repo.maven.apache.org/maven2/"),
            RepositoryEntry::maven("gradlePluginsM2", "https://plugins.gradle.org/m2/"),
        ];

        let mut plugin_repositories = head.clone();
        plugin_repositories.push(RepositoryEntry::preset(RepositoryPreset::GradlePluginPortal));
        plugin_repositories.extend(tail.iter().cloned());

        let mut dependency_repositories = head;
        dependency_repositories.extend(tail);

        Self {
            plugin_repositories,
            dependency_repositories,
            attempt_timeout_ms: None,
            retry: None,
        }
    }
}

impl Settings {
    pub fn from_json(document: &str) -> Result<Self, SettingsError> {
        Ok(serde_json::from_str(document)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let document = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&document)
    }

    /// Settings named by `REPOSCOUT_CONFIG` (or the defaults), with env overrides applied.
    pub fn from_env() -> Result<Self, SettingsError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, SettingsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = match lookup(CONFIG_ENV).filter(|path| !path.trim().is_empty()) {
            Some(path) => Self::load(path.trim())?,
            None => Self::default(),
        };
        settings.apply_overrides(lookup)?;
        Ok(settings)
    }

    /// Applies `REPOSCOUT_ATTEMPT_TIMEOUT_MS` when present.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), SettingsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup(ATTEMPT_TIMEOUT_ENV) {
            let timeout_ms = raw
                .trim()
                .parse::<u64>()
                .map_err(|_| SettingsError::InvalidEnv {
                    name: ATTEMPT_TIMEOUT_ENV,
                    value: raw.clone(),
                })?;
            self.attempt_timeout_ms = Some(timeout_ms);
        }
        Ok(())
    }

    pub fn entries(&self, scope: RepositoryScope) -> &[RepositoryEntry] {
        match scope {
            RepositoryScope::Plugins => &self.plugin_repositories,
            RepositoryScope::Dependencies => &self.dependency_repositories,
        }
    }

    /// Endpoints of `scope` in declaration order (not yet sorted by priority).
    pub fn endpoints(&self, scope: RepositoryScope) -> Result<Vec<Endpoint>, SettingsError> {
        self.entries(scope)
            .iter()
            .enumerate()
            .map(|(index, entry)| entry.to_endpoint(index))
            .collect()
    }

    pub fn resolver_config(&self) -> ResolverConfig {
        let mut config = ResolverConfig::default();
        if let Some(timeout_ms) = self.attempt_timeout_ms {
            config.attempt_timeout = Duration::from_millis(timeout_ms);
        }
        if let Some(retry) = &self.retry {
            config.retry = retry.to_retry_config();
        }
        config
    }

    pub fn resolver(&self, scope: RepositoryScope) -> Result<RepositoryResolver, SettingsError> {
        let endpoints = self.endpoints(scope)?;
        Ok(RepositoryResolver::with_config(
            endpoints,
            self.resolver_config(),
        )?)
    }
}
