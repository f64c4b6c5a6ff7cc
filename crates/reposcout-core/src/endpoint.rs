use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::SettingsError;

/// A configured artifact source.
///
/// Lower `priority` values are tried first. Endpoints with equal priority keep
/// the order in which they were handed to the resolver.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Endpoint {
    pub identifier: String,
    pub base_url: String,
    pub priority: i64,
}

impl Endpoint {
    pub fn new(identifier: impl Into<String>, base_url: impl Into<String>, priority: i64) -> Self {
        Self {
            identifier: identifier.into(),
            base_url: base_url.into(),
            priority,
        }
    }

    /// Endpoint for a well-known repository, identified by the preset's canonical name.
    pub fn from_preset(preset: RepositoryPreset, priority: i64) -> Self {
        Self::new(preset.as_str(), preset.base_url(), priority)
    }

    pub fn with_priority(mut self, priority: i64) -> Self {
        self.priority = priority;
        self
    }
}

impl Display for Endpoint {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.identifier, self.base_url)
    }
}

/// Well-known public repositories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RepositoryPreset {
    MavenCentral,
    Google,
    GradlePluginPortal,
}

impl RepositoryPreset {
    pub const ALL: [Self; 3] = [Self::MavenCentral, Self::Google, Self::GradlePluginPortal];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MavenCentral => "mavenCentral",
            Self::Google => "google",
            Self::GradlePluginPortal => "gradlePluginPortal",
        }
    }

    pub const fn base_url(self) -> &'static str {
        match self {
            Self::MavenCentral => "https://repo.maven.apache.org/maven2/",
            Self::Google => "https://dl.google.com/dl/android/maven2/",
            Self::GradlePluginPortal => "https://plugins.gradle.org/m2/",
        }
    }
}

impl Display for RepositoryPreset {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RepositoryPreset {
    type Err = SettingsError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().replace(['_', '-'], "").to_ascii_lowercase();
        match normalized.as_str() {
            "mavencentral" => Ok(Self::MavenCentral),
            "google" => Ok(Self::Google),
            "gradlepluginportal" => Ok(Self::GradlePluginPortal),
            _ => Err(SettingsError::UnknownPreset {
                value: value.trim().to_owned(),
            }),
        }
    }
}
