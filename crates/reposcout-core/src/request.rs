//! Artifact requests and coordinate helpers.
//!
//! The resolver treats a coordinate as an opaque key. Fetch adapters that talk
//! to Maven-layout repositories turn it into a repository-relative path with
//! [`artifact_path`].

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::RequestError;

/// A single lookup handed to the resolver.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArtifactRequest {
    pub coordinate: String,
}

impl ArtifactRequest {
    pub fn new(coordinate: impl Into<String>) -> Result<Self, RequestError> {
        let coordinate = coordinate.into();
        let trimmed = coordinate.trim();
        if trimmed.is_empty() {
            return Err(RequestError::EmptyCoordinate);
        }
        Ok(Self {
            coordinate: trimmed.to_owned(),
        })
    }

    /// Request for a Gradle plugin marker, given `plugin.id` and its version.
    pub fn plugin(plugin_id: &str, version: &str) -> Result<Self, RequestError> {
        let marker = MavenCoordinate::plugin_marker(plugin_id, version)?;
        Self::new(marker.to_string())
    }
}

impl Display for ArtifactRequest {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.coordinate)
    }
}

/// `group:artifact:version[:classifier][@extension]`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MavenCoordinate {
    pub group: String,
    pub artifact: String,
    pub version: String,
    pub classifier: Option<String>,
    pub extension: String,
}

impl MavenCoordinate {
    pub const DEFAULT_EXTENSION: &'static str = "jar";

    pub fn parse(value: &str) -> Result<Self, RequestError> {
        let value = value.trim();
        if value.is_empty() {
            return Err(RequestError::EmptyCoordinate);
        }

        let (body, extension) = match value.rsplit_once('@') {
            Some((body, extension)) => (body, extension),
            None => (value, Self::DEFAULT_EXTENSION),
        };

        let parts = body.split(':').collect::<Vec<_>>();
        let (group, artifact, version, classifier) = match parts.as_slice() {
            [group, artifact, version] => (*group, *artifact, *version, None),
            [group, artifact, version, classifier] => {
                (*group, *artifact, *version, Some(*classifier))
            }
            _ => {
                return Err(RequestError::MalformedCoordinate {
                    value: value.to_owned(),
                })
            }
        };

        let checked = [
            ("group", group),
            ("artifact", artifact),
            ("version", version),
            ("extension", extension),
        ];
        for (part, text) in checked {
            if text.trim().is_empty() {
                return Err(RequestError::EmptyCoordinatePart {
                    value: value.to_owned(),
                    part,
                });
            }
        }
        if classifier.is_some_and(|c| c.trim().is_empty()) {
            return Err(RequestError::EmptyCoordinatePart {
                value: value.to_owned(),
                part: "classifier",
            });
        }

        let mut path_parts = vec![artifact, version, extension];
        path_parts.extend(classifier);
        if !group.split('.').all(is_path_segment)
            || !path_parts.into_iter().all(is_path_segment)
        {
            return Err(RequestError::MalformedCoordinate {
                value: value.to_owned(),
            });
        }

        Ok(Self {
            group: group.to_owned(),
            artifact: artifact.to_owned(),
            version: version.to_owned(),
            classifier: classifier.map(str::to_owned),
            extension: extension.to_owned(),
        })
    }

    /// Marker POM that maps a plugin id onto its implementation artifact.
    pub fn plugin_marker(plugin_id: &str, version: &str) -> Result<Self, RequestError> {
        let plugin_id = plugin_id.trim();
        let version = version.trim();
        Self::parse(&format!(
            "{plugin_id}:{plugin_id}.gradle.plugin:{version}@pom"
        ))
    }

    pub fn file_name(&self) -> String {
        match &self.classifier {
            Some(classifier) => format!(
                "{}-{}-{}.{}",
                self.artifact, self.version, classifier, self.extension
            ),
            None => format!("{}-{}.{}", self.artifact, self.version, self.extension),
        }
    }

    /// Path relative to a Maven-layout repository root.
    pub fn relative_path(&self) -> String {
        format!(
            "{}/{}/{}/{}",
            self.group.replace('.', "/"),
            self.artifact,
            self.version,
            self.file_name()
        )
    }
}

impl Display for MavenCoordinate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.group, self.artifact, self.version)?;
        if let Some(classifier) = &self.classifier {
            write!(f, ":{classifier}")?;
        }
        if self.extension != Self::DEFAULT_EXTENSION {
            write!(f, "@{}", self.extension)?;
        }
        Ok(())
    }
}

/// A coordinate part must stay inside one path segment.
fn is_path_segment(part: &str) -> bool {
    let part = part.trim();
    !part.is_empty() && !matches!(part, "." | "..") && !part.contains(['/', '\\'])
}

/// Repository-relative path for a coordinate.
///
/// Anything containing `:` must be a Maven coordinate. Other values are taken
/// as relative paths; `.` and `..` segments are refused.
pub fn artifact_path(coordinate: &str) -> Result<String, RequestError> {
    let coordinate = coordinate.trim();
    if coordinate.contains(':') {
        return MavenCoordinate::parse(coordinate).map(|parsed| parsed.relative_path());
    }

    let segments = coordinate
        .split('/')
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>();
    if segments.is_empty() {
        return Err(RequestError::EmptyCoordinate);
    }
    if segments.iter().any(|segment| matches!(*segment, "." | "..")) {
        return Err(RequestError::MalformedCoordinate {
            value: coordinate.to_owned(),
        });
    }

    Ok(segments
        .into_iter()
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/"))
}

/// File name a fetched artifact should be stored under.
pub fn artifact_file_name(coordinate: &str) -> String {
    match MavenCoordinate::parse(coordinate) {
        Ok(parsed) => parsed.file_name(),
        Err(_) => coordinate
            .rsplit('/')
            .find(|segment| !segment.is_empty())
            .unwrap_or("artifact")
            .to_owned(),
    }
}
