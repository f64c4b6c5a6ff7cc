use std::io::ErrorKind;
use std::path::PathBuf;

use tracing::debug;

use crate::fetch::{Artifact, ArtifactFetcher, FetchError, FetchFuture};
use crate::request::artifact_path;

/// Reads artifacts from `file://` repositories on the local disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileFetcher;

impl FileFetcher {
    pub const SCHEME: &'static str = "file://";

    /// Local directory for a `file://` base url.
    pub fn root_dir(base_url: &str) -> Option<PathBuf> {
        let prefix = base_url.get(..Self::SCHEME.len())?;
        if !prefix.eq_ignore_ascii_case(Self::SCHEME) {
            return None;
        }
        let rest = &base_url[Self::SCHEME.len()..];
        let decoded = urlencoding::decode(rest).ok()?;
        if decoded.is_empty() {
            return None;
        }
        Some(PathBuf::from(decoded.into_owned()))
    }
}

impl ArtifactFetcher for FileFetcher {
    fn fetch<'a>(&'a self, base_url: &'a str, coordinate: &'a str) -> FetchFuture<'a> {
        Box::pin(async move {
            let Some(root) = Self::root_dir(base_url) else {
                return Err(FetchError::rejected(format!(
                    "'{base_url}' is not a file repository url"
                )));
            };
            let relative =
                artifact_path(coordinate).map_err(|e| FetchError::invalid_coordinate(&e))?;

            let mut path = root;
            for segment in relative.split('/') {
                let segment = urlencoding::decode(segment)
                    .map_err(|e| FetchError::rejected(format!("bad path segment: {e}")))?;
                path.push(segment.as_ref());
            }
            debug!(path = %path.display(), "reading");

            match tokio::fs::read(&path).await {
                Ok(bytes) => Ok(Artifact::new(path.display().to_string(), bytes)),
                Err(error) if error.kind() == ErrorKind::NotFound => Err(FetchError::not_found(
                    format!("{} does not exist", path.display()),
                )),
                Err(error) if error.kind() == ErrorKind::PermissionDenied => Err(
                    FetchError::rejected(format!("{}: {error}", path.display())),
                ),
                Err(error) => Err(FetchError::transport(format!("{}: {error}", path.display()))),
            }
        })
    }
}
