use std::sync::Arc;

use tracing::debug;

use crate::fetch::{join_url, Artifact, ArtifactFetcher, FetchError, FetchFuture};
use crate::http_client::{HttpClient, HttpRequest, ReqwestHttpClient};
use crate::request::artifact_path;

/// Fetches artifacts from Maven-layout repositories over HTTP(S).
#[derive(Clone)]
pub struct HttpFetcher {
    http_client: Arc<dyn HttpClient>,
    request_timeout_ms: u64,
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::with_http_client(Arc::new(ReqwestHttpClient::new()))
    }
}

impl HttpFetcher {
    pub fn with_http_client(http_client: Arc<dyn HttpClient>) -> Self {
        Self {
            http_client,
            request_timeout_ms: HttpRequest::DEFAULT_TIMEOUT_MS,
        }
    }

    /// Transport-level timeout. The resolver applies its own per-attempt bound on top.
    pub fn with_request_timeout_ms(mut self, request_timeout_ms: u64) -> Self {
        self.request_timeout_ms = request_timeout_ms;
        self
    }
}

impl ArtifactFetcher for HttpFetcher {
    fn fetch<'a>(&'a self, base_url: &'a str, coordinate: &'a str) -> FetchFuture<'a> {
        Box::pin(async move {
            let path = artifact_path(coordinate).map_err(|e| FetchError::invalid_coordinate(&e))?;
            let url = join_url(base_url, &path);
            debug!(%url, "GET");

            let request = HttpRequest::get(url.clone()).with_timeout_ms(self.request_timeout_ms);
            let response = self.http_client.execute(request).await.map_err(|error| {
                if error.is_timeout() {
                    FetchError::timeout(error.message())
                } else {
                    FetchError::transport(error.message())
                }
            })?;

            if response.is_success() {
                return Ok(Artifact::new(url, response.body));
            }
            Err(classify_status(response.status, &url))
        })
    }
}

fn classify_status(status: u16, url: &str) -> FetchError {
    match status {
        404 | 410 => FetchError::not_found(format!("status {status} for {url}")),
        408 | 429 | 500..=599 => FetchError::transport(format!("status {status} for {url}")),
        _ => FetchError::rejected(format!("status {status} for {url}")),
    }
}
