//! Fetch-time resolution policy.
//!
//! Documents are cache-first with the offline page as the miss answer.
//! Everything else is cache-then-network. Non-GET requests always go to the
//! network. When any of that fails, a fallback keyed on the request's
//! [`AcceptClass`] answers instead, so the host always gets a response.

use offcache_client::canonicalize;
use offcache_core::{Request, Response};

use crate::Worker;
use crate::error::ResolveError;

/// Placeholder served for images that are neither cached nor reachable.
pub const PLACEHOLDER_SVG: &str = concat!(
    r#"<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink" "#,
    r#"width="400" height="300" viewBox="0 0 400 300">"#,
    r#"<text style="text-anchor: middle; font-family: sans-serif;" fill-opacity="0.25" x="50%" y="50%">"#,
    "image unavailable offline",
    "</text></svg>"
);

/// What a request's Accept header says it wants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcceptClass {
    Document,
    Image,
    Other,
}

impl AcceptClass {
    /// `text/html` wins over `image`; a missing header is `Other`.
    pub fn from_header(accept: Option<&str>) -> Self {
        match accept {
            Some(accept) if accept.contains("text/html") => AcceptClass::Document,
            Some(accept) if accept.contains("image") => AcceptClass::Image,
            _ => AcceptClass::Other,
        }
    }

    pub fn of(request: &Request) -> Self {
        Self::from_header(request.accept())
    }
}

/// A successful answer and where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Cached(Response),
    Network(Response),
    OfflinePage(Response),
}

impl Resolution {
    pub fn source(&self) -> &'static str {
        match self {
            Resolution::Cached(_) => "cache",
            Resolution::Network(_) => "network",
            Resolution::OfflinePage(_) => "offline_page",
        }
    }

    pub fn into_response(self) -> Response {
        match self {
            Resolution::Cached(r) | Resolution::Network(r) | Resolution::OfflinePage(r) => r,
        }
    }
}

/// The synthetic image placeholder.
pub fn placeholder_image() -> Response {
    Response::new(200, vec![("Content-Type".into(), "image/svg+xml".into())], PLACEHOLDER_SVG)
}

/// Pick the last-resort answer for a request that could not be resolved.
pub fn fallback_response(class: AcceptClass) -> Response {
    match class {
        AcceptClass::Image => placeholder_image(),
        AcceptClass::Document | AcceptClass::Other => Response::empty(),
    }
}

impl Worker {
    /// Answer an intercepted request. Never fails.
    pub async fn resolve(&self, request: &Request) -> Response {
        match self.try_resolve(request).await {
            Ok(resolution) => {
                tracing::debug!(
                    method = %request.method,
                    url = %request.url,
                    source = resolution.source(),
                    "request resolved"
                );
                resolution.into_response()
            }
            Err(err) => {
                let class = AcceptClass::of(request);
                tracing::warn!(
                    method = %request.method,
                    url = %request.url,
                    accept_class = ?class,
                    error = %err,
                    "request unresolved, serving fallback"
                );
                fallback_response(class)
            }
        }
    }

    /// The resolution policy without the fallback step.
    pub async fn try_resolve(&self, request: &Request) -> Result<Resolution, ResolveError> {
        if !request.is_get() {
            return self.fetch_live(request).await;
        }

        let url = canonicalize(&request.url).map_err(|e| ResolveError::InvalidRequest(format!("{}: {e}", request.url)))?;
        let request = Request { url: url.to_string(), ..request.clone() };

        let cached = self.store.match_request(&request).await.map_err(ResolveError::Store)?;

        let accept = request
            .accept()
            .ok_or_else(|| ResolveError::MissingAccept(request.url.clone()))?;

        match (AcceptClass::from_header(Some(accept)), cached) {
            (_, Some(hit)) => Ok(Resolution::Cached(hit)),
            (AcceptClass::Document, None) => self
                .store
                .match_url(&self.offline_url)
                .await
                .map_err(ResolveError::Store)?
                .map(Resolution::OfflinePage)
                .ok_or_else(|| ResolveError::OfflinePageMissing(self.offline_url.clone())),
            (AcceptClass::Image | AcceptClass::Other, None) => self.fetch_live(&request).await,
        }
    }

    async fn fetch_live(&self, request: &Request) -> Result<Resolution, ResolveError> {
        self.network
            .fetch(request)
            .await
            .map(Resolution::Network)
            .map_err(ResolveError::Network)
    }
}
