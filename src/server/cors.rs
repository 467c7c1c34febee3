//! CORS policy.
//!
//! Every response, including errors, carries an `Access-Control-Allow-Origin`
//! header so the browser can read the body. The request origin is echoed
//! back when it is in the allow-list; any other origin receives the first
//! configured origin as a fallback value rather than a rejection, and the
//! browser then refuses the response on its own.

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use http::{header, HeaderValue, Method, StatusCode};

/// Origin used when no valid origins are configured.
const DEFAULT_ORIGIN: &str = "http://localhost:3000";

const ALLOW_METHODS: &str = "GET, POST, DELETE, OPTIONS";
const ALLOW_HEADERS: &str = "content-type, x-user-id";
const MAX_AGE_SECONDS: &str = "86400";

/// Allow-list of origins with a fallback for everything else.
#[derive(Clone)]
pub struct CorsPolicy {
    allowed: Vec<(String, HeaderValue)>,
    fallback: HeaderValue,
}

impl CorsPolicy {
    /// Build a policy from configured origins.
    ///
    /// Origins that are not valid header values are dropped; an empty list
    /// falls back to [`DEFAULT_ORIGIN`]. The first origin is the fallback
    /// echoed to unlisted callers.
    pub fn new(origins: &[String]) -> Self {
        let mut allowed: Vec<(String, HeaderValue)> = origins
            .iter()
            .filter_map(|o| HeaderValue::from_str(o).ok().map(|hv| (o.clone(), hv)))
            .collect();

        if allowed.is_empty() {
            allowed.push((
                DEFAULT_ORIGIN.to_string(),
                HeaderValue::from_static(DEFAULT_ORIGIN),
            ));
        }

        let fallback = allowed[0].1.clone();
        Self { allowed, fallback }
    }

    /// The origin value to echo for a given request origin.
    pub fn resolve(&self, origin: Option<&str>) -> HeaderValue {
        origin
            .and_then(|o| self.allowed.iter().find(|(s, _)| s == o))
            .map(|(_, hv)| hv.clone())
            .unwrap_or_else(|| self.fallback.clone())
    }
}

/// Middleware applying the CORS policy to every response and answering
/// preflights directly.
pub async fn cors_middleware(
    State(policy): State<CorsPolicy>,
    request: Request,
    next: Next,
) -> Response {
    let origin = request
        .headers()
        .get(header::ORIGIN)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let allow_origin = policy.resolve(origin.as_deref());

    let mut response = if request.method() == Method::OPTIONS {
        let mut response = StatusCode::NO_CONTENT.into_response();
        let headers = response.headers_mut();
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(ALLOW_METHODS),
        );
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static(ALLOW_HEADERS),
        );
        headers.insert(
            header::ACCESS_CONTROL_MAX_AGE,
            HeaderValue::from_static(MAX_AGE_SECONDS),
        );
        response
    } else {
        next.run(request).await
    };

    let headers = response.headers_mut();
    headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, allow_origin);
    headers.insert(header::VARY, HeaderValue::from_static("Origin"));

    response
}
