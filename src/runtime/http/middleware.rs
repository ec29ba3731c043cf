//! Request logging, authentication and admission.

use std::net::SocketAddr;
use std::time::Instant;

use async_trait::async_trait;
use axum::extract::{ConnectInfo, FromRequestParts, Request, State};
use axum::http::request::Parts;
use axum::http::{header, HeaderMap, Uri};
use axum::middleware::Next;
use axum::response::Response;
use tracing::{debug, info, warn};

use super::error::ApiError;
use super::state::AppState;
use crate::core::model::UserId;

/// Query parameter accepted in place of the header, for WebSocket clients.
const TOKEN_QUERY_PARAM: &str = "access_token";

/// Authenticated caller, inserted by [`authenticate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller(pub UserId);

impl Caller {
    /// User id.
    #[must_use]
    pub const fn user_id(self) -> UserId {
        self.0
    }

    /// Rate-limit identity.
    #[must_use]
    pub fn identity(self) -> String {
        self.0.to_string()
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Self>()
            .copied()
            .ok_or_else(|| ApiError::Unauthorized("caller identity missing".into()))
    }
}

/// Log method, URI, remote address, status and latency of every request.
pub async fn log_requests(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().clone();
    let uri = req.uri().clone();
    let remote = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map_or_else(|| "-".to_string(), |ConnectInfo(addr)| addr.to_string());

    let response = next.run(req).await;

    info!(
        remote = %remote,
        method = %method,
        uri = %uri,
        status = response.status().as_u16(),
        latency_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
        "request"
    );
    response
}

/// Resolve the bearer token to a [`Caller`] or answer 401.
pub async fn authenticate(State(state): State<AppState>, mut req: Request, next: Next) -> Result<Response, ApiError> {
    let token = extract_token(req.headers(), req.uri())
        .ok_or_else(|| ApiError::Unauthorized("authorization header is missing".into()))?;

    let user_id = state.tokens.validate(&token).map_err(|e| {
        debug!(error = %e, "token rejected");
        ApiError::Unauthorized("invalid token".into())
    })?;

    req.extensions_mut().insert(Caller(user_id));
    Ok(next.run(req).await)
}

/// Admit the caller through the rate limiter: 429 on denial, 500 on store failure.
pub async fn admit(
    State(state): State<AppState>,
    caller: Caller,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let identity = caller.identity();
    if !state.limiter.allow(&identity).await? {
        warn!(identity = %identity, "rate limit exceeded");
        return Err(ApiError::TooManyRequests);
    }
    Ok(next.run(req).await)
}

fn extract_token(headers: &HeaderMap, uri: &Uri) -> Option<String> {
    let from_header = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty());
    if let Some(token) = from_header {
        return Some(token.to_string());
    }

    uri.query()?
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| *key == TOKEN_QUERY_PARAM)
        .map(|(_, value)| value.to_string())
        .filter(|t| !t.is_empty())
}
