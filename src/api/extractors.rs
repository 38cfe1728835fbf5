//! # Custom Extractors
//!
//! Request data the handlers need beyond path and body: where the client
//! came from, which page referred it, and the origin short links are built on.

use std::net::SocketAddr;

use axum::{
    async_trait,
    body::Body,
    extract::{rejection::JsonRejection, ConnectInfo, FromRequest, FromRequestParts},
    http::{header, request::Parts, HeaderMap, Request},
    Json,
};
use serde::de::DeserializeOwned;

use crate::{error::AppError, services::AppState};

fn header_str<'a>(headers: &'a HeaderMap, name: impl header::AsHeaderName) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

// =====================================
// Client IP Extractor
// =====================================
/// Best-effort client address.
///
/// Looks at `X-Forwarded-For` (first hop), then `X-Real-IP`, then the peer
/// address of the connection when the server was started with connect info.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientIp(pub Option<String>);

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for ClientIp {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let ip = header_str(&parts.headers, "X-Forwarded-For")
            .and_then(|s| s.split(',').next())
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .or_else(|| header_str(&parts.headers, "X-Real-IP").map(ToString::to_string))
            .or_else(|| {
                parts
                    .extensions
                    .get::<ConnectInfo<SocketAddr>>()
                    .map(|ConnectInfo(addr)| addr.ip().to_string())
            });

        Ok(ClientIp(ip))
    }
}

// =====================================
// Referrer Extractor
// =====================================
/// `Referer` header, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Referrer(pub Option<String>);

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for Referrer {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Referrer(
            header_str(&parts.headers, header::REFERER).map(ToString::to_string),
        ))
    }
}

// =====================================
// Request Origin Extractor
// =====================================
/// Scheme and authority short links are built on.
///
/// A configured `public_base_url` wins. Otherwise the origin is rebuilt from
/// `X-Forwarded-Proto` and `Host`, falling back to the bind address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestOrigin(pub String);

#[async_trait]
impl FromRequestParts<AppState> for RequestOrigin {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(base) = state.config().public_base_url.as_deref() {
            return Ok(RequestOrigin(base.trim_end_matches('/').to_string()));
        }

        let scheme = header_str(&parts.headers, "X-Forwarded-Proto").unwrap_or("http");
        let origin = match header_str(&parts.headers, header::HOST) {
            Some(host) => format!("{scheme}://{host}"),
            None => format!("http://{}", state.config().server_addr()),
        };

        Ok(RequestOrigin(origin))
    }
}

// =====================================
// JSON Body Extractor
// =====================================
/// `Json<T>` whose rejections are reported as validation errors (422).
#[derive(Debug, Clone)]
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for JsonBody<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = AppError;

    async fn from_request(req: Request<Body>, state: &S) -> Result<Self, Self::Rejection> {
        let Json(data) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e: JsonRejection| {
                AppError::Validation(format!("Invalid JSON body: {}", e.body_text()))
            })?;

        Ok(JsonBody(data))
    }
}
