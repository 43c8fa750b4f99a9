use crate::server::router::StrokedeskState;
use axum::{
    extract::{ConnectInfo, FromRequestParts},
    http::request::Parts,
};
use std::{convert::Infallible, net::SocketAddr};

const X_FORWARDED_FOR: &str = "x-forwarded-for";

/// Client address for logging and login throttling.
///
/// The TCP peer address by default. With `security.trust_forwarded_for` the
/// last `X-Forwarded-For` hop wins, which is the one the fronting proxy
/// appended; earlier hops are client-controlled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientIp(pub String);

impl ClientIp {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromRequestParts<StrokedeskState> for ClientIp {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &StrokedeskState,
    ) -> Result<Self, Self::Rejection> {
        let forwarded = if state.security.trust_forwarded_for {
            forwarded_client(parts)
        } else {
            None
        };

        let ip = forwarded
            .or_else(|| {
                parts
                    .extensions
                    .get::<ConnectInfo<SocketAddr>>()
                    .map(|ConnectInfo(addr)| addr.ip().to_string())
            })
            .unwrap_or_else(|| "unknown".to_string());

        Ok(ClientIp(ip))
    }
}

fn forwarded_client(parts: &Parts) -> Option<String> {
    parts
        .headers
        .get_all(X_FORWARDED_FOR)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .last()
        .map(str::to_string)
}
