//! Endpoint derivation from a single base URL
//!
//! The service is addressed by one base URL (the "page origin"). The primary
//! WebSocket endpoint uses `wss` when the base is `https` and `ws` otherwise;
//! the secondary HTTP endpoint keeps the base scheme.

use url::Url;

use chatline_core::prelude::*;

/// Default path of the duplex chat endpoint.
pub const DEFAULT_WS_PATH: &str = "/ws/chat";

/// Default path of the request/response chat endpoint.
pub const DEFAULT_HTTP_PATH: &str = "/api/chat";

/// Resolved addresses of both transports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub primary: Url,
    pub secondary: Url,
}

/// Resolve both transport endpoints from `base`.
///
/// `base` may use `http`, `https`, `ws`, or `wss`; a secure base yields
/// secure variants of both endpoints.
///
/// # Errors
///
/// Returns [`Error::Url`] if `base` does not parse, has an unsupported
/// scheme, or has no host.
pub fn resolve_endpoints(base: &str, ws_path: &str, http_path: &str) -> Result<Endpoints> {
    let base = Url::parse(base).map_err(|e| Error::url(format!("{base}: {e}")))?;
    if base.host_str().is_none() {
        return Err(Error::url(format!("{base}: missing host")));
    }

    let secure = match base.scheme() {
        "https" | "wss" => true,
        "http" | "ws" => false,
        other => return Err(Error::url(format!("unsupported scheme '{other}'"))),
    };

    let primary = with_scheme(&base, if secure { "wss" } else { "ws" })?
        .join(ws_path)
        .map_err(|e| Error::url(format!("{ws_path}: {e}")))?;
    let secondary = with_scheme(&base, if secure { "https" } else { "http" })?
        .join(http_path)
        .map_err(|e| Error::url(format!("{http_path}: {e}")))?;

    Ok(Endpoints { primary, secondary })
}

fn with_scheme(base: &Url, scheme: &str) -> Result<Url> {
    let mut url = base.clone();
    url.set_scheme(scheme)
        .map_err(|_| Error::url(format!("cannot switch {base} to {scheme}")))?;
    Ok(url)
}
