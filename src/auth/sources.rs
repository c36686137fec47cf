//! Credential locations on an inbound request.

use axum::http::{header, HeaderMap, Uri};
use axum_extra::extract::CookieJar;

/// Query parameter that may carry a token.
pub const TOKEN_QUERY_PARAM: &str = "token";

/// Where a credential was found, in the order they are tried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    Header,
    Query,
    Cookie,
}

impl CredentialSource {
    pub const ORDER: [CredentialSource; 3] = [
        CredentialSource::Header,
        CredentialSource::Query,
        CredentialSource::Cookie,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CredentialSource::Header => "header",
            CredentialSource::Query => "query",
            CredentialSource::Cookie => "cookie",
        }
    }

    /// Extract this source's token from the request, if present.
    pub fn extract(&self, uri: &Uri, headers: &HeaderMap, cookie_name: &str) -> Option<String> {
        match self {
            CredentialSource::Header => bearer_token(headers),
            CredentialSource::Query => query_token(uri),
            CredentialSource::Cookie => cookie_token(headers, cookie_name),
        }
    }
}

impl std::fmt::Display for CredentialSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `Authorization: Bearer <token>` (scheme is case-insensitive).
pub fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then(|| token.to_string())
}

/// `?token=<token>`, form-decoded.
pub fn query_token(uri: &Uri) -> Option<String> {
    let query = uri.query()?;
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == TOKEN_QUERY_PARAM)
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.is_empty())
}

/// Cookie named `name` across all `Cookie` headers, percent-decoded.
pub fn cookie_token(headers: &HeaderMap, name: &str) -> Option<String> {
    CookieJar::from_headers(headers)
        .get(name)
        .map(|cookie| cookie.value().trim_matches('"').to_string())
        .filter(|value| !value.is_empty())
}
