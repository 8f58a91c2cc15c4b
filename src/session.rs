use axum::http::HeaderMap;

use crate::settings::Settings;

pub const SESSION_COOKIE_NAME: &str = "noteplane_session";

/// Opaque session token carried by the client, either as a bearer token or
/// in the session cookie. Verification happens against the sessions table;
/// this type only does extraction.
#[derive(Clone, Debug)]
pub struct SessionToken {
    pub session_id: String,
}

impl SessionToken {
    pub fn new(session_id: String) -> Self {
        Self { session_id }
    }

    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        if let Some(token) = bearer_token(headers) {
            return Some(Self {
                session_id: token.to_string(),
            });
        }
        cookie_token(headers)
    }

    pub fn to_cookie_header(&self, settings: &Settings) -> String {
        let secure = settings.public_base_url().starts_with("https://");
        let max_age = settings.sessions.ttl_secs;

        format!(
            "{}={}; HttpOnly; {}SameSite=Lax; Path=/; Max-Age={}",
            SESSION_COOKIE_NAME,
            self.session_id,
            if secure { "Secure; " } else { "" },
            max_age
        )
    }

    pub fn delete_cookie_header() -> String {
        format!(
            "{}=; HttpOnly; SameSite=Lax; Path=/; Max-Age=0",
            SESSION_COOKIE_NAME
        )
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers
        .get(axum::http::header::AUTHORIZATION)?
        .to_str()
        .ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}

fn cookie_token(headers: &HeaderMap) -> Option<SessionToken> {
    let cookie_header = headers.get(axum::http::header::COOKIE)?.to_str().ok()?;

    for cookie in cookie_header.split(';') {
        let cookie = cookie.trim();
        if let Some(value) = cookie
            .strip_prefix(SESSION_COOKIE_NAME)
            .and_then(|s| s.strip_prefix('='))
        {
            if value.is_empty() {
                return None;
            }
            return Some(SessionToken {
                session_id: value.to_string(),
            });
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn extracts_bearer_token() {
        let mut headers = HeaderMap::new();
        headers.insert(
            axum::http::header::AUTHORIZATION,
            HeaderValue::from_static("Bearer abc123"),
        );
        let token = SessionToken::from_headers(&headers).unwrap();
        assert_eq!(token.session_id, "abc123");
    }

    #[test]
    fn extracts_cookie_token() {
        let mut headers = HeaderMap::new();
        headers.insert(
            axum::http::header::COOKIE,
            HeaderValue::from_static("other=1; noteplane_session=s-42; theme=dark"),
        );
        let token = SessionToken::from_headers(&headers).unwrap();
        assert_eq!(token.session_id, "s-42");
    }

    #[test]
    fn bearer_wins_over_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(
            axum::http::header::AUTHORIZATION,
            HeaderValue::from_static("Bearer from-bearer"),
        );
        headers.insert(
            axum::http::header::COOKIE,
            HeaderValue::from_static("noteplane_session=from-cookie"),
        );
        let token = SessionToken::from_headers(&headers).unwrap();
        assert_eq!(token.session_id, "from-bearer");
    }

    #[test]
    fn missing_or_empty_yields_none() {
        assert!(SessionToken::from_headers(&HeaderMap::new()).is_none());

        let mut headers = HeaderMap::new();
        headers.insert(
            axum::http::header::AUTHORIZATION,
            HeaderValue::from_static("Bearer "),
        );
        assert!(SessionToken::from_headers(&headers).is_none());
    }
}
