//! Session cookie encoding

use axum::http::{header, HeaderMap};
use chrono::Duration;

use crate::config::{CookieConfig, SameSite};

/// Attributes applied to every session cookie this server sets
#[derive(Debug, Clone)]
pub struct CookiePolicy {
    pub name: String,
    pub secure: bool,
    pub same_site: SameSite,
    pub max_age: Duration,
}

impl CookiePolicy {
    pub fn new(config: &CookieConfig, max_age: Duration) -> Self {
        Self {
            name: config.name.clone(),
            secure: config.secure,
            same_site: config.same_site,
            max_age,
        }
    }

    /// `Set-Cookie` value carrying a session id
    pub fn session_cookie(&self, session_id: &str) -> String {
        self.render(session_id, self.max_age.num_seconds())
    }

    /// `Set-Cookie` value that removes the session cookie
    pub fn cleared_cookie(&self) -> String {
        self.render("", 0)
    }

    fn render(&self, value: &str, max_age: i64) -> String {
        let mut cookie = format!(
            "{}={}; Path=/; Max-Age={}; HttpOnly; SameSite={}",
            self.name,
            value,
            max_age,
            self.same_site.as_attribute()
        );
        if self.secure {
            cookie.push_str("; Secure");
        }
        cookie
    }

    /// Find this policy's cookie in the request's `Cookie` headers
    pub fn extract(&self, headers: &HeaderMap) -> Option<String> {
        let prefix = format!("{}=", self.name);
        headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|value| value.split(';'))
            .filter_map(|cookie| cookie.trim().strip_prefix(prefix.as_str()))
            .find(|value| !value.is_empty())
            .map(str::to_string)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn policy(same_site: SameSite, secure: bool) -> CookiePolicy {
        CookiePolicy {
            name: "artspace_session".to_string(),
            secure,
            same_site,
            max_age: Duration::hours(1),
        }
    }

    #[test]
    fn test_session_cookie_attributes() {
        let cookie = policy(SameSite::None, true).session_cookie("abc");
        assert!(cookie.starts_with("artspace_session=abc;"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("Secure"));
        assert!(cookie.contains("SameSite=None"));
        assert!(cookie.contains("Max-Age=3600"));
        assert!(cookie.contains("Path=/"));
    }

    #[test]
    fn test_insecure_cookie_for_local_development() {
        let cookie = policy(SameSite::Lax, false).session_cookie("abc");
        assert!(!cookie.contains("Secure"));
        assert!(cookie.contains("SameSite=Lax"));
    }

    #[test]
    fn test_cleared_cookie_expires_immediately() {
        let cookie = policy(SameSite::Strict, true).cleared_cookie();
        assert!(cookie.starts_with("artspace_session=;"));
        assert!(cookie.contains("Max-Age=0"));
    }

    #[test]
    fn test_extract_from_header() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; artspace_session=s123; other=1"),
        );
        assert_eq!(
            policy(SameSite::Lax, true).extract(&headers),
            Some("s123".to_string())
        );
    }

    #[test]
    fn test_extract_ignores_similar_names_and_empty_values() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("xartspace_session=nope; artspace_session="),
        );
        assert_eq!(policy(SameSite::Lax, true).extract(&headers), None);
    }

    #[test]
    fn test_extract_missing() {
        assert_eq!(policy(SameSite::Lax, true).extract(&HeaderMap::new()), None);
    }
}
