//! Authentication and authorization tests

use axum::http::{header, HeaderMap, HeaderValue};
use chrono::{Duration, Utc};
use std::sync::Arc;

use artspace::auth::{
    AuthError, AuthGate, AuthSource, CookiePolicy, MemoryUserStore, NewUser, PasswordHasher,
    Role, SessionManager, TokenIssuer, UserStore,
};
use artspace::config::CookieConfig;
use artspace::Error;

const SECRET: &[u8] = b"auth-tests-signing-key-0123456789abcdef";

struct Accounts {
    store: MemoryUserStore,
    passwords: PasswordHasher,
}

impl Accounts {
    fn new() -> Self {
        Self {
            store: MemoryUserStore::new(),
            passwords: PasswordHasher::new(4).expect("valid cost"),
        }
    }

    async fn signup(&self, email: &str, password: &str, role: Role) -> artspace::error::Result<i32> {
        let password_hash = self.passwords.hash(password).await?;
        self.store
            .create_user(NewUser {
                name: "Test".to_string(),
                email: email.to_string(),
                password_hash,
                role,
            })
            .await
    }

    /// Returns the role on success
    async fn login(&self, email: &str, password: &str) -> Option<Role> {
        let user = self.store.find_by_email(email).await.ok()??;
        let ok = self
            .passwords
            .verify(password, &user.password_hash)
            .await
            .ok()?;
        ok.then_some(user.role)
    }
}

fn bearer(token: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {}", token)).unwrap(),
    );
    headers
}

fn gate() -> (AuthGate, SessionManager, CookiePolicy, Arc<TokenIssuer>) {
    let sessions = SessionManager::new(Duration::hours(1));
    let cookies = CookiePolicy::new(&CookieConfig::default(), Duration::hours(1));
    let tokens = Arc::new(TokenIssuer::new(SECRET, Duration::hours(1)));
    let gate = AuthGate::new(sessions.clone(), cookies.clone(), tokens.clone());
    (gate, sessions, cookies, tokens)
}

#[tokio::test]
async fn test_signup_then_login_returns_signup_role() {
    let accounts = Accounts::new();
    accounts.signup("a@x.com", "p1", Role::Artist).await.unwrap();
    accounts.signup("c@x.com", "p2", Role::User).await.unwrap();

    assert_eq!(accounts.login("a@x.com", "p1").await, Some(Role::Artist));
    assert_eq!(accounts.login("c@x.com", "p2").await, Some(Role::User));
}

#[tokio::test]
async fn test_duplicate_signup_conflicts_and_keeps_one_record() {
    let accounts = Accounts::new();
    accounts.signup("a@x.com", "p1", Role::Artist).await.unwrap();

    let second = accounts.signup("A@X.com", "other", Role::User).await;
    assert!(matches!(second, Err(Error::Conflict(_))));
    assert_eq!(accounts.store.len().await, 1);

    // The original credentials still work
    assert_eq!(accounts.login("a@x.com", "p1").await, Some(Role::Artist));
}

#[tokio::test]
async fn test_wrong_password_is_rejected() {
    let accounts = Accounts::new();
    accounts.signup("a@x.com", "p1", Role::Artist).await.unwrap();

    assert_eq!(accounts.login("a@x.com", "p2").await, None);
    assert_eq!(accounts.login("a@x.com", "P1").await, None);
    assert_eq!(accounts.login("nobody@x.com", "p1").await, None);
    assert_eq!(accounts.login("a@x.com", "p1").await, Some(Role::Artist));
}

#[test]
fn test_token_validity_window() {
    let window = Duration::hours(2);
    let issuer = TokenIssuer::new(SECRET, window);
    let issued_at = Utc::now();
    let token = issuer.issue_at(9, Role::Artist, issued_at).unwrap();

    let claims = issuer
        .verify_at(&token, issued_at + Duration::seconds(1))
        .expect("valid one second after issue");
    assert_eq!(claims.user_id(), Ok(9));
    assert_eq!(claims.role, Role::Artist);

    assert_eq!(
        issuer
            .verify_at(&token, issued_at + window + Duration::seconds(1))
            .unwrap_err(),
        AuthError::Expired
    );
}

#[test]
fn test_any_altered_signature_byte_is_rejected() {
    let issuer = TokenIssuer::new(SECRET, Duration::hours(1));
    let token = issuer.issue(3, Role::User).unwrap();
    let sig_start = token.rfind('.').unwrap() + 1;

    for i in sig_start..token.len() {
        let mut bytes = token.clone().into_bytes();
        bytes[i] = if bytes[i] == b'A' { b'B' } else { b'A' };
        let altered = String::from_utf8(bytes).unwrap();
        if altered == token {
            continue;
        }
        assert_eq!(
            issuer.verify(&altered).unwrap_err(),
            AuthError::Invalid,
            "byte {} altered",
            i
        );
    }
}

#[tokio::test]
async fn test_gate_accepts_bearer_token() {
    let (gate, _, _, tokens) = gate();
    let token = tokens.issue(5, Role::Artist).unwrap();

    let ctx = gate.authenticate(&bearer(&token)).await.unwrap();
    assert_eq!(ctx.user_id, 5);
    assert_eq!(ctx.role, Role::Artist);
    assert_eq!(ctx.source, AuthSource::Token);
}

#[tokio::test]
async fn test_gate_prefers_session_over_token() {
    let (gate, sessions, cookies, tokens) = gate();
    let session_id = sessions.create_session(1, Role::User).await;
    let token = tokens.issue(2, Role::Artist).unwrap();

    let mut headers = bearer(&token);
    headers.insert(
        header::COOKIE,
        HeaderValue::from_str(&format!("{}={}", cookies.name, session_id)).unwrap(),
    );

    let ctx = gate.authenticate(&headers).await.unwrap();
    assert_eq!(ctx.user_id, 1);
    assert_eq!(ctx.source, AuthSource::Session);
}

#[tokio::test]
async fn test_gate_falls_back_to_token_after_logout() {
    let (gate, sessions, cookies, tokens) = gate();
    let session_id = sessions.create_session(4, Role::Artist).await;
    let token = tokens.issue(4, Role::Artist).unwrap();
    sessions.delete_session(&session_id).await;

    let mut headers = bearer(&token);
    headers.insert(
        header::COOKIE,
        HeaderValue::from_str(&format!("{}={}", cookies.name, session_id)).unwrap(),
    );

    let ctx = gate.authenticate(&headers).await.unwrap();
    assert_eq!(ctx.source, AuthSource::Token);
}

#[tokio::test]
async fn test_gate_without_credentials() {
    let (gate, _, _, _) = gate();
    assert_eq!(
        gate.authenticate(&HeaderMap::new()).await.unwrap_err(),
        AuthError::NoCredentials
    );
}

#[tokio::test]
async fn test_gate_enforces_required_role() {
    let (gate, _, _, tokens) = gate();
    let collector = bearer(&tokens.issue(8, Role::User).unwrap());
    let artist = bearer(&tokens.issue(9, Role::Artist).unwrap());

    assert_eq!(
        gate.authorize(&collector, Some(Role::Artist)).await.unwrap_err(),
        AuthError::Forbidden {
            required: Role::Artist,
            actual: Role::User
        }
    );
    assert!(gate.authorize(&artist, Some(Role::Artist)).await.is_ok());
    assert!(gate.authorize(&collector, None).await.is_ok());
}

#[tokio::test]
async fn test_token_from_another_key_is_rejected() {
    let (gate, _, _, _) = gate();
    let foreign = TokenIssuer::new(b"some-other-signing-key-0123456789abcd", Duration::hours(1));
    let token = foreign.issue(1, Role::Artist).unwrap();

    assert_eq!(
        gate.authenticate(&bearer(&token)).await.unwrap_err(),
        AuthError::Invalid
    );
}

#[test]
fn test_auth_errors_map_to_http_status() {
    use axum::http::StatusCode;

    assert_eq!(
        Error::from(AuthError::NoCredentials).status_code(),
        StatusCode::UNAUTHORIZED
    );
    assert_eq!(
        Error::from(AuthError::Expired).status_code(),
        StatusCode::UNAUTHORIZED
    );
    assert_eq!(
        Error::from(AuthError::Forbidden {
            required: Role::Artist,
            actual: Role::User
        })
        .status_code(),
        StatusCode::FORBIDDEN
    );
}
