//! Request authorization gate
//!
//! Identity is resolved by an ordered chain of resolvers: the session cookie
//! first, then the `Authorization: Bearer` header. Handlers receive the
//! result as an explicit [`AuthContext`] (or [`ArtistContext`]) argument.

use async_trait::async_trait;
use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts, HeaderMap},
};
use std::sync::Arc;

use crate::auth::cookie::CookiePolicy;
use crate::auth::jwt::TokenIssuer;
use crate::auth::models::{ArtistContext, AuthContext, AuthSource, Role};
use crate::auth::session::SessionManager;
use crate::auth::AuthError;
use crate::error::Error;

/// Outcome of a single resolver
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Credentials were present and valid
    Resolved(AuthContext),
    /// This resolver's credential kind was not supplied
    Absent,
    /// Credentials were supplied but are unusable
    Rejected(AuthError),
}

#[async_trait]
pub trait IdentityResolver: Send + Sync {
    async fn resolve(&self, headers: &HeaderMap) -> Resolution;
}

/// Resolves identity from the server-side session named by the cookie
pub struct SessionResolver {
    sessions: SessionManager,
    cookies: CookiePolicy,
}

impl SessionResolver {
    pub fn new(sessions: SessionManager, cookies: CookiePolicy) -> Self {
        Self { sessions, cookies }
    }
}

#[async_trait]
impl IdentityResolver for SessionResolver {
    async fn resolve(&self, headers: &HeaderMap) -> Resolution {
        let Some(session_id) = self.cookies.extract(headers) else {
            return Resolution::Absent;
        };

        // An unknown or idle-expired session falls through to the token.
        match self.sessions.get_session(&session_id).await {
            Some(session) => Resolution::Resolved(AuthContext {
                user_id: session.user_id,
                role: session.role,
                source: AuthSource::Session,
            }),
            None => Resolution::Absent,
        }
    }
}

/// Resolves identity from a signed bearer token
pub struct BearerResolver {
    tokens: Arc<TokenIssuer>,
}

impl BearerResolver {
    pub fn new(tokens: Arc<TokenIssuer>) -> Self {
        Self { tokens }
    }
}

/// Token from an `Authorization: Bearer <token>` header, scheme case-insensitive
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    scheme.eq_ignore_ascii_case("bearer").then(|| token.trim())
}

#[async_trait]
impl IdentityResolver for BearerResolver {
    async fn resolve(&self, headers: &HeaderMap) -> Resolution {
        let Some(token) = bearer_token(headers) else {
            return Resolution::Absent;
        };

        match self.tokens.verify(token) {
            Ok(claims) => match claims.user_id() {
                Ok(user_id) => Resolution::Resolved(AuthContext {
                    user_id,
                    role: claims.role,
                    source: AuthSource::Token,
                }),
                Err(e) => Resolution::Rejected(e),
            },
            Err(e) => Resolution::Rejected(e),
        }
    }
}

/// Guard in front of every protected route
#[derive(Clone)]
pub struct AuthGate {
    resolvers: Arc<Vec<Box<dyn IdentityResolver>>>,
}

impl AuthGate {
    /// Session first, then bearer token
    pub fn new(sessions: SessionManager, cookies: CookiePolicy, tokens: Arc<TokenIssuer>) -> Self {
        Self::with_resolvers(vec![
            Box::new(SessionResolver::new(sessions, cookies)),
            Box::new(BearerResolver::new(tokens)),
        ])
    }

    pub fn with_resolvers(resolvers: Vec<Box<dyn IdentityResolver>>) -> Self {
        Self {
            resolvers: Arc::new(resolvers),
        }
    }

    /// Resolve the caller; the first resolver that succeeds wins
    pub async fn authenticate(&self, headers: &HeaderMap) -> Result<AuthContext, AuthError> {
        let mut rejection = None;

        for resolver in self.resolvers.iter() {
            match resolver.resolve(headers).await {
                Resolution::Resolved(ctx) => return Ok(ctx),
                Resolution::Absent => {}
                Resolution::Rejected(e) => {
                    rejection.get_or_insert(e);
                }
            }
        }

        Err(rejection.unwrap_or(AuthError::NoCredentials))
    }

    /// Resolve the caller and, if `required` is set, check their role
    pub async fn authorize(
        &self,
        headers: &HeaderMap,
        required: Option<Role>,
    ) -> Result<AuthContext, AuthError> {
        let ctx = self.authenticate(headers).await?;

        match required {
            Some(role) if ctx.role != role => Err(AuthError::Forbidden {
                required: role,
                actual: ctx.role,
            }),
            _ => Ok(ctx),
        }
    }
}

impl<S> FromRequestParts<S> for AuthContext
where
    AuthGate: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let gate = AuthGate::from_ref(state);
        let ctx = gate.authorize(&parts.headers, None).await?;
        tracing::debug!(user_id = ctx.user_id, source = %ctx.source, "request authenticated");
        Ok(ctx)
    }
}

impl<S> FromRequestParts<S> for ArtistContext
where
    AuthGate: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let gate = AuthGate::from_ref(state);
        let ctx = gate.authorize(&parts.headers, Some(Role::Artist)).await?;
        Ok(ArtistContext(ctx))
    }
}
