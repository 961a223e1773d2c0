//! Account and utility route handlers

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::Serialize;

use super::extract::JsonBody;
use super::server::SharedState;
use crate::auth::models::{LoginRequest, LoginResponse, SignupRequest};
use crate::auth::{AuthContext, NewUser, Role};
use crate::error::{Error, Result};

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Json<Self> {
        Json(Self {
            message: message.into(),
        })
    }
}

/// Body of a `201 Created`
#[derive(Debug, Serialize)]
pub struct CreatedResponse {
    pub message: String,
    pub id: i32,
}

pub fn created(message: impl Into<String>, id: i32) -> (StatusCode, Json<CreatedResponse>) {
    (
        StatusCode::CREATED,
        Json(CreatedResponse {
            message: message.into(),
            id,
        }),
    )
}

#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub dashboard: &'static str,
    pub message: String,
}

fn invalid_credentials() -> Error {
    Error::Unauthenticated("Invalid credentials".to_string())
}

// Utility

pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "healthy" }))
}

pub async fn test_connection() -> impl IntoResponse {
    MessageResponse::new("Backend is reachable")
}

// Accounts

pub async fn signup(
    State(state): State<SharedState>,
    JsonBody(req): JsonBody<SignupRequest>,
) -> Result<impl IntoResponse> {
    let signup = req.validate()?;
    let password_hash = state.passwords.hash(&signup.password).await?;

    let id = state
        .users
        .create_user(NewUser {
            name: signup.name,
            email: signup.email,
            password_hash,
            role: signup.role,
        })
        .await?;

    tracing::info!(user_id = id, role = %signup.role, "Account created");
    Ok(created("User created successfully", id))
}

pub async fn login(
    State(state): State<SharedState>,
    JsonBody(req): JsonBody<LoginRequest>,
) -> Result<impl IntoResponse> {
    let (email, password) = req.validate()?;

    let Some(user) = state.users.find_by_email(&email).await? else {
        // Unknown emails cost the same bcrypt round as known ones.
        state.passwords.verify_dummy(&password).await?;
        tracing::debug!("Login rejected: unknown account");
        return Err(invalid_credentials());
    };

    if !state.passwords.verify(&password, &user.password_hash).await? {
        tracing::debug!(user_id = user.id, "Login rejected: wrong password");
        return Err(invalid_credentials());
    }

    let session_id = state.sessions.create_session(user.id, user.role).await;
    let token = state.tokens.issue(user.id, user.role)?;

    tracing::info!(user_id = user.id, role = %user.role, "Logged in");

    Ok((
        [(header::SET_COOKIE, state.cookies.session_cookie(&session_id))],
        Json(LoginResponse {
            message: "Login successful".to_string(),
            role: user.role,
            name: user.name,
            id: user.id,
            token,
        }),
    ))
}

/// Ends the cookie session. Bearer tokens stay valid until they expire.
pub async fn logout(State(state): State<SharedState>, headers: HeaderMap) -> impl IntoResponse {
    if let Some(session_id) = state.cookies.extract(&headers) {
        if let Some(session) = state.sessions.get_session(&session_id).await {
            tracing::info!(user_id = session.user_id, "Logged out");
        }
        state.sessions.delete_session(&session_id).await;
    }

    (
        [(header::SET_COOKIE, state.cookies.cleared_cookie())],
        MessageResponse::new("Logged out"),
    )
}

/// Profile of the authenticated account
pub async fn me(State(state): State<SharedState>, auth: AuthContext) -> Result<impl IntoResponse> {
    let user = state
        .users
        .find_by_id(auth.user_id)
        .await?
        .ok_or_else(|| Error::Unauthenticated("Account no longer exists".to_string()))?;

    Ok(Json(serde_json::json!({
        "id": user.id,
        "name": user.name,
        "email": user.email,
        "role": user.role,
        "source": auth.source,
    })))
}

pub async fn dashboard(auth: AuthContext) -> Json<DashboardResponse> {
    tracing::debug!(user_id = auth.user_id, role = %auth.role, source = %auth.source, "Dashboard");

    Json(match auth.role {
        Role::Artist => DashboardResponse {
            dashboard: "artist",
            message: "Welcome to the artist dashboard".to_string(),
        },
        Role::User => DashboardResponse {
            dashboard: "collector",
            message: "Welcome to the collector dashboard".to_string(),
        },
    })
}
