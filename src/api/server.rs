//! HTTP API server

use axum::{
    extract::{FromRef, Request, State},
    http::{header, HeaderValue, Method},
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::auth::{
    AuthGate, CookiePolicy, MemoryUserStore, PasswordHasher, SessionManager, TokenIssuer,
    UserStore,
};
use crate::catalog::Catalog;
use crate::config::{loader::generate_secret, Config};
use crate::db::{Database, PgUserStore};
use crate::error::Result;

use super::{catalog, routes};

/// Application state shared across handlers
///
/// Built once at startup and never mutated afterwards, apart from the
/// session map inside `sessions`.
pub struct AppState {
    pub config: Config,
    pub users: Arc<dyn UserStore>,
    pub passwords: PasswordHasher,
    pub sessions: SessionManager,
    pub tokens: Arc<TokenIssuer>,
    pub cookies: CookiePolicy,
    pub gate: AuthGate,
    pub catalog: Option<Catalog>,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    /// Validate `config` and wire the auth components from it
    pub fn new(config: Config, users: Arc<dyn UserStore>, catalog: Option<Catalog>) -> Result<Self> {
        config.validate()?;

        let secret = signing_secret(&config);
        let tokens = Arc::new(TokenIssuer::new(secret.as_bytes(), config.auth.token_ttl()));
        let sessions = SessionManager::new(config.auth.session_ttl());
        let cookies = CookiePolicy::new(&config.auth.cookie, config.auth.session_ttl());
        let gate = AuthGate::new(sessions.clone(), cookies.clone(), tokens.clone());
        let passwords = PasswordHasher::new(config.auth.bcrypt_cost)?;

        Ok(Self {
            config,
            users,
            passwords,
            sessions,
            tokens,
            cookies,
            gate,
            catalog,
        })
    }

    /// State backed by an in-memory credential store and no catalog
    pub fn in_memory(config: Config) -> Result<Self> {
        Self::new(config, Arc::new(MemoryUserStore::new()), None)
    }
}

impl FromRef<SharedState> for AuthGate {
    fn from_ref(state: &SharedState) -> Self {
        state.gate.clone()
    }
}

/// The configured secret, or an ephemeral one in development
fn signing_secret(config: &Config) -> String {
    if config.auth.jwt_secret.is_empty() {
        tracing::warn!(
            "auth.jwt_secret is not set; using a random key for this process. \
             Issued tokens will not survive a restart."
        );
        return generate_secret();
    }
    if config.auth.jwt_secret.len() < crate::config::MIN_SECRET_LEN {
        tracing::warn!("auth.jwt_secret is shorter than recommended");
    }
    config.auth.jwt_secret.clone()
}

/// Run the HTTP API server against PostgreSQL
pub async fn run_server(config: Config, host: &str, port: u16) -> Result<()> {
    let db = Arc::new(Database::connect(&config.database).await?);
    db.ensure_schema().await?;

    let users: Arc<dyn UserStore> = Arc::new(PgUserStore::new(db.clone()));
    let catalog = Catalog::new(db);
    let state = Arc::new(AppState::new(config, users, Some(catalog))?);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on {}", addr);

    serve(listener, state).await
}

/// Serve on an already-bound listener
pub async fn serve(listener: tokio::net::TcpListener, state: SharedState) -> Result<()> {
    let cleanup_every = std::time::Duration::from_secs(state.config.auth.session_cleanup_secs);
    let cleanup = state.sessions.spawn_cleanup(cleanup_every);

    let app = create_router(state);
    let result = axum::serve(listener, app).await;

    cleanup.abort();
    result?;
    Ok(())
}

/// Create the router with all routes
pub fn create_router(state: SharedState) -> Router {
    let cors = cors_layer(&state.config.server.allowed_origins);

    let mut app = Router::new()
        .route("/health", get(routes::health))
        .route("/test", get(routes::test_connection))
        .route("/signup", post(routes::signup))
        .route("/login", post(routes::login))
        .route("/logout", post(routes::logout))
        .route("/me", get(routes::me))
        .route("/dashboard", get(routes::dashboard))
        .with_state(state.clone());

    match &state.catalog {
        Some(store) => {
            app = app.merge(catalog::router(catalog::CatalogState {
                catalog: store.clone(),
                gate: state.gate.clone(),
            }));
        }
        None => tracing::warn!("No database attached; catalog routes are disabled"),
    }

    app.layer(middleware::from_fn_with_state(state, refresh_session_cookie))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

/// Re-send the session cookie with a fresh `Max-Age` while the session is
/// live, so the browser keeps it as long as the server-side idle timeout.
async fn refresh_session_cookie(
    State(state): State<SharedState>,
    request: Request,
    next: Next,
) -> Response {
    let session_id = state.cookies.extract(request.headers());
    let mut response = next.run(request).await;

    // Login and logout set the cookie themselves.
    if response.headers().contains_key(header::SET_COOKIE) {
        return response;
    }
    let Some(session_id) = session_id else {
        return response;
    };

    if state.sessions.get_session(&session_id).await.is_some() {
        if let Ok(value) = HeaderValue::from_str(&state.cookies.session_cookie(&session_id)) {
            response.headers_mut().append(header::SET_COOKIE, value);
        }
    }
    response
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true)
}
