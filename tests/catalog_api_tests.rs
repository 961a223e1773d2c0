//! Catalog routes over HTTP against a live PostgreSQL
//!
//! Run with:
//! ARTSPACE_TEST_DATABASE_URL=postgres://postgres@localhost/artspace_test \
//!     cargo test --test catalog_api_tests -- --ignored

use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::net::TcpListener;

use artspace::api::{serve, AppState};
use artspace::auth::UserStore;
use artspace::catalog::Catalog;
use artspace::db::{Database, PgUserStore};
use artspace::Config;

struct TestServer {
    base: String,
    client: Client,
}

impl TestServer {
    async fn start() -> Self {
        let url = std::env::var("ARTSPACE_TEST_DATABASE_URL")
            .expect("ARTSPACE_TEST_DATABASE_URL must be set for database tests");
        let db = Arc::new(Database::connect_str(&url).await.expect("connect"));
        db.ensure_schema().await.expect("schema");

        let mut config = Config::default();
        config.auth.bcrypt_cost = 4;
        config.auth.jwt_secret = "catalog-api-tests-key-0123456789abcdef".to_string();

        let users: Arc<dyn UserStore> = Arc::new(PgUserStore::new(db.clone()));
        let state = Arc::new(
            AppState::new(config, users, Some(Catalog::new(db))).expect("valid state"),
        );
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let _ = serve(listener, state).await;
        });

        Self {
            base: format!("http://{}", addr),
            client: Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    /// Sign up a fresh account and return its bearer token
    async fn account(&self, role: &str) -> String {
        let email = format!("{}-{}@test.local", role, uuid::Uuid::new_v4().simple());
        let resp = self
            .client
            .post(self.url("/signup"))
            .json(&json!({ "name": role, "email": email, "password": "pw", "role": role }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);

        let body: Value = self
            .client
            .post(self.url("/login"))
            .json(&json!({ "email": email, "password": "pw" }))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        body["token"].as_str().unwrap().to_string()
    }

    async fn get(&self, path: &str, token: &str) -> reqwest::Response {
        self.client
            .get(self.url(path))
            .bearer_auth(token)
            .send()
            .await
            .unwrap()
    }
}

#[tokio::test]
#[ignore]
async fn test_artist_routes_require_artist_role() {
    let server = TestServer::start().await;
    let collector = server.account("collector").await;
    let artist = server.account("artist").await;

    for path in ["/portfolio/my-portfolio", "/dashboard/artist-stats"] {
        let resp = server.get(path, &collector).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN, "{}", path);
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["error"], "This action requires the artist role");

        let resp = server.get(path, &artist).await;
        assert_eq!(resp.status(), StatusCode::OK, "{}", path);
    }

    let resp = server
        .client
        .get(server.url("/portfolio/my-portfolio"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore]
async fn test_other_artists_portfolio_items_are_not_found() {
    let server = TestServer::start().await;
    let owner = server.account("artist").await;
    let intruder = server.account("artist").await;

    let resp = server
        .client
        .post(server.url("/portfolio"))
        .bearer_auth(&owner)
        .json(&json!({ "title": "Retrospective" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let id = resp.json::<Value>().await.unwrap()["id"].as_i64().unwrap();

    let resp = server
        .client
        .put(server.url(&format!("/portfolio/{}", id)))
        .bearer_auth(&intruder)
        .json(&json!({ "title": "Mine now" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = server
        .client
        .delete(server.url(&format!("/portfolio/{}", id)))
        .bearer_auth(&intruder)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let body: Value = server
        .get("/portfolio/my-portfolio", &owner)
        .await
        .json()
        .await
        .unwrap();
    let items = body["portfolios"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["title"], "Retrospective");
    assert_eq!(items[0]["portfolio_type"], "gallery");
}

#[tokio::test]
#[ignore]
async fn test_purchase_over_http() {
    let server = TestServer::start().await;
    let seller = server.account("artist").await;
    let buyer = server.account("collector").await;

    let resp = server
        .client
        .post(server.url("/artworks"))
        .bearer_auth(&seller)
        .json(&json!({ "title": "Tide", "price": 75.5 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let artwork_id = resp.json::<Value>().await.unwrap()["id"].as_i64().unwrap();

    let resp = server
        .client
        .post(server.url("/transactions"))
        .bearer_auth(&buyer)
        .json(&json!({ "artwork_id": artwork_id, "amount": 1.0 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = server
        .client
        .post(server.url("/transactions"))
        .bearer_auth(&buyer)
        .json(&json!({ "artwork_id": artwork_id, "amount": 75.5 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = server
        .client
        .delete(server.url(&format!("/artworks/{}", artwork_id)))
        .bearer_auth(&seller)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    let body: Value = server
        .get("/transactions/my-transactions", &buyer)
        .await
        .json()
        .await
        .unwrap();
    let transactions = body["transactions"].as_array().unwrap();
    assert_eq!(transactions.len(), 1);
    assert_eq!(transactions[0]["amount"], 75.5);
    assert_eq!(transactions[0]["status"], "completed");
}

#[tokio::test]
#[ignore]
async fn test_non_numeric_id_is_json_bad_request() {
    let server = TestServer::start().await;
    let artist = server.account("artist").await;

    let resp = server.get("/artworks/abc", &artist).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.unwrap();
    assert!(body["error"].is_string());
}
