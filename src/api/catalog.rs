//! Catalog route handlers

use axum::{
    extract::{FromRef, State},
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};
use serde_json::json;

use super::extract::{JsonBody, PathParam};
use super::routes::{created, MessageResponse};
use crate::auth::{ArtistContext, AuthContext, AuthGate};
use crate::catalog::models::{
    ArtistRequest, ArtworkRequest, CategoryRequest, PortfolioRequest, PurchaseRequest,
};
use crate::catalog::Catalog;
use crate::error::Result;

/// State for routes that need the database
#[derive(Clone)]
pub struct CatalogState {
    pub catalog: Catalog,
    pub gate: AuthGate,
}

impl FromRef<CatalogState> for AuthGate {
    fn from_ref(state: &CatalogState) -> Self {
        state.gate.clone()
    }
}

type CatalogRef = State<CatalogState>;

pub fn router(state: CatalogState) -> Router {
    Router::new()
        .route("/categories", get(list_categories).post(create_category))
        .route("/categories/{id}", put(update_category).delete(delete_category))
        .route("/artists", get(list_artists).post(create_artist))
        .route("/artists/{id}", put(update_artist).delete(delete_artist))
        .route("/artworks", get(list_artworks).post(create_artwork))
        .route(
            "/artworks/{id}",
            get(get_artwork).put(update_artwork).delete(delete_artwork),
        )
        .route("/marketplace/available", get(available_artworks))
        .route("/transactions", post(purchase))
        .route("/transactions/my-transactions", get(my_transactions))
        .route("/portfolio", post(create_portfolio_item))
        .route("/portfolio/my-portfolio", get(my_portfolio))
        .route(
            "/portfolio/{id}",
            put(update_portfolio_item).delete(delete_portfolio_item),
        )
        .route("/dashboard/stats", get(dashboard_stats))
        .route("/dashboard/artist-stats", get(artist_stats))
        .with_state(state)
}

// Categories

async fn list_categories(State(state): CatalogRef, _auth: AuthContext) -> Result<impl IntoResponse> {
    let categories = state.catalog.list_categories().await?;
    Ok(Json(json!({ "categories": categories })))
}

async fn create_category(
    State(state): CatalogRef,
    auth: AuthContext,
    JsonBody(req): JsonBody<CategoryRequest>,
) -> Result<impl IntoResponse> {
    let input = req.validate()?;
    let id = state.catalog.create_category(&input).await?;
    tracing::info!(user_id = auth.user_id, category_id = id, "Category created");
    Ok(created("Category created successfully", id))
}

async fn update_category(
    State(state): CatalogRef,
    _auth: AuthContext,
    PathParam(id): PathParam<i32>,
    JsonBody(req): JsonBody<CategoryRequest>,
) -> Result<impl IntoResponse> {
    let input = req.validate()?;
    state.catalog.update_category(id, &input).await?;
    Ok(MessageResponse::new("Category updated successfully"))
}

async fn delete_category(
    State(state): CatalogRef,
    auth: AuthContext,
    PathParam(id): PathParam<i32>,
) -> Result<impl IntoResponse> {
    state.catalog.delete_category(id).await?;
    tracing::info!(user_id = auth.user_id, category_id = id, "Category deleted");
    Ok(MessageResponse::new("Category deleted successfully"))
}

// Artists

async fn list_artists(State(state): CatalogRef, _auth: AuthContext) -> Result<impl IntoResponse> {
    let artists = state.catalog.list_artists().await?;
    Ok(Json(json!({ "artists": artists })))
}

async fn create_artist(
    State(state): CatalogRef,
    auth: AuthContext,
    JsonBody(req): JsonBody<ArtistRequest>,
) -> Result<impl IntoResponse> {
    let input = req.validate()?;
    let id = state.catalog.create_artist(&input).await?;
    tracing::info!(user_id = auth.user_id, artist_id = id, "Artist created");
    Ok(created("Artist created successfully", id))
}

async fn update_artist(
    State(state): CatalogRef,
    _auth: AuthContext,
    PathParam(id): PathParam<i32>,
    JsonBody(req): JsonBody<ArtistRequest>,
) -> Result<impl IntoResponse> {
    let input = req.validate()?;
    state.catalog.update_artist(id, &input).await?;
    Ok(MessageResponse::new("Artist updated successfully"))
}

async fn delete_artist(
    State(state): CatalogRef,
    auth: AuthContext,
    PathParam(id): PathParam<i32>,
) -> Result<impl IntoResponse> {
    state.catalog.delete_artist(id).await?;
    tracing::info!(user_id = auth.user_id, artist_id = id, "Artist deleted");
    Ok(MessageResponse::new("Artist deleted successfully"))
}

// Artworks

async fn list_artworks(State(state): CatalogRef, _auth: AuthContext) -> Result<impl IntoResponse> {
    let artworks = state.catalog.list_artworks().await?;
    Ok(Json(json!({ "artworks": artworks })))
}

async fn get_artwork(
    State(state): CatalogRef,
    _auth: AuthContext,
    PathParam(id): PathParam<i32>,
) -> Result<impl IntoResponse> {
    let artwork = state.catalog.get_artwork(id).await?;
    Ok(Json(json!({ "artwork": artwork })))
}

async fn create_artwork(
    State(state): CatalogRef,
    auth: AuthContext,
    JsonBody(req): JsonBody<ArtworkRequest>,
) -> Result<impl IntoResponse> {
    let input = req.validate()?;
    let id = state.catalog.create_artwork(auth.user_id, &input).await?;
    tracing::info!(user_id = auth.user_id, artwork_id = id, "Artwork listed");
    Ok(created("Artwork created successfully", id))
}

async fn update_artwork(
    State(state): CatalogRef,
    auth: AuthContext,
    PathParam(id): PathParam<i32>,
    JsonBody(req): JsonBody<ArtworkRequest>,
) -> Result<impl IntoResponse> {
    let input = req.validate()?;
    state.catalog.update_artwork(id, auth.user_id, &input).await?;
    Ok(MessageResponse::new("Artwork updated successfully"))
}

async fn delete_artwork(
    State(state): CatalogRef,
    auth: AuthContext,
    PathParam(id): PathParam<i32>,
) -> Result<impl IntoResponse> {
    state.catalog.delete_artwork(id, auth.user_id).await?;
    tracing::info!(user_id = auth.user_id, artwork_id = id, "Artwork deleted");
    Ok(MessageResponse::new("Artwork deleted successfully"))
}

async fn available_artworks(
    State(state): CatalogRef,
    _auth: AuthContext,
) -> Result<impl IntoResponse> {
    let artworks = state.catalog.list_available_artworks().await?;
    Ok(Json(json!({ "artworks": artworks })))
}

// Transactions

async fn purchase(
    State(state): CatalogRef,
    auth: AuthContext,
    JsonBody(req): JsonBody<PurchaseRequest>,
) -> Result<impl IntoResponse> {
    let input = req.validate()?;
    let id = state.catalog.purchase(auth.user_id, &input).await?;
    tracing::info!(
        user_id = auth.user_id,
        artwork_id = input.artwork_id,
        transaction_id = id,
        "Artwork purchased"
    );
    Ok(created("Purchase completed successfully", id))
}

async fn my_transactions(State(state): CatalogRef, auth: AuthContext) -> Result<impl IntoResponse> {
    let transactions = state.catalog.transactions_for(auth.user_id).await?;
    Ok(Json(json!({ "transactions": transactions })))
}

// Portfolio

async fn my_portfolio(
    State(state): CatalogRef,
    ArtistContext(auth): ArtistContext,
) -> Result<impl IntoResponse> {
    let portfolios = state.catalog.portfolio_for(auth.user_id).await?;
    Ok(Json(json!({ "portfolios": portfolios })))
}

async fn create_portfolio_item(
    State(state): CatalogRef,
    ArtistContext(auth): ArtistContext,
    JsonBody(req): JsonBody<PortfolioRequest>,
) -> Result<impl IntoResponse> {
    let input = req.validate_new()?;
    let item = state.catalog.create_portfolio_item(auth.user_id, &input).await?;
    tracing::info!(user_id = auth.user_id, portfolio_id = item.id, "Portfolio item added");
    Ok(created("Portfolio item created successfully", item.id))
}

async fn update_portfolio_item(
    State(state): CatalogRef,
    ArtistContext(auth): ArtistContext,
    PathParam(id): PathParam<i32>,
    JsonBody(req): JsonBody<PortfolioRequest>,
) -> Result<impl IntoResponse> {
    let patch = req.validate_patch()?;
    let item = state
        .catalog
        .update_portfolio_item(id, auth.user_id, &patch)
        .await?;
    Ok(Json(json!({
        "message": "Portfolio item updated successfully",
        "portfolio": item,
    })))
}

async fn delete_portfolio_item(
    State(state): CatalogRef,
    ArtistContext(auth): ArtistContext,
    PathParam(id): PathParam<i32>,
) -> Result<impl IntoResponse> {
    state.catalog.delete_portfolio_item(id, auth.user_id).await?;
    Ok(MessageResponse::new("Portfolio item deleted successfully"))
}

// Dashboard

async fn dashboard_stats(State(state): CatalogRef, _auth: AuthContext) -> Result<impl IntoResponse> {
    let stats = state.catalog.dashboard_stats().await?;
    Ok(Json(stats))
}

async fn artist_stats(
    State(state): CatalogRef,
    ArtistContext(auth): ArtistContext,
) -> Result<impl IntoResponse> {
    let stats = state.catalog.artist_stats(auth.user_id).await?;
    Ok(Json(stats))
}
