//! Marketplace catalog persistence: categories, artists, artworks,
//! transactions, portfolios and dashboard aggregates.

pub mod models;

use std::sync::Arc;

use crate::db::{is_foreign_key_violation, Database};
use crate::error::{Error, Result};
use models::*;

const ARTWORK_SELECT: &str = "
    SELECT a.id, a.title, a.description, a.price, a.image_url, a.category_id,
           a.artist_id, a.seller_id, a.status, a.created_at,
           c.name AS category_name, ar.name AS artist_name, u.name AS seller_name
    FROM artworks a
    LEFT JOIN categories c ON c.id = a.category_id
    LEFT JOIN artists ar ON ar.id = a.artist_id
    LEFT JOIN users u ON u.id = a.seller_id";

const TRANSACTION_SELECT: &str = "
    SELECT t.id, t.buyer_id, t.seller_id, t.artwork_id, t.amount,
           t.transaction_date, t.status, t.payment_method, t.notes,
           b.name AS buyer_name, s.name AS seller_name, a.title AS artwork_title
    FROM transactions t
    JOIN users b ON b.id = t.buyer_id
    JOIN users s ON s.id = t.seller_id
    JOIN artworks a ON a.id = t.artwork_id";

const PORTFOLIO_COLUMNS: &str =
    "id, artist_id, title, description, image_url, external_link, portfolio_type, created_at";

/// Turns a foreign-key violation into a 400 naming the bad reference
fn reference_error(e: tokio_postgres::Error, what: &str) -> Error {
    if is_foreign_key_violation(&e) {
        Error::Validation(format!("Unknown {}", what))
    } else {
        Error::Database(e)
    }
}

fn not_found(what: &str) -> Error {
    Error::NotFound(format!("{} not found", what))
}

/// Catalog queries over a shared database connection
#[derive(Clone)]
pub struct Catalog {
    db: Arc<Database>,
}

impl Catalog {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    // Categories

    pub async fn list_categories(&self) -> Result<Vec<Category>> {
        let rows = self
            .db
            .client()
            .query(
                "SELECT id, name, description, created_at FROM categories ORDER BY name",
                &[],
            )
            .await?;
        rows.iter().map(Category::from_row).collect()
    }

    pub async fn create_category(&self, input: &CategoryInput) -> Result<i32> {
        let row = self
            .db
            .client()
            .query_one(
                "INSERT INTO categories (name, description) VALUES ($1, $2) RETURNING id",
                &[&input.name, &input.description],
            )
            .await?;
        Ok(row.try_get("id")?)
    }

    pub async fn update_category(&self, id: i32, input: &CategoryInput) -> Result<()> {
        let updated = self
            .db
            .client()
            .execute(
                "UPDATE categories SET name = $2, description = $3 WHERE id = $1",
                &[&id, &input.name, &input.description],
            )
            .await?;
        if updated == 0 {
            return Err(not_found("Category"));
        }
        Ok(())
    }

    pub async fn delete_category(&self, id: i32) -> Result<()> {
        let deleted = self
            .db
            .client()
            .execute("DELETE FROM categories WHERE id = $1", &[&id])
            .await?;
        if deleted == 0 {
            return Err(not_found("Category"));
        }
        Ok(())
    }

    // Artists

    pub async fn list_artists(&self) -> Result<Vec<Artist>> {
        let rows = self
            .db
            .client()
            .query(
                "SELECT id, name, bio, email, phone, website, created_at FROM artists ORDER BY name",
                &[],
            )
            .await?;
        rows.iter().map(Artist::from_row).collect()
    }

    pub async fn create_artist(&self, input: &ArtistInput) -> Result<i32> {
        let row = self
            .db
            .client()
            .query_one(
                "INSERT INTO artists (name, bio, email, phone, website) VALUES ($1, $2, $3, $4, $5) RETURNING id",
                &[&input.name, &input.bio, &input.email, &input.phone, &input.website],
            )
            .await?;
        Ok(row.try_get("id")?)
    }

    pub async fn update_artist(&self, id: i32, input: &ArtistInput) -> Result<()> {
        let updated = self
            .db
            .client()
            .execute(
                "UPDATE artists SET name = $2, bio = $3, email = $4, phone = $5, website = $6 WHERE id = $1",
                &[&id, &input.name, &input.bio, &input.email, &input.phone, &input.website],
            )
            .await?;
        if updated == 0 {
            return Err(not_found("Artist"));
        }
        Ok(())
    }

    pub async fn delete_artist(&self, id: i32) -> Result<()> {
        let deleted = self
            .db
            .client()
            .execute("DELETE FROM artists WHERE id = $1", &[&id])
            .await?;
        if deleted == 0 {
            return Err(not_found("Artist"));
        }
        Ok(())
    }

    // Artworks

    pub async fn list_artworks(&self) -> Result<Vec<Artwork>> {
        let query = format!("{} ORDER BY a.created_at DESC, a.id DESC", ARTWORK_SELECT);
        let rows = self.db.client().query(query.as_str(), &[]).await?;
        rows.iter().map(Artwork::from_row).collect()
    }

    pub async fn list_available_artworks(&self) -> Result<Vec<Artwork>> {
        let query = format!(
            "{} WHERE a.status = 'available' ORDER BY a.created_at DESC, a.id DESC",
            ARTWORK_SELECT
        );
        let rows = self.db.client().query(query.as_str(), &[]).await?;
        rows.iter().map(Artwork::from_row).collect()
    }

    pub async fn get_artwork(&self, id: i32) -> Result<Artwork> {
        let query = format!("{} WHERE a.id = $1", ARTWORK_SELECT);
        let row = self
            .db
            .client()
            .query_opt(query.as_str(), &[&id])
            .await?
            .ok_or_else(|| not_found("Artwork"))?;
        Artwork::from_row(&row)
    }

    /// List an artwork for sale; `seller_id` is the creating user
    pub async fn create_artwork(&self, seller_id: i32, input: &ArtworkInput) -> Result<i32> {
        let row = self
            .db
            .client()
            .query_one(
                "INSERT INTO artworks (title, description, price, image_url, category_id, artist_id, seller_id)
                 VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING id",
                &[
                    &input.title,
                    &input.description,
                    &input.price,
                    &input.image_url,
                    &input.category_id,
                    &input.artist_id,
                    &seller_id,
                ],
            )
            .await
            .map_err(|e| reference_error(e, "category or artist"))?;
        Ok(row.try_get("id")?)
    }

    /// Only the seller may change a listing; others see 404
    pub async fn update_artwork(&self, id: i32, seller_id: i32, input: &ArtworkInput) -> Result<()> {
        let updated = self
            .db
            .client()
            .execute(
                "UPDATE artworks SET title = $3, description = $4, price = $5, image_url = $6,
                        category_id = $7, artist_id = $8
                 WHERE id = $1 AND seller_id = $2",
                &[
                    &id,
                    &seller_id,
                    &input.title,
                    &input.description,
                    &input.price,
                    &input.image_url,
                    &input.category_id,
                    &input.artist_id,
                ],
            )
            .await
            .map_err(|e| reference_error(e, "category or artist"))?;
        if updated == 0 {
            return Err(not_found("Artwork"));
        }
        Ok(())
    }

    /// Withdraw a listing. Sold or reserved works keep their sales record.
    pub async fn delete_artwork(&self, id: i32, seller_id: i32) -> Result<()> {
        let deleted = self
            .db
            .client()
            .execute(
                "DELETE FROM artworks WHERE id = $1 AND seller_id = $2 AND status = 'available'",
                &[&id, &seller_id],
            )
            .await
            .map_err(|e| {
                if is_foreign_key_violation(&e) {
                    Error::Conflict("Artwork has transactions and cannot be deleted".to_string())
                } else {
                    Error::Database(e)
                }
            })?;
        if deleted > 0 {
            return Ok(());
        }

        match self.get_artwork(id).await {
            Ok(artwork) if artwork.seller_id == Some(seller_id) => Err(Error::Conflict(format!(
                "Artwork cannot be deleted (status: {})",
                artwork.status
            ))),
            Ok(_) | Err(Error::NotFound(_)) => Err(not_found("Artwork")),
            Err(e) => Err(e),
        }
    }

    // Transactions

    /// Buy an available artwork at its listed price
    ///
    /// Marking the artwork sold and recording the transaction happen in one
    /// statement, so two buyers cannot both succeed. The recorded amount is
    /// the artwork's price; an `amount` that differs from it is rejected.
    pub async fn purchase(&self, buyer_id: i32, input: &PurchaseInput) -> Result<i32> {
        let row = self
            .db
            .client()
            .query_opt(
                "WITH sold AS (
                     UPDATE artworks SET status = 'sold'
                     WHERE id = $1 AND status = 'available'
                       AND seller_id IS NOT NULL AND seller_id <> $2
                       AND price = $3::float8
                     RETURNING id, seller_id, price
                 )
                 INSERT INTO transactions (buyer_id, seller_id, artwork_id, amount, status, payment_method, notes)
                 SELECT $2::int4, seller_id, id, price, 'completed', $4::text, $5::text FROM sold
                 RETURNING id",
                &[
                    &input.artwork_id,
                    &buyer_id,
                    &input.amount,
                    &input.payment_method,
                    &input.notes,
                ],
            )
            .await?;

        if let Some(row) = row {
            return Ok(row.try_get("id")?);
        }

        let artwork = self.get_artwork(input.artwork_id).await?;
        if artwork.seller_id == Some(buyer_id) {
            Err(Error::Conflict("You cannot buy your own artwork".to_string()))
        } else if artwork.status != ArtworkStatus::Available || artwork.seller_id.is_none() {
            Err(Error::Conflict(format!(
                "Artwork is not available (status: {})",
                artwork.status
            )))
        } else {
            Err(Error::Validation(format!(
                "Amount {} does not match the artwork price {}",
                input.amount, artwork.price
            )))
        }
    }

    /// Transactions where the user is buyer or seller, newest first
    pub async fn transactions_for(&self, user_id: i32) -> Result<Vec<Transaction>> {
        let query = format!(
            "{} WHERE t.buyer_id = $1 OR t.seller_id = $1 ORDER BY t.transaction_date DESC, t.id DESC",
            TRANSACTION_SELECT
        );
        let rows = self.db.client().query(query.as_str(), &[&user_id]).await?;
        rows.iter().map(Transaction::from_row).collect()
    }

    // Portfolios

    pub async fn portfolio_for(&self, artist_id: i32) -> Result<Vec<PortfolioItem>> {
        let query = format!(
            "SELECT {} FROM artist_portfolios WHERE artist_id = $1 ORDER BY created_at DESC, id DESC",
            PORTFOLIO_COLUMNS
        );
        let rows = self.db.client().query(query.as_str(), &[&artist_id]).await?;
        rows.iter().map(PortfolioItem::from_row).collect()
    }

    pub async fn create_portfolio_item(
        &self,
        artist_id: i32,
        input: &PortfolioInput,
    ) -> Result<PortfolioItem> {
        let query = format!(
            "INSERT INTO artist_portfolios (artist_id, title, description, image_url, external_link, portfolio_type)
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {}",
            PORTFOLIO_COLUMNS
        );
        let row = self
            .db
            .client()
            .query_one(
                query.as_str(),
                &[
                    &artist_id,
                    &input.title,
                    &input.description,
                    &input.image_url,
                    &input.external_link,
                    &input.portfolio_type.as_str(),
                ],
            )
            .await?;
        PortfolioItem::from_row(&row)
    }

    /// Apply only the fields present in `patch`
    pub async fn update_portfolio_item(
        &self,
        id: i32,
        artist_id: i32,
        patch: &PortfolioPatch,
    ) -> Result<PortfolioItem> {
        let query = format!(
            "UPDATE artist_portfolios SET
                 title = COALESCE($3, title),
                 description = COALESCE($4, description),
                 image_url = COALESCE($5, image_url),
                 external_link = COALESCE($6, external_link),
                 portfolio_type = COALESCE($7, portfolio_type)
             WHERE id = $1 AND artist_id = $2
             RETURNING {}",
            PORTFOLIO_COLUMNS
        );
        let portfolio_type = patch.portfolio_type.map(|t| t.as_str());
        let row = self
            .db
            .client()
            .query_opt(
                query.as_str(),
                &[
                    &id,
                    &artist_id,
                    &patch.title,
                    &patch.description,
                    &patch.image_url,
                    &patch.external_link,
                    &portfolio_type,
                ],
            )
            .await?
            .ok_or_else(|| not_found("Portfolio item"))?;
        PortfolioItem::from_row(&row)
    }

    pub async fn delete_portfolio_item(&self, id: i32, artist_id: i32) -> Result<()> {
        let deleted = self
            .db
            .client()
            .execute(
                "DELETE FROM artist_portfolios WHERE id = $1 AND artist_id = $2",
                &[&id, &artist_id],
            )
            .await?;
        if deleted == 0 {
            return Err(not_found("Portfolio item"));
        }
        Ok(())
    }

    // Dashboard

    pub async fn dashboard_stats(&self) -> Result<DashboardStats> {
        let client = self.db.client();

        let totals = client
            .query_one(
                "SELECT
                     (SELECT COUNT(*) FROM artworks) AS total_artworks,
                     (SELECT COUNT(*) FROM artists) AS total_artists,
                     (SELECT COUNT(*) FROM categories) AS total_categories,
                     (SELECT COALESCE(SUM(price), 0)::float8 FROM artworks) AS total_value",
                &[],
            )
            .await?;

        let by_category = client
            .query(
                "SELECT COALESCE(c.name, 'Uncategorized') AS category_name, COUNT(a.id) AS artwork_count
                 FROM artworks a
                 LEFT JOIN categories c ON c.id = a.category_id
                 GROUP BY 1
                 ORDER BY artwork_count DESC, category_name",
                &[],
            )
            .await?;

        let monthly = client
            .query(
                "SELECT to_char(date_trunc('month', created_at), 'YYYY-MM') AS month, COUNT(*) AS count
                 FROM artworks
                 WHERE created_at >= date_trunc('month', now()) - interval '11 months'
                 GROUP BY 1
                 ORDER BY 1",
                &[],
            )
            .await?;

        let recent = client
            .query(
                "SELECT a.title, a.price, c.name AS category_name, ar.name AS artist_name, a.created_at
                 FROM artworks a
                 LEFT JOIN categories c ON c.id = a.category_id
                 LEFT JOIN artists ar ON ar.id = a.artist_id
                 ORDER BY a.created_at DESC, a.id DESC
                 LIMIT 5",
                &[],
            )
            .await?;

        Ok(DashboardStats {
            total_artworks: totals.try_get("total_artworks")?,
            total_artists: totals.try_get("total_artists")?,
            total_categories: totals.try_get("total_categories")?,
            total_value: totals.try_get("total_value")?,
            artworks_by_category: by_category
                .iter()
                .map(|row| -> Result<CategoryCount> {
                    Ok(CategoryCount {
                        category_name: row.try_get("category_name")?,
                        artwork_count: row.try_get("artwork_count")?,
                    })
                })
                .collect::<Result<_>>()?,
            monthly_artworks: monthly
                .iter()
                .map(|row| -> Result<MonthlyCount> {
                    Ok(MonthlyCount {
                        month: row.try_get("month")?,
                        count: row.try_get("count")?,
                    })
                })
                .collect::<Result<_>>()?,
            recent_artworks: recent
                .iter()
                .map(|row| -> Result<RecentArtwork> {
                    Ok(RecentArtwork {
                        title: row.try_get("title")?,
                        price: row.try_get("price")?,
                        category_name: row.try_get("category_name")?,
                        artist_name: row.try_get("artist_name")?,
                        created_at: row.try_get("created_at")?,
                    })
                })
                .collect::<Result<_>>()?,
        })
    }

    pub async fn artist_stats(&self, user_id: i32) -> Result<ArtistStats> {
        let row = self
            .db
            .client()
            .query_one(
                "SELECT
                     (SELECT COUNT(*) FROM artist_portfolios WHERE artist_id = $1) AS portfolio_count,
                     (SELECT COUNT(*) FROM artworks WHERE seller_id = $1) AS listed_artworks,
                     (SELECT COUNT(*) FROM transactions WHERE seller_id = $1 AND status = 'completed') AS sales_count,
                     (SELECT COALESCE(SUM(amount), 0)::float8 FROM transactions
                      WHERE seller_id = $1 AND status = 'completed') AS total_sales",
                &[&user_id],
            )
            .await?;

        Ok(ArtistStats {
            portfolio_count: row.try_get("portfolio_count")?,
            listed_artworks: row.try_get("listed_artworks")?,
            sales_count: row.try_get("sales_count")?,
            total_sales: row.try_get("total_sales")?,
        })
    }
}
