//! Catalog records and request bodies

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tokio_postgres::Row;

use crate::error::{Error, Result};

macro_rules! text_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
        #[serde(rename_all = "lowercase")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = Error;

            fn from_str(s: &str) -> Result<Self> {
                match s {
                    $($text => Ok($name::$variant),)+
                    other => Err(Error::Validation(format!(
                        "Invalid {}: {}",
                        stringify!($name),
                        other
                    ))),
                }
            }
        }
    };
}

text_enum!(
    /// Sale state of an artwork
    ArtworkStatus {
        Available => "available",
        Sold => "sold",
        Reserved => "reserved",
    }
);

text_enum!(
    TransactionStatus {
        Pending => "pending",
        Completed => "completed",
        Cancelled => "cancelled",
    }
);

text_enum!(
    /// Kind of portfolio entry
    PortfolioType {
        Gallery => "gallery",
        Exhibition => "exhibition",
        Award => "award",
        Publication => "publication",
    }
);

/// Read a TEXT column holding one of the enums above
fn enum_column<T: FromStr<Err = Error>>(row: &Row, column: &str) -> Result<T> {
    let value: String = row.try_get(column)?;
    value
        .parse()
        .map_err(|_| Error::Internal(format!("Unexpected value '{}' in column {}", value, column)))
}

/// Trimmed, non-empty required string
fn required(value: Option<String>) -> Result<String> {
    match value.map(|v| v.trim().to_string()) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(Error::missing_fields()),
    }
}

/// Blank optional strings are stored as NULL
fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

// Categories

#[derive(Debug, Clone, Serialize)]
pub struct Category {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Category {
    pub fn from_row(row: &Row) -> Result<Self> {
        Ok(Self {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct CategoryRequest {
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryInput {
    pub name: String,
    pub description: Option<String>,
}

impl CategoryRequest {
    pub fn validate(self) -> Result<CategoryInput> {
        Ok(CategoryInput {
            name: required(self.name)?,
            description: optional(self.description),
        })
    }
}

// Artists

#[derive(Debug, Clone, Serialize)]
pub struct Artist {
    pub id: i32,
    pub name: String,
    pub bio: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Artist {
    pub fn from_row(row: &Row) -> Result<Self> {
        Ok(Self {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            bio: row.try_get("bio")?,
            email: row.try_get("email")?,
            phone: row.try_get("phone")?,
            website: row.try_get("website")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ArtistRequest {
    pub name: Option<String>,
    pub bio: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArtistInput {
    pub name: String,
    pub bio: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
}

impl ArtistRequest {
    pub fn validate(self) -> Result<ArtistInput> {
        Ok(ArtistInput {
            name: required(self.name)?,
            bio: optional(self.bio),
            email: optional(self.email),
            phone: optional(self.phone),
            website: optional(self.website),
        })
    }
}

// Artworks

#[derive(Debug, Clone, Serialize)]
pub struct Artwork {
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    pub price: f64,
    pub image_url: Option<String>,
    pub category_id: Option<i32>,
    pub artist_id: Option<i32>,
    pub seller_id: Option<i32>,
    pub status: ArtworkStatus,
    pub category_name: Option<String>,
    pub artist_name: Option<String>,
    pub seller_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Artwork {
    /// Expects the joined columns `category_name`, `artist_name`, `seller_name`
    pub fn from_row(row: &Row) -> Result<Self> {
        Ok(Self {
            id: row.try_get("id")?,
            title: row.try_get("title")?,
            description: row.try_get("description")?,
            price: row.try_get("price")?,
            image_url: row.try_get("image_url")?,
            category_id: row.try_get("category_id")?,
            artist_id: row.try_get("artist_id")?,
            seller_id: row.try_get("seller_id")?,
            status: enum_column(row, "status")?,
            category_name: row.try_get("category_name")?,
            artist_name: row.try_get("artist_name")?,
            seller_name: row.try_get("seller_name")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ArtworkRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub image_url: Option<String>,
    pub category_id: Option<i32>,
    pub artist_id: Option<i32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArtworkInput {
    pub title: String,
    pub description: Option<String>,
    pub price: f64,
    pub image_url: Option<String>,
    pub category_id: Option<i32>,
    pub artist_id: Option<i32>,
}

impl ArtworkRequest {
    pub fn validate(self) -> Result<ArtworkInput> {
        let price = self.price.ok_or_else(Error::missing_fields)?;
        if !price.is_finite() || price < 0.0 {
            return Err(Error::Validation("Price must be a non-negative number".to_string()));
        }

        Ok(ArtworkInput {
            title: required(self.title)?,
            description: optional(self.description),
            price,
            image_url: optional(self.image_url),
            category_id: self.category_id,
            artist_id: self.artist_id,
        })
    }
}

// Transactions

#[derive(Debug, Clone, Serialize)]
pub struct Transaction {
    pub id: i32,
    pub buyer_id: i32,
    pub seller_id: i32,
    pub artwork_id: i32,
    pub buyer_name: String,
    pub seller_name: String,
    pub artwork_title: String,
    pub amount: f64,
    pub transaction_date: DateTime<Utc>,
    pub status: TransactionStatus,
    pub payment_method: Option<String>,
    pub notes: Option<String>,
}

impl Transaction {
    pub fn from_row(row: &Row) -> Result<Self> {
        Ok(Self {
            id: row.try_get("id")?,
            buyer_id: row.try_get("buyer_id")?,
            seller_id: row.try_get("seller_id")?,
            artwork_id: row.try_get("artwork_id")?,
            buyer_name: row.try_get("buyer_name")?,
            seller_name: row.try_get("seller_name")?,
            artwork_title: row.try_get("artwork_title")?,
            amount: row.try_get("amount")?,
            transaction_date: row.try_get("transaction_date")?,
            status: enum_column(row, "status")?,
            payment_method: row.try_get("payment_method")?,
            notes: row.try_get("notes")?,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct PurchaseRequest {
    pub artwork_id: Option<i32>,
    pub amount: Option<f64>,
    pub payment_method: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PurchaseInput {
    pub artwork_id: i32,
    pub amount: f64,
    pub payment_method: Option<String>,
    pub notes: Option<String>,
}

impl PurchaseRequest {
    pub fn validate(self) -> Result<PurchaseInput> {
        let (Some(artwork_id), Some(amount)) = (self.artwork_id, self.amount) else {
            return Err(Error::missing_fields());
        };
        if !amount.is_finite() || amount < 0.0 {
            return Err(Error::Validation("Amount must be a non-negative number".to_string()));
        }

        Ok(PurchaseInput {
            artwork_id,
            amount,
            payment_method: optional(self.payment_method),
            notes: optional(self.notes),
        })
    }
}

// Portfolios

#[derive(Debug, Clone, Serialize)]
pub struct PortfolioItem {
    pub id: i32,
    pub artist_id: i32,
    pub title: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub external_link: Option<String>,
    pub portfolio_type: PortfolioType,
    pub created_at: DateTime<Utc>,
}

impl PortfolioItem {
    pub fn from_row(row: &Row) -> Result<Self> {
        Ok(Self {
            id: row.try_get("id")?,
            artist_id: row.try_get("artist_id")?,
            title: row.try_get("title")?,
            description: row.try_get("description")?,
            image_url: row.try_get("image_url")?,
            external_link: row.try_get("external_link")?,
            portfolio_type: enum_column(row, "portfolio_type")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

/// Body for both create and update; on update only supplied fields change
#[derive(Debug, Default, Deserialize)]
pub struct PortfolioRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub external_link: Option<String>,
    pub portfolio_type: Option<PortfolioType>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PortfolioInput {
    pub title: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub external_link: Option<String>,
    pub portfolio_type: PortfolioType,
}

/// Field-by-field portfolio update; `None` leaves the column untouched
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PortfolioPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub external_link: Option<String>,
    pub portfolio_type: Option<PortfolioType>,
}

impl PortfolioPatch {
    pub fn is_empty(&self) -> bool {
        *self == PortfolioPatch::default()
    }
}

impl PortfolioRequest {
    pub fn validate_new(self) -> Result<PortfolioInput> {
        Ok(PortfolioInput {
            title: required(self.title)?,
            description: optional(self.description),
            image_url: optional(self.image_url),
            external_link: optional(self.external_link),
            portfolio_type: self.portfolio_type.unwrap_or(PortfolioType::Gallery),
        })
    }

    pub fn validate_patch(self) -> Result<PortfolioPatch> {
        let title = match self.title {
            Some(title) => Some(required(Some(title))?),
            None => None,
        };
        let patch = PortfolioPatch {
            title,
            description: self.description.map(|v| v.trim().to_string()),
            image_url: self.image_url.map(|v| v.trim().to_string()),
            external_link: self.external_link.map(|v| v.trim().to_string()),
            portfolio_type: self.portfolio_type,
        };
        if patch.is_empty() {
            return Err(Error::Validation("No fields to update".to_string()));
        }
        Ok(patch)
    }
}

// Dashboard

#[derive(Debug, Clone, Serialize)]
pub struct CategoryCount {
    pub category_name: String,
    pub artwork_count: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct MonthlyCount {
    /// `YYYY-MM`
    pub month: String,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecentArtwork {
    pub title: String,
    pub price: f64,
    pub category_name: Option<String>,
    pub artist_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardStats {
    pub total_artworks: i64,
    pub total_artists: i64,
    pub total_categories: i64,
    pub total_value: f64,
    pub artworks_by_category: Vec<CategoryCount>,
    pub monthly_artworks: Vec<MonthlyCount>,
    pub recent_artworks: Vec<RecentArtwork>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ArtistStats {
    pub portfolio_count: i64,
    pub listed_artworks: i64,
    pub sales_count: i64,
    pub total_sales: f64,
}
