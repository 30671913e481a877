//! Product catalog operations

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::fetch::ApiClient;

/// A perfume in the catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Perfume {
    /// The product ID
    pub id: i64,

    /// Product name
    pub name: String,

    /// Product description
    #[serde(default)]
    pub description: String,

    /// Unit price; travels as a string on the wire
    #[serde(with = "rust_decimal::serde::str")]
    pub price: Decimal,

    /// Brand, optional
    #[serde(default)]
    pub brand: Option<String>,

    /// Image URL, optional
    #[serde(default)]
    pub image: Option<String>,

    /// Whether the product is in stock
    #[serde(default)]
    pub in_stock: bool,

    /// Creation timestamp
    #[serde(default)]
    pub created_at: Option<String>,
}

impl Perfume {
    fn matches(&self, needle: &str) -> bool {
        if self.name.to_lowercase().contains(needle) {
            return true;
        }
        self.brand
            .as_deref()
            .map(|brand| brand.to_lowercase().contains(needle))
            .unwrap_or(false)
    }
}

/// Client for catalog browsing; all endpoints are public
pub struct CatalogClient {
    api: ApiClient,
}

impl CatalogClient {
    /// Create a new CatalogClient
    pub(crate) fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// List the full catalog
    pub async fn list(&self) -> Result<Vec<Perfume>, Error> {
        self.api.get("/perfumes/").execute::<Vec<Perfume>>().await
    }

    /// Fetch a single product
    pub async fn get(&self, id: i64) -> Result<Perfume, Error> {
        self.api
            .get(&format!("/perfumes/{}/", id))
            .execute::<Perfume>()
            .await
    }

    /// Search the catalog by name or brand.
    ///
    /// The backend has no search endpoint; filtering happens client-side
    /// over the full listing, case-insensitively. An empty query returns
    /// everything.
    pub async fn search(&self, query: &str) -> Result<Vec<Perfume>, Error> {
        let perfumes = self.list().await?;
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Ok(perfumes);
        }
        Ok(perfumes
            .into_iter()
            .filter(|perfume| perfume.matches(&needle))
            .collect())
    }
}
