//! Favorites operations

use serde::Deserialize;
use serde_json::json;

use crate::catalog::Perfume;
use crate::error::Error;
use crate::fetch::ApiClient;

/// A favorited product
#[derive(Debug, Clone, Deserialize)]
pub struct Favorite {
    /// The favorite entry ID
    pub id: i64,

    /// The favorited product
    pub perfume: Perfume,

    /// When it was favorited
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Deserialize)]
struct FavoriteFlag {
    is_favorite: bool,
}

/// Client for favorites; every endpoint requires authentication
pub struct FavoritesClient {
    api: ApiClient,
}

impl FavoritesClient {
    /// Create a new FavoritesClient
    pub(crate) fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// List the user's favorites
    pub async fn list(&self) -> Result<Vec<Favorite>, Error> {
        self.api.get("/favorites/").execute::<Vec<Favorite>>().await
    }

    /// Toggle a product's favorite flag; returns the new state
    pub async fn toggle(&self, perfume_id: i64) -> Result<bool, Error> {
        let body = json!({ "perfume_id": perfume_id });
        let flag = self
            .api
            .post("/favorites/toggle/")
            .json(&body)?
            .execute::<FavoriteFlag>()
            .await?;
        Ok(flag.is_favorite)
    }

    /// Whether a product is currently favorited
    pub async fn check(&self, perfume_id: i64) -> Result<bool, Error> {
        let flag = self
            .api
            .get(&format!("/favorites/check/{}/", perfume_id))
            .execute::<FavoriteFlag>()
            .await?;
        Ok(flag.is_favorite)
    }

    /// Remove a product from favorites
    pub async fn remove(&self, perfume_id: i64) -> Result<(), Error> {
        let body = json!({ "perfume_id": perfume_id });
        self.api
            .post("/favorites/remove/")
            .json(&body)?
            .execute_empty()
            .await
    }
}
