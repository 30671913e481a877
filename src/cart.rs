//! Shopping cart operations
//!
//! The cart is server-owned; this client only holds refetched snapshots.

use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;

use crate::catalog::Perfume;
use crate::error::Error;
use crate::fetch::ApiClient;

/// A line in the cart
#[derive(Debug, Clone, Deserialize)]
pub struct CartItem {
    /// The line ID
    pub id: i64,

    /// The product on this line
    pub perfume: Perfume,

    /// Quantity
    pub quantity: u32,

    /// Server-computed line total
    #[serde(with = "rust_decimal::serde::str")]
    pub total_price: Decimal,
}

/// The user's cart
#[derive(Debug, Clone, Deserialize)]
pub struct Cart {
    /// The cart ID
    pub id: i64,

    /// Cart lines
    #[serde(default)]
    pub items: Vec<CartItem>,

    /// Server-computed cart total
    #[serde(with = "rust_decimal::serde::str")]
    pub total_price: Decimal,

    /// Total unit count across lines
    #[serde(default)]
    pub total_items: u32,
}

/// Receipt returned when the cart is converted into an order
#[derive(Debug, Clone, Deserialize)]
pub struct OrderReceipt {
    /// The created order's ID
    pub order_id: i64,

    /// Human-readable confirmation
    #[serde(default)]
    pub message: String,
}

/// Client for cart operations; every endpoint requires authentication
pub struct CartClient {
    api: ApiClient,
}

impl CartClient {
    /// Create a new CartClient
    pub(crate) fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Fetch the current cart
    pub async fn get(&self) -> Result<Cart, Error> {
        self.api.get("/cart/").execute::<Cart>().await
    }

    /// Add a product to the cart; quantities for an existing line accumulate
    pub async fn add(&self, perfume_id: i64, quantity: u32) -> Result<(), Error> {
        let body = json!({ "perfume_id": perfume_id, "quantity": quantity });
        self.api.post("/cart/add/").json(&body)?.execute_empty().await
    }

    /// Set a line's quantity; a quantity below one removes the line
    pub async fn update(&self, item_id: i64, quantity: u32) -> Result<(), Error> {
        if quantity < 1 {
            return self.remove(item_id).await;
        }
        let body = json!({ "item_id": item_id, "quantity": quantity });
        self.api
            .post("/cart/update/")
            .json(&body)?
            .execute_empty()
            .await
    }

    /// Remove a line from the cart
    pub async fn remove(&self, item_id: i64) -> Result<(), Error> {
        let body = json!({ "item_id": item_id });
        self.api
            .post("/cart/remove/")
            .json(&body)?
            .execute_empty()
            .await
    }

    /// Empty the cart
    pub async fn clear(&self) -> Result<(), Error> {
        self.api.post("/cart/clear/").execute_empty().await
    }

    /// Convert the cart into an order; the server empties the cart
    pub async fn place_order(
        &self,
        shipping_address: &str,
        payment_method: &str,
    ) -> Result<OrderReceipt, Error> {
        let body = json!({
            "shipping_address": shipping_address,
            "payment_method": payment_method,
        });
        self.api
            .post("/checkout/")
            .json(&body)?
            .execute::<OrderReceipt>()
            .await
    }
}
