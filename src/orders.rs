//! Order history and cancellation

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Mutex;

use crate::catalog::Perfume;
use crate::error::Error;
use crate::fetch::ApiClient;

/// Lifecycle state of an order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Created, awaiting processing
    Pending,
    /// Being prepared
    Processing,
    /// Delivered
    Completed,
    /// Cancelled by the user or the store
    Cancelled,
}

/// A line in an order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
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

/// A placed order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    /// The order ID
    pub id: i64,

    /// Order lines
    #[serde(default)]
    pub items: Vec<OrderItem>,

    /// Order total
    #[serde(with = "rust_decimal::serde::str")]
    pub total_amount: Decimal,

    /// Lifecycle state
    pub status: OrderStatus,

    /// Creation timestamp
    #[serde(default)]
    pub created_at: Option<String>,

    /// Shipping address as submitted at checkout
    #[serde(default)]
    pub shipping_address: String,

    /// Payment method as submitted at checkout
    #[serde(default)]
    pub payment_method: String,

    /// Number of lines
    #[serde(default)]
    pub items_count: u32,
}

/// How a cancellation was carried out
#[derive(Debug, Clone, PartialEq)]
pub enum CancelOutcome {
    /// The order resource was deleted
    Deleted,
    /// The order's status was updated to cancelled
    Updated(OrderStatus),
    /// No endpoint accepted the cancellation; the order was removed from
    /// the local snapshot only
    Local,
}

/// Client for order history; every endpoint requires authentication
pub struct OrdersClient {
    api: ApiClient,
    snapshot: Mutex<Vec<Order>>,
}

impl OrdersClient {
    /// Create a new OrdersClient
    pub(crate) fn new(api: ApiClient) -> Self {
        Self {
            api,
            snapshot: Mutex::new(Vec::new()),
        }
    }

    /// The last fetched order list, minus any locally cancelled orders
    pub fn snapshot(&self) -> Vec<Order> {
        self.snapshot.lock().unwrap().clone()
    }

    /// List the user's orders
    pub async fn list(&self) -> Result<Vec<Order>, Error> {
        let orders = self.api.get("/orders/").execute::<Vec<Order>>().await?;
        *self.snapshot.lock().unwrap() = orders.clone();
        Ok(orders)
    }

    /// Fetch a single order
    pub async fn get(&self, id: i64) -> Result<Order, Error> {
        self.api
            .get(&format!("/orders/{}/", id))
            .execute::<Order>()
            .await
    }

    /// Cancel an order.
    ///
    /// Deployed backends disagree on how cancellation is expressed, so the
    /// strategies are tried in order: delete the resource, patch the status,
    /// put the full resource with a cancelled status, and finally a
    /// local-only removal. Each stage advances on not-found only; any other
    /// failure stops the walk and propagates.
    pub async fn cancel(&self, order: &Order) -> Result<CancelOutcome, Error> {
        let path = format!("/orders/{}/", order.id);

        match self.api.delete(&path).execute_empty().await {
            Ok(()) => {
                self.forget(order.id);
                return Ok(CancelOutcome::Deleted);
            }
            Err(err) if err.is_not_found() => {
                tracing::debug!("delete not supported for order {}, trying patch", order.id);
            }
            Err(err) => return Err(err),
        }

        let patch_body = json!({ "status": "cancelled" });
        match self
            .api
            .patch(&path)
            .json(&patch_body)?
            .execute::<Order>()
            .await
        {
            Ok(updated) => {
                self.forget(order.id);
                return Ok(CancelOutcome::Updated(updated.status));
            }
            Err(err) if err.is_not_found() => {
                tracing::debug!("patch not supported for order {}, trying put", order.id);
            }
            Err(err) => return Err(err),
        }

        let mut cancelled = order.clone();
        cancelled.status = OrderStatus::Cancelled;
        match self
            .api
            .put(&path)
            .json(&cancelled)?
            .execute::<Order>()
            .await
        {
            Ok(updated) => {
                self.forget(order.id);
                Ok(CancelOutcome::Updated(updated.status))
            }
            Err(err) if err.is_not_found() => {
                tracing::debug!("no cancel endpoint for order {}, removing locally", order.id);
                self.forget(order.id);
                Ok(CancelOutcome::Local)
            }
            Err(err) => Err(err),
        }
    }

    fn forget(&self, id: i64) {
        self.snapshot.lock().unwrap().retain(|order| order.id != id);
    }
}
