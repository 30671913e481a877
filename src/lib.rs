//! Ledo Storefront Client Library
//!
//! A Rust client for the Perfumaria Ledo storefront API, covering
//! authentication and session persistence, the product catalog, the
//! shopping cart, orders, favorites, address management, and the WhatsApp
//! checkout handoff.
//!
//! All state of record lives in the backend; this crate fetches, displays,
//! and mutates it over REST with bearer-token authorization.

pub mod addresses;
pub mod auth;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod error;
pub mod favorites;
pub mod fetch;
pub mod orders;
pub mod storage;

use reqwest::Client;
use std::sync::Arc;

use crate::addresses::AddressesClient;
use crate::auth::{Auth, SessionStore};
use crate::cart::CartClient;
use crate::catalog::CatalogClient;
use crate::checkout::CheckoutClient;
use crate::config::ClientOptions;
use crate::error::Error;
use crate::favorites::FavoritesClient;
use crate::fetch::ApiClient;
use crate::orders::OrdersClient;
use crate::storage::{MemoryTokenStore, TokenStore};

/// The main entry point for the Ledo storefront client
pub struct Ledo {
    /// Client options
    pub options: ClientOptions,
    /// HTTP client used for requests
    pub http_client: Client,
    session: Arc<SessionStore>,
    api: ApiClient,
    auth: Auth,
    addresses: AddressesClient,
    orders: OrdersClient,
}

impl Ledo {
    /// Create a new client without persistent session storage.
    ///
    /// Sessions live for the process only; use [`with_store`] to survive
    /// restarts.
    ///
    /// # Example
    ///
    /// ```
    /// use ledo_client::config::{ClientOptions, Environment};
    /// use ledo_client::Ledo;
    ///
    /// let ledo = Ledo::new(ClientOptions::default().with_environment(Environment::Development))?;
    /// # Ok::<(), ledo_client::error::Error>(())
    /// ```
    ///
    /// [`with_store`]: Ledo::with_store
    pub fn new(options: ClientOptions) -> Result<Self, Error> {
        Self::with_store(options, Arc::new(MemoryTokenStore::new()))
    }

    /// Create a new client with the given session persistence layer.
    ///
    /// Fails when the underlying HTTP client cannot be built with the
    /// configured options.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use std::sync::Arc;
    /// use ledo_client::config::ClientOptions;
    /// use ledo_client::storage::FileTokenStore;
    /// use ledo_client::Ledo;
    ///
    /// let store = Arc::new(FileTokenStore::new("/home/me/.ledo/session.json"));
    /// let ledo = Ledo::with_store(ClientOptions::default(), store)?;
    /// # Ok::<(), ledo_client::error::Error>(())
    /// ```
    pub fn with_store(options: ClientOptions, store: Arc<dyn TokenStore>) -> Result<Self, Error> {
        let mut builder = Client::builder();
        if let Some(timeout) = options.request_timeout {
            builder = builder.timeout(timeout);
        }
        let http_client = builder.build()?;

        let session = Arc::new(SessionStore::new(store));
        let api = ApiClient::new(options.api_url(), http_client.clone(), session.clone());
        let auth = Auth::new(api.clone());
        let addresses = AddressesClient::new(api.clone());
        let orders = OrdersClient::new(api.clone());

        Ok(Self {
            options,
            http_client,
            session,
            api,
            auth,
            addresses,
            orders,
        })
    }

    /// Get a reference to the auth client
    pub fn auth(&self) -> &Auth {
        &self.auth
    }

    /// Get a reference to the session store
    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    /// Get a client for catalog browsing
    pub fn catalog(&self) -> CatalogClient {
        CatalogClient::new(self.api.clone())
    }

    /// Get a client for cart operations
    pub fn cart(&self) -> CartClient {
        CartClient::new(self.api.clone())
    }

    /// Get a client for favorites
    pub fn favorites(&self) -> FavoritesClient {
        FavoritesClient::new(self.api.clone())
    }

    /// Get a reference to the address client
    pub fn addresses(&self) -> &AddressesClient {
        &self.addresses
    }

    /// Get a reference to the orders client
    pub fn orders(&self) -> &OrdersClient {
        &self.orders
    }

    /// Get a client for the checkout handoff
    pub fn checkout(&self) -> CheckoutClient {
        CheckoutClient::new(self.api.clone(), self.options.store_phone.clone())
    }
}


/// A convenience module for common imports
pub mod prelude {
    pub use crate::auth::{Credentials, Session, SessionStatus};
    pub use crate::config::{ClientOptions, Environment};
    pub use crate::error::Error;
    pub use crate::Ledo;
}
