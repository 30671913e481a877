//! Delivery address management
//!
//! The address API is still settling: deployed backends expose either
//! `/addresses/` or the legacy `/user/addresses/` prefix, and some expose
//! neither. Every mutation therefore walks an ordered fallback sequence:
//! the primary endpoint, then the legacy one, then a local-only mutation of
//! the last fetched snapshot. The sequence advances on not-found only;
//! any other failure stops it and propagates.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::Error;
use crate::fetch::ApiClient;

/// A delivery address
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Address {
    /// The address ID; locally created addresses carry a synthetic one
    pub id: i64,

    /// Nickname, e.g. "Casa"
    pub name: String,

    /// Street name
    pub street: String,

    /// Street number
    pub number: String,

    /// Complement, optional
    #[serde(default)]
    pub complement: Option<String>,

    /// Neighborhood
    pub neighborhood: String,

    /// City
    pub city: String,

    /// State abbreviation
    pub state: String,

    /// Postal code
    pub zip_code: String,

    /// Whether this is the default delivery address; at most one per user
    #[serde(default)]
    pub is_default: bool,
}

/// Form data for creating or updating an address
#[derive(Debug, Clone, Default, Serialize)]
pub struct AddressForm {
    /// Nickname
    pub name: String,

    /// Street name
    pub street: String,

    /// Street number
    pub number: String,

    /// Complement, optional
    #[serde(skip_serializing_if = "Option::is_none")]
    pub complement: Option<String>,

    /// Neighborhood
    pub neighborhood: String,

    /// City
    pub city: String,

    /// State abbreviation
    pub state: String,

    /// Postal code
    pub zip_code: String,

    /// Whether this should become the default address
    pub is_default: bool,
}

impl AddressForm {
    fn validate(&self) -> Result<(), Error> {
        let required = [
            ("name", &self.name),
            ("street", &self.street),
            ("number", &self.number),
            ("neighborhood", &self.neighborhood),
            ("city", &self.city),
            ("state", &self.state),
            ("zip_code", &self.zip_code),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(Error::validation(format!("{} is required", field)));
            }
        }
        Ok(())
    }

    fn into_address(self, id: i64) -> Address {
        Address {
            id,
            name: self.name,
            street: self.street,
            number: self.number,
            complement: self.complement,
            neighborhood: self.neighborhood,
            city: self.city,
            state: self.state,
            zip_code: self.zip_code,
            is_default: self.is_default,
        }
    }
}

/// Outcome of an operation that may have been applied locally only.
///
/// `Local` means every remote endpoint answered not-found and the change
/// lives in the client snapshot; callers qualify their success message
/// accordingly.
#[derive(Debug, Clone, PartialEq)]
pub enum Applied<T> {
    /// The backend accepted the mutation
    Remote(T),
    /// The mutation was applied to the local snapshot only
    Local(T),
}

impl<T> Applied<T> {
    /// The wrapped value, regardless of where the mutation landed
    pub fn into_inner(self) -> T {
        match self {
            Applied::Remote(value) | Applied::Local(value) => value,
        }
    }

    /// Whether the mutation only exists locally
    pub fn is_local(&self) -> bool {
        matches!(self, Applied::Local(_))
    }
}

// Clock-derived, with a counter so two creates in the same millisecond stay
// distinct.
fn synthetic_id() -> i64 {
    static SEQUENCE: AtomicI64 = AtomicI64::new(0);
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0);
    millis + SEQUENCE.fetch_add(1, Ordering::Relaxed)
}

/// Client for address management; every endpoint requires authentication
pub struct AddressesClient {
    api: ApiClient,
    snapshot: Mutex<Vec<Address>>,
}

impl AddressesClient {
    /// Create a new AddressesClient
    pub(crate) fn new(api: ApiClient) -> Self {
        Self {
            api,
            snapshot: Mutex::new(Vec::new()),
        }
    }

    /// The last known address list, remote or locally mutated
    pub fn snapshot(&self) -> Vec<Address> {
        self.snapshot.lock().unwrap().clone()
    }

    fn replace_snapshot(&self, addresses: Vec<Address>) {
        *self.snapshot.lock().unwrap() = addresses;
    }

    /// Fetch the address list.
    ///
    /// Falls back to the legacy endpoint on not-found; when neither endpoint
    /// exists the list is empty rather than an error.
    pub async fn list(&self) -> Result<Vec<Address>, Error> {
        match self.api.get("/addresses/").execute::<Vec<Address>>().await {
            Ok(addresses) => {
                self.replace_snapshot(addresses.clone());
                Ok(addresses)
            }
            Err(err) if err.is_not_found() => {
                tracing::debug!("primary address endpoint missing, trying legacy");
                match self
                    .api
                    .get("/user/addresses/")
                    .execute::<Vec<Address>>()
                    .await
                {
                    Ok(addresses) => {
                        self.replace_snapshot(addresses.clone());
                        Ok(addresses)
                    }
                    Err(err) if err.is_not_found() => {
                        tracing::debug!("no address endpoint deployed, starting empty");
                        self.replace_snapshot(Vec::new());
                        Ok(Vec::new())
                    }
                    Err(err) => Err(err),
                }
            }
            Err(err) => Err(err),
        }
    }

    /// Create a new address
    pub async fn create(&self, form: AddressForm) -> Result<Applied<Address>, Error> {
        form.validate()?;
        let body = self.payload(&form)?;

        match self
            .api
            .post("/addresses/")
            .json(&body)?
            .execute::<Address>()
            .await
        {
            Ok(address) => Ok(Applied::Remote(address)),
            Err(err) if err.is_not_found() => {
                tracing::debug!("primary address endpoint missing, trying legacy");
                match self
                    .api
                    .post("/user/addresses/")
                    .json(&body)?
                    .execute::<Address>()
                    .await
                {
                    Ok(address) => Ok(Applied::Remote(address)),
                    Err(err) if err.is_not_found() => {
                        let address = form.into_address(synthetic_id());
                        let mut snapshot = self.snapshot.lock().unwrap();
                        if address.is_default {
                            for existing in snapshot.iter_mut() {
                                existing.is_default = false;
                            }
                        }
                        snapshot.push(address.clone());
                        Ok(Applied::Local(address))
                    }
                    Err(err) => Err(err),
                }
            }
            Err(err) => Err(err),
        }
    }

    /// Update an existing address
    pub async fn update(&self, id: i64, form: AddressForm) -> Result<Applied<Address>, Error> {
        form.validate()?;
        let body = self.payload(&form)?;

        match self
            .api
            .put(&format!("/addresses/{}/", id))
            .json(&body)?
            .execute::<Address>()
            .await
        {
            Ok(address) => Ok(Applied::Remote(address)),
            Err(err) if err.is_not_found() => {
                match self
                    .api
                    .put(&format!("/user/addresses/{}/", id))
                    .json(&body)?
                    .execute::<Address>()
                    .await
                {
                    Ok(address) => Ok(Applied::Remote(address)),
                    Err(err) if err.is_not_found() => {
                        let address = form.into_address(id);
                        let mut snapshot = self.snapshot.lock().unwrap();
                        if let Some(existing) = snapshot.iter_mut().find(|a| a.id == id) {
                            *existing = address.clone();
                        }
                        Ok(Applied::Local(address))
                    }
                    Err(err) => Err(err),
                }
            }
            Err(err) => Err(err),
        }
    }

    /// Delete an address
    pub async fn delete(&self, id: i64) -> Result<Applied<()>, Error> {
        match self
            .api
            .delete(&format!("/addresses/{}/", id))
            .execute_empty()
            .await
        {
            Ok(()) => Ok(Applied::Remote(())),
            Err(err) if err.is_not_found() => {
                match self
                    .api
                    .delete(&format!("/user/addresses/{}/", id))
                    .execute_empty()
                    .await
                {
                    Ok(()) => Ok(Applied::Remote(())),
                    Err(err) if err.is_not_found() => {
                        self.snapshot.lock().unwrap().retain(|a| a.id != id);
                        Ok(Applied::Local(()))
                    }
                    Err(err) => Err(err),
                }
            }
            Err(err) => Err(err),
        }
    }

    /// Mark an address as the default delivery address
    pub async fn set_default(&self, id: i64) -> Result<Applied<()>, Error> {
        match self
            .api
            .post(&format!("/addresses/{}/set_default/", id))
            .execute_empty()
            .await
        {
            Ok(()) => Ok(Applied::Remote(())),
            Err(err) if err.is_not_found() => {
                match self
                    .api
                    .post(&format!("/user/addresses/{}/set_default/", id))
                    .execute_empty()
                    .await
                {
                    Ok(()) => Ok(Applied::Remote(())),
                    Err(err) if err.is_not_found() => {
                        let mut snapshot = self.snapshot.lock().unwrap();
                        for address in snapshot.iter_mut() {
                            address.is_default = address.id == id;
                        }
                        Ok(Applied::Local(()))
                    }
                    Err(err) => Err(err),
                }
            }
            Err(err) => Err(err),
        }
    }

    fn payload(&self, form: &AddressForm) -> Result<serde_json::Value, Error> {
        let mut body = serde_json::to_value(form)?;
        if let Some(user) = self.api.session().current_user() {
            body["user_id"] = serde_json::json!(user.id);
        }
        Ok(body)
    }
}
