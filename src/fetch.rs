//! HTTP request plumbing shared by every resource client

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use url::Url;

use crate::auth::SessionStore;
use crate::error::Error;

/// Helper for building and executing HTTP requests
pub struct FetchBuilder<'a> {
    client: &'a Client,
    url: String,
    method: Method,
    headers: HeaderMap,
    query_params: Option<HashMap<String, String>>,
    body: Option<Vec<u8>>,
    session: Option<Arc<SessionStore>>,
}

impl<'a> FetchBuilder<'a> {
    /// Create a new FetchBuilder
    pub fn new(client: &'a Client, url: &str, method: Method) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert("Content-Type", HeaderValue::from_static("application/json"));

        Self {
            client,
            url: url.to_string(),
            method,
            headers,
            query_params: None,
            body: None,
            session: None,
        }
    }

    /// Add a header to the request
    pub fn header(mut self, name: &str, value: &str) -> Self {
        let name = HeaderName::from_bytes(name.as_bytes());
        let value = HeaderValue::from_str(value);
        if let (Ok(name), Ok(value)) = (name, value) {
            self.headers.insert(name, value);
        }
        self
    }

    /// Add bearer token authentication to the request
    pub fn bearer_auth(self, token: &str) -> Self {
        self.header("Authorization", &format!("Bearer {}", token))
    }

    /// Attach a session store; a 401 response will expire it
    pub(crate) fn session(mut self, session: Arc<SessionStore>) -> Self {
        self.session = Some(session);
        self
    }

    /// Add query parameters to the request
    pub fn query(mut self, params: HashMap<String, String>) -> Self {
        self.query_params = Some(params);
        self
    }

    /// Add a JSON body to the request
    pub fn json<T: Serialize>(mut self, body: &T) -> Result<Self, Error> {
        let json = serde_json::to_vec(body)?;
        self.body = Some(json);
        Ok(self)
    }

    /// Build the request
    fn build(&self) -> Result<RequestBuilder, Error> {
        let mut url = Url::parse(&self.url)?;

        if let Some(params) = &self.query_params {
            let mut query_pairs = url.query_pairs_mut();
            for (key, value) in params {
                query_pairs.append_pair(key, value);
            }
        }

        let mut req = self.client.request(self.method.clone(), url.as_str());
        req = req.headers(self.headers.clone());

        if let Some(body) = &self.body {
            req = req.body(body.clone());
        }

        Ok(req)
    }

    /// Execute the request and parse the response as JSON
    pub async fn execute<T: DeserializeOwned>(&self) -> Result<T, Error> {
        let response = self.build()?.send().await?;
        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(self.failure(status, message).await);
        }

        let result = response.json::<T>().await?;
        Ok(result)
    }

    /// Execute the request, discarding any response body
    pub async fn execute_empty(&self) -> Result<(), Error> {
        let response = self.build()?.send().await?;
        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(self.failure(status, message).await);
        }

        Ok(())
    }

    async fn failure(&self, status: StatusCode, message: String) -> Error {
        if status == StatusCode::UNAUTHORIZED {
            if let Some(session) = &self.session {
                if session.expire().await {
                    return Error::SessionExpired;
                }
            }
        }
        Error::Api {
            status: status.as_u16(),
            message,
        }
    }
}

/// Storefront API client: base URL selection plus bearer attachment.
///
/// Every request built here carries `Authorization: Bearer <token>` when the
/// session holds one, and a 401 answer expires the session centrally instead
/// of leaving detection to each caller.
#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    client: Client,
    session: Arc<SessionStore>,
}

impl ApiClient {
    /// Create a new ApiClient rooted at the given `/api` base URL
    pub(crate) fn new(base_url: String, client: Client, session: Arc<SessionStore>) -> Self {
        Self {
            base_url,
            client,
            session,
        }
    }

    /// The session store requests read their token from
    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn request(&self, method: Method, path: &str) -> FetchBuilder<'_> {
        let url = self.endpoint(path);
        let mut builder =
            FetchBuilder::new(&self.client, &url, method).session(self.session.clone());
        if let Some(token) = self.session.access_token() {
            builder = builder.bearer_auth(&token);
        }
        builder
    }

    /// Create a GET request
    pub fn get(&self, path: &str) -> FetchBuilder<'_> {
        self.request(Method::GET, path)
    }

    /// Create a POST request
    pub fn post(&self, path: &str) -> FetchBuilder<'_> {
        self.request(Method::POST, path)
    }

    /// Create a PUT request
    pub fn put(&self, path: &str) -> FetchBuilder<'_> {
        self.request(Method::PUT, path)
    }

    /// Create a PATCH request
    pub fn patch(&self, path: &str) -> FetchBuilder<'_> {
        self.request(Method::PATCH, path)
    }

    /// Create a DELETE request
    pub fn delete(&self, path: &str) -> FetchBuilder<'_> {
        self.request(Method::DELETE, path)
    }

    /// Create a GET request without bearer attachment or 401 interception
    pub fn get_public(&self, path: &str) -> FetchBuilder<'_> {
        FetchBuilder::new(&self.client, &self.endpoint(path), Method::GET)
    }

    /// Create a POST request without bearer attachment or 401 interception.
    ///
    /// Used for the token exchange itself: a rejected re-sign-in must not
    /// disturb an existing session.
    pub fn post_public(&self, path: &str) -> FetchBuilder<'_> {
        FetchBuilder::new(&self.client, &self.endpoint(path), Method::POST)
    }
}
