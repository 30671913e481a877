//! Types for authentication and user data

use serde::{Deserialize, Serialize};

/// Credentials submitted to the token endpoint
#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    /// The account username
    pub username: String,

    /// The account password
    pub password: String,
}

impl Credentials {
    /// Convenience constructor
    pub fn new(username: &str, password: &str) -> Self {
        Self {
            username: username.to_string(),
            password: password.to_string(),
        }
    }
}

/// Response of the token endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct TokenPair {
    /// Bearer credential for authenticated requests
    pub access: String,

    /// Credential for obtaining a new access token
    #[serde(default)]
    pub refresh: Option<String>,
}

/// User account data, cached best-effort alongside the session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// The user ID; 0 for placeholder users built without a profile fetch
    pub id: i64,

    /// The account username
    pub username: String,

    /// The account email address
    pub email: String,

    /// Optional display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,

    /// Extended profile data, when the profile endpoint supplied it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<Profile>,
}

impl User {
    /// Build a minimal user from a submitted username, used when the profile
    /// endpoint is unavailable after a successful token exchange
    pub fn placeholder(username: &str) -> Self {
        Self {
            id: 0,
            username: username.to_string(),
            email: format!("{}@local", username),
            display_name: Some(username.to_string()),
            profile: None,
        }
    }
}

/// Extended profile fields nested under the user
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    /// Phone number
    #[serde(default)]
    pub phone: Option<String>,

    /// Brazilian taxpayer number
    #[serde(default)]
    pub cpf: Option<String>,

    /// Birth date as `YYYY-MM-DD`
    #[serde(default)]
    pub birth_date: Option<String>,

    /// Gender
    #[serde(default)]
    pub gender: Option<String>,
}

/// Profile attributes that can be updated
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProfileUpdate {
    /// Email address
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Display name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,

    /// Extended profile fields
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<Profile>,
}
