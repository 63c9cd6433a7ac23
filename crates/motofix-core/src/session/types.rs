//! Session data types

use serde::{Deserialize, Serialize};

/// Role of the signed-in account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[default]
    Driver,
    /// Mechanic or towing operator answering requests
    Provider,
    Admin,
    #[serde(other)]
    Unknown,
}

/// User record returned by the auth service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(deserialize_with = "crate::utils::string_or_number")]
    pub id: String,
    pub phone: String,
    #[serde(default, alias = "name")]
    pub display_name: Option<String>,
    #[serde(default)]
    pub role: Role,
}

impl User {
    /// Name to greet the user with, falling back to the phone number
    pub fn greeting_name(&self) -> &str {
        self.display_name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(&self.phone)
    }
}

/// An authenticated session: bearer token plus the user it belongs to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub user: User,
}

/// Authentication state as seen by the front-end
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AuthState {
    #[default]
    Unauthenticated,
    /// Restored from storage, not yet confirmed by the server
    Tentative(Session),
    /// Confirmed by the server during this run
    Authenticated(Session),
}

impl AuthState {
    /// Session for rendering, whether confirmed or not
    pub fn session(&self) -> Option<&Session> {
        match self {
            Self::Unauthenticated => None,
            Self::Tentative(session) | Self::Authenticated(session) => Some(session),
        }
    }

    pub fn user(&self) -> Option<&User> {
        self.session().map(|s| &s.user)
    }

    /// True for both tentative and confirmed sessions
    pub fn is_authenticated(&self) -> bool {
        !matches!(self, Self::Unauthenticated)
    }

    pub fn is_confirmed(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }
}
