//! Users as seen by the access gate.

use serde::{Deserialize, Serialize};

use crate::WalletAddress;

/// Role of an authenticated user.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Participant,
}

impl Role {
    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

/// A user requesting access to a survey.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    /// The wallet bound to this user, if any. Every built-in strategy
    /// identifies users by wallet.
    #[serde(default)]
    pub wallet_address: Option<WalletAddress>,
    #[serde(default = "default_role")]
    pub role: Role,
}

fn default_role() -> Role {
    Role::Participant
}

impl User {
    pub fn new(id: impl Into<String>, wallet_address: Option<WalletAddress>) -> Self {
        Self {
            id: id.into(),
            wallet_address,
            role: Role::Participant,
        }
    }

    pub fn with_role(mut self, role: Role) -> Self {
        self.role = role;
        self
    }
}
