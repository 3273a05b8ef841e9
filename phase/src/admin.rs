//! Administrative authorization phase.

use gate_types::{User, WalletAddress};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::PhaseError;

/// Live signals feeding the admin resolver.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminAuthInput {
    /// The session store finished its first load.
    pub initialized: bool,
    /// The session store is (re)loading.
    pub loading: bool,
    pub is_connected: bool,
    pub is_authenticated: bool,
    /// A session-creation call is in flight.
    pub is_creating_session: bool,
    /// The authenticated user, once loaded.
    pub user: Option<User>,
    /// Address reported by the wallet connection.
    pub connected_address: Option<WalletAddress>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdminAuthPhase {
    Initializing,
    ConnectWallet,
    Authenticate,
    Authenticating,
    WalletMismatch,
    AccessDenied,
    Authorized,
}

/// Work the caller performs on entering a phase. The resolver never does it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdminAuthEffect {
    ForceLogout,
    RedirectAway,
    CreateSession,
}

impl AdminAuthPhase {
    pub const ALL: [AdminAuthPhase; 7] = [
        AdminAuthPhase::Initializing,
        AdminAuthPhase::ConnectWallet,
        AdminAuthPhase::Authenticate,
        AdminAuthPhase::Authenticating,
        AdminAuthPhase::WalletMismatch,
        AdminAuthPhase::AccessDenied,
        AdminAuthPhase::Authorized,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AdminAuthPhase::Initializing => "initializing",
            AdminAuthPhase::ConnectWallet => "connect_wallet",
            AdminAuthPhase::Authenticate => "authenticate",
            AdminAuthPhase::Authenticating => "authenticating",
            AdminAuthPhase::WalletMismatch => "wallet_mismatch",
            AdminAuthPhase::AccessDenied => "access_denied",
            AdminAuthPhase::Authorized => "authorized",
        }
    }

    pub fn effect(&self) -> Option<AdminAuthEffect> {
        match self {
            AdminAuthPhase::WalletMismatch => Some(AdminAuthEffect::ForceLogout),
            AdminAuthPhase::AccessDenied => Some(AdminAuthEffect::RedirectAway),
            AdminAuthPhase::Authenticate => Some(AdminAuthEffect::CreateSession),
            _ => None,
        }
    }
}

impl fmt::Display for AdminAuthPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AdminAuthPhase {
    type Err = PhaseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AdminAuthPhase::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| PhaseError::UnknownPhase(s.to_string()))
    }
}

/// Resolve the admin phase. The order of the checks is the contract.
pub fn resolve_admin_auth_phase(input: &AdminAuthInput) -> AdminAuthPhase {
    // Connecting is always the first thing to ask for, even while loading.
    if !input.is_connected {
        return AdminAuthPhase::ConnectWallet;
    }
    if !input.initialized || input.loading {
        return AdminAuthPhase::Initializing;
    }
    if !input.is_authenticated {
        return if input.is_creating_session {
            AdminAuthPhase::Authenticating
        } else {
            AdminAuthPhase::Authenticate
        };
    }
    let Some(user) = &input.user else {
        return AdminAuthPhase::Initializing;
    };
    // Connected but the wallet has not reported its address yet.
    let Some(connected) = &input.connected_address else {
        return AdminAuthPhase::Initializing;
    };
    let same_wallet = user
        .wallet_address
        .as_ref()
        .is_some_and(|own| own.matches(connected));
    if !same_wallet {
        return AdminAuthPhase::WalletMismatch;
    }
    if !user.role.is_admin() {
        return AdminAuthPhase::AccessDenied;
    }
    AdminAuthPhase::Authorized
}

#[cfg(test)]
mod tests {
    use super::*;
    use gate_types::Role;

    fn wallet(raw: &str) -> WalletAddress {
        WalletAddress::new(raw).unwrap()
    }

    fn ready(user: User, connected: &str) -> AdminAuthInput {
        AdminAuthInput {
            initialized: true,
            loading: false,
            is_connected: true,
            is_authenticated: true,
            is_creating_session: false,
            user: Some(user),
            connected_address: Some(wallet(connected)),
        }
    }

    fn admin(raw: &str) -> User {
        User::new("admin-1", Some(wallet(raw))).with_role(Role::Admin)
    }

    #[test]
    fn disconnected_preempts_loading() {
        let input = AdminAuthInput {
            initialized: false,
            loading: true,
            ..Default::default()
        };
        assert_eq!(resolve_admin_auth_phase(&input), AdminAuthPhase::ConnectWallet);
    }

    #[test]
    fn connected_and_loading_is_initializing() {
        let input = AdminAuthInput {
            initialized: true,
            loading: true,
            is_connected: true,
            ..Default::default()
        };
        assert_eq!(resolve_admin_auth_phase(&input), AdminAuthPhase::Initializing);
    }

    #[test]
    fn unauthenticated_asks_for_session() {
        let mut input = ready(admin("0xabc"), "0xabc");
        input.is_authenticated = false;
        assert_eq!(resolve_admin_auth_phase(&input), AdminAuthPhase::Authenticate);
        assert_eq!(
            AdminAuthPhase::Authenticate.effect(),
            Some(AdminAuthEffect::CreateSession)
        );

        input.is_creating_session = true;
        assert_eq!(resolve_admin_auth_phase(&input), AdminAuthPhase::Authenticating);
    }

    #[test]
    fn missing_user_record_is_initializing() {
        let mut input = ready(admin("0xabc"), "0xabc");
        input.user = None;
        assert_eq!(resolve_admin_auth_phase(&input), AdminAuthPhase::Initializing);
    }

    #[test]
    fn authorized_admin_with_different_casing() {
        let input = ready(admin("0xABC123"), "0xabc123");
        assert_eq!(resolve_admin_auth_phase(&input), AdminAuthPhase::Authorized);
        assert_eq!(AdminAuthPhase::Authorized.effect(), None);
    }

    #[test]
    fn mismatch_wins_over_access_denied() {
        let participant = User::new("p", Some(wallet("0x111")));
        let input = ready(participant, "0x222");
        assert_eq!(resolve_admin_auth_phase(&input), AdminAuthPhase::WalletMismatch);
        assert_eq!(
            AdminAuthPhase::WalletMismatch.effect(),
            Some(AdminAuthEffect::ForceLogout)
        );
    }

    #[test]
    fn user_without_wallet_is_a_mismatch() {
        let input = ready(User::new("p", None).with_role(Role::Admin), "0x222");
        assert_eq!(resolve_admin_auth_phase(&input), AdminAuthPhase::WalletMismatch);
    }

    #[test]
    fn participant_is_denied() {
        let input = ready(User::new("p", Some(wallet("0x111"))), "0x111");
        assert_eq!(resolve_admin_auth_phase(&input), AdminAuthPhase::AccessDenied);
        assert_eq!(
            AdminAuthPhase::AccessDenied.effect(),
            Some(AdminAuthEffect::RedirectAway)
        );
    }

    #[test]
    fn phase_names_round_trip() {
        for phase in AdminAuthPhase::ALL {
            assert_eq!(phase.as_str().parse::<AdminAuthPhase>().unwrap(), phase);
        }
        assert!("sleeping".parse::<AdminAuthPhase>().is_err());
    }
}
