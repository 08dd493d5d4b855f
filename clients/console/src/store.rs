//! Client-side auth state machine
//!
//! Holds the identity decoded from the current session and drives the four
//! auth actions. The store is a single-writer structure: every action takes
//! `&mut self`, so two logins cannot interleave, and state is written only
//! after an awaited round trip resolves, so a call dropped mid-flight (e.g.
//! on navigation away) leaves no partial credentials behind.

use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{info, warn};

use common::identity::Identity;
use common::policy::AccessRequirement;

use crate::cache::{IdentityCache, MemoryCache, StoredAuth};
use crate::token::decode_claims_unverified;
use crate::transport::{AuthTransport, ClientError};

/// Where the state machine currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthStatus {
    /// App start; the persisted snapshot has not been consulted yet.
    Uninitialized,
    Unauthenticated,
    Authenticated,
}

/// Auth state mirrored from the current session.
#[derive(Debug, Clone)]
pub struct AuthState {
    pub status: AuthStatus,
    pub user: Option<Identity>,
    /// Local expiry of the backing token, seconds since epoch.
    pub expires_at: Option<u64>,
    /// Message from the most recent failed action.
    pub error: Option<String>,
}

impl Default for AuthState {
    fn default() -> Self {
        AuthState {
            status: AuthStatus::Uninitialized,
            user: None,
            expires_at: None,
            error: None,
        }
    }
}

/// The auth store. UI components read it; only the actions below mutate it.
pub struct AuthStore<T, C = MemoryCache> {
    transport: T,
    cache: C,
    state: AuthState,
}

impl<T: AuthTransport, C: IdentityCache> AuthStore<T, C> {
    pub fn new(transport: T, cache: C) -> Self {
        AuthStore {
            transport,
            cache,
            state: AuthState::default(),
        }
    }

    pub fn state(&self) -> &AuthState {
        &self.state
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.status == AuthStatus::Authenticated
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.state.user.as_ref()
    }

    /// Restore the session from the persisted snapshot, once.
    ///
    /// A snapshot that is locally past its expiry is discarded; the server is
    /// not consulted here.
    pub fn initialize(&mut self) {
        if self.state.status != AuthStatus::Uninitialized {
            return;
        }

        match self.cache.load() {
            Some(stored) if stored.expires_at > unix_now() => {
                info!("Restored session for {}", stored.user.username);
                self.state = AuthState {
                    status: AuthStatus::Authenticated,
                    user: Some(stored.user),
                    expires_at: Some(stored.expires_at),
                    error: None,
                };
            }
            Some(_) => {
                self.cache.clear();
                self.state.status = AuthStatus::Unauthenticated;
            }
            None => {
                self.state.status = AuthStatus::Unauthenticated;
            }
        }
    }

    /// Log in with the given credentials.
    pub async fn login(&mut self, username: &str, password: &str) -> Result<(), ClientError> {
        info!("Login attempt for {}", username);

        match self.transport.login(username, password).await {
            Ok(reply) => {
                let expires_at = decode_claims_unverified(&reply.access_token).map(|c| c.exp);
                self.set_authenticated(reply.user, expires_at);
                Ok(())
            }
            Err(e) => {
                self.purge();
                self.state.error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Log out. The server call clears the session cookie; local state is
    /// purged even when that call fails.
    pub async fn logout(&mut self) {
        if let Err(e) = self.transport.logout().await {
            warn!("Logout request failed, clearing local state anyway: {}", e);
        }
        self.purge();
    }

    /// Re-validate the session against the server and re-derive the identity
    /// from its authoritative answer. Any failure clears local credentials.
    pub async fn verify(&mut self) -> bool {
        match self.transport.verify().await {
            Ok(reply) if reply.valid => {
                self.set_authenticated(reply.user, None);
                true
            }
            Ok(_) => {
                self.purge();
                false
            }
            Err(e) => {
                self.purge();
                self.state.error = Some(e.to_string());
                false
            }
        }
    }

    /// Fetch the profile and refresh the locally held identity.
    pub async fn refresh_profile(&mut self) -> Result<Identity, ClientError> {
        match self.transport.profile().await {
            Ok(reply) => {
                self.set_authenticated(reply.user.clone(), None);
                Ok(reply.user)
            }
            Err(e) => {
                self.purge();
                self.state.error = Some(e.to_string());
                Err(e)
            }
        }
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.identity().is_some_and(|i| i.role == role)
    }

    pub fn has_permission(&self, permission: &str) -> bool {
        self.identity()
            .is_some_and(|i| i.permissions.iter().any(|p| p == permission))
    }

    /// Evaluate a route requirement against the locally held identity, using
    /// the same policy evaluator as the server-side guard.
    pub fn can_access(&self, requirement: &AccessRequirement) -> bool {
        self.identity().is_some_and(|i| requirement.allows(i))
    }

    fn set_authenticated(&mut self, user: Identity, expires_at: Option<u64>) {
        let expires_at = expires_at.or(self.state.expires_at);
        if let Some(exp) = expires_at {
            self.cache.store(&StoredAuth {
                user: user.clone(),
                expires_at: exp,
            });
        }
        self.state = AuthState {
            status: AuthStatus::Authenticated,
            user: Some(user),
            expires_at,
            error: None,
        };
    }

    fn purge(&mut self) {
        self.cache.clear();
        self.state.status = AuthStatus::Unauthenticated;
        self.state.user = None;
        self.state.expires_at = None;
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
