//! Persisted identity snapshot
//!
//! The browser build of the console keeps the last identity in local
//! storage so a reload does not bounce through the login view. That storage
//! is modeled here as a small trait; tests and headless embedders use the
//! in-memory implementation.

use serde::{Deserialize, Serialize};
use std::sync::Mutex;

use common::identity::Identity;

/// Snapshot written on login and read back on app start.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredAuth {
    pub user: Identity,
    /// Expiry of the backing token, seconds since epoch.
    pub expires_at: u64,
}

/// Client-side persistence for the identity snapshot.
pub trait IdentityCache {
    fn load(&self) -> Option<StoredAuth>;
    fn store(&self, auth: &StoredAuth);
    fn clear(&self);
}

/// In-memory cache, dropped with the process.
#[derive(Debug, Default)]
pub struct MemoryCache {
    slot: Mutex<Option<StoredAuth>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-seed the cache, e.g. with a snapshot restored by the host shell.
    pub fn seeded(auth: StoredAuth) -> Self {
        MemoryCache {
            slot: Mutex::new(Some(auth)),
        }
    }
}

impl IdentityCache for MemoryCache {
    fn load(&self) -> Option<StoredAuth> {
        self.slot.lock().expect("identity cache poisoned").clone()
    }

    fn store(&self, auth: &StoredAuth) {
        *self.slot.lock().expect("identity cache poisoned") = Some(auth.clone());
    }

    fn clear(&self) {
        *self.slot.lock().expect("identity cache poisoned") = None;
    }
}
