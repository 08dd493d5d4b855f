//! Console client for the admin gateway
//!
//! Client-side counterpart of the auth service: an async client over the
//! auth endpoints, an in-memory auth state machine mirroring the decoded
//! identity, and a navigation guard that gates restricted views before they
//! render. Client-side checks are a UX optimization only; the server-side
//! guard stays authoritative.

pub mod cache;
pub mod router;
pub mod store;
pub mod token;
pub mod transport;

pub use cache::{IdentityCache, MemoryCache, StoredAuth};
pub use router::{Navigation, RouteSpec, guard_navigation};
pub use store::{AuthState, AuthStatus, AuthStore};
pub use transport::{AuthTransport, ClientError, HttpTransport};
