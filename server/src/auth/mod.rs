//! Caller authentication.
//!
//! Identity is owned by an external service; this module only resolves the
//! bearer tokens it issued ([`identity`]) and exposes the result to handlers
//! ([`middleware`]).

pub mod identity;
pub mod middleware;

pub use identity::RedisIdentityProvider;
pub use middleware::{AuthenticatedCaller, Authenticator, TaskAuthorized, test_caller};
