//! Identity and email collaborators.
//!
//! Neither is part of the domain: the identity provider turns a bearer
//! credential into a [`Caller`], the email provider delivers the organizer
//! confirmation. Production adapters live in `conference-server`, doubles in
//! `conference-testing`.

use crate::error::Result;
use crate::store::BoxFuture;
use crate::types::Caller;

/// Resolves bearer tokens issued by an external identity service.
pub trait IdentityProvider: Send + Sync {
    /// The caller behind `token`, or `None` if the token is unknown or expired.
    ///
    /// # Errors
    ///
    /// Fails only when the backing service cannot be reached.
    fn resolve(&self, token: &str) -> BoxFuture<'_, Result<Option<Caller>>>;
}

/// Outbound email.
pub trait EmailProvider: Send + Sync {
    /// Tell an organizer that their conference was created.
    ///
    /// `conference_info` is a human-readable dump of the stored conference.
    fn send_conference_confirmation(
        &self,
        to: &str,
        conference_info: &str,
    ) -> BoxFuture<'_, Result<()>>;
}
