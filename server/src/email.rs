//! Console email provider.
//!
//! Logs the confirmation email instead of delivering it. Swap in an SMTP or
//! cloud provider by implementing [`EmailProvider`].

use conference_core::providers::EmailProvider;
use conference_core::store::BoxFuture;
use conference_core::Result;
use tracing::info;

/// Console email provider (logs the message for development)
#[derive(Debug, Clone)]
pub struct ConsoleEmailProvider {
    from: String,
}

impl ConsoleEmailProvider {
    /// Create a provider sending as `from`.
    #[must_use]
    pub fn new(from: impl Into<String>) -> Self {
        Self { from: from.into() }
    }

    /// Sender address.
    #[must_use]
    pub fn from_address(&self) -> &str {
        &self.from
    }
}

impl EmailProvider for ConsoleEmailProvider {
    fn send_conference_confirmation(
        &self,
        to: &str,
        conference_info: &str,
    ) -> BoxFuture<'_, Result<()>> {
        let to = to.to_string();
        let conference_info = conference_info.to_string();
        Box::pin(async move {
            info!(
                from = %self.from,
                to = %to,
                "\n\n\
                ┌────────────────────────────────────────────────────────────────┐\n\
                │                 You created a new Conference!                  │\n\
                └────────────────────────────────────────────────────────────────┘\n\
                Hi, you have created the following conference:\n\n{conference_info}\n"
            );
            Ok(())
        })
    }
}
