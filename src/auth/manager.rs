use std::time::Duration;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use super::cache::CredentialCache;
use super::fetcher::CredentialFetcher;
use super::refresh::RefreshLoop;
use super::relay::relay;

/// Credential manager
/// Owns both caches and supervises the two refresh loops that feed them
pub struct CredentialManager {
    /// Current access token
    access_token: CredentialCache,

    /// Current jsapi ticket
    jsapi_ticket: CredentialCache,

    /// Stops both loops
    cancel: CancellationToken,

    /// Running loop tasks
    tasks: JoinSet<()>,
}

impl CredentialManager {
    /// Start the access token loop and the ticket loop chained behind it
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn<A, T>(token_fetcher: A, ticket_fetcher: T, retry_interval: Duration) -> Self
    where
        A: CredentialFetcher + 'static,
        T: CredentialFetcher + 'static,
    {
        let access_token = CredentialCache::new();
        let jsapi_ticket = CredentialCache::new();
        let cancel = CancellationToken::new();
        let (sender, receiver) = relay();

        let token_loop = RefreshLoop::new(token_fetcher, access_token.clone(), cancel.clone())
            .with_downstream(sender)
            .with_retry_interval(retry_interval);

        let ticket_loop = RefreshLoop::new(ticket_fetcher, jsapi_ticket.clone(), cancel.clone())
            .with_upstream(receiver)
            .with_retry_interval(retry_interval);

        let mut tasks = JoinSet::new();
        tasks.spawn(token_loop.run());
        tasks.spawn(ticket_loop.run());

        Self {
            access_token,
            jsapi_ticket,
            cancel,
            tasks,
        }
    }

    /// Read handle on the access token cache
    pub fn access_token(&self) -> CredentialCache {
        self.access_token.clone()
    }

    /// Read handle on the jsapi ticket cache
    pub fn jsapi_ticket(&self) -> CredentialCache {
        self.jsapi_ticket.clone()
    }

    /// Token that stops the loops when cancelled
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Cancel both loops and wait for them to finish
    pub async fn shutdown(mut self) {
        self.cancel.cancel();

        while let Some(joined) = self.tasks.join_next().await {
            if let Err(e) = joined {
                if e.is_panic() {
                    tracing::error!("Refresh loop panicked: {}", e);
                }
            }
        }

        tracing::info!("Credential refresh stopped");
    }
}
