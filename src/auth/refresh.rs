// Credential refresh loop

use std::time::Duration;
use tokio_util::sync::CancellationToken;

use super::cache::CredentialCache;
use super::fetcher::CredentialFetcher;
use super::relay::{RelayReceiver, RelaySender};
use super::types::{Credential, CredentialKind};
use crate::error::FetchError;

/// Fixed delay before retrying a failed fetch
pub const DEFAULT_RETRY_INTERVAL: Duration = Duration::from_secs(1);

/// How long to wait before the next fetch
///
/// Success waits out the credential's validity; failure always waits the fixed
/// retry interval. A zero validity falls back to the retry interval so the loop
/// never spins against the provider.
pub fn next_sleep(result: &Result<Credential, FetchError>, retry_interval: Duration) -> Duration {
    match result {
        Ok(credential) if !credential.validity().is_zero() => credential.validity(),
        _ => retry_interval,
    }
}

/// Shorten a credential for logging
fn redact(value: &str) -> &str {
    &value[..value.char_indices().nth(8).map_or(value.len(), |(i, _)| i)]
}

/// Drives one cache: fetch, commit, publish, sleep, forever
///
/// A loop with an `upstream` relay waits for a value on it before every fetch and
/// passes it to the fetcher. A loop with a `downstream` relay hands every
/// successfully fetched value to it, blocking until it is taken.
pub struct RefreshLoop<F> {
    fetcher: F,
    cache: CredentialCache,
    upstream: Option<RelayReceiver>,
    downstream: Option<RelaySender>,
    retry_interval: Duration,
    cancel: CancellationToken,
}

impl<F: CredentialFetcher> RefreshLoop<F> {
    pub fn new(fetcher: F, cache: CredentialCache, cancel: CancellationToken) -> Self {
        Self {
            fetcher,
            cache,
            upstream: None,
            downstream: None,
            retry_interval: DEFAULT_RETRY_INTERVAL,
            cancel,
        }
    }

    /// Take fetch input from `receiver` instead of static secrets
    pub fn with_upstream(mut self, receiver: RelayReceiver) -> Self {
        self.upstream = Some(receiver);
        self
    }

    /// Publish every fresh value to `sender`
    pub fn with_downstream(mut self, sender: RelaySender) -> Self {
        self.downstream = Some(sender);
        self
    }

    pub fn with_retry_interval(mut self, retry_interval: Duration) -> Self {
        self.retry_interval = retry_interval;
        self
    }

    fn kind(&self) -> CredentialKind {
        self.fetcher.kind()
    }

    /// Run until cancelled, or until the upstream relay closes
    pub async fn run(mut self) {
        tracing::info!(credential = %self.kind(), "Starting refresh loop");

        while let Some(sleep) = self.step().await {
            tracing::debug!(
                credential = %self.kind(),
                sleep_secs = sleep.as_secs(),
                "Next refresh scheduled"
            );

            tokio::select! {
                _ = self.cancel.cancelled() => break,
                _ = tokio::time::sleep(sleep) => {}
            }
        }

        tracing::info!(credential = %self.kind(), "Refresh loop stopped");
    }

    /// One Fetching phase
    ///
    /// Returns how long to sleep afterwards, or `None` when the loop must stop.
    pub async fn step(&mut self) -> Option<Duration> {
        let input = match self.upstream.as_mut() {
            Some(upstream) => {
                let received = tokio::select! {
                    _ = self.cancel.cancelled() => return None,
                    received = upstream.receive() => received,
                };
                match received {
                    Some(value) => Some(value),
                    None => {
                        tracing::info!(credential = %self.fetcher.kind(), "Upstream relay closed");
                        return None;
                    }
                }
            }
            None => None,
        };

        let result = tokio::select! {
            _ = self.cancel.cancelled() => return None,
            result = self.fetcher.fetch(input.as_deref()) => result,
        };
        let sleep = next_sleep(&result, self.retry_interval);

        match result {
            Ok(credential) => {
                if credential.validity().is_zero() {
                    tracing::warn!(
                        credential = %self.kind(),
                        "Provider returned zero validity, refreshing after retry interval"
                    );
                }
                tracing::info!(
                    credential = %self.kind(),
                    value = %redact(credential.value()),
                    expires_in = credential.validity().as_secs(),
                    "✅ Credential refreshed"
                );

                let value = credential.into_value();
                self.cache.set(value.clone()).await;
                self.publish(value).await?;
            }
            Err(e) => {
                if let FetchError::Remote { credential, .. } = &e {
                    tracing::debug!(
                        credential = %self.kind(),
                        value = %redact(credential.value()),
                        expires_in = credential.validity().as_secs(),
                        "Rejected provider reply"
                    );
                }
                tracing::error!(
                    credential = %self.kind(),
                    error_kind = e.kind(),
                    error = %e,
                    retry_secs = sleep.as_secs(),
                    "❌ Credential refresh failed"
                );
            }
        }

        Some(sleep)
    }

    /// Hand `value` downstream, if anyone is listening
    async fn publish(&mut self, value: String) -> Option<()> {
        let Some(downstream) = self.downstream.as_ref() else {
            return Some(());
        };

        let published = tokio::select! {
            _ = self.cancel.cancelled() => return None,
            published = downstream.publish(value) => published,
        };

        if let Err(e) = published {
            tracing::warn!(
                credential = %self.kind(),
                error = %e,
                "Downstream loop is gone, continuing without publishing"
            );
            self.downstream = None;
        }

        Some(())
    }
}
