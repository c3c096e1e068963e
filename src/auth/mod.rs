// Credential module
// Fetches, caches, and refreshes the access token and the jsapi ticket

mod cache;
mod fetcher;
mod manager;
mod refresh;
mod relay;
mod types;

pub use cache::CredentialCache;
pub use fetcher::{AccessTokenFetcher, CredentialFetcher, JsapiTicketFetcher};
pub use manager::CredentialManager;
pub use refresh::{next_sleep, RefreshLoop, DEFAULT_RETRY_INTERVAL};
pub use relay::{relay, RelayClosed, RelayReceiver, RelaySender};
pub use types::{Credential, CredentialKind, ProviderReply};
