// Single-shot credential exchanges against the provider

use async_trait::async_trait;

use super::types::{
    AccessTokenResponse, Credential, CredentialKind, JsapiTicketResponse, ProviderReply,
};
use crate::error::FetchError;
use crate::http_client::WeixinHttpClient;

/// Get access token URL
fn get_access_token_url(api_base: &str, app_id: &str, app_secret: &str) -> String {
    format!(
        "{}/cgi-bin/token?grant_type=client_credential&appid={}&secret={}",
        api_base, app_id, app_secret
    )
}

/// Get jsapi ticket URL
fn get_jsapi_ticket_url(api_base: &str, access_token: &str) -> String {
    format!(
        "{}/cgi-bin/ticket/getticket?access_token={}&type=jsapi",
        api_base, access_token
    )
}

/// One remote exchange producing a fresh credential
///
/// `upstream` is the value received from the loop this fetcher depends on, if any.
/// Implementations never retry.
#[async_trait]
pub trait CredentialFetcher: Send + Sync {
    /// Credential this fetcher produces
    fn kind(&self) -> CredentialKind;

    async fn fetch(&self, upstream: Option<&str>) -> Result<Credential, FetchError>;
}

/// Exchanges appid and secret for an access token
pub struct AccessTokenFetcher {
    client: WeixinHttpClient,
    app_id: String,
    app_secret: String,
}

impl AccessTokenFetcher {
    pub fn new(client: WeixinHttpClient, app_id: String, app_secret: String) -> Self {
        Self {
            client,
            app_id,
            app_secret,
        }
    }
}

#[async_trait]
impl CredentialFetcher for AccessTokenFetcher {
    fn kind(&self) -> CredentialKind {
        CredentialKind::AccessToken
    }

    async fn fetch(&self, _upstream: Option<&str>) -> Result<Credential, FetchError> {
        tracing::info!("Requesting new access token...");

        let url = get_access_token_url(self.client.api_base(), &self.app_id, &self.app_secret);
        let resp: AccessTokenResponse = self.client.get_json(&url).await?;

        ProviderReply::from(resp).into_credential()
    }
}

/// Exchanges the current access token for a jsapi ticket
pub struct JsapiTicketFetcher {
    client: WeixinHttpClient,
}

impl JsapiTicketFetcher {
    pub fn new(client: WeixinHttpClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl CredentialFetcher for JsapiTicketFetcher {
    fn kind(&self) -> CredentialKind {
        CredentialKind::JsapiTicket
    }

    async fn fetch(&self, upstream: Option<&str>) -> Result<Credential, FetchError> {
        let access_token = upstream.ok_or(FetchError::MissingUpstream)?;
        tracing::info!("Requesting new jsapi ticket...");

        let url = get_jsapi_ticket_url(self.client.api_base(), access_token);
        let resp: JsapiTicketResponse = self.client.get_json(&url).await?;

        ProviderReply::from(resp).into_credential()
    }
}
