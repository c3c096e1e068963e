// Credential types

use serde::Deserialize;
use std::time::Duration;

use crate::error::FetchError;

/// Which credential a fetcher or loop is responsible for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialKind {
    /// `access_token` from /cgi-bin/token
    AccessToken,

    /// `ticket` from /cgi-bin/ticket/getticket
    JsapiTicket,
}

impl CredentialKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CredentialKind::AccessToken => "access_token",
            CredentialKind::JsapiTicket => "jsapi_ticket",
        }
    }
}

impl std::fmt::Display for CredentialKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A freshly fetched credential and how long the provider says it stays valid
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    value: String,
    validity: Duration,
}

impl Credential {
    pub fn new(value: String, validity: Duration) -> Self {
        Self { value, validity }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn validity(&self) -> Duration {
        self.validity
    }

    pub fn into_value(self) -> String {
        self.value
    }
}

/// /cgi-bin/token response
#[derive(Debug, Deserialize)]
pub struct AccessTokenResponse {
    #[serde(default)]
    pub access_token: String,
    #[serde(default)]
    pub expires_in: u64,
    #[serde(default)]
    pub errcode: i64,
    #[serde(default)]
    pub errmsg: String,
}

/// /cgi-bin/ticket/getticket response
#[derive(Debug, Deserialize)]
pub struct JsapiTicketResponse {
    #[serde(default)]
    pub ticket: String,
    #[serde(default)]
    pub expires_in: u64,
    #[serde(default)]
    pub errcode: i64,
    #[serde(default)]
    pub errmsg: String,
}

/// Provider reply with the credential field name erased
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderReply {
    pub value: String,
    pub expires_in: u64,
    pub errcode: i64,
    pub errmsg: String,
}

impl ProviderReply {
    /// Turn the reply into a credential, or a remote error when errcode is set
    pub fn into_credential(self) -> Result<Credential, FetchError> {
        let credential = Credential::new(self.value, Duration::from_secs(self.expires_in));

        if self.errcode != 0 {
            return Err(FetchError::Remote {
                code: self.errcode,
                message: self.errmsg,
                credential,
            });
        }

        Ok(credential)
    }
}

impl From<AccessTokenResponse> for ProviderReply {
    fn from(resp: AccessTokenResponse) -> Self {
        Self {
            value: resp.access_token,
            expires_in: resp.expires_in,
            errcode: resp.errcode,
            errmsg: resp.errmsg,
        }
    }
}

impl From<JsapiTicketResponse> for ProviderReply {
    fn from(resp: JsapiTicketResponse) -> Self {
        Self {
            value: resp.ticket,
            expires_in: resp.expires_in,
            errcode: resp.errcode,
            errmsg: resp.errmsg,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_access_token_response_success() {
        let resp: AccessTokenResponse =
            serde_json::from_str(r#"{"access_token":"ACCESS_TOKEN","expires_in":7200}"#).unwrap();
        let credential = ProviderReply::from(resp).into_credential().unwrap();
        assert_eq!(credential.value(), "ACCESS_TOKEN");
        assert_eq!(credential.validity(), Duration::from_secs(7200));
    }

    #[test]
    fn test_zero_errcode_is_not_remote_error() {
        let resp: JsapiTicketResponse = serde_json::from_str(
            r#"{"errcode":0,"errmsg":"ok","ticket":"TICKET","expires_in":7200}"#,
        )
        .unwrap();
        let credential = ProviderReply::from(resp).into_credential().unwrap();
        assert_eq!(credential.value(), "TICKET");
    }

    #[test]
    fn test_nonzero_errcode_is_remote_error_even_with_value() {
        let resp: JsapiTicketResponse = serde_json::from_str(
            r#"{"errcode":40001,"errmsg":"invalid credential","ticket":"TICKET","expires_in":7200}"#,
        )
        .unwrap();

        match ProviderReply::from(resp).into_credential() {
            Err(FetchError::Remote {
                code,
                message,
                credential,
            }) => {
                assert_eq!(code, 40001);
                assert_eq!(message, "invalid credential");
                assert_eq!(credential.value(), "TICKET");
            }
            other => panic!("expected remote error, got {:?}", other),
        }
    }

    #[test]
    fn test_error_only_body() {
        let resp: AccessTokenResponse =
            serde_json::from_str(r#"{"errcode":40013,"errmsg":"invalid appid"}"#).unwrap();
        let reply = ProviderReply::from(resp);
        assert_eq!(reply.value, "");
        assert_eq!(reply.expires_in, 0);
        assert!(matches!(
            reply.into_credential(),
            Err(FetchError::Remote { code: 40013, .. })
        ));
    }

    #[test]
    fn test_credential_kind_display() {
        assert_eq!(CredentialKind::AccessToken.to_string(), "access_token");
        assert_eq!(CredentialKind::JsapiTicket.to_string(), "jsapi_ticket");
    }
}
