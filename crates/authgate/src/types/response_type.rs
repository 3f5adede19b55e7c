//! OAuth 2.0 response types and grant types.
//!
//! Both enumerations are closed: every token the authorization endpoint
//! recognizes is listed here, and each [`ResponseType`] is bound to exactly
//! one [`GrantType`].

use std::fmt;

use serde::{Deserialize, Serialize};

// =============================================================================
// Response Type
// =============================================================================

/// Response types accepted on the authorization endpoint.
///
/// Multi-valued response types (OpenID Connect hybrid and implicit flows)
/// are matched as whole strings, e.g. `code id_token`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResponseType {
    /// Authorization code flow.
    #[serde(rename = "code")]
    Code,
    /// Implicit flow returning an access token.
    #[serde(rename = "token")]
    Token,
    /// Implicit flow returning an ID token.
    #[serde(rename = "id_token")]
    IdToken,
    /// Implicit flow returning an ID token and an access token.
    #[serde(rename = "id_token token")]
    IdTokenToken,
    /// Hybrid flow returning a code and an ID token.
    #[serde(rename = "code id_token")]
    CodeIdToken,
    /// Hybrid flow returning a code and an access token.
    #[serde(rename = "code token")]
    CodeToken,
    /// Hybrid flow returning a code, an ID token and an access token.
    #[serde(rename = "code id_token token")]
    CodeIdTokenToken,
    /// Device authorization flow.
    #[serde(rename = "device_code")]
    DeviceCode,
}

impl ResponseType {
    /// Every response type, in the order the default chain registers them.
    pub const ALL: [ResponseType; 8] = [
        Self::Code,
        Self::Token,
        Self::IdToken,
        Self::IdTokenToken,
        Self::CodeIdToken,
        Self::CodeToken,
        Self::CodeIdTokenToken,
        Self::DeviceCode,
    ];

    /// Returns the `response_type` parameter value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Code => "code",
            Self::Token => "token",
            Self::IdToken => "id_token",
            Self::IdTokenToken => "id_token token",
            Self::CodeIdToken => "code id_token",
            Self::CodeToken => "code token",
            Self::CodeIdTokenToken => "code id_token token",
            Self::DeviceCode => "device_code",
        }
    }

    /// Parses a `response_type` parameter value.
    ///
    /// Matching is exact: no trimming, no reordering of space-separated
    /// tokens.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|rt| rt.as_str() == value)
    }

    /// Returns the grant type this response type is issued under.
    #[must_use]
    pub fn grant_type(&self) -> GrantType {
        match self {
            Self::Code | Self::CodeIdToken | Self::CodeToken | Self::CodeIdTokenToken => {
                GrantType::AuthorizationCode
            }
            Self::Token | Self::IdToken | Self::IdTokenToken => GrantType::Implicit,
            Self::DeviceCode => GrantType::DeviceCode,
        }
    }

    /// Returns `true` for OpenID Connect hybrid response types.
    #[must_use]
    pub fn is_hybrid(&self) -> bool {
        matches!(
            self,
            Self::CodeIdToken | Self::CodeToken | Self::CodeIdTokenToken
        )
    }
}

impl fmt::Display for ResponseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// =============================================================================
// Grant Type
// =============================================================================

/// OAuth 2.0 grant types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GrantType {
    /// Authorization Code flow.
    #[serde(rename = "authorization_code")]
    AuthorizationCode,
    /// Implicit flow.
    #[serde(rename = "implicit")]
    Implicit,
    /// Resource Owner Password Credentials flow.
    #[serde(rename = "password")]
    Password,
    /// Client Credentials flow.
    #[serde(rename = "client_credentials")]
    ClientCredentials,
    /// Refresh Token flow.
    #[serde(rename = "refresh_token")]
    RefreshToken,
    /// Device Authorization Grant (RFC 8628).
    #[serde(rename = "urn:ietf:params:oauth:grant-type:device_code")]
    DeviceCode,
    /// UMA 2.0 ticket grant.
    #[serde(rename = "urn:ietf:params:oauth:grant-type:uma-ticket")]
    UmaTicket,
}

impl GrantType {
    /// Every grant type.
    pub const ALL: [GrantType; 7] = [
        Self::AuthorizationCode,
        Self::Implicit,
        Self::Password,
        Self::ClientCredentials,
        Self::RefreshToken,
        Self::DeviceCode,
        Self::UmaTicket,
    ];

    /// Returns the OAuth 2.0 `grant_type` parameter value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AuthorizationCode => "authorization_code",
            Self::Implicit => "implicit",
            Self::Password => "password",
            Self::ClientCredentials => "client_credentials",
            Self::RefreshToken => "refresh_token",
            Self::DeviceCode => "urn:ietf:params:oauth:grant-type:device_code",
            Self::UmaTicket => "urn:ietf:params:oauth:grant-type:uma-ticket",
        }
    }

    /// Parses a `grant_type` parameter value (exact match).
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|gt| gt.as_str() == value)
    }
}

impl fmt::Display for GrantType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
