//! Authorization request context.
//!
//! The validation chain only looks at request parameters by name, plus the
//! caller's source address for access strategies that restrict it. All
//! values are strings; presence or absence is the only structural contract.

use std::collections::HashMap;
use std::net::IpAddr;

/// Well-known authorization endpoint parameter names.
pub mod params {
    /// Requested response type.
    pub const RESPONSE_TYPE: &str = "response_type";
    /// Grant type the flow runs under.
    pub const GRANT_TYPE: &str = "grant_type";
    /// Client identifier.
    pub const CLIENT_ID: &str = "client_id";
    /// Redirect URI where the response will be sent.
    pub const REDIRECT_URI: &str = "redirect_uri";
    /// Bundled request object (JWT-secured authorization request).
    pub const REQUEST: &str = "request";
    /// CSRF protection state.
    pub const STATE: &str = "state";
    /// Requested scopes.
    pub const SCOPE: &str = "scope";
    /// OpenID Connect nonce.
    pub const NONCE: &str = "nonce";
}

/// Immutable snapshot of an inbound authorization request.
///
/// # Example
///
/// ```
/// use authgate::AuthorizationRequestContext;
///
/// let request = AuthorizationRequestContext::from_query(
///     "response_type=code&client_id=client&redirect_uri=https%3A%2F%2Fcallback.example.org",
/// );
/// assert_eq!(request.response_type(), Some("code"));
/// assert_eq!(request.redirect_uri(), Some("https://callback.example.org"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthorizationRequestContext {
    parameters: HashMap<String, String>,
    source_ip: Option<IpAddr>,
}

impl AuthorizationRequestContext {
    /// Creates an empty request.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses an `application/x-www-form-urlencoded` query or form body.
    ///
    /// When a parameter is repeated, the first occurrence wins.
    #[must_use]
    pub fn from_query(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        url::form_urlencoded::parse(query.as_bytes())
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect()
    }

    /// Returns a copy with `name` set to `value`, replacing any previous value.
    #[must_use]
    pub fn with_parameter(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.insert(name.into(), value.into());
        self
    }

    /// Returns a copy without `name`.
    #[must_use]
    pub fn without_parameter(mut self, name: &str) -> Self {
        self.parameters.remove(name);
        self
    }

    /// Returns a copy carrying the caller's source address.
    #[must_use]
    pub fn with_source_ip(mut self, ip: IpAddr) -> Self {
        self.source_ip = Some(ip);
        self
    }

    /// Returns the raw value of a parameter, if present.
    #[must_use]
    pub fn parameter(&self, name: &str) -> Option<&str> {
        self.parameters.get(name).map(String::as_str)
    }

    /// Returns the value of a parameter if it is present and not blank.
    #[must_use]
    pub fn non_blank_parameter(&self, name: &str) -> Option<&str> {
        self.parameter(name).filter(|v| !v.trim().is_empty())
    }

    /// Returns `true` if the parameter was sent at all, even with an empty value.
    #[must_use]
    pub fn contains_parameter(&self, name: &str) -> bool {
        self.parameters.contains_key(name)
    }

    /// Returns all parameters.
    #[must_use]
    pub fn parameters(&self) -> &HashMap<String, String> {
        &self.parameters
    }

    /// Returns the caller's source address, if known.
    #[must_use]
    pub fn source_ip(&self) -> Option<IpAddr> {
        self.source_ip
    }

    /// `response_type` parameter.
    #[must_use]
    pub fn response_type(&self) -> Option<&str> {
        self.parameter(params::RESPONSE_TYPE)
    }

    /// `grant_type` parameter.
    #[must_use]
    pub fn grant_type(&self) -> Option<&str> {
        self.parameter(params::GRANT_TYPE)
    }

    /// `client_id` parameter.
    #[must_use]
    pub fn client_id(&self) -> Option<&str> {
        self.parameter(params::CLIENT_ID)
    }

    /// `redirect_uri` parameter.
    #[must_use]
    pub fn redirect_uri(&self) -> Option<&str> {
        self.parameter(params::REDIRECT_URI)
    }

    /// `request` parameter (bundled request object).
    #[must_use]
    pub fn request_object(&self) -> Option<&str> {
        self.parameter(params::REQUEST)
    }
}

impl<K, V> FromIterator<(K, V)> for AuthorizationRequestContext
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut parameters = HashMap::new();
        for (k, v) in iter {
            parameters.entry(k.into()).or_insert_with(|| v.into());
        }
        Self {
            parameters,
            source_ip: None,
        }
    }
}
