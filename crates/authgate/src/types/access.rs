//! Access strategy attached to every registered service.
//!
//! The access strategy decides whether a service may be used at all,
//! independently of the shape of the protocol request: a disabled service,
//! a service outside its activation window, or a request from a source
//! address outside the allowed ranges is refused even when the request is
//! otherwise valid.

use std::net::IpAddr;

use ipnetwork::IpNetwork;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Per-service usage policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AccessStrategy {
    /// Whether the service may be used at all.
    pub enabled: bool,

    /// The service may not be used before this instant.
    #[serde(with = "time::serde::rfc3339::option", skip_serializing_if = "Option::is_none")]
    pub starting_date_time: Option<OffsetDateTime>,

    /// The service may not be used after this instant.
    #[serde(with = "time::serde::rfc3339::option", skip_serializing_if = "Option::is_none")]
    pub ending_date_time: Option<OffsetDateTime>,

    /// Source address ranges (CIDR notation) allowed to use the service.
    /// Empty means any source.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub allowed_source_ips: Vec<String>,

    /// Where the surrounding layer should send users that are refused.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unauthorized_redirect_url: Option<String>,
}

impl Default for AccessStrategy {
    fn default() -> Self {
        Self {
            enabled: true,
            starting_date_time: None,
            ending_date_time: None,
            allowed_source_ips: Vec::new(),
            unauthorized_redirect_url: None,
        }
    }
}

/// Why an access strategy refused a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessDenial {
    /// The service is disabled.
    Disabled,
    /// The activation window has not started yet.
    NotYetActive,
    /// The activation window has ended.
    Expired,
    /// The request came from a source outside the allowed ranges.
    SourceRejected,
}

impl AccessDenial {
    /// Returns a stable identifier for logs and audit records.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Disabled => "service_disabled",
            Self::NotYetActive => "service_not_yet_active",
            Self::Expired => "service_expired",
            Self::SourceRejected => "source_rejected",
        }
    }
}

impl AccessStrategy {
    /// Creates a strategy that refuses every request.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    /// Returns whether the service is enabled.
    #[must_use]
    pub fn is_service_access_allowed(&self) -> bool {
        self.enabled
    }

    /// Enables or disables the service.
    pub fn set_service_access_allowed(&mut self, allowed: bool) {
        self.enabled = allowed;
    }

    /// Restricts use of the service to the given window.
    #[must_use]
    pub fn with_window(
        mut self,
        starting: Option<OffsetDateTime>,
        ending: Option<OffsetDateTime>,
    ) -> Self {
        self.starting_date_time = starting;
        self.ending_date_time = ending;
        self
    }

    /// Restricts use of the service to the given CIDR ranges.
    #[must_use]
    pub fn with_allowed_source_ips<I, S>(mut self, ranges: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_source_ips = ranges.into_iter().map(Into::into).collect();
        self
    }

    /// Evaluates the strategy at `now` for a request from `source`.
    ///
    /// Checks run in order: enabled flag, activation window, source address.
    ///
    /// # Errors
    ///
    /// Returns the first [`AccessDenial`] that applies.
    pub fn evaluate(&self, now: OffsetDateTime, source: Option<IpAddr>) -> Result<(), AccessDenial> {
        if !self.enabled {
            return Err(AccessDenial::Disabled);
        }

        if let Some(start) = self.starting_date_time {
            if now < start {
                return Err(AccessDenial::NotYetActive);
            }
        }

        if let Some(end) = self.ending_date_time {
            if now > end {
                return Err(AccessDenial::Expired);
            }
        }

        if !self.is_source_allowed(source) {
            return Err(AccessDenial::SourceRejected);
        }

        Ok(())
    }

    /// Checks the source address against the allowed ranges.
    ///
    /// With no ranges configured every source is allowed. With ranges
    /// configured an unknown source is refused. Entries that are not valid
    /// CIDR notation never match.
    #[must_use]
    pub fn is_source_allowed(&self, source: Option<IpAddr>) -> bool {
        if self.allowed_source_ips.is_empty() {
            return true;
        }

        let Some(ip) = source else {
            return false;
        };

        self.allowed_source_ips
            .iter()
            .any(|range| match range.parse::<IpNetwork>() {
                Ok(network) => network.contains(ip),
                Err(e) => {
                    tracing::warn!(range = %range, error = %e, "Ignoring invalid CIDR range in access strategy");
                    false
                }
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::Duration;

    fn now() -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }

    #[test]
    fn test_default_strategy_allows() {
        let strategy = AccessStrategy::default();
        assert!(strategy.is_service_access_allowed());
        assert_eq!(strategy.evaluate(now(), None), Ok(()));
    }

    #[test]
    fn test_disabled_strategy_denies() {
        let strategy = AccessStrategy::disabled();
        assert!(!strategy.is_service_access_allowed());
        assert_eq!(strategy.evaluate(now(), None), Err(AccessDenial::Disabled));
    }

    #[test]
    fn test_toggle_service_access() {
        let mut strategy = AccessStrategy::default();
        strategy.set_service_access_allowed(false);
        assert_eq!(strategy.evaluate(now(), None), Err(AccessDenial::Disabled));
        strategy.set_service_access_allowed(true);
        assert_eq!(strategy.evaluate(now(), None), Ok(()));
    }

    #[test]
    fn test_activation_window() {
        let t = now();

        let future = AccessStrategy::default().with_window(Some(t + Duration::hours(1)), None);
        assert_eq!(future.evaluate(t, None), Err(AccessDenial::NotYetActive));

        let past = AccessStrategy::default().with_window(None, Some(t - Duration::hours(1)));
        assert_eq!(past.evaluate(t, None), Err(AccessDenial::Expired));

        let open = AccessStrategy::default()
            .with_window(Some(t - Duration::hours(1)), Some(t + Duration::hours(1)));
        assert_eq!(open.evaluate(t, None), Ok(()));
    }

    #[test]
    fn test_disabled_wins_over_window() {
        let t = now();
        let mut strategy = AccessStrategy::default().with_window(None, Some(t - Duration::hours(1)));
        strategy.enabled = false;
        assert_eq!(strategy.evaluate(t, None), Err(AccessDenial::Disabled));
    }

    #[test]
    fn test_source_ranges() {
        let strategy =
            AccessStrategy::default().with_allowed_source_ips(["10.0.0.0/8", "2001:db8::/32"]);

        assert!(strategy.is_source_allowed(Some("10.1.2.3".parse().unwrap())));
        assert!(strategy.is_source_allowed(Some("2001:db8::1".parse().unwrap())));
        assert!(!strategy.is_source_allowed(Some("192.168.1.1".parse().unwrap())));
        assert!(!strategy.is_source_allowed(None));
        assert_eq!(
            strategy.evaluate(now(), Some("192.168.1.1".parse().unwrap())),
            Err(AccessDenial::SourceRejected)
        );
    }

    #[test]
    fn test_invalid_cidr_never_matches() {
        let strategy = AccessStrategy::default().with_allowed_source_ips(["not-a-cidr"]);
        assert!(!strategy.is_source_allowed(Some("10.0.0.1".parse().unwrap())));
    }

    #[test]
    fn test_deserialize_camel_case() {
        let json = r#"{
            "enabled": true,
            "startingDateTime": "2020-01-01T00:00:00Z",
            "allowedSourceIps": ["127.0.0.1/32"]
        }"#;
        let strategy: AccessStrategy = serde_json::from_str(json).unwrap();
        assert!(strategy.enabled);
        assert!(strategy.starting_date_time.is_some());
        assert!(strategy.ending_date_time.is_none());
        assert_eq!(strategy.allowed_source_ips, vec!["127.0.0.1/32".to_string()]);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let strategy: AccessStrategy = serde_json::from_str("{}").unwrap();
        assert_eq!(strategy, AccessStrategy::default());
    }

    #[test]
    fn test_denial_identifiers() {
        assert_eq!(AccessDenial::Disabled.as_str(), "service_disabled");
        assert_eq!(AccessDenial::SourceRejected.as_str(), "source_rejected");
    }
}
