//! Security event audit logging.
//!
//! Audit records are emitted as structured `tracing` events on the
//! [`AUDIT_TARGET`] target, so operators can route them to a dedicated sink
//! with an `EnvFilter` directive such as `authgate::audit=info`.
//!
//! Two kinds of events are recorded:
//!
//! - Access strategy decisions made by the enforcer
//! - Final admit/deny verdicts of the validation chain

use std::fmt;

use time::OffsetDateTime;

/// `tracing` target used for every audit record.
pub const AUDIT_TARGET: &str = "authgate::audit";

/// What happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuditAction {
    /// The access strategy allowed use of a service.
    ServiceAccessAllowed,
    /// The access strategy refused use of a service.
    ServiceAccessDenied,
    /// The validation chain admitted an authorization request.
    AuthorizationRequestAdmitted,
    /// The validation chain denied an authorization request.
    AuthorizationRequestDenied,
}

impl AuditAction {
    /// Returns a stable identifier for the action.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ServiceAccessAllowed => "SERVICE_ACCESS_ENFORCEMENT_ALLOWED",
            Self::ServiceAccessDenied => "SERVICE_ACCESS_ENFORCEMENT_DENIED",
            Self::AuthorizationRequestAdmitted => "AUTHORIZATION_REQUEST_ADMITTED",
            Self::AuthorizationRequestDenied => "AUTHORIZATION_REQUEST_DENIED",
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single audit record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditRecord {
    /// What happened.
    pub action: AuditAction,
    /// Client identifier from the request, if any.
    pub client_id: Option<String>,
    /// Name of the registered service involved, if resolved.
    pub service: Option<String>,
    /// Machine-readable reason for a denial.
    pub reason: Option<&'static str>,
    /// When the event happened.
    pub timestamp: OffsetDateTime,
}

impl AuditRecord {
    /// Creates a record stamped with the current time.
    #[must_use]
    pub fn new(action: AuditAction) -> Self {
        Self {
            action,
            client_id: None,
            service: None,
            reason: None,
            timestamp: OffsetDateTime::now_utc(),
        }
    }

    /// Sets the client identifier.
    #[must_use]
    pub fn with_client_id(mut self, client_id: Option<&str>) -> Self {
        self.client_id = client_id.map(str::to_string);
        self
    }

    /// Sets the service name.
    #[must_use]
    pub fn with_service(mut self, service: impl Into<String>) -> Self {
        self.service = Some(service.into());
        self
    }

    /// Sets the denial reason.
    #[must_use]
    pub fn with_reason(mut self, reason: &'static str) -> Self {
        self.reason = Some(reason);
        self
    }

    /// Emits the record on the audit target.
    pub fn emit(&self) {
        tracing::info!(
            target: AUDIT_TARGET,
            action = %self.action,
            client_id = self.client_id.as_deref().unwrap_or("-"),
            service = self.service.as_deref().unwrap_or("-"),
            reason = self.reason.unwrap_or("-"),
            timestamp = %self.timestamp,
            "audit"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_builder() {
        let record = AuditRecord::new(AuditAction::ServiceAccessDenied)
            .with_client_id(Some("client"))
            .with_service("OAuth")
            .with_reason("service_disabled");

        assert_eq!(record.action, AuditAction::ServiceAccessDenied);
        assert_eq!(record.client_id.as_deref(), Some("client"));
        assert_eq!(record.service.as_deref(), Some("OAuth"));
        assert_eq!(record.reason, Some("service_disabled"));

        // Emitting without a subscriber is a no-op.
        record.emit();
    }

    #[test]
    fn test_action_identifiers() {
        assert_eq!(
            AuditAction::ServiceAccessAllowed.to_string(),
            "SERVICE_ACCESS_ENFORCEMENT_ALLOWED"
        );
        assert_eq!(
            AuditAction::AuthorizationRequestDenied.as_str(),
            "AUTHORIZATION_REQUEST_DENIED"
        );
    }
}
