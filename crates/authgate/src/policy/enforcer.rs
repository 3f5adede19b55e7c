//! Access strategy enforcement.
//!
//! The enforcer is the last gate of every flow validator: it decides whether
//! a resolved service may be used right now, regardless of how well-formed
//! the request is.

use async_trait::async_trait;
use time::OffsetDateTime;

use crate::AuthResult;
use crate::audit::{AuditAction, AuditRecord};
use crate::request::AuthorizationRequestContext;
use crate::types::RegisteredClientService;

/// Yes/no gate on whether a service may currently be used.
///
/// Returning `Ok(false)` is a denial. Returning `Err` means the enforcer
/// could not decide, and the chain propagates the fault instead of denying.
#[async_trait]
pub trait AccessStrategyEnforcer: Send + Sync {
    /// Decide whether `service` may be used for `request`.
    ///
    /// # Errors
    ///
    /// Returns an error if the decision could not be made.
    async fn is_service_access_allowed(
        &self,
        service: &RegisteredClientService,
        request: &AuthorizationRequestContext,
    ) -> AuthResult<bool>;
}

/// Enforcer that evaluates the service's own [`AccessStrategy`] and records
/// the outcome in the audit log.
///
/// [`AccessStrategy`]: crate::types::AccessStrategy
#[derive(Debug, Clone)]
pub struct RegisteredServiceAccessStrategyEnforcer {
    audit: bool,
    clock: fn() -> OffsetDateTime,
}

impl Default for RegisteredServiceAccessStrategyEnforcer {
    fn default() -> Self {
        Self::new()
    }
}

impl RegisteredServiceAccessStrategyEnforcer {
    /// Creates an auditing enforcer using the system clock.
    #[must_use]
    pub fn new() -> Self {
        Self {
            audit: true,
            clock: OffsetDateTime::now_utc,
        }
    }

    /// Enables or disables audit records.
    #[must_use]
    pub fn with_audit(mut self, audit: bool) -> Self {
        self.audit = audit;
        self
    }

    /// Replaces the clock used to evaluate activation windows.
    #[must_use]
    pub fn with_clock(mut self, clock: fn() -> OffsetDateTime) -> Self {
        self.clock = clock;
        self
    }
}

#[async_trait]
impl AccessStrategyEnforcer for RegisteredServiceAccessStrategyEnforcer {
    async fn is_service_access_allowed(
        &self,
        service: &RegisteredClientService,
        request: &AuthorizationRequestContext,
    ) -> AuthResult<bool> {
        let outcome = service
            .access_strategy
            .evaluate((self.clock)(), request.source_ip());

        if self.audit {
            let record = match outcome {
                Ok(()) => AuditRecord::new(AuditAction::ServiceAccessAllowed),
                Err(denial) => {
                    AuditRecord::new(AuditAction::ServiceAccessDenied).with_reason(denial.as_str())
                }
            };
            record
                .with_client_id(request.client_id())
                .with_service(service.name.as_str())
                .emit();
        }

        if let Err(denial) = outcome {
            tracing::debug!(
                service = %service.name,
                reason = denial.as_str(),
                "Service access refused by access strategy"
            );
        }

        Ok(outcome.is_ok())
    }
}
