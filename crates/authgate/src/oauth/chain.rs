//! Ordered dispatch over flow validators.
//!
//! The chain keeps its validators sorted by precedence. For each request it
//! picks the first validator that supports the request and returns that
//! validator's verdict. Later validators are never consulted, even if the
//! selected one denies.

use std::sync::Arc;

use crate::AuthResult;
use crate::audit::{AuditAction, AuditRecord};
use crate::config::ChainConfig;
use crate::oauth::resolver::ServiceIdentityResolver;
use crate::oauth::validator::{DenialReason, FlowValidator, Verdict};
use crate::policy::AccessStrategyEnforcer;
use crate::request::AuthorizationRequestContext;
use crate::storage::ServiceDirectory;
use crate::types::ResponseType;

/// Precedence-ordered set of flow validators.
#[derive(Debug, Clone, Default)]
pub struct ValidationChain {
    validators: Vec<FlowValidator>,
    audit_verdicts: bool,
}

impl ValidationChain {
    /// Creates a chain from validators in registration order.
    ///
    /// Validators are stably sorted by ascending order, so registration order
    /// only decides between equal orders.
    #[must_use]
    pub fn new(validators: Vec<FlowValidator>) -> Self {
        let mut validators = validators;
        validators.sort_by_key(FlowValidator::order);
        Self {
            validators,
            audit_verdicts: false,
        }
    }

    /// Starts building a chain.
    #[must_use]
    pub fn builder() -> ValidationChainBuilder {
        ValidationChainBuilder::default()
    }

    /// Chain with one validator per known response type, all at the lowest
    /// precedence.
    #[must_use]
    pub fn with_default_flows(
        directory: Arc<dyn ServiceDirectory>,
        enforcer: Arc<dyn AccessStrategyEnforcer>,
    ) -> Self {
        Self::from_config(&ChainConfig::default(), directory, enforcer)
    }

    /// Chain built from configuration.
    ///
    /// Disabled flows are left out. Enabled flows keep their configured order
    /// and the configured client binding.
    #[must_use]
    pub fn from_config(
        config: &ChainConfig,
        directory: Arc<dyn ServiceDirectory>,
        enforcer: Arc<dyn AccessStrategyEnforcer>,
    ) -> Self {
        let resolver = ServiceIdentityResolver::new(directory);

        let validators = config
            .flows
            .iter()
            .filter(|flow| flow.enabled)
            .map(|flow| {
                FlowValidator::new(flow.response_type, resolver.clone(), enforcer.clone())
                    .with_order(flow.order)
                    .with_client_binding(config.enforce_client_binding)
            })
            .collect();

        Self::new(validators)
    }

    /// Enables audit records for every verdict.
    #[must_use]
    pub fn with_audit(mut self, audit_verdicts: bool) -> Self {
        self.audit_verdicts = audit_verdicts;
        self
    }

    /// Returns the validator that would handle the request.
    #[must_use]
    pub fn select(&self, request: &AuthorizationRequestContext) -> Option<&FlowValidator> {
        self.validators.iter().find(|v| v.supports(request))
    }

    /// Evaluates the request with the first supporting validator.
    ///
    /// # Errors
    ///
    /// Returns an error if a collaborator of the selected validator fails.
    pub async fn evaluate(&self, request: &AuthorizationRequestContext) -> AuthResult<Verdict> {
        let verdict = match self.select(request) {
            Some(validator) => validator.evaluate(request).await?,
            None => {
                tracing::debug!(
                    response_type = request.response_type().unwrap_or("-"),
                    "No validator supports the authorization request"
                );
                Verdict::Deny(DenialReason::NoMatchingValidator)
            }
        };

        if self.audit_verdicts {
            let record = match verdict {
                Verdict::Admit => AuditRecord::new(AuditAction::AuthorizationRequestAdmitted),
                Verdict::Deny(reason) => {
                    AuditRecord::new(AuditAction::AuthorizationRequestDenied)
                        .with_reason(reason.as_str())
                }
            };
            record.with_client_id(request.client_id()).emit();
        }

        Ok(verdict)
    }

    /// Returns true if the request is admitted.
    ///
    /// # Errors
    ///
    /// Returns an error if a collaborator of the selected validator fails.
    pub async fn validate(&self, request: &AuthorizationRequestContext) -> AuthResult<bool> {
        Ok(self.evaluate(request).await?.is_admitted())
    }

    /// Validators in dispatch order.
    #[must_use]
    pub fn validators(&self) -> &[FlowValidator] {
        &self.validators
    }

    /// Response types in dispatch order.
    #[must_use]
    pub fn response_types(&self) -> Vec<ResponseType> {
        self.validators.iter().map(FlowValidator::response_type).collect()
    }

    /// Number of validators.
    #[must_use]
    pub fn len(&self) -> usize {
        self.validators.len()
    }

    /// Returns true if the chain has no validators.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }
}

/// Builder for [`ValidationChain`].
#[derive(Debug, Default)]
pub struct ValidationChainBuilder {
    validators: Vec<FlowValidator>,
    audit_verdicts: bool,
}

impl ValidationChainBuilder {
    /// Registers a validator.
    #[must_use]
    pub fn validator(mut self, validator: FlowValidator) -> Self {
        self.validators.push(validator);
        self
    }

    /// Enables audit records for every verdict.
    #[must_use]
    pub fn audit_verdicts(mut self, enabled: bool) -> Self {
        self.audit_verdicts = enabled;
        self
    }

    /// Builds the chain.
    #[must_use]
    pub fn build(self) -> ValidationChain {
        ValidationChain::new(self.validators).with_audit(self.audit_verdicts)
    }
}
