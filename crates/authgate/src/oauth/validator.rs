//! Per-flow authorization request validation.
//!
//! A [`FlowValidator`] is bound to one response type. It answers two
//! questions: does this request belong to my flow ([`FlowValidator::supports`]),
//! and if so, may it proceed ([`FlowValidator::validate`])?

use std::fmt;
use std::sync::Arc;

use crate::AuthResult;
use crate::oauth::authorize::AuthorizationErrorCode;
use crate::oauth::resolver::ServiceIdentityResolver;
use crate::policy::AccessStrategyEnforcer;
use crate::request::{AuthorizationRequestContext, params};
use crate::types::{GrantType, ResponseType};

/// Order assigned to validators that do not ask for one.
pub const LOWEST_PRECEDENCE: i32 = i32::MAX;

/// Order that sorts ahead of every other validator.
pub const HIGHEST_PRECEDENCE: i32 = i32::MIN;

// ============================================================================
// Verdict
// ============================================================================

/// Why a request was refused.
///
/// Diagnostic only. Callers that just need the decision use
/// [`Verdict::is_admitted`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DenialReason {
    /// `grant_type` missing or not the flow's grant type.
    GrantTypeMismatch,
    /// `client_id` missing or blank.
    MissingClientId,
    /// `redirect_uri` missing or blank.
    MissingRedirectUri,
    /// `redirect_uri` does not belong to any registered service.
    UnknownService,
    /// The resolved service is registered to a different client.
    ClientMismatch,
    /// `response_type` missing or not the validator's token.
    ResponseTypeMismatch,
    /// A `request` object was supplied.
    RequestObjectPresent,
    /// The service does not allow this response type.
    UnsupportedResponseType,
    /// The access strategy refused the service.
    AccessDenied,
    /// No validator in the chain handles the request's response type.
    NoMatchingValidator,
}

impl DenialReason {
    /// Returns a stable identifier for the reason.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GrantTypeMismatch => "grant_type_mismatch",
            Self::MissingClientId => "missing_client_id",
            Self::MissingRedirectUri => "missing_redirect_uri",
            Self::UnknownService => "unknown_service",
            Self::ClientMismatch => "client_mismatch",
            Self::ResponseTypeMismatch => "response_type_mismatch",
            Self::RequestObjectPresent => "request_object_present",
            Self::UnsupportedResponseType => "unsupported_response_type",
            Self::AccessDenied => "access_denied",
            Self::NoMatchingValidator => "no_matching_validator",
        }
    }

    /// The OAuth error code the authorization endpoint should answer with.
    #[must_use]
    pub fn error_code(&self) -> AuthorizationErrorCode {
        match self {
            Self::GrantTypeMismatch
            | Self::MissingClientId
            | Self::MissingRedirectUri
            | Self::UnknownService => AuthorizationErrorCode::InvalidRequest,
            Self::ClientMismatch | Self::UnsupportedResponseType => {
                AuthorizationErrorCode::UnauthorizedClient
            }
            Self::ResponseTypeMismatch | Self::NoMatchingValidator => {
                AuthorizationErrorCode::UnsupportedResponseType
            }
            Self::RequestObjectPresent => AuthorizationErrorCode::RequestNotSupported,
            Self::AccessDenied => AuthorizationErrorCode::AccessDenied,
        }
    }

    /// Human-readable text for `error_description`.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::GrantTypeMismatch => "grant_type is missing or does not match the flow",
            Self::MissingClientId => "client_id is required",
            Self::MissingRedirectUri => "redirect_uri is required",
            Self::UnknownService => "redirect_uri is not registered",
            Self::ClientMismatch => "redirect_uri is registered to another client",
            Self::ResponseTypeMismatch => "response_type is missing or not handled by this flow",
            Self::RequestObjectPresent => "request objects are not supported",
            Self::UnsupportedResponseType => "the client may not use this response_type",
            Self::AccessDenied => "access to the service is denied",
            Self::NoMatchingValidator => "response_type is not supported",
        }
    }

    /// Returns `true` if the denial happened after `redirect_uri` resolved
    /// to the requesting client's service, so the error may be sent there.
    ///
    /// Earlier checks have not looked at the URI, and a client mismatch means
    /// the URI belongs to someone else.
    #[must_use]
    pub fn allows_error_redirect(&self) -> bool {
        matches!(
            self,
            Self::ResponseTypeMismatch
                | Self::RequestObjectPresent
                | Self::UnsupportedResponseType
                | Self::AccessDenied
        )
    }
}

impl fmt::Display for DenialReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of validating an authorization request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// The request may proceed.
    Admit,
    /// The request is refused.
    Deny(DenialReason),
}

impl Verdict {
    /// Returns true if the request was admitted.
    #[must_use]
    pub fn is_admitted(&self) -> bool {
        matches!(self, Self::Admit)
    }

    /// Returns the denial reason, if any.
    #[must_use]
    pub fn denial_reason(&self) -> Option<DenialReason> {
        match self {
            Self::Admit => None,
            Self::Deny(reason) => Some(*reason),
        }
    }
}

// ============================================================================
// FlowValidator
// ============================================================================

/// Validator for a single OAuth flow, identified by its response type.
#[derive(Clone)]
pub struct FlowValidator {
    response_type: ResponseType,
    grant_type: GrantType,
    order: i32,
    enforce_client_binding: bool,
    resolver: ServiceIdentityResolver,
    enforcer: Arc<dyn AccessStrategyEnforcer>,
}

impl fmt::Debug for FlowValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlowValidator")
            .field("response_type", &self.response_type)
            .field("grant_type", &self.grant_type)
            .field("order", &self.order)
            .field("enforce_client_binding", &self.enforce_client_binding)
            .finish_non_exhaustive()
    }
}

impl FlowValidator {
    /// Creates a validator for `response_type` at the lowest precedence.
    ///
    /// The expected grant type is derived from the response type.
    #[must_use]
    pub fn new(
        response_type: ResponseType,
        resolver: ServiceIdentityResolver,
        enforcer: Arc<dyn AccessStrategyEnforcer>,
    ) -> Self {
        Self {
            response_type,
            grant_type: response_type.grant_type(),
            order: LOWEST_PRECEDENCE,
            enforce_client_binding: false,
            resolver,
            enforcer,
        }
    }

    /// Creates the authorization code flow validator.
    #[must_use]
    pub fn authorization_code(
        resolver: ServiceIdentityResolver,
        enforcer: Arc<dyn AccessStrategyEnforcer>,
    ) -> Self {
        Self::new(ResponseType::Code, resolver, enforcer)
    }

    /// Sets the precedence. Lower values are consulted first.
    #[must_use]
    pub fn with_order(mut self, order: i32) -> Self {
        self.order = order;
        self
    }

    /// Requires the resolved service to be registered to the requesting client.
    #[must_use]
    pub fn with_client_binding(mut self, enforce: bool) -> Self {
        self.enforce_client_binding = enforce;
        self
    }

    /// Precedence of this validator.
    #[must_use]
    pub fn order(&self) -> i32 {
        self.order
    }

    /// Response type this validator handles.
    #[must_use]
    pub fn response_type(&self) -> ResponseType {
        self.response_type
    }

    /// Grant type requests of this flow must carry.
    #[must_use]
    pub fn grant_type(&self) -> GrantType {
        self.grant_type
    }

    /// Whether client binding is enforced.
    #[must_use]
    pub fn enforces_client_binding(&self) -> bool {
        self.enforce_client_binding
    }

    /// Resolver used to map redirect URIs to services.
    #[must_use]
    pub fn resolver(&self) -> &ServiceIdentityResolver {
        &self.resolver
    }

    /// Enforcer consulted as the last check.
    #[must_use]
    pub fn enforcer(&self) -> &Arc<dyn AccessStrategyEnforcer> {
        &self.enforcer
    }

    /// Returns true if the request's `response_type` is exactly this
    /// validator's token.
    ///
    /// Purely syntactic: never touches the directory or the enforcer.
    #[must_use]
    pub fn supports(&self, request: &AuthorizationRequestContext) -> bool {
        request.response_type() == Some(self.response_type.as_str())
    }

    /// Validates the request, returning true only if every check passes.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or the enforcer fails.
    pub async fn validate(&self, request: &AuthorizationRequestContext) -> AuthResult<bool> {
        Ok(self.evaluate(request).await?.is_admitted())
    }

    /// Validates the request and reports the first failed check.
    ///
    /// Checks run in a fixed order and stop at the first failure.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or the enforcer fails.
    pub async fn evaluate(&self, request: &AuthorizationRequestContext) -> AuthResult<Verdict> {
        // 1. Grant type
        if request.grant_type() != Some(self.grant_type.as_str()) {
            return Ok(self.deny(request, DenialReason::GrantTypeMismatch));
        }

        // 2. Client id
        let Some(client_id) = request.non_blank_parameter(params::CLIENT_ID) else {
            return Ok(self.deny(request, DenialReason::MissingClientId));
        };

        // 3. Redirect URI must resolve to a registered service
        let Some(redirect_uri) = request.non_blank_parameter(params::REDIRECT_URI) else {
            return Ok(self.deny(request, DenialReason::MissingRedirectUri));
        };

        let Some((reference, service)) = self.resolver.resolve(redirect_uri).await? else {
            return Ok(self.deny(request, DenialReason::UnknownService));
        };

        if self.enforce_client_binding && service.client_id != client_id {
            tracing::debug!(
                client_id = %client_id,
                service = %service.name,
                "Redirect URI is registered to a different client"
            );
            return Ok(self.deny(request, DenialReason::ClientMismatch));
        }

        // 4. Response type
        if request.response_type() != Some(self.response_type.as_str()) {
            return Ok(self.deny(request, DenialReason::ResponseTypeMismatch));
        }

        // 5. Request objects are not supported
        if request.contains_parameter(params::REQUEST) {
            return Ok(self.deny(request, DenialReason::RequestObjectPresent));
        }

        // 6. Service capability
        if !service.is_response_type_supported(self.response_type) {
            return Ok(self.deny(request, DenialReason::UnsupportedResponseType));
        }

        // 7. Access strategy
        if !self
            .enforcer
            .is_service_access_allowed(&service, request)
            .await?
        {
            return Ok(self.deny(request, DenialReason::AccessDenied));
        }

        tracing::debug!(
            client_id = %client_id,
            service = %service.name,
            service_id = %reference.id(),
            response_type = %self.response_type,
            "Authorization request validated"
        );

        Ok(Verdict::Admit)
    }

    fn deny(&self, request: &AuthorizationRequestContext, reason: DenialReason) -> Verdict {
        tracing::debug!(
            client_id = request.client_id().unwrap_or("-"),
            response_type = %self.response_type,
            reason = reason.as_str(),
            "Authorization request denied"
        );
        Verdict::Deny(reason)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AuthError;
    use crate::storage::InMemoryServiceDirectory;
    use crate::types::{AccessStrategy, RegisteredClientService};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const REDIRECT: &str = "https://callback.example.org";

    // Enforcer that records how often it was asked.
    struct CountingEnforcer {
        allow: bool,
        calls: AtomicUsize,
    }

    impl CountingEnforcer {
        fn new(allow: bool) -> Self {
            Self {
                allow,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl AccessStrategyEnforcer for CountingEnforcer {
        async fn is_service_access_allowed(
            &self,
            _service: &RegisteredClientService,
            _request: &AuthorizationRequestContext,
        ) -> AuthResult<bool> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.allow)
        }
    }

    struct FailingEnforcer;

    #[async_trait]
    impl AccessStrategyEnforcer for FailingEnforcer {
        async fn is_service_access_allowed(
            &self,
            _service: &RegisteredClientService,
            _request: &AuthorizationRequestContext,
        ) -> AuthResult<bool> {
            Err(AuthError::access_strategy("policy backend unreachable"))
        }
    }

    fn service() -> RegisteredClientService {
        RegisteredClientService::new(1, "OAuth", "client", "https://callback\\.example\\.org")
            .unwrap()
    }

    fn resolver(services: Vec<RegisteredClientService>) -> ServiceIdentityResolver {
        let directory = InMemoryServiceDirectory::with_services(services).unwrap();
        ServiceIdentityResolver::new(Arc::new(directory))
    }

    fn valid_request() -> AuthorizationRequestContext {
        AuthorizationRequestContext::new()
            .with_parameter(params::GRANT_TYPE, "authorization_code")
            .with_parameter(params::CLIENT_ID, "client")
            .with_parameter(params::REDIRECT_URI, REDIRECT)
            .with_parameter(params::RESPONSE_TYPE, "code")
    }

    fn validator(enforcer: Arc<dyn AccessStrategyEnforcer>) -> FlowValidator {
        FlowValidator::authorization_code(resolver(vec![service()]), enforcer)
    }

    #[test]
    fn test_defaults() {
        let validator = validator(Arc::new(CountingEnforcer::new(true)));
        assert_eq!(validator.order(), LOWEST_PRECEDENCE);
        assert_eq!(validator.response_type(), ResponseType::Code);
        assert_eq!(validator.grant_type(), GrantType::AuthorizationCode);
        assert!(!validator.enforces_client_binding());
    }

    #[test]
    fn test_supports_is_exact_match() {
        let validator = validator(Arc::new(CountingEnforcer::new(true)));

        assert!(validator.supports(&valid_request()));
        assert!(!validator.supports(&AuthorizationRequestContext::new()));
        for token in ["Code", " code", "code ", "token", "code token"] {
            let request = valid_request().with_parameter(params::RESPONSE_TYPE, token);
            assert!(!validator.supports(&request), "{token:?} must not match");
        }
    }

    #[test]
    fn test_supports_ignores_other_parameters() {
        let validator = validator(Arc::new(CountingEnforcer::new(true)));

        let bare = AuthorizationRequestContext::new().with_parameter(params::RESPONSE_TYPE, "code");
        assert!(validator.supports(&bare));

        let garbage = bare
            .clone()
            .with_parameter(params::GRANT_TYPE, "not-a-grant")
            .with_parameter(params::CLIENT_ID, "   ")
            .with_parameter(params::REDIRECT_URI, "::not a uri::")
            .with_parameter(params::REQUEST, "eyJhbGciOiJub25lIn0.e30.");
        assert!(validator.supports(&garbage));
    }

    #[tokio::test]
    async fn test_valid_request_admitted() {
        let enforcer = Arc::new(CountingEnforcer::new(true));
        let validator = validator(enforcer.clone());

        assert_eq!(validator.evaluate(&valid_request()).await.unwrap(), Verdict::Admit);
        assert!(validator.validate(&valid_request()).await.unwrap());
        assert_eq!(enforcer.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_checks_report_first_failure() {
        let validator = validator(Arc::new(CountingEnforcer::new(true)));

        let cases = [
            (
                valid_request().without_parameter(params::GRANT_TYPE),
                DenialReason::GrantTypeMismatch,
            ),
            (
                valid_request().with_parameter(params::GRANT_TYPE, "implicit"),
                DenialReason::GrantTypeMismatch,
            ),
            (
                valid_request().with_parameter(params::CLIENT_ID, "  "),
                DenialReason::MissingClientId,
            ),
            (
                valid_request().without_parameter(params::REDIRECT_URI),
                DenialReason::MissingRedirectUri,
            ),
            (
                valid_request().with_parameter(params::REDIRECT_URI, "unknown-uri"),
                DenialReason::UnknownService,
            ),
            (
                valid_request().with_parameter(params::RESPONSE_TYPE, "token"),
                DenialReason::ResponseTypeMismatch,
            ),
            (
                valid_request().with_parameter(params::REQUEST, ""),
                DenialReason::RequestObjectPresent,
            ),
        ];

        for (request, expected) in cases {
            assert_eq!(
                validator.evaluate(&request).await.unwrap(),
                Verdict::Deny(expected)
            );
        }
    }

    #[tokio::test]
    async fn test_grant_type_checked_before_directory() {
        // An empty request is refused without any collaborator being asked.
        let enforcer = Arc::new(CountingEnforcer::new(true));
        let validator = validator(enforcer.clone());

        assert!(!validator.validate(&AuthorizationRequestContext::new()).await.unwrap());
        assert_eq!(enforcer.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_supported_response_types() {
        let enforcer: Arc<dyn AccessStrategyEnforcer> = Arc::new(CountingEnforcer::new(true));

        let wildcard = FlowValidator::authorization_code(resolver(vec![service()]), enforcer.clone());
        assert!(wildcard.validate(&valid_request()).await.unwrap());

        let code_only = FlowValidator::authorization_code(
            resolver(vec![service().with_supported_response_types([ResponseType::Code])]),
            enforcer.clone(),
        );
        assert!(code_only.validate(&valid_request()).await.unwrap());

        let token_only = FlowValidator::authorization_code(
            resolver(vec![service().with_supported_response_types([ResponseType::Token])]),
            enforcer,
        );
        assert_eq!(
            token_only.evaluate(&valid_request()).await.unwrap(),
            Verdict::Deny(DenialReason::UnsupportedResponseType)
        );
    }

    #[tokio::test]
    async fn test_enforcer_refusal_denies() {
        let enforcer = Arc::new(CountingEnforcer::new(false));
        let validator = validator(enforcer.clone());

        assert_eq!(
            validator.evaluate(&valid_request()).await.unwrap(),
            Verdict::Deny(DenialReason::AccessDenied)
        );
        assert_eq!(enforcer.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_disabled_strategy_denies_with_registered_enforcer() {
        let validator = FlowValidator::authorization_code(
            resolver(vec![service().with_access_strategy(AccessStrategy::disabled())]),
            Arc::new(crate::policy::RegisteredServiceAccessStrategyEnforcer::new()),
        );
        assert!(!validator.validate(&valid_request()).await.unwrap());
    }

    #[tokio::test]
    async fn test_enforcer_fault_propagates() {
        let validator = validator(Arc::new(FailingEnforcer));
        let err = validator.validate(&valid_request()).await.unwrap_err();
        assert!(matches!(err, AuthError::AccessStrategy { .. }));
    }

    #[tokio::test]
    async fn test_client_binding() {
        let enforcer: Arc<dyn AccessStrategyEnforcer> = Arc::new(CountingEnforcer::new(true));
        let other_client = valid_request().with_parameter(params::CLIENT_ID, "someone-else");

        let unbound = validator(enforcer.clone());
        assert!(unbound.validate(&other_client).await.unwrap());

        let bound = validator(enforcer).with_client_binding(true);
        assert_eq!(
            bound.evaluate(&other_client).await.unwrap(),
            Verdict::Deny(DenialReason::ClientMismatch)
        );
        assert!(bound.validate(&valid_request()).await.unwrap());
    }

    #[tokio::test]
    async fn test_implicit_flow_expects_implicit_grant() {
        let validator = FlowValidator::new(
            ResponseType::Token,
            resolver(vec![service()]),
            Arc::new(CountingEnforcer::new(true)),
        );
        let request = valid_request()
            .with_parameter(params::GRANT_TYPE, "implicit")
            .with_parameter(params::RESPONSE_TYPE, "token");

        assert!(validator.supports(&request));
        assert!(validator.validate(&request).await.unwrap());
    }

    #[test]
    fn test_denial_error_codes() {
        assert_eq!(
            DenialReason::RequestObjectPresent.error_code(),
            AuthorizationErrorCode::RequestNotSupported
        );
        assert_eq!(
            DenialReason::AccessDenied.error_code(),
            AuthorizationErrorCode::AccessDenied
        );
        assert_eq!(
            DenialReason::UnsupportedResponseType.error_code(),
            AuthorizationErrorCode::UnauthorizedClient
        );
        assert_eq!(DenialReason::MissingClientId.to_string(), "missing_client_id");
        assert_eq!(
            DenialReason::RequestObjectPresent.description(),
            "request objects are not supported"
        );
        assert_eq!(
            Verdict::Deny(DenialReason::UnknownService).denial_reason(),
            Some(DenialReason::UnknownService)
        );
        assert!(Verdict::Admit.denial_reason().is_none());
    }

    #[test]
    fn test_error_redirect_only_after_resolution() {
        for reason in [
            DenialReason::GrantTypeMismatch,
            DenialReason::MissingClientId,
            DenialReason::MissingRedirectUri,
            DenialReason::UnknownService,
            DenialReason::ClientMismatch,
            DenialReason::NoMatchingValidator,
        ] {
            assert!(!reason.allows_error_redirect(), "{reason}");
        }
        for reason in [
            DenialReason::ResponseTypeMismatch,
            DenialReason::RequestObjectPresent,
            DenialReason::UnsupportedResponseType,
            DenialReason::AccessDenied,
        ] {
            assert!(reason.allows_error_redirect(), "{reason}");
        }
    }
}
