//! End-to-end walk through the authorization code flow.

use std::sync::Arc;

use authgate::prelude::*;

const CALLBACK: &str = "https://callback.example.org";

fn registered_service(supported: &[ResponseType]) -> RegisteredClientService {
    RegisteredClientService::new(1, "OAuth", "client", "https://callback\\.example\\.org")
        .unwrap()
        .with_supported_response_types(supported.iter().copied())
}

fn validator_for(service: RegisteredClientService) -> FlowValidator {
    let directory = InMemoryServiceDirectory::with_services(vec![service]).unwrap();
    FlowValidator::authorization_code(
        ServiceIdentityResolver::new(Arc::new(directory)),
        Arc::new(RegisteredServiceAccessStrategyEnforcer::new()),
    )
}

#[tokio::test]
async fn validates_request_built_up_step_by_step() {
    let validator = validator_for(registered_service(&[]));

    let request = AuthorizationRequestContext::new();
    assert!(!validator.validate(&request).await.unwrap());

    let request = request.with_parameter(params::GRANT_TYPE, "authorization_code");
    assert!(!validator.validate(&request).await.unwrap());

    let request = request.with_parameter(params::CLIENT_ID, "client");
    assert!(!validator.validate(&request).await.unwrap());

    let request = request.with_parameter(params::REDIRECT_URI, CALLBACK);
    assert!(!validator.validate(&request).await.unwrap());

    let request = request.with_parameter(params::RESPONSE_TYPE, "unknown");
    assert!(!validator.validate(&request).await.unwrap());

    // An empty supported set accepts every response type.
    let request = request.with_parameter(params::RESPONSE_TYPE, "code");
    assert!(validator.validate(&request).await.unwrap());

    let with_request_object = request
        .clone()
        .with_parameter(params::REQUEST, "eyJhbGciOiJub25lIn0");
    assert!(!validator.validate(&with_request_object).await.unwrap());
    assert_eq!(
        validator.evaluate(&with_request_object).await.unwrap(),
        Verdict::Deny(DenialReason::RequestObjectPresent)
    );
}

#[tokio::test]
async fn honours_supported_response_types() {
    let request = AuthorizationRequestContext::new()
        .with_parameter(params::GRANT_TYPE, "authorization_code")
        .with_parameter(params::CLIENT_ID, "client")
        .with_parameter(params::REDIRECT_URI, CALLBACK)
        .with_parameter(params::RESPONSE_TYPE, "code");

    let code_only = validator_for(registered_service(&[ResponseType::Code]));
    assert!(code_only.validate(&request).await.unwrap());

    let token_only = validator_for(registered_service(&[ResponseType::Token]));
    assert!(!token_only.validate(&request).await.unwrap());
}

#[tokio::test]
async fn supports_and_rejects_unknown_redirect() {
    let validator = validator_for(registered_service(&[ResponseType::Code]));

    let request = AuthorizationRequestContext::new()
        .with_parameter(params::GRANT_TYPE, "authorization_code")
        .with_parameter(params::CLIENT_ID, "client")
        .with_parameter(params::REDIRECT_URI, "unknown-uri")
        .with_parameter(params::RESPONSE_TYPE, "code");

    assert!(validator.supports(&request));
    assert!(!validator.validate(&request).await.unwrap());
    assert_eq!(
        validator.evaluate(&request).await.unwrap(),
        Verdict::Deny(DenialReason::UnknownService)
    );
}

#[tokio::test]
async fn disabling_access_strategy_denies() {
    let mut service = registered_service(&[ResponseType::Code]);
    service.access_strategy.set_service_access_allowed(false);
    let validator = validator_for(service);

    let request = AuthorizationRequestContext::new()
        .with_parameter(params::GRANT_TYPE, "authorization_code")
        .with_parameter(params::CLIENT_ID, "client")
        .with_parameter(params::REDIRECT_URI, CALLBACK)
        .with_parameter(params::RESPONSE_TYPE, "code");

    assert!(!validator.validate(&request).await.unwrap());
    assert_eq!(
        validator.evaluate(&request).await.unwrap().denial_reason(),
        Some(DenialReason::AccessDenied)
    );
}

#[test]
fn exposes_order_and_collaborators() {
    let validator = validator_for(registered_service(&[]));

    assert_eq!(validator.order(), LOWEST_PRECEDENCE);
    assert_eq!(validator.response_type(), ResponseType::Code);
    assert_eq!(validator.grant_type(), GrantType::AuthorizationCode);
    assert!(validator.resolver().create_service(CALLBACK).is_some());
    let _enforcer: &Arc<dyn AccessStrategyEnforcer> = validator.enforcer();
}

#[tokio::test]
async fn chain_dispatches_query_string_requests() {
    let directory =
        InMemoryServiceDirectory::with_services(vec![registered_service(&[ResponseType::Code])])
            .unwrap();
    let chain = ValidationChain::with_default_flows(
        Arc::new(directory),
        Arc::new(RegisteredServiceAccessStrategyEnforcer::new()),
    )
    .with_audit(true);

    let admitted = AuthorizationRequestContext::from_query(
        "grant_type=authorization_code&client_id=client\
         &redirect_uri=https%3A%2F%2Fcallback.example.org&response_type=code&state=xyz",
    );
    assert!(chain.validate(&admitted).await.unwrap());

    // Implicit flow is registered in the chain, but the service only allows code.
    let implicit = AuthorizationRequestContext::from_query(
        "grant_type=implicit&client_id=client\
         &redirect_uri=https%3A%2F%2Fcallback.example.org&response_type=token",
    );
    assert_eq!(
        chain.evaluate(&implicit).await.unwrap(),
        Verdict::Deny(DenialReason::UnsupportedResponseType)
    );

    let unknown = AuthorizationRequestContext::from_query("response_type=none");
    assert_eq!(
        chain.evaluate(&unknown).await.unwrap(),
        Verdict::Deny(DenialReason::NoMatchingValidator)
    );
}
