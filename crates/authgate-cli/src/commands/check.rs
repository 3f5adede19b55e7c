use std::sync::Arc;

use anyhow::{Result, bail};
use authgate::request::params;
use authgate::{
    AuthError, AuthGateConfig, AuthorizationError, AuthorizationRequestContext, DenialReason,
    InMemoryServiceDirectory, RegisteredServiceAccessStrategyEnforcer, ValidationChain, Verdict,
};
use serde::Serialize;

use crate::cli::{CheckArgs, OutputFormat};
use crate::output::{print_denied, print_json, print_success};

/// Exit code for a denied request.
pub const EXIT_DENIED: i32 = 2;

#[derive(Serialize)]
struct CheckReport {
    admitted: bool,
    flow: Option<&'static str>,
    reason: Option<&'static str>,
    error: Option<&'static str>,
    error_redirect: Option<String>,
}

pub async fn check(
    args: &CheckArgs,
    config: &AuthGateConfig,
    directory: InMemoryServiceDirectory,
    format: OutputFormat,
) -> Result<i32> {
    let request = build_request(args)?;

    let enforcer =
        RegisteredServiceAccessStrategyEnforcer::new().with_audit(config.audit.log_access_decisions);
    let chain = ValidationChain::from_config(&config.chain, Arc::new(directory), Arc::new(enforcer))
        .with_audit(config.audit.log_verdicts);

    let flow = chain.select(&request).map(|v| v.response_type().as_str());
    let verdict = match chain.evaluate(&request).await {
        Ok(verdict) => verdict,
        Err(e) => {
            emit(&fault_report(flow, &e), format)?;
            return Err(e.into());
        }
    };

    let report = match verdict {
        Verdict::Admit => CheckReport {
            admitted: true,
            flow,
            reason: None,
            error: None,
            error_redirect: None,
        },
        Verdict::Deny(reason) => CheckReport {
            admitted: false,
            flow,
            reason: Some(reason.as_str()),
            error: Some(reason.error_code().as_str()),
            error_redirect: error_redirect(&request, reason),
        },
    };

    emit(&report, format)?;
    Ok(if report.admitted { 0 } else { EXIT_DENIED })
}

/// Report for a request the chain could not decide. The endpoint would
/// answer `server_error` without redirecting.
fn fault_report(flow: Option<&'static str>, err: &AuthError) -> CheckReport {
    CheckReport {
        admitted: false,
        flow,
        reason: None,
        error: Some(err.oauth_error_code().as_str()),
        error_redirect: None,
    }
}

fn emit(report: &CheckReport, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => print_json(report)?,
        OutputFormat::Text => print_report(report),
    }
    Ok(())
}

fn print_report(report: &CheckReport) {
    let flow = report.flow.unwrap_or("none");
    if report.admitted {
        print_success(&format!("Admitted (flow: {flow})"));
        return;
    }

    print_denied(&format!(
        "Denied: {} (flow: {flow}, error: {})",
        report.reason.unwrap_or("-"),
        report.error.unwrap_or("-"),
    ));
    if let Some(url) = &report.error_redirect {
        println!("  Redirect: {url}");
    }
}

/// Error redirect for the client, only once its redirect URI has resolved
/// to the client's registered service.
fn error_redirect(request: &AuthorizationRequestContext, reason: DenialReason) -> Option<String> {
    if !reason.allows_error_redirect() {
        return None;
    }

    let redirect_uri = request.redirect_uri()?;
    let state = request.parameter(params::STATE).map(str::to_string);
    AuthorizationError::with_description(reason.error_code(), reason.description(), state)
        .to_redirect_url(redirect_uri)
        .ok()
}

fn build_request(args: &CheckArgs) -> Result<AuthorizationRequestContext> {
    let mut request = args
        .query
        .as_deref()
        .map(AuthorizationRequestContext::from_query)
        .unwrap_or_default();

    for pair in &args.params {
        let (key, value) = parse_pair(pair)?;
        request = request.with_parameter(key, value);
    }

    if let Some(ip) = args.source_ip {
        request = request.with_source_ip(ip);
    }

    Ok(request)
}

fn parse_pair(pair: &str) -> Result<(&str, &str)> {
    match pair.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => Ok((key.trim(), value)),
        _ => bail!("Invalid parameter '{pair}', expected KEY=VALUE"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pair() {
        assert_eq!(parse_pair("client_id=app").unwrap(), ("client_id", "app"));
        assert_eq!(parse_pair("request=").unwrap(), ("request", ""));
        assert_eq!(
            parse_pair("redirect_uri=https://a.org/cb?x=1").unwrap(),
            ("redirect_uri", "https://a.org/cb?x=1")
        );
        assert!(parse_pair("client_id").is_err());
        assert!(parse_pair("=value").is_err());
    }

    #[test]
    fn test_build_request_overrides_query() {
        let args = CheckArgs {
            params: vec!["client_id=override".to_string()],
            query: Some("client_id=app&response_type=code".to_string()),
            source_ip: Some("10.0.0.1".parse().unwrap()),
        };
        let request = build_request(&args).unwrap();
        assert_eq!(request.client_id(), Some("override"));
        assert_eq!(request.response_type(), Some("code"));
        assert!(request.source_ip().is_some());
    }

    #[test]
    fn test_error_redirect() {
        let request = AuthorizationRequestContext::new()
            .with_parameter(params::REDIRECT_URI, "https://callback.example.org/cb")
            .with_parameter(params::STATE, "xyz");

        let url = error_redirect(&request, DenialReason::AccessDenied).unwrap();
        assert!(url.starts_with("https://callback.example.org/cb?"));
        assert!(url.contains("error=access_denied"));
        assert!(url.contains("error_description=access+to+the+service+is+denied"));
        assert!(url.contains("state=xyz"));

        assert!(error_redirect(&request, DenialReason::UnknownService).is_none());
    }

    #[test]
    fn test_no_error_redirect_to_unverified_uri() {
        let request = AuthorizationRequestContext::new()
            .with_parameter(params::REDIRECT_URI, "https://attacker.example.com/steal")
            .with_parameter(params::STATE, "xyz");

        for reason in [
            DenialReason::GrantTypeMismatch,
            DenialReason::MissingClientId,
            DenialReason::ClientMismatch,
            DenialReason::NoMatchingValidator,
        ] {
            assert!(error_redirect(&request, reason).is_none(), "{reason}");
        }
    }

    #[test]
    fn test_fault_report_is_server_error() {
        let report = fault_report(Some("code"), &AuthError::storage("registry unavailable"));
        assert!(!report.admitted);
        assert_eq!(report.error, Some("server_error"));
        assert!(report.reason.is_none());
        assert!(report.error_redirect.is_none());
    }
}
