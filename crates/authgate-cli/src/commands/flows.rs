use std::sync::Arc;

use anyhow::Result;
use authgate::{
    AuthGateConfig, InMemoryServiceDirectory, LOWEST_PRECEDENCE,
    RegisteredServiceAccessStrategyEnforcer, ValidationChain,
};
use serde::Serialize;

use crate::cli::OutputFormat;
use crate::output::{print_json, print_table};

#[derive(Serialize)]
struct FlowEntry {
    position: usize,
    response_type: &'static str,
    grant_type: &'static str,
    order: i32,
    client_binding: bool,
}

pub fn flows(config: &AuthGateConfig, format: OutputFormat) -> Result<()> {
    // Dispatch order does not depend on the registry contents.
    let chain = ValidationChain::from_config(
        &config.chain,
        Arc::new(InMemoryServiceDirectory::new()),
        Arc::new(RegisteredServiceAccessStrategyEnforcer::new()),
    );

    let entries: Vec<FlowEntry> = chain
        .validators()
        .iter()
        .enumerate()
        .map(|(idx, v)| FlowEntry {
            position: idx + 1,
            response_type: v.response_type().as_str(),
            grant_type: v.grant_type().as_str(),
            order: v.order(),
            client_binding: v.enforces_client_binding(),
        })
        .collect();

    if matches!(format, OutputFormat::Json) {
        return print_json(&entries);
    }

    if entries.is_empty() {
        println!("No flows enabled; every request will be denied.");
        return Ok(());
    }

    let rows = entries
        .iter()
        .map(|e| {
            let order = if e.order == LOWEST_PRECEDENCE {
                "lowest".to_string()
            } else {
                e.order.to_string()
            };
            [
                e.position.to_string(),
                e.response_type.to_string(),
                e.grant_type.to_string(),
                order,
                e.client_binding.to_string(),
            ]
        })
        .collect();

    print_table(
        ["#", "Response Type", "Grant Type", "Order", "Client Binding"],
        rows,
    );
    Ok(())
}
