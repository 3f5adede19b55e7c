use anyhow::{Result, anyhow};
use authgate::{AuthGateConfig, DigestPasswordEncoder};
use serde_json::json;

use crate::cli::{EncodeSecretArgs, OutputFormat};
use crate::output::print_json;

pub fn encode_secret(
    args: &EncodeSecretArgs,
    config: &AuthGateConfig,
    format: OutputFormat,
) -> Result<()> {
    let algorithm = args
        .algorithm
        .as_deref()
        .unwrap_or(&config.encoder.algorithm);
    let encoder = DigestPasswordEncoder::new(algorithm, config.encoder.character_encoding.as_str());

    let digest = encoder
        .encode(&args.secret)
        .ok_or_else(|| anyhow!("Cannot encode secret with algorithm '{algorithm}'"))?;

    match format {
        OutputFormat::Json => print_json(&json!({
            "algorithm": encoder.algorithm(),
            "digest": digest,
        }))?,
        OutputFormat::Text => println!("{digest}"),
    }
    Ok(())
}
