//! `sunbae serve` — Start the HTTP API server.

use std::path::Path;

pub async fn run(config_path: Option<&Path>, port_override: Option<u16>) -> anyhow::Result<()> {
    let mut config = super::load_config(config_path)?;

    if let Some(port) = port_override {
        config.gateway.port = port;
    }

    println!("🎓 sunbae Gateway");
    println!("   Listening: {}:{}", config.gateway.host, config.gateway.port);
    println!("   Remote assistant: {}", if config.has_api_key() { "configured" } else { "offline" });

    sunbae_gateway::start(config)
        .await
        .map_err(|e| anyhow::anyhow!("Gateway stopped: {e}"))?;

    Ok(())
}
